//! Pack planar RGB frames into interleaved pixel layouts and back.
//!
//! Supported layouts ([`Packing`]):
//!
//! | source   | packing  | packed pixel                             |
//! |----------|----------|------------------------------------------|
//! | `RGB24`  | `Argb32` | `u32`, `A << 24 \| R << 16 \| G << 8 \| B` |
//! | `RGB30`  | `Rgb30`  | `u32`, `R << 20 \| G << 10 \| B`           |
//! | `RGB48`  | `Argb64` | `u64`, `A << 48 \| R << 32 \| G << 16 \| B` |
//!
//! Packed images are stored in the single plane [`PixelFormat::GRAY32`] carrier format. An
//! `Argb64` pixel takes two carrier samples, so the carrier image is twice as wide.
//!
//! [`pack`] and [`unpack`] work on any [`ImageRef`]/[`ImageMut`]. The [`Pack`] and [`Unpack`]
//! nodes wrap them for use in a frame graph, recording the source format on every packed frame
//! (see [`P2P_INPUT_FORMAT`]) so `Unpack` needs no configuration.

pub use filter::{CreateError, Pack, Unpack};
pub use frame::{FRAME_ALIGNMENT, Frame, VideoInfo};
pub use image::{BufferKind, Image, ImageError};
pub use image_traits::{ImageMut, ImageRef, ImageRefExt};
#[cfg(feature = "multi-thread")]
pub use multi_thread::{pack_multi_thread, unpack_multi_thread};
pub use pack::pack;
pub use packing::{Packing, UnsupportedFormatError};
pub use pixel_format::{BoundsCheckError, ColorFamily, FormatId, PixelFormat, SampleType};
pub use planes::{AnySlice, InvalidNumberOfPlanesError, infer};
pub use props::{FrameProps, P2P_INPUT_FORMAT, PropError, PropValue};
pub use unpack::unpack;

pub mod node;
pub mod plugin;

mod filter;
mod frame;
mod image;
mod image_traits;
#[cfg(feature = "multi-thread")]
mod multi_thread;
mod pack;
mod packing;
mod pixel_format;
mod plane_decs;
mod planes;
mod props;
mod unpack;
mod util;

pub(crate) use util::StrictApi;

/// Everything that can go wrong when packing or unpacking an image
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("width or height must not be zero")]
    InvalidDimensions,

    #[error("source and destination dimensions do not match the packing")]
    MismatchedImageSize,

    #[error("expected an image in {expected} format, got {got}")]
    MismatchedFormat {
        expected: PixelFormat,
        got: PixelFormat,
    },

    #[error(transparent)]
    InvalidNumberOfPlanes(#[from] InvalidNumberOfPlanesError),

    #[error(transparent)]
    BoundsCheck(#[from] BoundsCheckError),
}
