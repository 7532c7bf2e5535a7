//! `Pack` and `Unpack` nodes
//!
//! The packing is resolved once when a node is constructed and never re-checked per frame.
//! `Unpack` trusts the format tag of frame 0 for the whole stream, keeping it consistent is up
//! to whoever produced the stream. Frames that do not match the upstream [`VideoInfo`] fail
//! their request with a [`FetchError`].

use crate::node::{Activation, FetchError, FrameContext, Node, NodeRef, fetch_frame};
use crate::{FormatId, Frame, Packing, PixelFormat, PropError, UnsupportedFormatError, VideoInfo};
use std::sync::Arc;

#[cfg(not(feature = "multi-thread"))]
use crate::{pack, unpack};
#[cfg(feature = "multi-thread")]
use crate::{pack_multi_thread as pack, unpack_multi_thread as unpack};

/// Everything that can go wrong when constructing a [`Pack`] or [`Unpack`] node
#[derive(Debug, thiserror::Error)]
pub enum CreateError {
    #[error("Pack: only RGB24, RGB30 and RGB48 inputs are supported!")]
    UnsupportedFormat(#[source] UnsupportedFormatError),

    #[error("Unpack: only Gray32 input is supported!")]
    UnsupportedCarrier { got: PixelFormat },

    #[error("Unpack: failed to retrieve first frame from clip. Error message: {0}")]
    FetchFailure(#[source] FetchError),

    #[error("Unpack: first frame carries no usable _P2PInputFormat property!")]
    MissingFormatTag(#[source] PropError),

    #[error("Unpack: unsupported source format!")]
    UnsupportedSourceFormat { tag: i64 },

    #[error("clip dimensions {width}x{height} must not be zero!")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Unpack: carrier width {width} does not hold a whole number of {packing} pixels!")]
    InvalidCarrierWidth { width: usize, packing: Packing },
}

/// Packs planar RGB24, RGB30 or RGB48 frames into a [`Packing::CARRIER`] stream
pub struct Pack {
    upstream: NodeRef,
    info: VideoInfo,
    src_format: FormatId,
    packing: Packing,
}

impl Pack {
    pub fn new(clip: NodeRef) -> Result<Self, CreateError> {
        let src = *clip.video_info();

        if src.width == 0 || src.height == 0 {
            return Err(CreateError::InvalidDimensions {
                width: src.width,
                height: src.height,
            });
        }

        let packing = Packing::for_format(src.format).map_err(|e| {
            tracing::debug!(format = %src.format, "Pack: rejected input format");
            CreateError::UnsupportedFormat(e)
        })?;

        let info = VideoInfo {
            format: Packing::CARRIER,
            width: packing.carrier_width(src.width),
            ..src
        };

        tracing::debug!(
            format = %src.format,
            %packing,
            width = src.width,
            height = src.height,
            carrier_width = info.width,
            "Pack: created"
        );

        Ok(Self {
            upstream: clip,
            info,
            src_format: src.format.id(),
            packing,
        })
    }

    pub fn packing(&self) -> Packing {
        self.packing
    }

    pub fn into_node(self) -> NodeRef {
        Arc::new(self)
    }
}

impl Node for Pack {
    fn name(&self) -> &str {
        "Pack"
    }

    fn video_info(&self) -> &VideoInfo {
        &self.info
    }

    fn get_frame(
        &self,
        n: usize,
        activation: Activation,
        ctx: &mut FrameContext,
    ) -> Result<Option<Arc<Frame>>, FetchError> {
        let src = match activation {
            Activation::Initial => {
                ctx.request_frame(n, &self.upstream);
                return Ok(None);
            }
            Activation::AllFramesReady => ctx
                .get_frame(n, &self.upstream)
                .ok_or_else(|| FetchError::new(format!("Pack: frame {n} was not delivered")))?,
        };

        let VideoInfo {
            format,
            width,
            height,
            ..
        } = self.info;
        let mut dst = Frame::new_with_props(format, width, height, &src);

        pack(&*src, &mut dst, self.packing)
            .map_err(|e| FetchError::new(format!("Pack: frame {n}: {e}")))?;

        dst.props_mut().set_format_tag(self.src_format);

        Ok(Some(Arc::new(dst)))
    }
}

/// Restores the planar frames of a stream created by [`Pack`]
pub struct Unpack {
    upstream: NodeRef,
    info: VideoInfo,
    packing: Packing,
}

impl Unpack {
    /// Blocks on fetching the first frame of `clip` to read its format tag
    pub fn new(clip: NodeRef) -> Result<Self, CreateError> {
        let carrier = *clip.video_info();

        if carrier.format != Packing::CARRIER {
            tracing::debug!(format = %carrier.format, "Unpack: rejected input format");
            return Err(CreateError::UnsupportedCarrier {
                got: carrier.format,
            });
        }

        if carrier.width == 0 || carrier.height == 0 {
            return Err(CreateError::InvalidDimensions {
                width: carrier.width,
                height: carrier.height,
            });
        }

        let tag = {
            let first = fetch_frame(&clip, 0).map_err(CreateError::FetchFailure)?;

            first
                .props()
                .format_tag()
                .map_err(CreateError::MissingFormatTag)?
        };

        let packing =
            Packing::for_format_tag(tag).ok_or(CreateError::UnsupportedSourceFormat { tag })?;

        if carrier.width % packing.words_per_pixel() != 0 {
            return Err(CreateError::InvalidCarrierWidth {
                width: carrier.width,
                packing,
            });
        }

        let info = VideoInfo {
            format: packing.source_format(),
            width: packing.semantic_width(carrier.width),
            ..carrier
        };

        tracing::debug!(
            tag,
            %packing,
            carrier_width = carrier.width,
            width = info.width,
            height = info.height,
            "Unpack: created"
        );

        Ok(Self {
            upstream: clip,
            info,
            packing,
        })
    }

    pub fn packing(&self) -> Packing {
        self.packing
    }

    pub fn into_node(self) -> NodeRef {
        Arc::new(self)
    }
}

impl Node for Unpack {
    fn name(&self) -> &str {
        "Unpack"
    }

    fn video_info(&self) -> &VideoInfo {
        &self.info
    }

    fn get_frame(
        &self,
        n: usize,
        activation: Activation,
        ctx: &mut FrameContext,
    ) -> Result<Option<Arc<Frame>>, FetchError> {
        let src = match activation {
            Activation::Initial => {
                ctx.request_frame(n, &self.upstream);
                return Ok(None);
            }
            Activation::AllFramesReady => ctx
                .get_frame(n, &self.upstream)
                .ok_or_else(|| FetchError::new(format!("Unpack: frame {n} was not delivered")))?,
        };

        let VideoInfo {
            format,
            width,
            height,
            ..
        } = self.info;
        let mut dst = Frame::new_with_props(format, width, height, &src);

        unpack(&*src, &mut dst, self.packing)
            .map_err(|e| FetchError::new(format!("Unpack: frame {n}: {e}")))?;

        Ok(Some(Arc::new(dst)))
    }
}
