//! Packed pixel layouts and the mapping from planar source formats onto them

use crate::{ColorFamily, FormatId, PixelFormat, SampleType};
use std::fmt;

/// Interleaved layout a planar RGB image gets packed into
///
/// Every packed pixel is a single native endian word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Packing {
    /// `u32`: `A << 24 | R << 16 | G << 8 | B`, 8 bits per channel, alpha is always `0xFF`
    Argb32,

    /// `u32`: `R << 20 | G << 10 | B`, 10 bits per channel, upper 2 bits are zero
    Rgb30,

    /// `u64`: `A << 48 | R << 32 | G << 16 | B`, 16 bits per channel, alpha is always `0xFFFF`
    Argb64,
}

/// The source format has no [`Packing`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("no packed layout for source format {id}")]
pub struct UnsupportedFormatError {
    pub id: FormatId,
}

impl Packing {
    /// The planar carrier format packed images are stored in
    pub const CARRIER: PixelFormat = PixelFormat::GRAY32;

    /// Resolve the packing for a planar source format
    pub fn for_format(format: PixelFormat) -> Result<Self, UnsupportedFormatError> {
        let unsupported = UnsupportedFormatError { id: format.id() };

        if format.color_family != ColorFamily::RGB
            || format.sample_type != SampleType::Integer
            || format.sub_sampling_w != 0
            || format.sub_sampling_h != 0
            || format.alpha
        {
            return Err(unsupported);
        }

        match format.bits_per_sample {
            8 => Ok(Packing::Argb32),
            10 => Ok(Packing::Rgb30),
            16 => Ok(Packing::Argb64),
            _ => Err(unsupported),
        }
    }

    /// Resolve the packing from a format tag read from a packed frame
    pub fn for_format_id(id: FormatId) -> Result<Self, UnsupportedFormatError> {
        let format = PixelFormat::from_id(id).ok_or(UnsupportedFormatError { id })?;

        Self::for_format(format)
    }

    /// Resolve the packing from the raw format tag read from a packed frame
    ///
    /// Returns `None` for values outside of the format id range.
    pub fn for_format_tag(tag: i64) -> Option<Self> {
        let id = u32::try_from(tag).ok()?;

        Self::for_format_id(FormatId(id)).ok()
    }

    /// Planar format which packs into `self`
    pub fn source_format(self) -> PixelFormat {
        match self {
            Packing::Argb32 => PixelFormat::RGB24,
            Packing::Rgb30 => PixelFormat::RGB30,
            Packing::Argb64 => PixelFormat::RGB48,
        }
    }

    pub fn bits_per_channel(self) -> u32 {
        match self {
            Packing::Argb32 => 8,
            Packing::Rgb30 => 10,
            Packing::Argb64 => 16,
        }
    }

    pub fn has_alpha(self) -> bool {
        match self {
            Packing::Argb32 | Packing::Argb64 => true,
            Packing::Rgb30 => false,
        }
    }

    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Packing::Argb32 | Packing::Rgb30 => 4,
            Packing::Argb64 => 8,
        }
    }

    /// Number of carrier samples (32 bit) one packed pixel occupies
    pub fn words_per_pixel(self) -> usize {
        self.bytes_per_pixel() / Self::CARRIER.bytes_per_sample()
    }

    /// Width of the carrier image holding `width` packed pixels
    pub fn carrier_width(self, width: usize) -> usize {
        width * self.words_per_pixel()
    }

    /// Pixel width of a carrier image that is `carrier_width` samples wide
    pub fn semantic_width(self, carrier_width: usize) -> usize {
        carrier_width / self.words_per_pixel()
    }
}

impl fmt::Display for Packing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Packing::Argb32 => "ARGB32",
            Packing::Rgb30 => "RGB30",
            Packing::Argb64 => "ARGB64",
        };

        f.write_str(name)
    }
}

/// Bit layout of a single packed pixel
///
/// Rows are handed over trimmed to the image width: sample rows hold `width * SAMPLE_BYTES`,
/// packed rows `width * PIXEL_BYTES` bytes.
pub(crate) trait Layout {
    const SAMPLE_BYTES: usize;
    const PIXEL_BYTES: usize;

    fn pack_row(r: &[u8], g: &[u8], b: &[u8], dst: &mut [u8]);
    fn unpack_row(src: &[u8], r: &mut [u8], g: &mut [u8], b: &mut [u8]);
}

pub(crate) struct Argb32;
pub(crate) struct Rgb30;
pub(crate) struct Argb64;

#[inline(always)]
fn load_u16(sample: &[u8]) -> u16 {
    u16::from_ne_bytes([sample[0], sample[1]])
}

impl Layout for Argb32 {
    const SAMPLE_BYTES: usize = 1;
    const PIXEL_BYTES: usize = 4;

    #[inline(always)]
    fn pack_row(r: &[u8], g: &[u8], b: &[u8], dst: &mut [u8]) {
        let pixels = dst.chunks_exact_mut(Self::PIXEL_BYTES);

        for (px, ((&r, &g), &b)) in pixels.zip(r.iter().zip(g).zip(b)) {
            let word = 0xFFu32 << 24 | u32::from(r) << 16 | u32::from(g) << 8 | u32::from(b);

            px.copy_from_slice(&word.to_ne_bytes());
        }
    }

    #[inline(always)]
    fn unpack_row(src: &[u8], r: &mut [u8], g: &mut [u8], b: &mut [u8]) {
        let pixels = src.chunks_exact(Self::PIXEL_BYTES);

        for (px, ((r, g), b)) in pixels.zip(r.iter_mut().zip(g.iter_mut()).zip(b.iter_mut())) {
            let word = u32::from_ne_bytes([px[0], px[1], px[2], px[3]]);

            *r = (word >> 16) as u8;
            *g = (word >> 8) as u8;
            *b = word as u8;
        }
    }
}

impl Layout for Rgb30 {
    const SAMPLE_BYTES: usize = 2;
    const PIXEL_BYTES: usize = 4;

    #[inline(always)]
    fn pack_row(r: &[u8], g: &[u8], b: &[u8], dst: &mut [u8]) {
        const MASK: u32 = 0x3FF;

        let pixels = dst.chunks_exact_mut(Self::PIXEL_BYTES);
        let samples = r
            .chunks_exact(2)
            .zip(g.chunks_exact(2))
            .zip(b.chunks_exact(2));

        for (px, ((r, g), b)) in pixels.zip(samples) {
            let r = u32::from(load_u16(r)) & MASK;
            let g = u32::from(load_u16(g)) & MASK;
            let b = u32::from(load_u16(b)) & MASK;

            px.copy_from_slice(&(r << 20 | g << 10 | b).to_ne_bytes());
        }
    }

    #[inline(always)]
    fn unpack_row(src: &[u8], r: &mut [u8], g: &mut [u8], b: &mut [u8]) {
        let pixels = src.chunks_exact(Self::PIXEL_BYTES);
        let samples = r
            .chunks_exact_mut(2)
            .zip(g.chunks_exact_mut(2))
            .zip(b.chunks_exact_mut(2));

        for (px, ((r, g), b)) in pixels.zip(samples) {
            let word = u32::from_ne_bytes([px[0], px[1], px[2], px[3]]);

            r.copy_from_slice(&(((word >> 20) & 0x3FF) as u16).to_ne_bytes());
            g.copy_from_slice(&(((word >> 10) & 0x3FF) as u16).to_ne_bytes());
            b.copy_from_slice(&((word & 0x3FF) as u16).to_ne_bytes());
        }
    }
}

impl Layout for Argb64 {
    const SAMPLE_BYTES: usize = 2;
    const PIXEL_BYTES: usize = 8;

    #[inline(always)]
    fn pack_row(r: &[u8], g: &[u8], b: &[u8], dst: &mut [u8]) {
        let pixels = dst.chunks_exact_mut(Self::PIXEL_BYTES);
        let samples = r
            .chunks_exact(2)
            .zip(g.chunks_exact(2))
            .zip(b.chunks_exact(2));

        for (px, ((r, g), b)) in pixels.zip(samples) {
            let word = 0xFFFFu64 << 48
                | u64::from(load_u16(r)) << 32
                | u64::from(load_u16(g)) << 16
                | u64::from(load_u16(b));

            px.copy_from_slice(&word.to_ne_bytes());
        }
    }

    #[inline(always)]
    fn unpack_row(src: &[u8], r: &mut [u8], g: &mut [u8], b: &mut [u8]) {
        let pixels = src.chunks_exact(Self::PIXEL_BYTES);
        let samples = r
            .chunks_exact_mut(2)
            .zip(g.chunks_exact_mut(2))
            .zip(b.chunks_exact_mut(2));

        for (px, ((r, g), b)) in pixels.zip(samples) {
            let mut word = [0u8; 8];
            word.copy_from_slice(px);
            let word = u64::from_ne_bytes(word);

            r.copy_from_slice(&((word >> 32) as u16).to_ne_bytes());
            g.copy_from_slice(&((word >> 16) as u16).to_ne_bytes());
            b.copy_from_slice(&(word as u16).to_ne_bytes());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_supported() {
        assert_eq!(Packing::for_format(PixelFormat::RGB24), Ok(Packing::Argb32));
        assert_eq!(Packing::for_format(PixelFormat::RGB30), Ok(Packing::Rgb30));
        assert_eq!(Packing::for_format(PixelFormat::RGB48), Ok(Packing::Argb64));
    }

    #[test]
    fn resolve_unsupported() {
        let rejected = [
            PixelFormat::RGB24.with_alpha(),
            PixelFormat::RGBH,
            PixelFormat::RGBS,
            PixelFormat::YUV420P8,
            PixelFormat::YUV444P8,
            PixelFormat::GRAY8,
            PixelFormat::GRAY32,
            PixelFormat::new(ColorFamily::RGB, SampleType::Integer, 12, 0, 0),
        ];

        for format in rejected {
            assert_eq!(
                Packing::for_format(format),
                Err(UnsupportedFormatError { id: format.id() }),
                "{format} must not resolve"
            );
        }
    }

    #[test]
    fn resolve_by_id() {
        assert_eq!(
            Packing::for_format_id(FormatId(0x200A_0000)),
            Ok(Packing::Rgb30)
        );
        assert!(Packing::for_format_id(FormatId(0xDEAD_BEEF)).is_err());
        assert!(Packing::for_format_id(PixelFormat::GRAY32.id()).is_err());
    }

    #[test]
    fn resolve_by_tag() {
        assert_eq!(Packing::for_format_tag(0x2010_0000), Some(Packing::Argb64));
        assert_eq!(Packing::for_format_tag(-1), None);
        assert_eq!(Packing::for_format_tag(i64::from(u32::MAX) + 0x2008_0001), None);
        assert_eq!(
            Packing::for_format_tag(i64::from(PixelFormat::YUV444P8.id())),
            None
        );
    }

    #[test]
    fn source_format_resolves_back() {
        for packing in [Packing::Argb32, Packing::Rgb30, Packing::Argb64] {
            assert_eq!(Packing::for_format(packing.source_format()), Ok(packing));
        }
    }

    #[test]
    fn carrier_widths() {
        assert_eq!(Packing::Argb32.carrier_width(640), 640);
        assert_eq!(Packing::Rgb30.carrier_width(640), 640);
        assert_eq!(Packing::Argb64.carrier_width(640), 1280);
        assert_eq!(Packing::Argb64.semantic_width(1280), 640);
    }

    #[test]
    fn argb32_word() {
        let mut dst = [0u8; 8];
        Argb32::pack_row(&[10, 20], &[50, 60], &[90, 100], &mut dst);

        let word = u32::from_ne_bytes([dst[0], dst[1], dst[2], dst[3]]);
        assert_eq!(word, 0xFF0A325A);
    }

    #[test]
    fn rgb30_word() {
        let r = 1023u16.to_ne_bytes();
        let g = 512u16.to_ne_bytes();
        let b = 1u16.to_ne_bytes();

        let mut dst = [0u8; 4];
        Rgb30::pack_row(&r, &g, &b, &mut dst);

        let word = u32::from_ne_bytes(dst);
        assert_eq!(word, 1023 << 20 | 512 << 10 | 1);
        assert_eq!(word >> 30, 0);
    }

    #[test]
    fn rgb30_ignores_padding_bits() {
        let word: u32 = 0b11 << 30 | 5 << 20 | 6 << 10 | 7;

        let (mut r, mut g, mut b) = ([0u8; 2], [0u8; 2], [0u8; 2]);
        Rgb30::unpack_row(&word.to_ne_bytes(), &mut r, &mut g, &mut b);

        assert_eq!(u16::from_ne_bytes(r), 5);
        assert_eq!(u16::from_ne_bytes(g), 6);
        assert_eq!(u16::from_ne_bytes(b), 7);
    }

    #[test]
    fn argb64_word() {
        let r = 0x1234u16.to_ne_bytes();
        let g = 0x5678u16.to_ne_bytes();
        let b = 0x9ABCu16.to_ne_bytes();

        let mut dst = [0u8; 8];
        Argb64::pack_row(&r, &g, &b, &mut dst);

        assert_eq!(u64::from_ne_bytes(dst), 0xFFFF_1234_5678_9ABC);
    }
}
