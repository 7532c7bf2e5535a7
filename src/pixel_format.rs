use crate::{InvalidNumberOfPlanesError, StrictApi as _, plane_decs::PlaneDesc};
use std::fmt;

/// Color family of a [`PixelFormat`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ColorFamily {
    Gray = 1,
    RGB = 2,
    YUV = 3,
}

/// How samples are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SampleType {
    Integer = 0,
    Float = 1,
}

/// Numeric identity of a [`PixelFormat`]
///
/// Layout: `family << 28 | alpha << 27 | sample_type << 24 | bits << 16 | ssw << 8 | ssh`.
/// This is the value stored as format tag on packed frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FormatId(pub u32);

impl From<FormatId> for i64 {
    fn from(id: FormatId) -> Self {
        i64::from(id.0)
    }
}

impl fmt::Display for FormatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

/// Description of a planar pixel format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelFormat {
    pub color_family: ColorFamily,
    pub sample_type: SampleType,
    pub bits_per_sample: u8,
    /// log2 of the horizontal chroma sub sampling
    pub sub_sampling_w: u8,
    /// log2 of the vertical chroma sub sampling
    pub sub_sampling_h: u8,
    /// An additional full resolution alpha plane follows the color planes
    pub alpha: bool,
}

impl PixelFormat {
    /// R, G and B planes, 8 bits per sample
    pub const RGB24: Self = Self::new(ColorFamily::RGB, SampleType::Integer, 8, 0, 0);
    /// R, G and B planes, 10 bits per sample
    pub const RGB30: Self = Self::new(ColorFamily::RGB, SampleType::Integer, 10, 0, 0);
    /// R, G and B planes, 16 bits per sample
    pub const RGB48: Self = Self::new(ColorFamily::RGB, SampleType::Integer, 16, 0, 0);
    /// R, G and B planes, 16 bit float samples
    pub const RGBH: Self = Self::new(ColorFamily::RGB, SampleType::Float, 16, 0, 0);
    /// R, G and B planes, 32 bit float samples
    pub const RGBS: Self = Self::new(ColorFamily::RGB, SampleType::Float, 32, 0, 0);

    pub const GRAY8: Self = Self::new(ColorFamily::Gray, SampleType::Integer, 8, 0, 0);
    pub const GRAY16: Self = Self::new(ColorFamily::Gray, SampleType::Integer, 16, 0, 0);
    /// Single 32 bit integer plane, used as container for packed pixels
    pub const GRAY32: Self = Self::new(ColorFamily::Gray, SampleType::Integer, 32, 0, 0);

    pub const YUV420P8: Self = Self::new(ColorFamily::YUV, SampleType::Integer, 8, 1, 1);
    pub const YUV422P8: Self = Self::new(ColorFamily::YUV, SampleType::Integer, 8, 1, 0);
    pub const YUV444P8: Self = Self::new(ColorFamily::YUV, SampleType::Integer, 8, 0, 0);
    pub const YUV444P16: Self = Self::new(ColorFamily::YUV, SampleType::Integer, 16, 0, 0);

    pub const fn new(
        color_family: ColorFamily,
        sample_type: SampleType,
        bits_per_sample: u8,
        sub_sampling_w: u8,
        sub_sampling_h: u8,
    ) -> Self {
        Self {
            color_family,
            sample_type,
            bits_per_sample,
            sub_sampling_w,
            sub_sampling_h,
            alpha: false,
        }
    }

    /// Same format with an additional alpha plane
    pub const fn with_alpha(mut self) -> Self {
        self.alpha = true;
        self
    }

    pub const fn id(&self) -> FormatId {
        FormatId(
            (self.color_family as u32) << 28
                | (self.alpha as u32) << 27
                | (self.sample_type as u32) << 24
                | (self.bits_per_sample as u32) << 16
                | (self.sub_sampling_w as u32) << 8
                | self.sub_sampling_h as u32,
        )
    }

    /// Decode a [`FormatId`], returns `None` if it doesn't describe a valid format
    pub fn from_id(id: FormatId) -> Option<Self> {
        let id = id.0;

        let color_family = match id >> 28 {
            1 => ColorFamily::Gray,
            2 => ColorFamily::RGB,
            3 => ColorFamily::YUV,
            _ => return None,
        };

        let sample_type = match (id >> 24) & 0x7 {
            0 => SampleType::Integer,
            1 => SampleType::Float,
            _ => return None,
        };

        let format = Self {
            color_family,
            sample_type,
            bits_per_sample: (id >> 16) as u8,
            sub_sampling_w: (id >> 8) as u8,
            sub_sampling_h: id as u8,
            alpha: (id >> 27) & 1 == 1,
        };

        format.is_valid().then_some(format)
    }

    /// Check the combination of fields describes a format that can exist
    pub fn is_valid(&self) -> bool {
        let depth_ok = match self.sample_type {
            SampleType::Integer => (8..=32).contains(&self.bits_per_sample),
            SampleType::Float => matches!(self.bits_per_sample, 16 | 32),
        };

        let sub_sampling_ok = match self.color_family {
            ColorFamily::YUV => self.sub_sampling_w <= 4 && self.sub_sampling_h <= 4,
            ColorFamily::Gray | ColorFamily::RGB => {
                self.sub_sampling_w == 0 && self.sub_sampling_h == 0
            }
        };

        depth_ok && sub_sampling_ok
    }

    pub fn bytes_per_sample(&self) -> usize {
        match self.bits_per_sample {
            0..=8 => 1,
            9..=16 => 2,
            _ => 4,
        }
    }

    pub fn num_planes(&self) -> usize {
        let color = match self.color_family {
            ColorFamily::Gray => 1,
            ColorFamily::RGB | ColorFamily::YUV => 3,
        };

        color + usize::from(self.alpha)
    }

    pub(crate) fn plane_desc(&self, plane: usize) -> PlaneDesc {
        let bytes = self.bytes_per_sample();

        if self.color_family == ColorFamily::YUV && (plane == 1 || plane == 2) {
            PlaneDesc::sub_sampled(bytes, self.sub_sampling_w, self.sub_sampling_h)
        } else {
            PlaneDesc::full(bytes)
        }
    }

    pub(crate) fn plane_descs(&self) -> impl Iterator<Item = PlaneDesc> + '_ {
        (0..self.num_planes()).map(|plane| self.plane_desc(plane))
    }

    /// Calculate the required buffer size in bytes given the [`PixelFormat`] self and image dimensions (in pixel width, height).
    #[deny(clippy::arithmetic_side_effects)]
    pub fn buffer_size(self, width: usize, height: usize) -> usize {
        let mut size: usize = 0;

        for plane in self.plane_descs() {
            let w = plane.width_op.op(width);
            let h = plane.height_op.op(height);

            size = size.strict_add_(w.strict_mul_(h).strict_mul_(plane.bytes_per_sample));
        }

        size
    }

    /// Calculate the strides of an image in a packed buffer
    #[deny(clippy::arithmetic_side_effects)]
    pub fn packed_strides(self, width: usize) -> Vec<usize> {
        self.plane_descs()
            .map(|desc| desc.packed_stride(width))
            .collect()
    }

    /// Calculate strides where every row starts at a multiple of `alignment` bytes
    ///
    /// An `alignment` of 0 is treated as 1, giving the packed strides.
    pub fn aligned_strides(self, width: usize, alignment: usize) -> Vec<usize> {
        let alignment = alignment.max(1);

        self.plane_descs()
            .map(|desc| desc.packed_stride(width).next_multiple_of(alignment))
            .collect()
    }

    /// Check if the given planes+strides are valid for dimensions
    #[deny(clippy::arithmetic_side_effects)]
    pub fn bounds_check<'a>(
        self,
        planes: impl Iterator<Item = (&'a [u8], usize)>,
        width: usize,
        height: usize,
    ) -> Result<(), BoundsCheckError> {
        let expected = self.num_planes();
        let mut got = 0usize;

        for (desc, (slice, stride)) in self.plane_descs().zip(planes) {
            let i = got;
            got = got.strict_add_(1);

            // Ensure stride is not smaller than the width would allow
            let min_stride = desc.packed_stride(width);

            if min_stride > stride {
                return Err(BoundsCheckError::InvalidStride {
                    plane: i,
                    minimum: min_stride,
                    got: stride,
                });
            }

            // Ensure slice is large enough
            let min_len = stride.strict_mul_(desc.height_op.op(height));

            if min_len > slice.len() {
                return Err(BoundsCheckError::InvalidPlaneSize {
                    plane: i,
                    minimum: min_len,
                    got: slice.len(),
                });
            }
        }

        if got != expected {
            return Err(InvalidNumberOfPlanesError { expected, got }.into());
        }

        Ok(())
    }

    fn name(&self) -> Option<&'static str> {
        let name = match *self {
            Self::RGB24 => "RGB24",
            Self::RGB30 => "RGB30",
            Self::RGB48 => "RGB48",
            Self::RGBH => "RGBH",
            Self::RGBS => "RGBS",
            Self::GRAY8 => "Gray8",
            Self::GRAY16 => "Gray16",
            Self::GRAY32 => "Gray32",
            Self::YUV420P8 => "YUV420P8",
            Self::YUV422P8 => "YUV422P8",
            Self::YUV444P8 => "YUV444P8",
            Self::YUV444P16 => "YUV444P16",
            _ => return None,
        };

        Some(name)
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = self.name() {
            return f.write_str(name);
        }

        write!(
            f,
            "{:?} {:?} {}bit {}x{}",
            self.color_family,
            self.sample_type,
            self.bits_per_sample,
            self.sub_sampling_w,
            self.sub_sampling_h
        )?;

        if self.alpha {
            f.write_str(" +alpha")?;
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BoundsCheckError {
    #[error(transparent)]
    InvalidNumberOfPlanes(#[from] InvalidNumberOfPlanesError),

    #[error("invalid stride at plane {plane}, expected it to be at least {minimum}, but got {got}")]
    InvalidStride {
        plane: usize,
        minimum: usize,
        got: usize,
    },

    #[error(
        "invalid plane size at plane {plane}, expected it to be at least {minimum}, but got {got}"
    )]
    InvalidPlaneSize {
        plane: usize,
        minimum: usize,
        got: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_known_ids() {
        assert_eq!(PixelFormat::RGB24.id(), FormatId(0x2008_0000));
        assert_eq!(PixelFormat::RGB30.id(), FormatId(0x200A_0000));
        assert_eq!(PixelFormat::RGB48.id(), FormatId(0x2010_0000));
        assert_eq!(PixelFormat::GRAY32.id(), FormatId(0x1020_0000));
        assert_eq!(PixelFormat::YUV420P8.id(), FormatId(0x3008_0101));
    }

    #[test]
    fn id_survives_decode() {
        let formats = [
            PixelFormat::RGB24,
            PixelFormat::RGBS,
            PixelFormat::YUV420P8,
            PixelFormat::GRAY32,
            PixelFormat::RGB24.with_alpha(),
        ];

        for format in formats {
            assert_eq!(PixelFormat::from_id(format.id()), Some(format));
        }
    }

    #[test]
    fn invalid_ids() {
        assert_eq!(PixelFormat::from_id(FormatId(0)), None);
        // RGB cannot be sub sampled
        assert_eq!(PixelFormat::from_id(FormatId(0x2008_0101)), None);
        // 8 bit float
        assert_eq!(PixelFormat::from_id(FormatId(0x2108_0000)), None);
    }

    #[test]
    fn planes_and_sizes() {
        assert_eq!(PixelFormat::RGB24.num_planes(), 3);
        assert_eq!(PixelFormat::RGB24.with_alpha().num_planes(), 4);
        assert_eq!(PixelFormat::GRAY32.num_planes(), 1);

        assert_eq!(PixelFormat::RGB30.bytes_per_sample(), 2);
        assert_eq!(PixelFormat::GRAY32.bytes_per_sample(), 4);

        assert_eq!(PixelFormat::RGB48.buffer_size(4, 2), 4 * 2 * 2 * 3);
        assert_eq!(PixelFormat::YUV420P8.buffer_size(4, 2), 8 + 2 + 2);
        assert_eq!(PixelFormat::YUV420P8.packed_strides(4), vec![4, 2, 2]);
        assert_eq!(PixelFormat::RGB24.aligned_strides(10, 64), vec![64, 64, 64]);
        assert_eq!(PixelFormat::RGB48.aligned_strides(10, 0), vec![20, 20, 20]);
    }

    #[test]
    fn bounds_check_rejects_short_stride() {
        let plane = [0u8; 16];
        let planes = [(&plane[..], 3), (&plane[..], 4), (&plane[..], 4)];

        let err = PixelFormat::RGB24
            .bounds_check(planes.into_iter(), 4, 2)
            .unwrap_err();

        assert!(matches!(
            err,
            BoundsCheckError::InvalidStride {
                plane: 0,
                minimum: 4,
                got: 3
            }
        ));
    }

    #[test]
    fn bounds_check_rejects_missing_plane() {
        let plane = [0u8; 16];
        let planes = [(&plane[..], 4), (&plane[..], 4)];

        let err = PixelFormat::RGB24
            .bounds_check(planes.into_iter(), 4, 2)
            .unwrap_err();

        assert!(matches!(
            err,
            BoundsCheckError::InvalidNumberOfPlanes(InvalidNumberOfPlanesError {
                expected: 3,
                got: 2
            })
        ));
    }

    #[test]
    fn display() {
        assert_eq!(PixelFormat::RGB48.to_string(), "RGB48");
        assert_eq!(
            PixelFormat::RGB24.with_alpha().to_string(),
            "RGB Integer 8bit 0x0 +alpha"
        );
    }
}
