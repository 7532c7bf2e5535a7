use crate::{BoundsCheckError, ImageMut, ImageRef, ImageRefExt, PixelFormat, infer};

/// Basic wrapper around any image, implementing the [`ImageRef`] and [`ImageMut`] trait
#[derive(Debug, Clone)]
pub struct Image<S> {
    format: PixelFormat,
    buffer: BufferKind<S>,
    strides: Vec<usize>,
    width: usize,
    height: usize,
}

#[derive(Debug, Clone)]
pub enum BufferKind<S> {
    /// All planes in one buffer, one after another
    Whole(S),
    /// One buffer per plane
    Split(Vec<S>),
}

/// Everything that can go wrong when constructing an [`Image`]
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("width or height must not be zero")]
    InvalidDimensions,

    #[error(transparent)]
    BoundsCheck(#[from] BoundsCheckError),
}

impl Image<Vec<u8>> {
    /// Zeroed image with one tightly packed buffer per plane
    pub fn blank(format: PixelFormat, width: usize, height: usize) -> Self {
        let strides = format.packed_strides(width);

        Self::blank_with_strides(format, strides, width, height)
    }

    /// Zeroed image with one buffer per plane, every row starts at a multiple of `alignment` bytes
    pub fn blank_aligned(
        format: PixelFormat,
        width: usize,
        height: usize,
        alignment: usize,
    ) -> Self {
        let strides = format.aligned_strides(width, alignment);

        Self::blank_with_strides(format, strides, width, height)
    }

    fn blank_with_strides(
        format: PixelFormat,
        strides: Vec<usize>,
        width: usize,
        height: usize,
    ) -> Self {
        let planes = format
            .plane_descs()
            .zip(&strides)
            .map(|(desc, stride)| vec![0u8; stride * desc.height_op.op(height)])
            .collect();

        Self {
            format,
            buffer: BufferKind::Split(planes),
            strides,
            width,
            height,
        }
    }
}

impl<S> Image<S>
where
    Image<S>: ImageRef,
{
    pub fn from_buffer(
        format: PixelFormat,
        buffer: S,
        strides: Option<Vec<usize>>,
        width: usize,
        height: usize,
    ) -> Result<Self, ImageError> {
        Self::new(format, BufferKind::Whole(buffer), strides, width, height)
    }

    pub fn from_planes(
        format: PixelFormat,
        planes: Vec<S>,
        strides: Option<Vec<usize>>,
        width: usize,
        height: usize,
    ) -> Result<Self, ImageError> {
        Self::new(format, BufferKind::Split(planes), strides, width, height)
    }

    fn new(
        format: PixelFormat,
        buffer: BufferKind<S>,
        strides: Option<Vec<usize>>,
        width: usize,
        height: usize,
    ) -> Result<Self, ImageError> {
        if width == 0 || height == 0 {
            return Err(ImageError::InvalidDimensions);
        }

        let strides = strides.unwrap_or_else(|| format.packed_strides(width));

        let this = Self {
            format,
            buffer,
            strides,
            width,
            height,
        };

        this.bounds_check()?;

        Ok(this)
    }
}

impl<S> Image<S> {
    pub fn buffer(&self) -> &BufferKind<S> {
        &self.buffer
    }

    pub fn into_buffer(self) -> BufferKind<S> {
        self.buffer
    }

    pub fn strides(&self) -> &[usize] {
        &self.strides
    }
}

unsafe impl<S: AsRef<[u8]>> ImageRef for Image<S> {
    fn format(&self) -> PixelFormat {
        self.format
    }
    fn width(&self) -> usize {
        self.width
    }
    fn height(&self) -> usize {
        self.height
    }

    fn planes(&self) -> Box<dyn Iterator<Item = (&[u8], usize)> + '_> {
        match &self.buffer {
            BufferKind::Whole(buffer) => {
                if self.whole_buffer_too_small(buffer.as_ref().len()) {
                    return Box::new(std::iter::empty());
                }

                Box::new(
                    infer(
                        self.format,
                        buffer.as_ref(),
                        self.width,
                        self.height,
                        Some(&self.strides),
                    )
                    .into_iter()
                    .zip(self.strides.iter().copied()),
                )
            }
            BufferKind::Split(planes) => Box::new(
                planes
                    .iter()
                    .map(|p| p.as_ref())
                    .zip(self.strides.iter().copied()),
            ),
        }
    }
}

unsafe impl<S: AsRef<[u8]> + AsMut<[u8]>> ImageMut for Image<S> {
    fn planes_mut(&mut self) -> Box<dyn Iterator<Item = (&mut [u8], usize)> + '_> {
        match &mut self.buffer {
            BufferKind::Whole(buffer) => {
                let len = buffer.as_mut().len();

                if whole_buffer_too_small(self.format, &self.strides, self.height, len) {
                    return Box::new(std::iter::empty());
                }

                Box::new(
                    infer(
                        self.format,
                        buffer.as_mut(),
                        self.width,
                        self.height,
                        Some(&self.strides),
                    )
                    .into_iter()
                    .zip(self.strides.iter().copied()),
                )
            }
            BufferKind::Split(planes) => Box::new(
                planes
                    .iter_mut()
                    .map(|plane| plane.as_mut())
                    .zip(self.strides.iter().copied()),
            ),
        }
    }
}

impl<S> Image<S> {
    fn whole_buffer_too_small(&self, len: usize) -> bool {
        whole_buffer_too_small(self.format, &self.strides, self.height, len)
    }
}

/// A whole buffer yields no planes if it cannot hold all of them
///
/// The bounds check then reports the missing planes.
fn whole_buffer_too_small(
    format: PixelFormat,
    strides: &[usize],
    height: usize,
    len: usize,
) -> bool {
    if strides.len() != format.num_planes() {
        return true;
    }

    let required = format
        .plane_descs()
        .zip(strides)
        .try_fold(0usize, |acc, (desc, stride)| {
            stride
                .checked_mul(desc.height_op.op(height))
                .and_then(|size| acc.checked_add(size))
        });

    required.is_none_or(|required| required > len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_is_bounds_checked() {
        let image = Image::blank(PixelFormat::RGB48, 7, 3);

        image.bounds_check().unwrap();
        assert_eq!(image.strides(), &[14, 14, 14]);
    }

    #[test]
    fn blank_aligned_pads_rows() {
        let image = Image::blank_aligned(PixelFormat::GRAY32, 7, 3, 64);

        image.bounds_check().unwrap();
        assert_eq!(image.strides(), &[64]);
        assert!(image.planes().all(|(plane, _)| plane.len() == 64 * 3));
    }

    #[test]
    fn blank_aligned_with_zero_alignment() {
        let image = Image::blank_aligned(PixelFormat::RGB24, 5, 2, 0);

        image.bounds_check().unwrap();
        assert_eq!(image.strides(), &[5, 5, 5]);
    }

    #[test]
    fn zero_dimensions() {
        let result = Image::from_planes(PixelFormat::GRAY8, vec![&[0u8][..]], None, 0, 1);

        assert!(matches!(result, Err(ImageError::InvalidDimensions)));
    }

    #[test]
    fn whole_buffer() {
        let buf = vec![0u8; PixelFormat::RGB24.buffer_size(4, 4)];
        let image = Image::from_buffer(PixelFormat::RGB24, &buf[..], None, 4, 4).unwrap();

        assert_eq!(image.planes().count(), 3);
    }

    #[test]
    fn whole_buffer_too_small() {
        let buf = vec![0u8; PixelFormat::RGB24.buffer_size(4, 4) - 1];
        let result = Image::from_buffer(PixelFormat::RGB24, &buf[..], None, 4, 4);

        assert!(matches!(
            result,
            Err(ImageError::BoundsCheck(
                BoundsCheckError::InvalidNumberOfPlanes(_)
            ))
        ));
    }
}
