use crate::{FrameProps, Image, ImageMut, ImageRef, PixelFormat};

/// Row alignment in bytes of frames allocated with [`Frame::new`]
pub const FRAME_ALIGNMENT: usize = 64;

/// Format and dimensions shared by every frame of a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoInfo {
    pub format: PixelFormat,
    pub width: usize,
    pub height: usize,
    pub num_frames: usize,
}

/// Image together with its properties, the unit passed between nodes
#[derive(Debug, Clone)]
pub struct Frame {
    image: Image<Vec<u8>>,
    props: FrameProps,
}

impl Frame {
    /// Allocate a zeroed frame, rows of every plane are aligned to [`FRAME_ALIGNMENT`]
    pub fn new(format: PixelFormat, width: usize, height: usize) -> Self {
        Self {
            image: Image::blank_aligned(format, width, height, FRAME_ALIGNMENT),
            props: FrameProps::new(),
        }
    }

    /// Allocate a zeroed frame which starts out with a copy of the properties of `prop_src`
    pub fn new_with_props(
        format: PixelFormat,
        width: usize,
        height: usize,
        prop_src: &Frame,
    ) -> Self {
        let mut frame = Self::new(format, width, height);
        frame.props = prop_src.props.clone();
        frame
    }

    pub fn props(&self) -> &FrameProps {
        &self.props
    }

    pub fn props_mut(&mut self) -> &mut FrameProps {
        &mut self.props
    }
}

unsafe impl ImageRef for Frame {
    fn format(&self) -> PixelFormat {
        self.image.format()
    }

    fn width(&self) -> usize {
        self.image.width()
    }

    fn height(&self) -> usize {
        self.image.height()
    }

    fn planes(&self) -> Box<dyn Iterator<Item = (&[u8], usize)> + '_> {
        self.image.planes()
    }
}

unsafe impl ImageMut for Frame {
    fn planes_mut(&mut self) -> Box<dyn Iterator<Item = (&mut [u8], usize)> + '_> {
        self.image.planes_mut()
    }
}
