//! Pull based frame graph
//!
//! Every frame request runs through [`RequestState`]: a node first sees [`Activation::Initial`]
//! where it registers the upstream frames it depends on. Once those are delivered it is
//! activated again with [`Activation::AllFramesReady`] and produces its frame.

use crate::{Frame, VideoInfo};
use std::sync::Arc;

pub type NodeRef = Arc<dyn Node>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Initial,
    AllFramesReady,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    /// Waiting for the node's initial activation
    Requested,
    /// All dependencies were delivered
    Ready,
    /// The frame was produced
    Completed,
}

/// Failure to produce a frame, carries a human readable message
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct FetchError {
    message: String,
}

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A stage in the frame graph
///
/// Nodes may be asked for different frames from many threads at once.
pub trait Node: Send + Sync {
    fn name(&self) -> &str;

    fn video_info(&self) -> &VideoInfo;

    /// Produce frame `n`
    ///
    /// Returning `None` on [`Activation::Initial`] means the node registered dependencies on
    /// `ctx` and wants to be activated again once they are available.
    fn get_frame(
        &self,
        n: usize,
        activation: Activation,
        ctx: &mut FrameContext,
    ) -> Result<Option<Arc<Frame>>, FetchError>;
}

struct Dependency {
    node: NodeRef,
    n: usize,
    frame: Option<Arc<Frame>>,
}

/// Per request bookkeeping of upstream frames
#[derive(Default)]
pub struct FrameContext {
    dependencies: Vec<Dependency>,
}

impl FrameContext {
    /// Register frame `n` of `node` as dependency of the current request
    pub fn request_frame(&mut self, n: usize, node: &NodeRef) {
        self.dependencies.push(Dependency {
            node: node.clone(),
            n,
            frame: None,
        });
    }

    /// Get a previously requested frame, available during [`Activation::AllFramesReady`]
    pub fn get_frame(&self, n: usize, node: &NodeRef) -> Option<Arc<Frame>> {
        self.dependencies
            .iter()
            .find(|dep| dep.n == n && std::ptr::addr_eq(Arc::as_ptr(&dep.node), Arc::as_ptr(node)))
            .and_then(|dep| dep.frame.clone())
    }

    fn resolve(&mut self) -> Result<(), FetchError> {
        for dep in &mut self.dependencies {
            if dep.frame.is_none() {
                dep.frame = Some(fetch_frame(&dep.node, dep.n)?);
            }
        }

        Ok(())
    }
}

/// Drives a single frame request through its [`RequestState`]s
pub struct FrameRequest {
    node: NodeRef,
    n: usize,
    state: RequestState,
    ctx: FrameContext,
}

impl FrameRequest {
    pub fn new(node: NodeRef, n: usize) -> Self {
        Self {
            node,
            n,
            state: RequestState::Requested,
            ctx: FrameContext::default(),
        }
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    /// Move the request one state further
    ///
    /// Returns the frame once the request is [`RequestState::Completed`].
    pub fn advance(&mut self) -> Result<Option<Arc<Frame>>, FetchError> {
        match self.state {
            RequestState::Requested => {
                let frame = self
                    .node
                    .get_frame(self.n, Activation::Initial, &mut self.ctx)?;

                if let Some(frame) = frame {
                    self.transition(RequestState::Completed);
                    return Ok(Some(frame));
                }

                self.ctx.resolve()?;
                self.transition(RequestState::Ready);

                Ok(None)
            }
            RequestState::Ready => {
                let frame = self
                    .node
                    .get_frame(self.n, Activation::AllFramesReady, &mut self.ctx)?
                    .ok_or_else(|| {
                        FetchError::new(format!(
                            "{} returned no frame for frame {}",
                            self.node.name(),
                            self.n
                        ))
                    })?;

                self.transition(RequestState::Completed);

                Ok(Some(frame))
            }
            RequestState::Completed => Err(FetchError::new(format!(
                "request for frame {} of {} already completed",
                self.n,
                self.node.name()
            ))),
        }
    }

    fn transition(&mut self, state: RequestState) {
        tracing::trace!(
            node = self.node.name(),
            n = self.n,
            from = ?self.state,
            to = ?state,
            "frame request"
        );

        self.state = state;
    }
}

/// Fetch frame `n` of `node`, blocking until it and all its dependencies are produced
pub fn fetch_frame(node: &NodeRef, n: usize) -> Result<Arc<Frame>, FetchError> {
    let num_frames = node.video_info().num_frames;

    if n >= num_frames {
        return Err(FetchError::new(format!(
            "requested frame {n} of {}, which only has {num_frames} frames",
            node.name()
        )));
    }

    let mut request = FrameRequest::new(node.clone(), n);

    loop {
        if let Some(frame) = request.advance()? {
            return Ok(frame);
        }
    }
}

/// Everything that can go wrong when constructing a [`Clip`]
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ClipError {
    #[error("a clip needs at least one frame")]
    Empty,

    #[error("frames must not have a zero width or height")]
    InvalidDimensions,

    #[error("frame {index} differs in format or dimensions from the first frame")]
    MismatchedFrame { index: usize },
}

/// Source node serving frames from memory
pub struct Clip {
    info: VideoInfo,
    frames: Vec<Arc<Frame>>,
}

impl Clip {
    pub fn new(frames: Vec<Frame>) -> Result<Self, ClipError> {
        use crate::ImageRef as _;

        let first = frames.first().ok_or(ClipError::Empty)?;

        let info = VideoInfo {
            format: first.format(),
            width: first.width(),
            height: first.height(),
            num_frames: frames.len(),
        };

        if info.width == 0 || info.height == 0 {
            return Err(ClipError::InvalidDimensions);
        }

        for (index, frame) in frames.iter().enumerate() {
            if (frame.format(), frame.width(), frame.height())
                != (info.format, info.width, info.height)
            {
                return Err(ClipError::MismatchedFrame { index });
            }
        }

        Ok(Self {
            info,
            frames: frames.into_iter().map(Arc::new).collect(),
        })
    }

    pub fn into_node(self) -> NodeRef {
        Arc::new(self)
    }
}

impl Node for Clip {
    fn name(&self) -> &str {
        "Clip"
    }

    fn video_info(&self) -> &VideoInfo {
        &self.info
    }

    fn get_frame(
        &self,
        n: usize,
        _activation: Activation,
        _ctx: &mut FrameContext,
    ) -> Result<Option<Arc<Frame>>, FetchError> {
        self.frames
            .get(n)
            .cloned()
            .map(Some)
            .ok_or_else(|| FetchError::new(format!("Clip: frame {n} does not exist")))
    }
}
