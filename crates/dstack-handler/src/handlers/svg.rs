use std::any::Any;

use crate::data::FrameData;
use crate::error::{HandlerError, Result};
use crate::handler::Handler;

/// A chart already rendered to an SVG document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Svg(String);

impl Svg {
    pub fn new(document: impl Into<String>) -> Self {
        Self(document.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Encodes [`Svg`] documents as `image/svg`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SvgHandler;

impl SvgHandler {
    pub const CONTENT_TYPE: &'static str = "image/svg";
}

impl Handler for SvgHandler {
    fn name(&self) -> &'static str {
        "svg"
    }

    fn is_capable(&self, obj: &dyn Any) -> bool {
        obj.is::<Svg>()
    }

    fn as_frame_data(&self, obj: &dyn Any) -> Result<FrameData> {
        let svg = obj
            .downcast_ref::<Svg>()
            .ok_or(HandlerError::Mismatch(self.name()))?;
        Ok(FrameData::new(
            Self::CONTENT_TYPE,
            svg.as_str().as_bytes().to_vec(),
        ))
    }
}
