use std::any::Any;

use crate::data::FrameData;
use crate::error::{HandlerError, Result};
use crate::handler::Handler;

/// Encodes `String` and `&'static str` as `text/plain`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextHandler;

impl TextHandler {
    pub const CONTENT_TYPE: &'static str = "text/plain";
}

fn as_text(obj: &dyn Any) -> Option<&str> {
    obj.downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| obj.downcast_ref::<&'static str>().copied())
}

impl Handler for TextHandler {
    fn name(&self) -> &'static str {
        "text"
    }

    fn is_capable(&self, obj: &dyn Any) -> bool {
        as_text(obj).is_some()
    }

    fn as_frame_data(&self, obj: &dyn Any) -> Result<FrameData> {
        let text = as_text(obj).ok_or(HandlerError::Mismatch(self.name()))?;
        Ok(FrameData::new(Self::CONTENT_TYPE, text.as_bytes().to_vec()))
    }
}
