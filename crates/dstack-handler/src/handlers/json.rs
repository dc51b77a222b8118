use std::any::Any;

use serde_json::Value;

use crate::data::FrameData;
use crate::error::{HandlerError, Result};
use crate::handler::Handler;

/// Encodes `serde_json::Value` as `application/json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonHandler;

impl JsonHandler {
    pub const CONTENT_TYPE: &'static str = "application/json";
}

impl Handler for JsonHandler {
    fn name(&self) -> &'static str {
        "json"
    }

    fn is_capable(&self, obj: &dyn Any) -> bool {
        obj.is::<Value>()
    }

    fn as_frame_data(&self, obj: &dyn Any) -> Result<FrameData> {
        let value = obj
            .downcast_ref::<Value>()
            .ok_or(HandlerError::Mismatch(self.name()))?;
        Ok(FrameData::new(Self::CONTENT_TYPE, serde_json::to_vec(value)?))
    }
}
