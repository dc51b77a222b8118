use std::any::Any;

use bytes::Bytes;

use crate::data::FrameData;
use crate::error::{HandlerError, Result};
use crate::handler::Handler;

/// Encodes raw `Vec<u8>` or `Bytes` as `application/octet-stream`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesHandler;

impl BytesHandler {
    pub const CONTENT_TYPE: &'static str = "application/octet-stream";
}

impl Handler for BytesHandler {
    fn name(&self) -> &'static str {
        "bytes"
    }

    fn is_capable(&self, obj: &dyn Any) -> bool {
        obj.is::<Vec<u8>>() || obj.is::<Bytes>()
    }

    fn as_frame_data(&self, obj: &dyn Any) -> Result<FrameData> {
        if let Some(bytes) = obj.downcast_ref::<Bytes>() {
            return Ok(FrameData::new(Self::CONTENT_TYPE, bytes.clone()));
        }
        let bytes = obj
            .downcast_ref::<Vec<u8>>()
            .ok_or(HandlerError::Mismatch(self.name()))?;
        Ok(FrameData::new(Self::CONTENT_TYPE, bytes.clone()))
    }
}
