use std::any::{type_name, Any};

use crate::data::FrameData;
use crate::error::{HandlerError, Result};

/// Encodes objects of the types it declares itself capable of.
pub trait Handler: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Whether this handler can encode `obj`.
    fn is_capable(&self, obj: &dyn Any) -> bool;

    /// Encode `obj`. Callers check [`Handler::is_capable`] first.
    fn as_frame_data(&self, obj: &dyn Any) -> Result<FrameData>;
}

impl<H: Handler + ?Sized> Handler for Box<H> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn is_capable(&self, obj: &dyn Any) -> bool {
        (**self).is_capable(obj)
    }

    fn as_frame_data(&self, obj: &dyn Any) -> Result<FrameData> {
        (**self).as_frame_data(obj)
    }
}

/// Encode `obj` with `handler`, reporting the concrete type when refused.
pub fn encode<T: Any>(handler: &dyn Handler, obj: &T) -> Result<FrameData> {
    let obj: &dyn Any = obj;
    if !handler.is_capable(obj) {
        return Err(HandlerError::UnsupportedObjectType {
            type_name: type_name::<T>(),
            handler: handler.name(),
        });
    }
    handler.as_frame_data(obj)
}
