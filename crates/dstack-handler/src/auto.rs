use std::any::Any;
use std::fmt;

use tracing::debug;

use crate::data::FrameData;
use crate::error::{HandlerError, Result};
use crate::handler::Handler;
use crate::handlers::default_handlers;

/// Ordered chain of handlers; the first capable one encodes the object.
pub struct AutoHandler {
    handlers: Vec<Box<dyn Handler>>,
}

impl AutoHandler {
    /// Chain of all built-in handlers.
    pub fn new() -> Self {
        Self::with_handlers(default_handlers())
    }

    /// Chain with no handlers; every object is unsupported until some are added.
    pub fn empty() -> Self {
        Self::with_handlers(Vec::new())
    }

    /// Chain of exactly these handlers, in this order.
    pub fn with_handlers(handlers: Vec<Box<dyn Handler>>) -> Self {
        Self { handlers }
    }

    /// Add a handler at the end (lowest priority).
    pub fn push_handler(&mut self, handler: Box<dyn Handler>) {
        self.handlers.push(handler);
    }

    /// Add a handler at the front (highest priority).
    pub fn prepend_handler(&mut self, handler: Box<dyn Handler>) {
        self.handlers.insert(0, handler);
    }

    /// Handler names in dispatch order.
    pub fn handler_names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|handler| handler.name()).collect()
    }

    /// First handler capable of encoding `obj`.
    pub fn resolve(&self, obj: &dyn Any) -> Option<&dyn Handler> {
        self.handlers
            .iter()
            .find(|handler| handler.is_capable(obj))
            .map(|handler| &**handler)
    }
}

impl Default for AutoHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AutoHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutoHandler")
            .field("handlers", &self.handler_names())
            .finish()
    }
}

impl Handler for AutoHandler {
    fn name(&self) -> &'static str {
        "auto"
    }

    fn is_capable(&self, obj: &dyn Any) -> bool {
        self.resolve(obj).is_some()
    }

    fn as_frame_data(&self, obj: &dyn Any) -> Result<FrameData> {
        match self.resolve(obj) {
            Some(handler) => {
                debug!(handler = handler.name(), "dispatching object");
                handler.as_frame_data(obj)
            }
            None => Err(HandlerError::UnsupportedObjectType {
                type_name: "<unknown>",
                handler: self.name(),
            }),
        }
    }
}
