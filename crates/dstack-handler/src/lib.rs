//! Type-dispatched serializers for objects committed to a stack frame.
//!
//! A [`Handler`] says whether it can encode a given object and, if so,
//! turns it into [`FrameData`]: a content type, the encoded bytes and an
//! optional preview. [`AutoHandler`] chains handlers and picks the first
//! capable one. New object types are supported by adding a handler to the
//! chain.

pub mod auto;
pub mod data;
pub mod error;
pub mod handler;
pub mod handlers;

pub use auto::AutoHandler;
pub use data::FrameData;
pub use error::{HandlerError, Result};
pub use handler::{encode, Handler};
pub use handlers::{
    default_handlers, BytesHandler, FileHandler, JsonHandler, Svg, SvgHandler, Table,
    TableHandler, TextHandler,
};
