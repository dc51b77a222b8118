//! Built-in handlers, one per supported object kind.

mod file;
mod json;
mod raw;
mod svg;
mod table;
mod text;

pub use self::file::FileHandler;
pub use self::json::JsonHandler;
pub use self::raw::BytesHandler;
pub use self::svg::{Svg, SvgHandler};
pub use self::table::{Table, TableHandler};
pub use self::text::TextHandler;

use crate::handler::Handler;

/// The built-in chain, most specific first.
pub fn default_handlers() -> Vec<Box<dyn Handler>> {
    vec![
        Box::new(SvgHandler),
        Box::new(TableHandler::default()),
        Box::new(JsonHandler),
        Box::new(TextHandler),
        Box::new(FileHandler),
        Box::new(BytesHandler),
    ]
}
