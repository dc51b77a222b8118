//! Push data artifacts to a dstack server.
//!
//! A frame is created for a stack, objects are committed to it and the
//! frame is pushed in one request:
//!
//! ```no_run
//! use dstack::handler::Svg;
//!
//! let mut frame = dstack::create_frame("plots/my_plot")?;
//! frame.commit(&Svg::new("<svg/>"), Some("My first plot"), None)?;
//! let result = frame.push()?;
//! println!("{result}");
//! # Ok::<(), dstack::Error>(())
//! ```
//!
//! # Crate Structure
//!
//! - [`protocol`]: request/response protocol and the HTTP JSON implementation
//! - [`config`]: profiles and configuration file lookup
//! - [`handler`]: type-dispatched serializers for committed objects
//! - [`frame`]: stack frames, attachments and encryption

mod error;
mod session;

pub use error::{Error, Result};
pub use session::{
    configure, create_frame, push_frame, push_frame_with, reset_configuration, FrameBuilder,
};

/// Re-export protocol types.
pub mod protocol {
    pub use dstack_protocol::*;
}

/// Re-export configuration types.
pub mod config {
    pub use dstack_config::*;
}

/// Re-export handler types.
pub mod handler {
    pub use dstack_handler::*;
}

/// Re-export frame types.
pub mod frame {
    pub use dstack_frame::*;
}
