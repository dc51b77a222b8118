//! Request/response protocol between the dstack client and the server.
//!
//! A [`Protocol`] takes an endpoint name and a JSON payload and returns the
//! parsed JSON response. This is the lowest layer of dstack. Everything that
//! talks to the server goes through it, which is also what makes the higher
//! layers testable without a network.

pub mod error;
pub mod json;
pub mod traits;

pub use error::{ProtocolError, Result};
pub use json::JsonProtocol;
pub use traits::{Protocol, ACCESS_ENDPOINT, PUSH_ENDPOINT};
