//! Stack frames: the commit/push session of the dstack client.
//!
//! A [`StackFrame`] collects committed objects as [`Attachment`]s and sends
//! them to the server in one envelope on [`StackFrame::push`]. Objects are
//! encoded by a handler chain, optionally encrypted by an
//! [`EncryptionMethod`], and delivered through a
//! [`Protocol`](dstack_protocol::Protocol).

pub mod attachment;
pub mod encryption;
pub mod envelope;
pub mod error;
pub mod path;
pub mod stack;

pub use attachment::{Attachment, Params};
pub use encryption::{AesGcmEncryption, Encrypted, EncryptionError, EncryptionMethod, NoEncryption};
pub use envelope::{ClientSettings, OsInfo, CLIENT_NAME};
pub use error::{FrameError, Result};
pub use path::normalize_stack_path;
pub use stack::{PushResult, StackFrame};
