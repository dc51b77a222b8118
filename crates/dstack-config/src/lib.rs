//! Profile and configuration lookup.
//!
//! A [`Profile`] names the credentials used for a push: user, token and
//! server. Profiles come from a [`Config`], which is either built in memory
//! ([`InPlaceConfig`]) or read from a TOML file ([`FileConfig`]). A
//! [`ConfigFactory`] decides which source to read when a frame is created.

pub mod config;
pub mod error;
pub mod factory;
pub mod file;
pub mod profile;

pub use config::{Config, InPlaceConfig};
pub use error::{ConfigError, Result};
pub use factory::{ConfigFactory, FileConfigFactory, CONFIG_DIR, CONFIG_FILE};
pub use file::FileConfig;
pub use profile::{Profile, DEFAULT_PROFILE, DEFAULT_SERVER};
