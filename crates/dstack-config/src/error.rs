use std::path::PathBuf;

/// Errors that can occur while resolving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No profile with this name exists in the configuration.
    #[error("profile '{0}' not found")]
    ProfileNotFound(String),

    /// None of the candidate configuration files exists.
    #[error("no configuration file found (searched: {})", display_paths(.searched))]
    NotFound { searched: Vec<PathBuf> },

    /// The configuration file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The configuration file could not be written.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML or misses required fields.
    #[error("failed to parse {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    /// The configuration could not be serialized.
    #[error("failed to serialize configuration: {0}")]
    Serialize(String),

    /// A profile field is empty or malformed.
    #[error("invalid profile '{name}': {reason}")]
    InvalidProfile { name: String, reason: String },

    /// The user's home directory could not be determined.
    #[error("unable to determine home directory")]
    NoHomeDir,
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, ConfigError>;
