use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::{Config, InPlaceConfig};
use crate::error::{ConfigError, Result};
use crate::file::FileConfig;

/// Directory holding the configuration file, relative to its root.
pub const CONFIG_DIR: &str = ".dstack";

/// Configuration file name inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "config.toml";

/// Produces the configuration consulted when a frame is created.
///
/// Called once per frame creation; implementations should not cache.
pub trait ConfigFactory: Send + Sync {
    fn get_config(&self) -> Result<Box<dyn Config>>;
}

/// An in-memory configuration is its own factory.
impl ConfigFactory for InPlaceConfig {
    fn get_config(&self) -> Result<Box<dyn Config>> {
        Ok(Box::new(self.clone()))
    }
}

/// A loaded file is served as is; it is not re-read per frame.
impl ConfigFactory for FileConfig {
    fn get_config(&self) -> Result<Box<dyn Config>> {
        Ok(Box::new(self.clone()))
    }
}

/// File lookup: an explicit path, else the working directory, else home.
///
/// Only the first existing file is read; files are never merged.
#[derive(Debug, Clone, Default)]
pub struct FileConfigFactory {
    explicit: Option<PathBuf>,
    working_dir: Option<PathBuf>,
    home_dir: Option<PathBuf>,
}

impl FileConfigFactory {
    /// Look in the process working directory, then the user's home.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use exactly this file and nothing else.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            explicit: Some(path.into()),
            ..Self::default()
        }
    }

    /// Override the working and home directories used for lookup.
    pub fn with_roots(working_dir: impl Into<PathBuf>, home_dir: impl Into<PathBuf>) -> Self {
        Self {
            explicit: None,
            working_dir: Some(working_dir.into()),
            home_dir: Some(home_dir.into()),
        }
    }

    /// Candidate files in priority order.
    pub fn candidates(&self) -> Vec<PathBuf> {
        if let Some(path) = &self.explicit {
            return vec![path.clone()];
        }

        let mut candidates = Vec::with_capacity(2);
        if let Some(dir) = self.working_root() {
            candidates.push(config_path_in(&dir));
        }
        if let Some(dir) = self.home_root() {
            candidates.push(config_path_in(&dir));
        }
        candidates
    }

    /// First candidate that exists.
    pub fn locate(&self) -> Option<PathBuf> {
        self.candidates().into_iter().find(|path| path.is_file())
    }

    /// File that configuration edits should go to: the file lookup would
    /// read, or the home file when none exists yet.
    pub fn writable_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.explicit {
            return Ok(path.clone());
        }
        if let Some(path) = self.locate() {
            return Ok(path);
        }
        self.home_root()
            .map(|dir| config_path_in(&dir))
            .ok_or(ConfigError::NoHomeDir)
    }

    fn working_root(&self) -> Option<PathBuf> {
        self.working_dir
            .clone()
            .or_else(|| std::env::current_dir().ok())
    }

    fn home_root(&self) -> Option<PathBuf> {
        self.home_dir.clone().or_else(dirs::home_dir)
    }
}

impl ConfigFactory for FileConfigFactory {
    fn get_config(&self) -> Result<Box<dyn Config>> {
        match self.locate() {
            Some(path) => {
                debug!(?path, "using configuration file");
                Ok(Box::new(FileConfig::load(path)?))
            }
            None => Err(ConfigError::NotFound {
                searched: self.candidates(),
            }),
        }
    }
}

fn config_path_in(root: &Path) -> PathBuf {
    root.join(CONFIG_DIR).join(CONFIG_FILE)
}
