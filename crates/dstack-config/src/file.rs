use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{Config, InPlaceConfig};
use crate::error::{ConfigError, Result};
use crate::profile::{Profile, DEFAULT_SERVER};

/// Permission mode for written configuration files; they hold tokens.
#[cfg(unix)]
const CONFIG_FILE_MODE: u32 = 0o600;

#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigDocument {
    #[serde(default)]
    profiles: BTreeMap<String, ProfileEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ProfileEntry {
    user: String,
    token: String,
    #[serde(default = "default_server")]
    server: String,
}

fn default_server() -> String {
    DEFAULT_SERVER.to_string()
}

/// Configuration backed by a TOML file.
///
/// ```toml
/// [profiles.default]
/// user = "alice"
/// token = "..."
/// server = "https://api.dstack.ai"
/// ```
#[derive(Debug, Clone)]
pub struct FileConfig {
    path: PathBuf,
    profiles: InPlaceConfig,
}

impl FileConfig {
    /// Read and parse the file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config = Self::parse(path, &content)?;
        debug!(path = ?config.path, profiles = config.profiles.len(), "loaded configuration");
        Ok(config)
    }

    /// Load `path` if it exists, otherwise start an empty configuration there.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self {
                path: path.to_path_buf(),
                profiles: InPlaceConfig::new(),
            })
        }
    }

    fn parse(path: PathBuf, content: &str) -> Result<Self> {
        let document: ConfigDocument =
            toml::from_str(content).map_err(|err| ConfigError::Parse {
                path: path.clone(),
                reason: err.to_string(),
            })?;

        let mut profiles = InPlaceConfig::new();
        for (name, entry) in document.profiles {
            match Profile::new(name.clone(), entry.user, entry.token, entry.server) {
                Ok(profile) => profiles.add_or_replace_profile(profile),
                Err(err) => {
                    warn!(path = ?path, profile = %name, error = %err, "skipping invalid profile")
                }
            }
        }

        Ok(Self { path, profiles })
    }

    /// Write the configuration back to its file, creating parent directories.
    pub fn save(&self) -> Result<()> {
        let document = ConfigDocument {
            profiles: self
                .profiles
                .list_profiles()
                .into_iter()
                .map(|profile| {
                    (
                        profile.name().to_string(),
                        ProfileEntry {
                            user: profile.user().to_string(),
                            token: profile.token().to_string(),
                            server: profile.server().to_string(),
                        },
                    )
                })
                .collect(),
        };
        let content = toml::to_string_pretty(&document)
            .map_err(|err| ConfigError::Serialize(err.to_string()))?;

        let write_err = |source| ConfigError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(write_err)?;
            }
        }
        write_private(&self.path, &content).map_err(write_err)?;

        debug!(path = ?self.path, "saved configuration");
        Ok(())
    }

    /// File this configuration is read from and saved to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert a profile, replacing any profile of the same name.
    pub fn add_or_replace_profile(&mut self, profile: Profile) {
        self.profiles.add_or_replace_profile(profile);
    }

    /// Remove a profile, returning it if it existed.
    pub fn remove_profile(&mut self, name: &str) -> Option<Profile> {
        self.profiles.remove_profile(name)
    }
}

/// Write `content` so that no other user can read it at any point.
#[cfg(unix)]
fn write_private(path: &Path, content: &str) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(CONFIG_FILE_MODE)
        .open(path)?;
    // `mode` only applies to new files; tighten an existing one before writing.
    file.set_permissions(std::fs::Permissions::from_mode(CONFIG_FILE_MODE))?;
    file.write_all(content.as_bytes())
}

#[cfg(not(unix))]
fn write_private(path: &Path, content: &str) -> std::io::Result<()> {
    std::fs::write(path, content)
}

impl Config for FileConfig {
    fn get_profile(&self, name: &str) -> Result<Profile> {
        self.profiles.get_profile(name)
    }

    fn list_profiles(&self) -> Vec<Profile> {
        self.profiles.list_profiles()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "dstack-config-{tag}-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn load_parses_profiles_and_defaults_server() {
        let dir = make_temp_dir("load");
        let path = dir.join("config.toml");
        std::fs::write(
            &path,
            r#"
[profiles.default]
user = "user"
token = "my_token"

[profiles.staging]
user = "other"
token = "t2"
server = "http://localhost:8080"
"#,
        )
        .unwrap();

        let config = FileConfig::load(&path).unwrap();
        let default = config.get_profile("default").unwrap();
        assert_eq!(default.user(), "user");
        assert_eq!(default.token(), "my_token");
        assert_eq!(default.server(), DEFAULT_SERVER);
        assert_eq!(
            config.get_profile("staging").unwrap().server(),
            "http://localhost:8080"
        );
        assert_eq!(config.path(), path.as_path());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn save_then_load_keeps_profiles() {
        let dir = make_temp_dir("save");
        let path = dir.join("nested").join("config.toml");

        let mut config = FileConfig::load_or_default(&path).unwrap();
        assert!(config.list_profiles().is_empty());
        config.add_or_replace_profile(
            Profile::with_default_server("default", "user", "my_token").unwrap(),
        );
        config.save().unwrap();

        let reloaded = FileConfig::load(&path).unwrap();
        assert_eq!(reloaded.list_profiles(), config.list_profiles());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
            assert_eq!(mode, CONFIG_FILE_MODE);
        }

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = make_temp_dir("malformed");
        let path = dir.join("config.toml");
        std::fs::write(&path, "[profiles.default]\nuser = \"u\"\n").unwrap();

        assert!(matches!(
            FileConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn invalid_profile_is_skipped() {
        let dir = make_temp_dir("invalid");
        let path = dir.join("config.toml");
        std::fs::write(
            &path,
            r#"
[profiles.broken]
user = "user"
token = "t"
server = "api.dstack.ai"

[profiles.default]
user = "user"
token = "my_token"
"#,
        )
        .unwrap();

        let config = FileConfig::load(&path).unwrap();
        assert_eq!(config.get_profile("default").unwrap().token(), "my_token");
        assert!(matches!(
            config.get_profile("broken"),
            Err(ConfigError::ProfileNotFound(_))
        ));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[cfg(unix)]
    #[test]
    fn save_tightens_an_existing_readable_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = make_temp_dir("tighten");
        let path = dir.join("config.toml");
        std::fs::write(&path, "").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        let mut config = FileConfig::load_or_default(&path).unwrap();
        config.add_or_replace_profile(
            Profile::with_default_server("default", "user", "my_token").unwrap(),
        );
        config.save().unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, CONFIG_FILE_MODE);
        assert_eq!(
            FileConfig::load(&path).unwrap().get_profile("default").unwrap().token(),
            "my_token"
        );

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = make_temp_dir("missing");
        assert!(matches!(
            FileConfig::load(dir.join("absent.toml")),
            Err(ConfigError::Read { .. })
        ));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn remove_profile_then_save() {
        let dir = make_temp_dir("remove");
        let path = dir.join("config.toml");
        let mut config = FileConfig::load_or_default(&path).unwrap();
        config.add_or_replace_profile(Profile::with_default_server("a", "u", "t").unwrap());
        config.add_or_replace_profile(Profile::with_default_server("b", "u", "t").unwrap());
        assert!(config.remove_profile("a").is_some());
        config.save().unwrap();

        let reloaded = FileConfig::load(&path).unwrap();
        assert!(reloaded.get_profile("a").is_err());
        assert!(reloaded.get_profile("b").is_ok());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
