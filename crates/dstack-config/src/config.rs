use std::collections::BTreeMap;

use crate::error::{ConfigError, Result};
use crate::profile::Profile;

/// A source of named profiles.
pub trait Config: Send + Sync {
    /// Look up a profile by name.
    fn get_profile(&self, name: &str) -> Result<Profile>;

    /// All profiles, sorted by name.
    fn list_profiles(&self) -> Vec<Profile>;
}

/// Configuration held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct InPlaceConfig {
    profiles: BTreeMap<String, Profile>,
}

impl InPlaceConfig {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration holding the given profiles.
    pub fn from_profiles(profiles: impl IntoIterator<Item = Profile>) -> Self {
        let mut config = Self::new();
        for profile in profiles {
            config.add_or_replace_profile(profile);
        }
        config
    }

    /// Insert a profile, replacing any profile of the same name.
    pub fn add_or_replace_profile(&mut self, profile: Profile) {
        self.profiles.insert(profile.name().to_string(), profile);
    }

    /// Remove a profile, returning it if it existed.
    pub fn remove_profile(&mut self, name: &str) -> Option<Profile> {
        self.profiles.remove(name)
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }
}

impl Config for InPlaceConfig {
    fn get_profile(&self, name: &str) -> Result<Profile> {
        self.profiles
            .get(name)
            .cloned()
            .ok_or_else(|| ConfigError::ProfileNotFound(name.to_string()))
    }

    fn list_profiles(&self) -> Vec<Profile> {
        self.profiles.values().cloned().collect()
    }
}
