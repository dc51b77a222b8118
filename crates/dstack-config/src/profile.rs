use std::fmt;

use crate::error::{ConfigError, Result};

/// Name of the profile used when the caller does not pick one.
pub const DEFAULT_PROFILE: &str = "default";

/// Server used when a profile does not name one.
pub const DEFAULT_SERVER: &str = "https://api.dstack.ai";

/// Credentials for one account on one server.
///
/// Fields are read-only after construction. The token is redacted in
/// debug output.
#[derive(Clone, PartialEq, Eq)]
pub struct Profile {
    name: String,
    user: String,
    token: String,
    server: String,
}

impl Profile {
    /// Create a profile, rejecting empty names, users, tokens and servers.
    pub fn new(
        name: impl Into<String>,
        user: impl Into<String>,
        token: impl Into<String>,
        server: impl Into<String>,
    ) -> Result<Self> {
        let profile = Self {
            name: name.into(),
            user: user.into(),
            token: token.into(),
            server: server.into(),
        };
        profile.validate()?;
        Ok(profile)
    }

    /// Create a profile pointing at [`DEFAULT_SERVER`].
    pub fn with_default_server(
        name: impl Into<String>,
        user: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self> {
        Self::new(name, user, token, DEFAULT_SERVER)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    /// Token with everything but the last four characters masked.
    pub fn masked_token(&self) -> String {
        let chars: Vec<char> = self.token.chars().collect();
        let visible = chars.len().min(4);
        let hidden = chars.len() - visible;
        let tail: String = chars[hidden..].iter().collect();
        format!("{}{tail}", "*".repeat(hidden))
    }

    fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| ConfigError::InvalidProfile {
            name: self.name.clone(),
            reason: reason.to_string(),
        };

        if self.name.trim().is_empty() {
            return Err(invalid("name must not be empty"));
        }
        if self.user.trim().is_empty() {
            return Err(invalid("user must not be empty"));
        }
        if self.user.contains('/') {
            return Err(invalid("user must not contain '/'"));
        }
        if self.token.trim().is_empty() {
            return Err(invalid("token must not be empty"));
        }
        if !(self.server.starts_with("http://") || self.server.starts_with("https://")) {
            return Err(invalid("server must be an http(s) URL"));
        }
        Ok(())
    }
}

impl fmt::Debug for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Profile")
            .field("name", &self.name)
            .field("user", &self.user)
            .field(
                "token",
                &format_args!("<redacted:{} bytes>", self.token.len()),
            )
            .field("server", &self.server)
            .finish()
    }
}
