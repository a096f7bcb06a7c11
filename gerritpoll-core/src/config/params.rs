//! Typed per-target trigger parameters
//!
//! Mirrors the parameter set the host configuration store supplies per
//! trigger: connection identity, optional query filters, and optional
//! private-key credentials. All values are trimmed before use and validated
//! once here; absent and empty are equivalent everywhere.

use std::collections::HashMap;
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;

/// Host parameter key for the SSH username.
pub const PARAM_USERNAME: &str = "username";
/// Host parameter key for the Gerrit host name.
pub const PARAM_HOST: &str = "host";
/// Host parameter key for the optional project filter.
pub const PARAM_PROJECT: &str = "project";
/// Host parameter key for the optional branch filter.
pub const PARAM_BRANCH: &str = "branch";
/// Host parameter key for the optional private-key path override.
pub const PARAM_PRIVATE_KEY_PATH: &str = "privateKeyPath";
/// Host parameter key for the optional private-key passphrase.
pub const PARAM_PASSPHRASE: &str = "passphrase";

/// Errors raised while constructing [`TriggerParameters`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The username parameter was absent or blank.
    #[error("trigger parameter '{PARAM_USERNAME}' is missing or blank")]
    MissingUsername,

    /// The host parameter was absent or blank.
    #[error("trigger parameter '{PARAM_HOST}' is missing or blank")]
    MissingHost,
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Validated parameters for one configured Gerrit trigger.
///
/// Construct per target; the engine holds no state shared between targets.
#[derive(Debug, Clone)]
pub struct TriggerParameters {
    username: String,
    host: String,
    project: Option<String>,
    branch: Option<String>,
    private_key_path: Option<PathBuf>,
    passphrase: Option<SecretString>,
}

impl TriggerParameters {
    /// Creates parameters from the required connection identity.
    ///
    /// Both values are trimmed first.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingUsername`] or [`ConfigError::MissingHost`]
    /// when the respective value is blank after trimming.
    pub fn new(username: &str, host: &str) -> ConfigResult<Self> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ConfigError::MissingUsername);
        }
        let host = host.trim();
        if host.is_empty() {
            return Err(ConfigError::MissingHost);
        }

        Ok(Self {
            username: username.to_string(),
            host: host.to_string(),
            project: None,
            branch: None,
            private_key_path: None,
            passphrase: None,
        })
    }

    /// Creates parameters from a host-supplied key/value map.
    ///
    /// Uses the `PARAM_*` keys; absent values are treated as empty, and
    /// empty-after-trim optional values as unset.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when username or host is missing or blank.
    pub fn from_values(values: &HashMap<String, String>) -> ConfigResult<Self> {
        let get = |key: &str| values.get(key).map(String::as_str).unwrap_or_default();

        let mut params = Self::new(get(PARAM_USERNAME), get(PARAM_HOST))?
            .with_project(get(PARAM_PROJECT))
            .with_branch(get(PARAM_BRANCH))
            .with_private_key_path(get(PARAM_PRIVATE_KEY_PATH));

        let passphrase = get(PARAM_PASSPHRASE).trim();
        if !passphrase.is_empty() {
            params = params.with_passphrase(passphrase);
        }

        Ok(params)
    }

    /// Sets the project filter; blank after trim clears it.
    #[must_use]
    pub fn with_project(mut self, project: &str) -> Self {
        self.project = non_blank(project);
        self
    }

    /// Sets the branch filter; blank after trim clears it.
    #[must_use]
    pub fn with_branch(mut self, branch: &str) -> Self {
        self.branch = non_blank(branch);
        self
    }

    /// Sets the private-key path override; blank after trim clears it.
    ///
    /// A leading `~` is expanded against the caller's home directory.
    #[must_use]
    pub fn with_private_key_path(mut self, path: &str) -> Self {
        self.private_key_path =
            non_blank(path).map(|p| PathBuf::from(shellexpand::tilde(&p).into_owned()));
        self
    }

    /// Sets the private-key passphrase.
    #[must_use]
    pub fn with_passphrase(mut self, passphrase: impl Into<String>) -> Self {
        self.passphrase = Some(SecretString::from(passphrase.into()));
        self
    }

    /// SSH username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Gerrit host name.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Project filter, if configured.
    #[must_use]
    pub fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }

    /// Branch filter, if configured.
    #[must_use]
    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref()
    }

    /// Private-key passphrase, if configured.
    #[must_use]
    pub fn passphrase(&self) -> Option<&SecretString> {
        self.passphrase.as_ref()
    }

    /// Path of the private key used to authenticate.
    ///
    /// Falls back to `~/.ssh/id_rsa` when no override is configured, with
    /// the current directory standing in for an unresolvable home.
    #[must_use]
    pub fn private_key_path(&self) -> PathBuf {
        self.private_key_path
            .clone()
            .unwrap_or_else(default_private_key_path)
    }

    /// Whether a key-path override is configured.
    #[must_use]
    pub const fn has_custom_private_key(&self) -> bool {
        self.private_key_path.is_some()
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn default_private_key_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".ssh")
        .join("id_rsa")
}
