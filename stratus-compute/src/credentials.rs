//! Login credentials and the shared credential store.
//!
//! The store is shared with other subsystems, so entries are addressed by a
//! typed [`CredentialKey`] rather than a bare node id. The key still renders
//! as `node#<id>` so the namespace stays readable in logs and dumps.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;
use tracing::debug;

use crate::error::{ComputeError, Result};

/// Prefix of node-scoped keys in the shared namespace.
pub const NODE_KEY_PREFIX: &str = "node#";

// =============================================================================
// CREDENTIALS
// =============================================================================

/// Credentials used to log into a node.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginCredentials {
    /// Login user
    pub user: String,
    /// Password
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Private key material (PEM)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    /// Whether sudo requires the password
    #[serde(default)]
    pub authenticate_sudo: bool,
}

impl LoginCredentials {
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: None,
            private_key: None,
            authenticate_sudo: false,
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_private_key(mut self, private_key: impl Into<String>) -> Self {
        self.private_key = Some(private_key.into());
        self
    }

    pub fn with_authenticate_sudo(mut self, authenticate_sudo: bool) -> Self {
        self.authenticate_sudo = authenticate_sudo;
        self
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("authenticate_sudo", &self.authenticate_sudo)
            .finish()
    }
}

/// Partial credentials supplied by a caller to replace provider ones.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialOverride {
    pub user: Option<String>,
    pub password: Option<String>,
    pub private_key: Option<String>,
    pub authenticate_sudo: bool,
}

impl CredentialOverride {
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn private_key(mut self, private_key: impl Into<String>) -> Self {
        self.private_key = Some(private_key.into());
        self
    }

    pub fn authenticate_sudo(mut self, authenticate_sudo: bool) -> Self {
        self.authenticate_sudo = authenticate_sudo;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.user.is_none()
            && self.password.is_none()
            && self.private_key.is_none()
            && !self.authenticate_sudo
    }
}

impl From<LoginCredentials> for CredentialOverride {
    fn from(creds: LoginCredentials) -> Self {
        Self {
            user: Some(creds.user),
            password: creds.password,
            private_key: creds.private_key,
            authenticate_sudo: creds.authenticate_sudo,
        }
    }
}

impl fmt::Debug for CredentialOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialOverride")
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("authenticate_sudo", &self.authenticate_sudo)
            .finish()
    }
}

// =============================================================================
// STORE
// =============================================================================

/// Key into the shared credential store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CredentialKey {
    /// Login credentials of a node, by provider id
    Node(String),
    /// Entry owned by another subsystem, addressed by its raw name
    Custom(String),
}

impl CredentialKey {
    pub fn node(id: impl Into<String>) -> Self {
        CredentialKey::Node(id.into())
    }
}

impl fmt::Display for CredentialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialKey::Node(id) => write!(f, "{}{}", NODE_KEY_PREFIX, id),
            CredentialKey::Custom(name) => f.write_str(name),
        }
    }
}

/// Shared mapping from credential key to login credentials.
///
/// Owned outside the strategy layer; implementations must be safe for
/// concurrent use.
pub trait CredentialStore: Send + Sync {
    /// Look up an entry.
    fn get(&self, key: &CredentialKey) -> Result<Option<LoginCredentials>>;

    /// Insert or replace an entry.
    fn put(&self, key: CredentialKey, credentials: LoginCredentials) -> Result<()>;

    /// Check whether an entry exists.
    fn contains_key(&self, key: &CredentialKey) -> Result<bool>;
}

/// Credential store held in process memory.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    entries: RwLock<HashMap<CredentialKey, LoginCredentials>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    pub fn len(&self) -> Result<usize> {
        let entries = self.entries.read().map_err(|_| {
            ComputeError::CredentialStore("Lock poisoned".to_string())
        })?;

        Ok(entries.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl FromIterator<(CredentialKey, LoginCredentials)> for InMemoryCredentialStore {
    fn from_iter<T: IntoIterator<Item = (CredentialKey, LoginCredentials)>>(iter: T) -> Self {
        Self {
            entries: RwLock::new(iter.into_iter().collect()),
        }
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn get(&self, key: &CredentialKey) -> Result<Option<LoginCredentials>> {
        let entries = self.entries.read().map_err(|_| {
            ComputeError::CredentialStore("Lock poisoned".to_string())
        })?;

        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: CredentialKey, credentials: LoginCredentials) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| {
            ComputeError::CredentialStore("Lock poisoned".to_string())
        })?;

        debug!(key = %key, user = %credentials.user, "Storing credentials");
        entries.insert(key, credentials);
        Ok(())
    }

    fn contains_key(&self, key: &CredentialKey) -> Result<bool> {
        let entries = self.entries.read().map_err(|_| {
            ComputeError::CredentialStore("Lock poisoned".to_string())
        })?;

        Ok(entries.contains_key(key))
    }
}
