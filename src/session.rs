//! Session credentials
//!
//! Resolves the bearer token every gateway call is authenticated with. An
//! explicit token (config file or `SECUREDOC_TOKEN`) wins; otherwise the token
//! saved by `securedoc login` is read from the OS keyring.

use crate::config::SessionConfig;
use crate::error::{Result, SecureDocError};

/// Keyring-backed token store
///
/// # Examples
///
/// ```no_run
/// use securedoc::config::SessionConfig;
/// use securedoc::session::TokenStore;
///
/// # fn example() -> anyhow::Result<()> {
/// let store = TokenStore::new(&SessionConfig::default());
/// store.save("eyJhbGciOi...")?;
/// assert!(store.load()?.is_some());
/// store.clear()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TokenStore {
    service: String,
    user: String,
}

impl TokenStore {
    /// Create a store for the configured keyring entry
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            service: config.keyring_service.clone(),
            user: config.keyring_user.clone(),
        }
    }

    fn entry(&self) -> Result<keyring::Entry> {
        Ok(keyring::Entry::new(&self.service, &self.user)?)
    }

    /// Persist a token
    ///
    /// # Errors
    ///
    /// Returns error if the token is blank or the keyring rejects the write
    pub fn save(&self, token: &str) -> Result<()> {
        if token.trim().is_empty() {
            return Err(SecureDocError::Session("token cannot be empty".to_string()).into());
        }
        self.entry()?.set_password(token.trim())?;
        tracing::info!("Stored session token in keyring ({})", self.service);
        Ok(())
    }

    /// Read the stored token, if any
    ///
    /// # Errors
    ///
    /// Returns error if the keyring is unavailable
    pub fn load(&self) -> Result<Option<String>> {
        match self.entry()?.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(SecureDocError::Keyring(e).into()),
        }
    }

    /// Remove the stored token; succeeds when nothing was stored
    ///
    /// # Errors
    ///
    /// Returns error if the keyring is unavailable
    pub fn clear(&self) -> Result<()> {
        match self.entry()?.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => {
                tracing::info!("Removed session token from keyring ({})", self.service);
                Ok(())
            }
            Err(e) => Err(SecureDocError::Keyring(e).into()),
        }
    }
}

/// Resolve the bearer token for this run
///
/// A keyring failure is not fatal: it is logged and treated as "not signed
/// in", so gateway calls fail with a clear message instead of aborting.
pub fn resolve_token(config: &SessionConfig) -> Option<String> {
    if let Some(token) = config.token.as_deref().filter(|t| !t.trim().is_empty()) {
        tracing::debug!("Using explicitly configured session token");
        return Some(token.trim().to_string());
    }

    match TokenStore::new(config).load() {
        Ok(Some(token)) => {
            tracing::debug!("Using session token from keyring");
            Some(token)
        }
        Ok(None) => {
            tracing::debug!("No session token stored");
            None
        }
        Err(e) => {
            tracing::warn!("Could not read session token from keyring: {}", e);
            None
        }
    }
}
