//! Single-credential registration and session handling.
//!
//! Exactly one credential is ever stored: registering again overwrites it.
//! Multi-account support is intentionally absent.

use crate::error::{Error, Field, Result, ValidationErrors};
use crate::models::{Credential, Registration, Session};
use crate::storage::{load_json, save_json, KeyValueStore, StorageKey};

/// Persists the registered credential and the current session.
#[derive(Debug, Clone)]
pub struct CredentialStore<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> CredentialStore<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Validate and persist `registration`, replacing any prior credential.
    ///
    /// Any open session is ended: it was issued against the old credential.
    pub fn register(&self, registration: &Registration) -> Result<Credential> {
        let credential = registration.validate()?;
        let replaced = self.credential()?.is_some();
        save_json(&self.store, StorageKey::Credential, &credential)?;
        self.store.remove(StorageKey::Session)?;
        tracing::info!(
            "Registered credential for {} (replaced existing: {})",
            credential.email,
            replaced
        );
        Ok(credential)
    }

    /// Match against the stored credential and start a session.
    pub fn login(&self, email: &str, password: &str) -> Result<Session> {
        let mut errors = ValidationErrors::new();
        if email.trim().is_empty() {
            errors.add(Field::Email, "Email is required");
        }
        if password.trim().is_empty() {
            errors.add(Field::Password, "Password is required");
        }
        errors.into_result()?;

        let Some(credential) = self.credential()? else {
            tracing::warn!("Login attempted with no registered credential");
            return Err(Error::InvalidCredentials);
        };
        if !credential.matches(email, password) {
            tracing::warn!("Login rejected for {}", email);
            return Err(Error::InvalidCredentials);
        }

        let session = Session::for_email(email);
        save_json(&self.store, StorageKey::Session, &session)?;
        tracing::info!("Logged in as {}", session.username);
        Ok(session)
    }

    /// End the session; the credential stays registered.
    pub fn logout(&self) -> Result<()> {
        self.store.remove(StorageKey::Session)?;
        tracing::info!("Logged out");
        Ok(())
    }

    pub fn credential(&self) -> Result<Option<Credential>> {
        load_json(&self.store, StorageKey::Credential)
    }

    pub fn has_registered(&self) -> Result<bool> {
        Ok(self.store.get(StorageKey::Credential)?.is_some())
    }

    /// The persisted session, if it still belongs to the current credential.
    ///
    /// A session left over from a replaced or missing credential, or one that
    /// can no longer be parsed, is cleared.
    pub fn current_session(&self) -> Result<Option<Session>> {
        let session = match load_json::<Session, _>(&self.store, StorageKey::Session) {
            Ok(Some(session)) => session,
            Ok(None) => return Ok(None),
            Err(Error::Serialization(error)) => {
                tracing::warn!("Discarding unreadable session: {}", error);
                self.store.remove(StorageKey::Session)?;
                return Ok(None);
            }
            Err(error) => return Err(error),
        };

        let belongs = self
            .credential()?
            .is_some_and(|credential| credential.email == session.email);
        if belongs {
            Ok(Some(session))
        } else {
            tracing::warn!(
                "Discarding session for {} that no longer matches the credential",
                session.email
            );
            self.store.remove(StorageKey::Session)?;
            Ok(None)
        }
    }
}
