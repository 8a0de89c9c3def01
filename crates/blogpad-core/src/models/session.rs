//! Logged-in session model

use serde::{Deserialize, Serialize};

/// Transient proof of a successful login, persisted in the `loginData` slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub email: String,
    pub username: String,
}

impl Session {
    /// Build a session for `email`, deriving the username from its local part.
    pub fn for_email(email: impl Into<String>) -> Self {
        let email = email.into();
        let username = username_from_email(&email).to_string();
        Self { email, username }
    }
}

/// Substring before the first `@`; the whole value when there is none.
pub fn username_from_email(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}
