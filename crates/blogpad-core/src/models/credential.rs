//! Registered credential and the registration form that produces it

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Field, Result, ValidationErrors};

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid regex"));
static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{10}$").expect("Invalid regex"));

const MIN_NAME_CHARS: usize = 3;
const MIN_PASSWORD_CHARS: usize = 6;

/// The single registered identity.
///
/// Field names on the wire match the persisted `authData` slot.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    #[serde(rename = "name")]
    pub display_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

impl Credential {
    /// Exact, case-sensitive match on both fields.
    pub fn matches(&self, email: &str, password: &str) -> bool {
        self.email == email && self.password == password
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Credential")
            .field("display_name", &self.display_name)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Registration form input. The confirmation is never persisted.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
}

impl Registration {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let password = password.into();
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            confirm_password: password.clone(),
            password,
        }
    }

    /// Validate every field and build the credential to persist.
    ///
    /// All failing fields are reported together.
    pub fn validate(&self) -> Result<Credential> {
        let mut errors = ValidationErrors::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.add(Field::Name, "Full name is required");
        } else if name.chars().count() < MIN_NAME_CHARS {
            errors.add(Field::Name, "Minimum 3 characters required");
        }

        let email = self.email.trim();
        if email.is_empty() {
            errors.add(Field::Email, "Email is required");
        } else if !EMAIL_PATTERN.is_match(email) {
            errors.add(Field::Email, "Invalid email format");
        }

        let phone = self.phone.trim();
        if phone.is_empty() {
            errors.add(Field::Phone, "Phone number is required");
        } else if !PHONE_PATTERN.is_match(phone) {
            errors.add(Field::Phone, "Phone must be 10 digits");
        }

        if self.password.trim().is_empty() {
            errors.add(Field::Password, "Password is required");
        } else if self.password.chars().count() < MIN_PASSWORD_CHARS {
            errors.add(Field::Password, "Minimum 6 characters required");
        }

        if self.confirm_password.trim().is_empty() {
            errors.add(Field::ConfirmPassword, "Confirm password is required");
        } else if self.password != self.confirm_password {
            errors.add(Field::ConfirmPassword, "Passwords do not match");
        }

        errors.into_result()?;

        Ok(Credential {
            display_name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            password: self.password.clone(),
        })
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Registration")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("password", &"[REDACTED]")
            .field("confirm_password", &"[REDACTED]")
            .finish()
    }
}
