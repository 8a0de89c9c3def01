//! Error types for blogpad-core

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Result type alias using blogpad-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in blogpad-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// One or more form fields failed validation
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// Login did not match the registered credential
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Acting session does not own the record
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Remote record not found
    #[error("Post not found: {0}")]
    NotFound(String),

    /// Transport failure or unavailable remote store
    #[error("Network error: {0}")]
    Network(String),

    /// Upload is not an image
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    /// Upload exceeds the size limit
    #[error("File too large: {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: u64, limit: u64 },

    /// Remote record failed schema validation
    #[error("Malformed post record: {0}")]
    MalformedRecord(String),

    /// Key-value slot failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        Self::Network(error.to_string())
    }
}

/// Where an error should be shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// Next to the offending form field.
    Inline,
    /// As a single notification; the triggering operation is aborted.
    Notification,
}

impl Error {
    /// Validation errors are resolved inline; everything else is a notification.
    pub const fn surface(&self) -> Surface {
        match self {
            Self::Validation(_) => Surface::Inline,
            _ => Surface::Notification,
        }
    }

    /// Field-level errors, when this is a validation failure.
    pub const fn field_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

/// Form fields that can carry a validation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Name,
    Email,
    Phone,
    Password,
    ConfirmPassword,
    Title,
    Description,
    Image,
}

impl Field {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Password => "password",
            Self::ConfirmPassword => "confirmPassword",
            Self::Title => "title",
            Self::Description => "description",
            Self::Image => "image",
        }
    }
}

/// Ordered field-level validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors(BTreeMap<Field, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for `field`, keeping the first one reported.
    pub fn add(&mut self, field: Field, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    /// `Ok(())` when nothing was recorded, otherwise `Error::Validation`.
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {message}", field.as_str())?;
            first = false;
        }
        Ok(())
    }
}
