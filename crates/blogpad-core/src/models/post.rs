//! Post model

use std::fmt;

use chrono::{TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::error::{Field, Result, ValidationErrors};

use super::session::Session;

/// Identifier of a post in the remote collection.
///
/// Remote stores may assign numeric ids; both forms are accepted and kept as
/// their string rendering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PostId(String);

impl PostId {
    /// Create a new client-assigned id using UUID v7 (time-sortable)
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PostId {
    fn from(value: &str) -> Self {
        Self(value.trim().to_string())
    }
}

impl From<String> for PostId {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<u64> for PostId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl Serialize for PostId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for PostId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(i64),
        }

        match RawId::deserialize(deserializer)? {
            RawId::Text(text) => Ok(Self::from(text)),
            RawId::Number(number) => Ok(Self(number.to_string())),
        }
    }
}

/// A single authored post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub author: String,
    pub description: String,
    /// Remote URL or `data:` payload produced by the ingestion pipeline
    pub image: String,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
    /// Display date (`dd/mm/yyyy`)
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_email: Option<String>,
}

impl Post {
    /// Build a new post from a validated draft, owned by `session`.
    pub fn from_draft(draft: PostDraft, session: &Session, created_at: i64) -> Self {
        let author = draft.author_or(&session.username);
        Self {
            id: PostId::generate(),
            title: draft.title,
            author,
            description: draft.description,
            image: draft.image,
            created_at,
            date: display_date(created_at),
            owner_id: Some(session.username.clone()),
            owner_email: Some(session.email.clone()),
        }
    }

    /// Replace the editable fields, keeping identity and ownership.
    #[must_use]
    pub fn with_edits(&self, draft: PostDraft) -> Self {
        let author = draft.author_or(&self.author);
        Self {
            title: draft.title,
            author,
            description: draft.description,
            image: draft.image,
            ..self.clone()
        }
    }

    /// Whether `session` may edit this record.
    ///
    /// `ownerEmail` decides when present; otherwise `ownerId`; legacy records
    /// with neither fall back to the author name.
    pub fn is_owned_by(&self, session: &Session) -> bool {
        if let Some(owner_email) = self.owner_email.as_deref() {
            return owner_email == session.email;
        }
        if let Some(owner_id) = self.owner_id.as_deref() {
            return owner_id == session.username;
        }
        self.author == session.username
    }
}

/// Editable post fields as submitted by the authoring form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub description: String,
    /// Free-text author; blank means "use the session username"
    pub author: String,
    pub image: String,
}

impl PostDraft {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        image: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            author: String::new(),
            image: image.into(),
        }
    }

    #[must_use]
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Trim every field and require title, description and image.
    pub fn validated(self) -> Result<Self> {
        let draft = Self {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            author: self.author.trim().to_string(),
            image: self.image.trim().to_string(),
        };

        let mut errors = ValidationErrors::new();
        if draft.title.is_empty() {
            errors.add(Field::Title, "Title is required");
        }
        if draft.description.is_empty() {
            errors.add(Field::Description, "Description is required");
        }
        if draft.image.is_empty() {
            errors.add(Field::Image, "Image is required");
        }
        errors.into_result()?;

        Ok(draft)
    }

    fn author_or(&self, fallback: &str) -> String {
        if self.author.is_empty() {
            fallback.to_string()
        } else {
            self.author.clone()
        }
    }
}

/// Render a Unix-ms timestamp as the `dd/mm/yyyy` display date.
pub fn display_date(timestamp_ms: i64) -> String {
    Utc.timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|datetime| datetime.format("%d/%m/%Y").to_string())
        .unwrap_or_default()
}
