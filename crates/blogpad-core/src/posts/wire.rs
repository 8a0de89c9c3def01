//! Wire schema for remote post records.
//!
//! Remote responses are decoded into an all-optional shape first and then
//! checked field by field, so a malformed record is rejected instead of
//! leaking blank or missing values into the cache.

use chrono::DateTime;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::{display_date, Post, PostId};
use crate::util::non_blank;

/// Reject records whose required fields are blank.
pub fn check_record(post: &Post) -> Result<()> {
    let missing = [
        ("id", post.id.as_str()),
        ("title", post.title.as_str()),
        ("description", post.description.as_str()),
        ("image", post.image.as_str()),
    ]
    .into_iter()
    .find(|(_, value)| value.trim().is_empty());

    match missing {
        Some((field, _)) => Err(Error::MalformedRecord(format!(
            "record {} has an empty '{field}'",
            post.id
        ))),
        None => Ok(()),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RemotePost {
    id: Option<PostId>,
    title: Option<String>,
    author: Option<String>,
    description: Option<String>,
    image: Option<String>,
    created_at: Option<RemoteTimestamp>,
    date: Option<String>,
    owner_id: Option<String>,
    owner_email: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RemoteTimestamp {
    Millis(i64),
    Text(String),
}

impl RemoteTimestamp {
    fn into_millis(self) -> Result<i64> {
        match self {
            Self::Millis(millis) => Ok(millis),
            Self::Text(text) => DateTime::parse_from_rfc3339(text.trim())
                .map(|datetime| datetime.timestamp_millis())
                .map_err(|error| {
                    Error::MalformedRecord(format!("invalid createdAt '{text}': {error}"))
                }),
        }
    }
}

impl TryFrom<RemotePost> for Post {
    type Error = Error;

    fn try_from(value: RemotePost) -> Result<Self> {
        let id = value
            .id
            .filter(|id| !id.as_str().is_empty())
            .ok_or_else(|| Error::MalformedRecord("record did not include an id".to_string()))?;
        let required = |field: &str, raw: Option<String>| {
            non_blank(raw).ok_or_else(|| {
                Error::MalformedRecord(format!("record {id} did not include '{field}'"))
            })
        };

        let title = required("title", value.title)?;
        let description = required("description", value.description)?;
        let image = required("image", value.image)?;
        let created_at = value
            .created_at
            .map(RemoteTimestamp::into_millis)
            .transpose()?
            .unwrap_or_default();
        let date = non_blank(value.date).unwrap_or_else(|| display_date(created_at));

        Ok(Self {
            id,
            title,
            author: value.author.unwrap_or_default().trim().to_string(),
            description,
            image,
            created_at,
            date,
            owner_id: non_blank(value.owner_id),
            owner_email: non_blank(value.owner_email),
        })
    }
}

/// Decode a single record from a response body.
pub(super) fn parse_post(body: &str) -> Result<Post> {
    let record: RemotePost = serde_json::from_str(body)
        .map_err(|error| Error::MalformedRecord(format!("invalid post payload: {error}")))?;
    record.try_into()
}

/// Decode a list response; one bad record fails the whole list.
pub(super) fn parse_post_list(body: &str) -> Result<Vec<Post>> {
    let records: Vec<RemotePost> = serde_json::from_str(body)
        .map_err(|error| Error::MalformedRecord(format!("invalid post list payload: {error}")))?;
    records.into_iter().map(Post::try_from).collect()
}
