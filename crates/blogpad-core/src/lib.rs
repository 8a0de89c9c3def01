//! blogpad-core - Core library for Blogpad
//!
//! This crate contains the session/authorization logic, the post repository
//! synchronized against the remote content store, the image ingestion
//! pipeline used when authoring posts, and the locally persisted favorites
//! list. Presentation layers consume the records and errors produced here.

pub mod activation;
pub mod analytics;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod favorites;
pub mod guard;
pub mod logging;
pub mod media;
pub mod models;
pub mod posts;
pub mod storage;
pub mod theme;
mod util;

pub use client::{BlogClient, PostForm, Published};
pub use error::{Error, Result};
pub use models::{Credential, Post, PostId, Session};
