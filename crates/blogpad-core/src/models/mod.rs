//! Data models for Blogpad

mod credential;
mod post;
mod session;
mod settings;

pub use credential::{Credential, Registration};
pub use post::{display_date, Post, PostDraft, PostId};
pub use session::{username_from_email, Session};
pub use settings::ThemeMode;
