//! Per-view access policy evaluated against session presence.

use std::fmt;

use crate::models::PostId;

/// Views the client can be asked to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Register,
    Login,
    Dashboard,
    CreatePost,
    EditPost(PostId),
    PostDetails(PostId),
    Favorites,
    Analytics,
}

/// Access requirement attached to a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    RequiresAuth,
    ForbidsAuth,
}

/// Outcome of evaluating a view request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Render(View),
    Redirect(View),
}

impl Decision {
    /// The view that ends up displayed.
    pub const fn view(&self) -> &View {
        match self {
            Self::Render(view) | Self::Redirect(view) => view,
        }
    }
}

impl View {
    pub const fn access(&self) -> Access {
        match self {
            Self::Register | Self::Login => Access::ForbidsAuth,
            _ => Access::RequiresAuth,
        }
    }

    /// Parse a route path. Matching is case-insensitive on the fixed
    /// segments; `None` for the root and for unknown paths.
    pub fn from_path(path: &str) -> Option<Self> {
        let trimmed = path.trim().trim_matches('/');
        let mut segments = trimmed.splitn(2, '/');
        let head = segments.next()?.to_ascii_lowercase();
        let rest = segments.next().map(str::trim).filter(|rest| !rest.is_empty());

        match (head.as_str(), rest) {
            ("register", None) => Some(Self::Register),
            ("login", None) => Some(Self::Login),
            ("dashboard", None) => Some(Self::Dashboard),
            ("create-post", None) => Some(Self::CreatePost),
            ("favorites", None) => Some(Self::Favorites),
            ("analytics", None) => Some(Self::Analytics),
            ("edit-post", Some(id)) if !id.contains('/') => Some(Self::EditPost(id.into())),
            ("post", Some(id)) if !id.contains('/') => Some(Self::PostDetails(id.into())),
            _ => None,
        }
    }

    /// Canonical lowercase path.
    pub fn path(&self) -> String {
        match self {
            Self::Register => "/register".to_string(),
            Self::Login => "/login".to_string(),
            Self::Dashboard => "/dashboard".to_string(),
            Self::CreatePost => "/create-post".to_string(),
            Self::EditPost(id) => format!("/edit-post/{id}"),
            Self::PostDetails(id) => format!("/post/{id}"),
            Self::Favorites => "/favorites".to_string(),
            Self::Analytics => "/analytics".to_string(),
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Decide whether `view` renders given the current session state.
pub fn evaluate(view: View, session_present: bool) -> Decision {
    match (view.access(), session_present) {
        (Access::RequiresAuth, true) | (Access::ForbidsAuth, false) => Decision::Render(view),
        (Access::RequiresAuth, false) => Decision::Redirect(View::Login),
        (Access::ForbidsAuth, true) => Decision::Redirect(View::Dashboard),
    }
}

/// Where the root (or an unknown path) leads.
///
/// Dashboard with a session; otherwise login once a credential has ever been
/// registered, registration before that.
pub const fn default_view(session_present: bool, credential_registered: bool) -> View {
    if session_present {
        View::Dashboard
    } else if credential_registered {
        View::Login
    } else {
        View::Register
    }
}

/// Resolve a raw path request end to end.
pub fn resolve(path: &str, session_present: bool, credential_registered: bool) -> Decision {
    View::from_path(path).map_or_else(
        || Decision::Redirect(default_view(session_present, credential_registered)),
        |view| evaluate(view, session_present),
    )
}
