//! View activation tokens for discarding late asynchronous results.
//!
//! Each view activation takes a token. Activating another view, or tearing
//! the current one down, bumps the generation; results that arrive for an
//! older token are dropped instead of being applied to a context that no
//! longer exists.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Generation counter shared by all tokens it issues.
#[derive(Debug, Clone, Default)]
pub struct Activations {
    generation: Arc<AtomicU64>,
}

/// Handle held by an in-flight operation.
#[derive(Debug, Clone)]
pub struct ActivationToken {
    generation: u64,
    current: Arc<AtomicU64>,
}

/// Result of an operation started under an [`ActivationToken`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion<T> {
    /// The originating view is still active and the result was applied.
    Applied(T),
    /// The view went away before the result arrived.
    Discarded,
}

impl<T> Completion<T> {
    pub fn applied(self) -> Option<T> {
        match self {
            Self::Applied(value) => Some(value),
            Self::Discarded => None,
        }
    }

    pub const fn is_discarded(&self) -> bool {
        matches!(self, Self::Discarded)
    }
}

impl Activations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new activation, invalidating every earlier token.
    pub fn activate(&self) -> ActivationToken {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        ActivationToken {
            generation,
            current: Arc::clone(&self.generation),
        }
    }

    /// Tear down the active view.
    pub fn teardown(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

impl ActivationToken {
    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.generation
    }

    /// Wrap `value` according to whether this token is still current.
    pub fn complete<T>(&self, value: T) -> Completion<T> {
        if self.is_current() {
            Completion::Applied(value)
        } else {
            Completion::Discarded
        }
    }
}
