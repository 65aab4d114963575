//! Display widgets with optimistic local mutation.
//!
//! A widget applies a change locally, asks its backend to confirm it, and
//! rolls back to the pre-change snapshot if the backend refuses. The last
//! failure stays visible on the widget until the next mutation.

pub mod backend;
pub mod comments;
pub mod favorite;
pub mod rating;

use senselib_kernel::{ApiError, Id};
use thiserror::Error;

pub use backend::{InteractionBackend, SimulatedBackend};
pub use comments::CommentThread;
pub use favorite::FavoriteToggle;
pub use rating::{star_fill, RatingSummary, StarFill, StarRating};

#[derive(Error, Debug)]
pub enum WidgetError {
    #[error("another change is still being confirmed")]
    Busy,

    #[error("rating must be between 1 and {max}, got {stars}")]
    InvalidRating { stars: u8, max: u8 },

    #[error("comment {0} does not exist")]
    UnknownComment(Id),

    #[error("reply cannot be empty")]
    EmptyReply,

    #[error(transparent)]
    Rejected(#[from] ApiError),
}

/// A value plus the snapshot needed to undo an unconfirmed change.
#[derive(Debug, Clone, PartialEq)]
pub struct Optimistic<T> {
    value: T,
    snapshot: Option<T>,
    error: Option<String>,
}

impl<T: Clone> Optimistic<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            snapshot: None,
            error: None,
        }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    /// A change is waiting for confirmation.
    pub fn is_pending(&self) -> bool {
        self.snapshot.is_some()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Change the value locally, keeping a snapshot to roll back to.
    pub fn apply<R>(&mut self, mutate: impl FnOnce(&mut T) -> R) -> Result<R, WidgetError> {
        if self.is_pending() {
            return Err(WidgetError::Busy);
        }
        self.snapshot = Some(self.value.clone());
        self.error = None;
        Ok(mutate(&mut self.value))
    }

    /// Confirm or roll back the pending change.
    pub fn settle<U>(&mut self, result: &Result<U, ApiError>) {
        let snapshot = self.snapshot.take();
        if let Err(error) = result {
            if let Some(snapshot) = snapshot {
                self.value = snapshot;
            }
            self.error = Some(error.user_message());
        }
    }

    /// Adjust a confirmed value in place, e.g. with server-assigned fields.
    pub fn patch(&mut self, mutate: impl FnOnce(&mut T)) {
        mutate(&mut self.value);
    }
}
