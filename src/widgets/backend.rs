use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use senselib_kernel::{ApiError, Id};
use time::OffsetDateTime;

use crate::modules::documents::Comment;

/// Confirms widget interactions.
#[async_trait]
pub trait InteractionBackend: Send + Sync {
    async fn set_favorite(&self, document: Id, favorite: bool) -> Result<(), ApiError>;

    async fn rate(&self, document: Id, stars: u8) -> Result<(), ApiError>;

    async fn set_comment_like(&self, comment: Id, liked: bool) -> Result<(), ApiError>;

    /// Store a reply and return it with its assigned id.
    async fn post_reply(&self, parent: Id, content: &str) -> Result<Comment, ApiError>;

    async fn delete_comment(&self, document: Id, comment: Id) -> Result<(), ApiError>;
}

/// Backend that answers after a fixed delay, with injectable failures.
pub struct SimulatedBackend {
    delay: Duration,
    author: String,
    next_id: AtomicI64,
    failures: Mutex<VecDeque<ApiError>>,
}

impl SimulatedBackend {
    pub fn new(delay: Duration, author: impl Into<String>) -> Self {
        Self {
            delay,
            author: author.into(),
            next_id: AtomicI64::new(10_000),
            failures: Mutex::new(VecDeque::new()),
        }
    }

    /// Make the next call fail with `error`.
    pub fn fail_next(&self, error: ApiError) {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(error);
    }

    async fn round_trip(&self, action: &str) -> Result<(), ApiError> {
        tokio::time::sleep(self.delay).await;
        let failure = self
            .failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        match failure {
            Some(error) => {
                tracing::debug!(action, error = %error, "simulated interaction failed");
                Err(error)
            }
            None => Ok(()),
        }
    }
}

impl Default for SimulatedBackend {
    fn default() -> Self {
        Self::new(Duration::from_millis(300), "You")
    }
}

#[async_trait]
impl InteractionBackend for SimulatedBackend {
    async fn set_favorite(&self, _document: Id, _favorite: bool) -> Result<(), ApiError> {
        self.round_trip("favorite").await
    }

    async fn rate(&self, _document: Id, _stars: u8) -> Result<(), ApiError> {
        self.round_trip("rate").await
    }

    async fn set_comment_like(&self, _comment: Id, _liked: bool) -> Result<(), ApiError> {
        self.round_trip("like").await
    }

    async fn post_reply(&self, _parent: Id, content: &str) -> Result<Comment, ApiError> {
        self.round_trip("reply").await?;
        Ok(Comment {
            id: Id(self.next_id.fetch_add(1, Ordering::SeqCst)),
            author: self.author.clone(),
            content: content.to_string(),
            likes: 0,
            liked_by_me: false,
            created_at: OffsetDateTime::now_utc(),
            replies: Vec::new(),
        })
    }

    async fn delete_comment(&self, _document: Id, _comment: Id) -> Result<(), ApiError> {
        self.round_trip("delete comment").await
    }
}
