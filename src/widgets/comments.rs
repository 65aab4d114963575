use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use senselib_events::Notifier;
use senselib_kernel::{ApiError, Id};
use time::OffsetDateTime;

use super::{InteractionBackend, Optimistic, WidgetError};
use crate::modules::documents::Comment;

/// Comments on one document: likes, nested replies and deletion.
pub struct CommentThread {
    document: Id,
    author: String,
    state: Mutex<Optimistic<Vec<Comment>>>,
    backend: Arc<dyn InteractionBackend>,
    notifier: Notifier,
    /// Local ids for replies not yet stored; always negative.
    next_placeholder: AtomicI64,
}

impl CommentThread {
    pub fn new(
        document: Id,
        author: impl Into<String>,
        comments: Vec<Comment>,
        backend: Arc<dyn InteractionBackend>,
        notifier: Notifier,
    ) -> Self {
        Self {
            document,
            author: author.into(),
            state: Mutex::new(Optimistic::new(comments)),
            backend,
            notifier,
            next_placeholder: AtomicI64::new(-1),
        }
    }

    pub fn comments(&self) -> Vec<Comment> {
        self.lock().value().clone()
    }

    /// Comments plus replies at every depth.
    pub fn total(&self) -> usize {
        fn count(comments: &[Comment]) -> usize {
            comments.iter().map(|c| 1 + count(&c.replies)).sum()
        }
        count(self.lock().value())
    }

    pub fn is_pending(&self) -> bool {
        self.lock().is_pending()
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error().map(str::to_string)
    }

    /// Like or unlike a comment. Returns whether it is now liked.
    pub async fn toggle_like(&self, comment: Id) -> Result<bool, WidgetError> {
        let liked = {
            let mut state = self.lock();
            ensure_exists(state.value(), comment)?;
            state.apply(|comments| {
                find_mut(comments, comment).is_some_and(|target| {
                    target.liked_by_me = !target.liked_by_me;
                    target.likes = if target.liked_by_me {
                        target.likes + 1
                    } else {
                        target.likes.saturating_sub(1)
                    };
                    target.liked_by_me
                })
            })?
        };

        let result = self.backend.set_comment_like(comment, liked).await;
        self.finish(result, "Could not update like").map(|()| liked)
    }

    /// Reply under `parent`. The reply shows immediately with a local id.
    pub async fn reply(&self, parent: Id, content: &str) -> Result<Comment, WidgetError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(WidgetError::EmptyReply);
        }

        let placeholder = Id(self.next_placeholder.fetch_sub(1, Ordering::SeqCst));
        {
            let mut state = self.lock();
            ensure_exists(state.value(), parent)?;
            let draft = Comment {
                id: placeholder,
                author: self.author.clone(),
                content: content.to_string(),
                likes: 0,
                liked_by_me: false,
                created_at: OffsetDateTime::now_utc(),
                replies: Vec::new(),
            };
            state.apply(|comments| {
                if let Some(target) = find_mut(comments, parent) {
                    target.replies.push(draft);
                }
            })?;
        }

        let result = self.backend.post_reply(parent, content).await;
        let mut state = self.lock();
        state.settle(&result);
        match result {
            Ok(stored) => {
                state.patch(|comments| {
                    if let Some(local) = find_mut(comments, placeholder) {
                        *local = stored.clone();
                    }
                });
                drop(state);
                tracing::debug!(document = %self.document, %parent, id = %stored.id, "reply stored");
                Ok(stored)
            }
            Err(error) => {
                drop(state);
                Err(self.report(error, "Could not post reply"))
            }
        }
    }

    pub async fn delete(&self, comment: Id) -> Result<(), WidgetError> {
        {
            let mut state = self.lock();
            ensure_exists(state.value(), comment)?;
            state.apply(|comments| {
                let before = comments.len();
                comments.retain(|c| c.id != comment);
                if comments.len() == before {
                    comments.iter_mut().any(|c| c.remove_reply(comment));
                }
            })?;
        }

        let result = self.backend.delete_comment(self.document, comment).await;
        self.finish(result, "Could not delete comment")
    }

    fn finish(&self, result: Result<(), ApiError>, context: &str) -> Result<(), WidgetError> {
        self.lock().settle(&result);
        result.map_err(|error| self.report(error, context))
    }

    fn report(&self, error: ApiError, context: &str) -> WidgetError {
        self.notifier
            .error("Comments", format!("{}: {}", context, error.user_message()));
        WidgetError::from(error)
    }

    fn lock(&self) -> MutexGuard<'_, Optimistic<Vec<Comment>>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn find_mut(comments: &mut [Comment], id: Id) -> Option<&mut Comment> {
    comments.iter_mut().find_map(|comment| comment.find_mut(id))
}

fn ensure_exists(comments: &[Comment], id: Id) -> Result<(), WidgetError> {
    fn contains(comments: &[Comment], id: Id) -> bool {
        comments
            .iter()
            .any(|c| c.id == id || contains(&c.replies, id))
    }
    if contains(comments, id) {
        Ok(())
    } else {
        Err(WidgetError::UnknownComment(id))
    }
}
