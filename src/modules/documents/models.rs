use senselib_kernel::Id;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Reader comment on a document, with its nested replies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Id,
    pub author: String,
    pub content: String,
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub liked_by_me: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default)]
    pub replies: Vec<Comment>,
}

impl Comment {
    /// Depth-first search through this comment and its replies.
    pub fn find_mut(&mut self, id: Id) -> Option<&mut Comment> {
        if self.id == id {
            return Some(self);
        }
        self.replies.iter_mut().find_map(|reply| reply.find_mut(id))
    }

    /// Remove a reply anywhere below this comment.
    pub fn remove_reply(&mut self, id: Id) -> bool {
        let before = self.replies.len();
        self.replies.retain(|reply| reply.id != id);
        if self.replies.len() != before {
            return true;
        }
        self.replies.iter_mut().any(|reply| reply.remove_reply(id))
    }
}
