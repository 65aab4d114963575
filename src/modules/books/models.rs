use senselib_kernel::{Entity, Id};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::controllers::Draft;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: Id,
    pub title: String,
    pub author_id: Id,
    pub category_id: Id,
    pub publisher_id: Id,
    #[serde(default)]
    pub isbn: String,
    pub price: i64,
    #[serde(default)]
    pub stock: u32,
    /// Open and historical borrow records. Read-only.
    #[serde(default)]
    pub borrow_count: u64,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Entity for Book {
    const NAME: &'static str = "books";

    fn id(&self) -> Id {
        self.id
    }

    fn is_active(&self) -> Option<bool> {
        Some(self.is_active)
    }

    fn set_active(&mut self, active: bool) {
        self.is_active = active;
    }

    fn usage_count(&self) -> u64 {
        self.borrow_count
    }
}

/// References and price stay `None` until entered, so only the required
/// checks see an untouched form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDraft {
    pub title: String,
    pub author_id: Option<Id>,
    pub category_id: Option<Id>,
    pub publisher_id: Option<Id>,
    pub isbn: String,
    pub price: Option<i64>,
    pub stock: u32,
}

impl Draft for BookDraft {
    type Entity = Book;

    fn from_entity(entity: &Book) -> Self {
        Self {
            title: entity.title.clone(),
            author_id: Some(entity.author_id),
            category_id: Some(entity.category_id),
            publisher_id: Some(entity.publisher_id),
            isbn: entity.isbn.clone(),
            price: Some(entity.price),
            stock: entity.stock,
        }
    }
}
