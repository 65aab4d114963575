use senselib_kernel::{Entity, Id};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::controllers::Draft;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub is_active: bool,
    /// Books filed under this category. Read-only.
    #[serde(default)]
    pub books_count: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Entity for Category {
    const NAME: &'static str = "categories";

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
        self.books_count
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDraft {
    pub name: String,
    pub description: String,
}

impl Draft for CategoryDraft {
    type Entity = Category;

    fn from_entity(entity: &Category) -> Self {
        Self {
            name: entity.name.clone(),
            description: entity.description.clone(),
        }
    }
}
