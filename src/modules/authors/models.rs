use senselib_kernel::{Entity, Id};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::controllers::Draft;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub biography: String,
    pub is_active: bool,
    #[serde(default)]
    pub books_count: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Entity for Author {
    const NAME: &'static str = "authors";

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
pub struct AuthorDraft {
    pub name: String,
    pub biography: String,
}

impl Draft for AuthorDraft {
    type Entity = Author;

    fn from_entity(entity: &Author) -> Self {
        Self {
            name: entity.name.clone(),
            biography: entity.biography.clone(),
        }
    }
}
