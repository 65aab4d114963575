use senselib_kernel::{Entity, Id};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::controllers::Draft;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Publisher {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub is_active: bool,
    #[serde(default)]
    pub books_count: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Entity for Publisher {
    const NAME: &'static str = "publishers";

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
pub struct PublisherDraft {
    pub name: String,
    pub address: String,
    pub email: String,
    pub phone: String,
}

impl Draft for PublisherDraft {
    type Entity = Publisher;

    fn from_entity(entity: &Publisher) -> Self {
        Self {
            name: entity.name.clone(),
            address: entity.address.clone(),
            email: entity.email.clone(),
            phone: entity.phone.clone(),
        }
    }
}
