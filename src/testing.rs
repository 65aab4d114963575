//! Fixtures shared by the controller and widget tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use senselib_kernel::{
    ApiError, Collaborator, Entity, EntityDescriptor, Id, ListQuery, Page, Rule, SortDirection,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use crate::controllers::detail::Draft;
use crate::store::MemoryCollaborator;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Genre {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub books_count: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Entity for Genre {
    const NAME: &'static str = "genres";

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
pub struct GenreDraft {
    pub name: String,
    pub description: String,
}

impl Draft for GenreDraft {
    type Entity = Genre;

    fn from_entity(entity: &Genre) -> Self {
        Self {
            name: entity.name.clone(),
            description: entity.description.clone(),
        }
    }
}

pub fn descriptor() -> Arc<EntityDescriptor> {
    Arc::new(
        EntityDescriptor::builder("genres")
            .label("Genre")
            .sortable(["name", "booksCount", "createdAt"])
            .default_sort("name", SortDirection::Asc)
            .toggleable()
            .usage_field("booksCount")
            .required("name", "Name is required")
            .rule("name", Rule::MinLength(2), "Name is too short")
            .build(),
    )
}

pub fn genre(id: i64, name: &str, books_count: u64) -> Genre {
    Genre {
        id: Id(id),
        name: name.to_string(),
        description: String::new(),
        is_active: true,
        books_count,
        created_at: OffsetDateTime::from_unix_timestamp(1_700_000_000 + id * 86_400)
            .expect("valid timestamp"),
    }
}

/// `count` unused genres named `Genre 01`, `Genre 02`, ...
pub fn genres(count: i64) -> Vec<Genre> {
    (1..=count)
        .map(|id| genre(id, &format!("Genre {id:02}"), 0))
        .collect()
}

/// Delays every call before delegating to the wrapped store.
pub struct Slow<E> {
    pub inner: Arc<MemoryCollaborator<E>>,
    pub list_delay: fn(&ListQuery) -> Duration,
    pub mutation_delay: Duration,
}

impl<E: Entity> Slow<E> {
    pub fn new(inner: Arc<MemoryCollaborator<E>>) -> Self {
        Self {
            inner,
            list_delay: |_| Duration::from_millis(10),
            mutation_delay: Duration::from_millis(10),
        }
    }
}

#[async_trait]
impl<E: Entity> Collaborator<E> for Slow<E> {
    async fn list(&self, query: &ListQuery) -> Result<Page<E>, ApiError> {
        tokio::time::sleep((self.list_delay)(query)).await;
        self.inner.list(query).await
    }

    async fn get(&self, id: Id) -> Result<E, ApiError> {
        tokio::time::sleep(self.mutation_delay).await;
        self.inner.get(id).await
    }

    async fn create(&self, payload: &Value) -> Result<E, ApiError> {
        tokio::time::sleep(self.mutation_delay).await;
        self.inner.create(payload).await
    }

    async fn update(&self, id: Id, payload: &Value) -> Result<E, ApiError> {
        tokio::time::sleep(self.mutation_delay).await;
        self.inner.update(id, payload).await
    }

    async fn toggle_active(&self, id: Id) -> Result<E, ApiError> {
        tokio::time::sleep(self.mutation_delay).await;
        self.inner.toggle_active(id).await
    }

    async fn delete(&self, id: Id) -> Result<(), ApiError> {
        tokio::time::sleep(self.mutation_delay).await;
        self.inner.delete(id).await
    }
}
