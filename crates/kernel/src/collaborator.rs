use async_trait::async_trait;
use serde_json::Value;

use crate::entity::{Entity, Id};
use crate::error::ApiError;
use crate::query::{ListQuery, Page};

/// Per-entity REST endpoints consumed by the controllers.
///
/// `toggle_active` always answers with the updated entity.
#[async_trait]
pub trait Collaborator<E: Entity>: Send + Sync {
    async fn list(&self, query: &ListQuery) -> Result<Page<E>, ApiError>;

    async fn get(&self, id: Id) -> Result<E, ApiError>;

    async fn create(&self, payload: &Value) -> Result<E, ApiError>;

    async fn update(&self, id: Id, payload: &Value) -> Result<E, ApiError>;

    async fn toggle_active(&self, id: Id) -> Result<E, ApiError>;

    async fn delete(&self, id: Id) -> Result<(), ApiError>;
}
