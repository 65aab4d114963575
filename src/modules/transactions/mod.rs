pub mod models;

use async_trait::async_trait;
use senselib_http::{Method, RestClient};
use senselib_kernel::{
    ApiError, Collaborator, Entity, EntityDescriptor, Id, ListQuery, Page, SortDirection,
};
use serde_json::Value;

use crate::store::paginate;

pub use models::{Transaction, TransactionStatus};

pub fn descriptor() -> EntityDescriptor {
    EntityDescriptor::builder(Transaction::NAME)
        .label("Transaction")
        .sortable(["amount", "status", "createdAt"])
        .default_sort("createdAt", SortDirection::Desc)
        .build()
}

/// Every transaction of one user, as returned by the per-user endpoint.
pub async fn for_user(client: &RestClient, user_id: Id) -> Result<Vec<Transaction>, ApiError> {
    let url = client
        .endpoint()
        .resource(Transaction::NAME)
        .segment("user")
        .item(user_id)
        .build();
    client.send_json(client.request(Method::GET, &url)).await
}

/// Read-only collaborator over one user's transactions.
///
/// The per-user endpoint returns a plain array, so search, sort and paging
/// happen client-side.
pub struct UserTransactions {
    client: RestClient,
    user_id: Id,
}

impl UserTransactions {
    pub fn new(client: RestClient, user_id: Id) -> Self {
        Self { client, user_id }
    }

    fn read_only() -> ApiError {
        ApiError::bad_request("transactions are read-only")
    }
}

#[async_trait]
impl Collaborator<Transaction> for UserTransactions {
    async fn list(&self, query: &ListQuery) -> Result<Page<Transaction>, ApiError> {
        let all = for_user(&self.client, self.user_id).await?;
        Ok(paginate(&all, query))
    }

    async fn get(&self, id: Id) -> Result<Transaction, ApiError> {
        for_user(&self.client, self.user_id)
            .await?
            .into_iter()
            .find(|transaction| transaction.id == id)
            .ok_or_else(|| ApiError::not_found(format!("transaction {} does not exist", id)))
    }

    async fn create(&self, _payload: &Value) -> Result<Transaction, ApiError> {
        Err(Self::read_only())
    }

    async fn update(&self, _id: Id, _payload: &Value) -> Result<Transaction, ApiError> {
        Err(Self::read_only())
    }

    async fn toggle_active(&self, _id: Id) -> Result<Transaction, ApiError> {
        Err(Self::read_only())
    }

    async fn delete(&self, _id: Id) -> Result<(), ApiError> {
        Err(Self::read_only())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_codes_parse_case_insensitively() {
        let status: TransactionStatus = serde_json::from_value(json!("completed")).unwrap();
        assert_eq!(status, TransactionStatus::Completed);
        let status: TransactionStatus = serde_json::from_value(json!("CANCELED")).unwrap();
        assert_eq!(status, TransactionStatus::Cancelled);
    }

    #[test]
    fn unknown_status_survives_a_round_trip() {
        let status: TransactionStatus = serde_json::from_value(json!("ON_HOLD")).unwrap();
        assert_eq!(status, TransactionStatus::Unknown("ON_HOLD".to_string()));
        assert_eq!(serde_json::to_value(status).unwrap(), json!("ON_HOLD"));
    }

    #[test]
    fn transactions_cannot_be_toggled() {
        assert!(!descriptor().toggleable());
        assert_eq!(descriptor().usage_field(), None);
    }
}
