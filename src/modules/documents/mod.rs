pub mod models;

use senselib_http::{Method, RestClient};
use senselib_kernel::{ApiError, Id};

pub use models::Comment;

pub const RESOURCE: &str = "documents";

pub async fn delete_comment(
    client: &RestClient,
    document_id: Id,
    comment_id: Id,
) -> Result<(), ApiError> {
    let url = client
        .endpoint()
        .resource(RESOURCE)
        .item(document_id)
        .segment("comments")
        .item(comment_id)
        .build();
    client.send_empty(client.request(Method::DELETE, &url)).await?;
    tracing::info!(%document_id, %comment_id, "comment deleted");
    Ok(())
}
