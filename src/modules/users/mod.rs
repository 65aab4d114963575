pub mod models;

use senselib_http::{Method, RestClient, UploadFile};
use senselib_kernel::{ApiError, Entity, EntityDescriptor, Id, Rule, SortDirection};

use crate::controllers::{validate, ControllerError};

pub use models::{Registration, Role, User, UserDraft};

/// Multipart field carrying the avatar image.
pub const AVATAR_FIELD: &str = "avatar";

pub fn descriptor() -> EntityDescriptor {
    EntityDescriptor::builder(User::NAME)
        .label("User")
        .sortable(["fullName", "email", "balance", "createdAt"])
        .default_sort("createdAt", SortDirection::Desc)
        .toggleable()
        .required("fullName", "Full name is required")
        .required("email", "Email is required")
        .rule("email", Rule::Email, "Email address is invalid")
        .build()
}

fn registration_descriptor() -> EntityDescriptor {
    EntityDescriptor::builder("registrations")
        .required("fullName", "Full name is required")
        .required("email", "Email is required")
        .rule("email", Rule::Email, "Email address is invalid")
        .required("password", "Password is required")
        .rule("password", Rule::MinLength(8), "Password must be at least 8 characters")
        .build()
}

/// Create an account through the registration endpoint.
///
/// The payload is validated locally first; invalid input never reaches the server.
pub async fn register(client: &RestClient, registration: &Registration) -> Result<User, ControllerError> {
    let payload = crate::controllers::draft_payload(registration)?;
    let errors = validate(&registration_descriptor(), &payload);
    if !errors.is_empty() {
        return Err(ControllerError::Validation(errors));
    }

    let url = client.endpoint().resource(User::NAME).segment("register").build();
    let user: User = client
        .send_json(client.request(Method::POST, &url).json(&payload))
        .await?;
    tracing::info!(id = %user.id, "user registered");
    Ok(user)
}

/// Replace the user's avatar. Returns the user with its new `avatarUrl`.
pub async fn upload_avatar(client: &RestClient, id: Id, file: UploadFile) -> Result<User, ApiError> {
    let url = client
        .endpoint()
        .resource(User::NAME)
        .item(id)
        .segment(AVATAR_FIELD)
        .build();
    tracing::debug!(%id, file = %file.file_name, bytes = file.bytes.len(), "uploading avatar");
    client.upload(&url, AVATAR_FIELD, file).await
}
