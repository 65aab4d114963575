pub mod models;

use senselib_http::{RestClient, UploadFile};
use senselib_kernel::{ApiError, Entity, EntityDescriptor, Id, Rule, SortDirection};

pub use models::{Slide, SlideDraft};

/// Multipart field carrying the slide image.
pub const IMAGE_FIELD: &str = "image";

pub fn descriptor() -> EntityDescriptor {
    EntityDescriptor::builder(Slide::NAME)
        .label("Slide")
        .sortable(["title", "displayOrder", "createdAt"])
        .default_sort("displayOrder", SortDirection::Asc)
        .toggleable()
        .required("title", "Slide title is required")
        .rule("displayOrder", Rule::Positive, "Display order must be positive")
        .build()
}

/// Replace the slide image. Returns the slide with its new `imageUrl`.
pub async fn upload_image(client: &RestClient, id: Id, file: UploadFile) -> Result<Slide, ApiError> {
    let url = client
        .endpoint()
        .resource(Slide::NAME)
        .item(id)
        .segment(IMAGE_FIELD)
        .build();
    tracing::debug!(%id, file = %file.file_name, bytes = file.bytes.len(), "uploading slide image");
    client.upload(&url, IMAGE_FIELD, file).await
}
