pub mod models;

use senselib_kernel::{Entity, EntityDescriptor, Rule, SortDirection};

pub use models::{Publisher, PublisherDraft};

pub fn descriptor() -> EntityDescriptor {
    EntityDescriptor::builder(Publisher::NAME)
        .label("Publisher")
        .sortable(["name", "booksCount", "createdAt"])
        .default_sort("createdAt", SortDirection::Desc)
        .toggleable()
        .usage_field("booksCount")
        .required("name", "Publisher name is required")
        .rule("email", Rule::Email, "Email address is invalid")
        .build()
}
