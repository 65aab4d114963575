pub mod models;

use senselib_kernel::{Entity, EntityDescriptor, SortDirection};

pub use models::{Author, AuthorDraft};

pub fn descriptor() -> EntityDescriptor {
    EntityDescriptor::builder(Author::NAME)
        .label("Author")
        .sortable(["name", "booksCount", "createdAt"])
        .default_sort("createdAt", SortDirection::Desc)
        .toggleable()
        .usage_field("booksCount")
        .required("name", "Author name is required")
        .build()
}
