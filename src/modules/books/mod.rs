pub mod models;

use senselib_kernel::{Entity, EntityDescriptor, Rule, SortDirection};

pub use models::{Book, BookDraft};

pub fn descriptor() -> EntityDescriptor {
    EntityDescriptor::builder(Book::NAME)
        .label("Book")
        .sortable(["title", "price", "stock", "borrowCount", "createdAt"])
        .default_sort("createdAt", SortDirection::Desc)
        .toggleable()
        .usage_field("borrowCount")
        .required("title", "Title is required")
        .required("authorId", "Author is required")
        .required("categoryId", "Category is required")
        .required("publisherId", "Publisher is required")
        .rule("price", Rule::Positive, "Price must be greater than zero")
        .build()
}
