pub mod models;

use senselib_kernel::{Entity, EntityDescriptor, Rule, SortDirection};

pub use models::{Category, CategoryDraft};

pub fn descriptor() -> EntityDescriptor {
    EntityDescriptor::builder(Category::NAME)
        .label("Category")
        .sortable(["name", "booksCount", "createdAt"])
        .default_sort("createdAt", SortDirection::Desc)
        .toggleable()
        .usage_field("booksCount")
        .required("name", "Category name is required")
        .rule("name", Rule::MinLength(2), "Category name must be at least 2 characters")
        .build()
}
