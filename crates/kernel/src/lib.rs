//! Core traits, settings, and entity registry for SenseLib.

pub mod collaborator;
pub mod entity;
pub mod error;
pub mod query;
pub mod registry;
pub mod scope;
pub mod settings;

pub use collaborator::Collaborator;
pub use entity::{Entity, EntityDescriptor, EntityDescriptorBuilder, FieldRule, Id, Rule};
pub use error::ApiError;
pub use query::{ListQuery, Page, SortDirection, SortSpec};
pub use registry::EntityRegistry;
pub use scope::{Scope, ScopeHandle};
