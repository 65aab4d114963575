//! Per-entity models, descriptors and endpoint variants.

pub mod authors;
pub mod books;
pub mod borrow_records;
pub mod categories;
pub mod documents;
pub mod publishers;
pub mod slides;
pub mod transactions;
pub mod users;

use senselib_kernel::EntityRegistry;

/// Register every entity descriptor with the registry
pub fn register_all(registry: &mut EntityRegistry) -> anyhow::Result<()> {
    registry.register(categories::descriptor())?;
    registry.register(authors::descriptor())?;
    registry.register(publishers::descriptor())?;
    registry.register(books::descriptor())?;
    registry.register(slides::descriptor())?;
    registry.register(users::descriptor())?;
    registry.register(transactions::descriptor())?;
    registry.register(borrow_records::descriptor())?;
    Ok(())
}
