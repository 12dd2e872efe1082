pub mod books;

use std::sync::Arc;

use catalog_kernel::ModuleRegistry;

use books::BookRepository;

/// Register all application modules with the registry
pub fn register_all(
    registry: &mut ModuleRegistry,
    repository: Arc<dyn BookRepository>,
) -> anyhow::Result<()> {
    registry.register(books::create_module(repository)?);
    Ok(())
}
