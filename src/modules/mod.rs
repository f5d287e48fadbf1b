pub mod books;

use std::sync::Arc;

use bookshelf_db::Repository;
use bookshelf_kernel::ModuleRegistry;

use books::models::Book;

/// Register all project-specific modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, books: Arc<dyn Repository<Book>>) {
    registry.register(books::create_module(books));
}
