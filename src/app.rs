//! Application bootstrap: store selection, module registration, lifecycle.

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use bookshelf_db::{apply_migrations, Database, InMemoryRepository, Repository};
use bookshelf_kernel::{
    settings::{DatabaseBackend, Settings},
    InitCtx, ModuleRegistry,
};

use crate::modules::{
    self,
    books::{models::Book, repository::SqliteBookRepository},
};

/// A fully wired application, ready to migrate and serve.
pub struct App {
    settings: Settings,
    registry: ModuleRegistry,
    database: Option<Database>,
}

impl App {
    /// Open the configured record store and register every module.
    pub fn build(settings: Settings) -> anyhow::Result<Self> {
        let mut database = None;

        let books: Arc<dyn Repository<Book>> = match settings.database.backend {
            DatabaseBackend::Memory => Arc::new(InMemoryRepository::<Book>::new()),
            DatabaseBackend::Sqlite => {
                let db = Database::open(&settings.database.path).with_context(|| {
                    format!("failed to open database '{}'", settings.database.path)
                })?;
                database = Some(db.clone());
                Arc::new(SqliteBookRepository::new(db))
            }
        };

        let mut registry = ModuleRegistry::new();
        modules::register_all(&mut registry, books);

        Ok(Self {
            settings,
            registry,
            database,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// Apply pending module migrations; a no-op for the in-memory store.
    pub async fn migrate(&self) -> anyhow::Result<usize> {
        let Some(db) = &self.database else {
            tracing::info!("in-memory store selected; no migrations to apply");
            return Ok(0);
        };

        apply_migrations(db, self.registry.collect_migrations())
            .await
            .context("failed to apply migrations")
    }

    /// The HTTP router with every module mounted.
    pub fn router(&self) -> Router {
        bookshelf_http::build_router(&self.registry, &self.settings)
    }

    /// Init, migrate, start, serve until shutdown, then stop modules.
    pub async fn run(self) -> anyhow::Result<()> {
        let ctx = InitCtx {
            settings: &self.settings,
        };

        self.registry.init_all(&ctx).await?;
        self.migrate().await?;
        self.registry.start_all(&ctx).await?;

        let served = bookshelf_http::start_server(&self.registry, &self.settings).await;

        self.registry.stop_all().await?;
        tracing::info!("bookshelf-app shut down");
        served
    }
}
