use async_trait::async_trait;
use axum::Router;

/// Borrowed view of the loaded settings handed to lifecycle hooks.
pub struct InitCtx<'a> {
    pub settings: &'a crate::settings::Settings,
}

/// Schema migration contributed by a module.
///
/// `id` must be unique within the contributing module; it is recorded once
/// applied so the same migration never runs twice against one database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    pub id: &'static str,
    pub up: &'static str,
}

/// A feature slice of bookshelf (books today) plugged into the registry.
///
/// Only `name` is required. The registry drives the hooks in this order:
/// `init`, migrations (SQLite backend only), `start`, serving, `stop`.
#[async_trait]
pub trait Module: Sync + Send {
    /// Mount segment and ledger key, e.g. `books` for `/api/books`.
    fn name(&self) -> &'static str;

    /// Runs before any migration touches the database.
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Routes relative to `/api/{name}`; `/` maps to the bare prefix.
    fn routes(&self) -> Router {
        Router::new()
    }

    /// OpenAPI fragment with `paths` relative to the mount and any
    /// `components.schemas`, folded into `/docs/openapi.json`.
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    /// DDL this module owns. Ids already in `schema_migrations` are skipped.
    fn migrations(&self) -> Vec<Migration> {
        vec![]
    }

    /// Runs once the schema is current, right before the server binds.
    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Runs after the server drains, in reverse registration order.
    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;

    struct Bare;

    #[async_trait]
    impl Module for Bare {
        fn name(&self) -> &'static str {
            "bare"
        }
    }

    #[tokio::test]
    async fn hooks_default_to_no_ops() {
        let settings = Settings::default();
        let ctx = InitCtx {
            settings: &settings,
        };

        Bare.init(&ctx).await.unwrap();
        Bare.start(&ctx).await.unwrap();
        Bare.stop().await.unwrap();

        assert!(Bare.openapi().is_none());
        assert!(Bare.migrations().is_empty());
    }
}
