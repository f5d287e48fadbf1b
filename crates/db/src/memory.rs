use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{DbError, DbResult, Entity, Repository};

/// Map-backed store with an atomic id allocator.
///
/// Ids start at 1. Saving a record with an explicit id moves the allocator
/// past it, so later inserts never reuse that id. Once `i64::MAX` has been
/// handed out, inserts without an id fail with [`DbError::IdExhausted`].
pub struct InMemoryRepository<E> {
    records: RwLock<BTreeMap<i64, E>>,
    /// Highest id allocated or saved so far.
    last_id: AtomicI64,
}

impl<E: Entity> InMemoryRepository<E> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
            last_id: AtomicI64::new(0),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    fn allocate_id(&self) -> DbResult<i64> {
        self.last_id
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| last.checked_add(1))
            .map(|previous| previous + 1)
            .map_err(|_| DbError::IdExhausted)
    }
}

impl<E: Entity> Default for InMemoryRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for InMemoryRepository<E> {
    async fn find_all(&self) -> DbResult<Vec<E>> {
        Ok(self.records.read().await.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> DbResult<Option<E>> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn save(&self, entity: E) -> DbResult<E> {
        let mut records = self.records.write().await;

        let (id, entity) = match entity.id() {
            Some(id) => {
                self.last_id.fetch_max(id, Ordering::SeqCst);
                (id, entity)
            }
            None => {
                let id = self.allocate_id()?;
                (id, entity.with_id(id))
            }
        };

        records.insert(id, entity.clone());
        Ok(entity)
    }

    async fn update(&self, id: i64, entity: E) -> DbResult<Option<E>> {
        let mut records = self.records.write().await;

        let Some(stored) = records.get_mut(&id) else {
            return Ok(None);
        };
        let entity = entity.with_id(id);
        *stored = entity.clone();
        Ok(Some(entity))
    }

    async fn delete_by_id(&self, id: i64) -> DbResult<()> {
        self.records.write().await.remove(&id);
        Ok(())
    }
}
