use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::models::price_history::DEFAULT_RETENTION_CAP;
use crate::models::{PriceHistory, PriceObservation, TrackedItem};
use crate::store::PriceStore;
use crate::utils::error::AppError;

/// In-memory store, primarily for tests. Entries keep registration order
/// via an insertion counter so sweeps are deterministic.
pub struct MemoryStore {
    items: RwLock<HashMap<String, Entry>>,
    retention_cap: usize,
}

struct Entry {
    order: u64,
    item: TrackedItem,
    history: PriceHistory,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_retention_cap(DEFAULT_RETENTION_CAP)
    }

    pub fn with_retention_cap(retention_cap: usize) -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
            retention_cap,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceStore for MemoryStore {
    async fn insert_item(
        &self,
        item: &TrackedItem,
        seed: &PriceObservation,
    ) -> Result<(), AppError> {
        let mut items = self.items.write().await;
        let order = items.len() as u64;
        let mut history = PriceHistory::with_cap(self.retention_cap);
        history.record(seed.clone());
        items.insert(
            item.id.clone(),
            Entry {
                order,
                item: item.clone(),
                history,
            },
        );
        Ok(())
    }

    async fn active_items(&self) -> Result<Vec<TrackedItem>, AppError> {
        let items = self.items.read().await;
        let mut entries: Vec<_> = items
            .values()
            .filter(|entry| entry.item.is_active)
            .collect();
        entries.sort_by_key(|entry| entry.order);
        Ok(entries.iter().map(|entry| entry.item.clone()).collect())
    }

    async fn find_item(&self, id: &str, owner_id: &str) -> Result<TrackedItem, AppError> {
        let items = self.items.read().await;
        items
            .get(id)
            .filter(|entry| entry.item.owner_id == owner_id)
            .map(|entry| entry.item.clone())
            .ok_or_else(|| AppError::NotFound {
                resource: format!("tracked item {id}"),
            })
    }

    async fn commit_observation(
        &self,
        item: &TrackedItem,
        observation: &PriceObservation,
    ) -> Result<(), AppError> {
        let mut items = self.items.write().await;
        let entry = items.get_mut(&item.id).ok_or_else(|| AppError::NotFound {
            resource: format!("tracked item {}", item.id),
        })?;
        entry.item = item.clone();
        entry.history.record(observation.clone());
        Ok(())
    }

    async fn history(&self, item_id: &str) -> Result<PriceHistory, AppError> {
        let items = self.items.read().await;
        items
            .get(item_id)
            .map(|entry| entry.history.clone())
            .ok_or_else(|| AppError::NotFound {
                resource: format!("tracked item {item_id}"),
            })
    }

    async fn deactivate_item(&self, id: &str, owner_id: &str) -> Result<(), AppError> {
        let mut items = self.items.write().await;
        let entry = items
            .get_mut(id)
            .filter(|entry| entry.item.owner_id == owner_id)
            .ok_or_else(|| AppError::NotFound {
                resource: format!("tracked item {id}"),
            })?;
        entry.item.deactivate();
        Ok(())
    }
}
