pub mod memory;
pub mod sqlite;

use async_trait::async_trait;

use crate::models::{PriceHistory, PriceObservation, TrackedItem};
use crate::utils::error::AppError;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Persistence seam for tracked items and their price history.
///
/// `commit_observation` is the load-bearing operation: the item update, the
/// history append, and the retention trim must land together so a crash
/// mid-sweep never leaves an item whose current price disagrees with its
/// newest observation.
#[async_trait]
pub trait PriceStore: Send + Sync {
    /// Persists a freshly registered item together with its seed
    /// observation. History is never empty after this call.
    async fn insert_item(
        &self,
        item: &TrackedItem,
        seed: &PriceObservation,
    ) -> Result<(), AppError>;

    /// Items eligible for the next sweep, in registration order.
    async fn active_items(&self) -> Result<Vec<TrackedItem>, AppError>;

    async fn find_item(&self, id: &str, owner_id: &str) -> Result<TrackedItem, AppError>;

    /// Atomically records one observation: updates the item row, appends to
    /// history, and evicts beyond the retention cap.
    async fn commit_observation(
        &self,
        item: &TrackedItem,
        observation: &PriceObservation,
    ) -> Result<(), AppError>;

    async fn history(&self, item_id: &str) -> Result<PriceHistory, AppError>;

    async fn deactivate_item(&self, id: &str, owner_id: &str) -> Result<(), AppError>;
}
