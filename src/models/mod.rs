use uuid::Uuid;

pub mod price_history;
pub mod tracked_item;

// Re-exports for convenience
pub use price_history::*;
pub use tracked_item::*;

// Helper function to generate record ids in the format expected by the database
pub fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}
