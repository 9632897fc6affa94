pub mod config;
pub mod extractors;
pub mod fetcher;
pub mod item_manager;
pub mod models;
pub mod notifiers;
pub mod reconciler;
pub mod scheduler;
pub mod store;
pub mod sweep;
pub mod utils;

// Re-export commonly used types
pub use config::AppConfig;
pub use utils::error::AppError;

pub type Result<T> = std::result::Result<T, AppError>;
