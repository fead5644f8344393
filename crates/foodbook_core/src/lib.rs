//! Core data layer for FoodBook.
//! This crate is the single source of truth for store invariants: unique
//! clients and deliveries, client -> delivery cascades, and undo.

pub mod logging;
pub mod model;
pub mod prefs;
pub mod service;
pub mod storage;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::client::{Client, MAX_CLIENT_TAGS};
pub use model::delivery::{
    Cost, Delivery, DeliveryId, DeliveryStatus, DELIVERY_DATE_TIME_FORMAT,
};
pub use model::error::{EntityKind, ModelError, ModelResult};
pub use model::filter::{filtered_view, ClientFilter, DeliveryFilter, EntityFilter, ViewFilters};
pub use model::food_book::{FoodBook, FoodBookSnapshot};
pub use model::history::{Checkpoint, HistoryState, UndoHistory};
pub use model::sample::sample_food_book;
pub use model::tag::Tag;
pub use model::unique_list::{Identified, UniqueEntityList};
pub use model::validation::ValidationError;
pub use prefs::{read_user_prefs, save_user_prefs, PrefsError, StorageBackend, UserPrefs};
pub use service::model_manager::{DeletedClient, ModelManager, NewDelivery};
pub use storage::{
    FoodBookStorage, JsonFoodBookStorage, SqliteFoodBookStorage, StorageError, StorageResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
