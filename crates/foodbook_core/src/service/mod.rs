//! Core use-case services.
//!
//! # Responsibility
//! - Expose the store operation set consumed by command handlers.
//! - Keep command/UI layers decoupled from collection internals.

pub mod model_manager;
