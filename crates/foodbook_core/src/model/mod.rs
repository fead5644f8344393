//! FoodBook domain model.
//!
//! # Responsibility
//! - Define clients, deliveries and the aggregate that keeps them consistent.
//! - Provide the unique collection, view filters and undo history the facade
//!   composes.
//!
//! # Invariants
//! - Client identity is the exact full name; delivery identity is the id.
//! - Every delivery references a client present in the same book.
//! - Nothing in this module performs I/O or logging.

pub mod client;
pub mod delivery;
pub mod error;
pub mod filter;
pub mod food_book;
pub mod history;
pub mod sample;
pub mod tag;
pub mod unique_list;
pub mod validation;
