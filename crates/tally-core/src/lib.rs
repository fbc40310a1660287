//! tally-core - Core library for Tally
//!
//! This crate contains the shared models, recurring-transaction generation,
//! and local/cloud reconciliation logic used by all Tally interfaces. UI
//! concerns (forms, charts, routing) live in the client crates and call in
//! through [`store::LedgerStore`] and [`sync::SyncService`].

pub mod clock;
pub mod config;
pub mod error;
pub mod generate;
pub mod merge;
pub mod models;
pub mod schedule;
pub mod state;
pub mod store;
pub mod sync;

pub use error::{Error, Result};
pub use models::Snapshot;
pub use sync::SyncService;
