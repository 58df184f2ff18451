//! Order, quote and sales bookkeeping for a custom-footwear workshop.

pub mod app;
pub mod calc;
pub mod config;
pub mod db;
pub mod error;
pub mod format;
pub mod history;
pub mod model;
pub mod parse;
pub mod sizes;
pub mod stats;

pub use app::Workshop;
pub use db::{Database, KeyValueStore};
pub use error::{LedgerError, RecordKind};
