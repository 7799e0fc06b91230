// Pedantic lint configuration for the crate.
// Most of these are reasonable but too strict for this codebase:
// - missing_errors_doc: Error handling is self-evident from Result types
// - missing_panics_doc: Panics are rare and documented inline
// - module_name_repetitions: `RecordStore` in `store` reads better than `Store`
// - needless_pass_by_value: Handlers take extractors by value
// - cast_precision_loss: Backup sizes are far below f64 precision limits
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::needless_pass_by_value,
    clippy::cast_precision_loss
)]

pub mod backup;
pub mod cli;
pub mod config;
pub mod error;
pub mod inventory;
pub mod models;
pub mod server;
pub mod store;
