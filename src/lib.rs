//! Local ledger for parking tickets: the started-hour pricing rule, display
//! formatting and a two-collection ticket store over key-value persistence.

pub mod clock;
pub mod config;
pub mod format;
pub mod models;
pub mod persisters;
pub mod pricing;
pub mod stats;
pub mod store;
