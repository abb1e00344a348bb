// Library root: shared domain types, configuration, providers, and stores
// consumed by the simulation engine and the CLI.

pub mod cache;
pub mod config;
pub mod draft;
pub mod history;
pub mod player;
pub mod providers;
pub mod rankings_csv;
pub mod store;
pub mod weights;
