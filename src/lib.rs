pub mod adapters;
pub mod config;
pub mod context;
pub mod core;
pub mod disc;
pub mod logging;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
