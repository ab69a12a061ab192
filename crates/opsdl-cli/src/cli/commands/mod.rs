//! CLI command handlers, one file per command.

mod config;
mod status;
mod sync;

pub use config::run_config;
pub use status::run_status;
pub use sync::run_sync;
