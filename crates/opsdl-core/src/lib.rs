pub mod config;
pub mod logging;

pub mod browser;
pub mod catalog;
pub mod collaborators;
pub mod control;
pub mod episode;
pub mod error;
pub mod library;
pub mod numbering;
pub mod pipeline;

pub use error::{Result, SyncError};
