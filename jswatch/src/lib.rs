pub mod compiler;
pub mod config;
pub mod error;
pub mod logging;
pub mod monitor;
pub mod process;
pub mod report;
pub mod watcher;

pub use error::{Result, WatchError};
