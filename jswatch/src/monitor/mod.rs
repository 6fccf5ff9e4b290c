//! File system monitor for jswatch
//!
//! Scans the watched tree once, then follows change events from the watch
//! process and hands every path to the registered watchers.

pub mod core;
mod source;


pub use self::core::ChangeMonitor;
pub use source::{ChangeStream, InotifySource, ShutdownHandle, INOTIFYWAIT, STOP_GRACE};
