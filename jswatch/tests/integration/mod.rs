//! Integration tests for jswatch
//!
//! External tools are replaced by small shell scripts and an in-process HTTP
//! server, so these run without inotifywait, java, or network access.

pub mod end_to_end;
pub mod helpers;
pub mod signals;
