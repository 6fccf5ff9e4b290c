//! JavaScript compiler backends and their results
//!
//! A [`Backend`] is one strategy for running Closure Compiler: the local
//! application through `java -jar`, or the hosted compiler service over HTTP.
//! The [`BackendResolver`] picks the first backend whose dependencies are
//! available once per run; every compile afterwards goes through that choice.

mod backend;
mod local;
pub mod message;
pub mod parser;
mod remote;
mod resolver;
mod result;

pub use backend::{default_target_path, Backend, BackendKind};
pub use local::LocalBackend;
pub use message::{expand_tabs, Message, MessageKind, TAB_WIDTH};
pub use remote::RemoteBackend;
pub use resolver::BackendResolver;
pub use result::CompilationResult;
