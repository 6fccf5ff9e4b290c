//! Picks the compiler backend for the whole run

use std::cell::OnceCell;
use std::sync::Arc;

use super::backend::{Backend, BackendKind};
use super::local::LocalBackend;
use super::remote::RemoteBackend;
use crate::config::Config;
use crate::error::{Result, WatchError};

type BackendFactory = Box<dyn Fn(BackendKind) -> Result<Backend>>;

/// Tries backends in a fixed order and caches the first one that can be built.
///
/// A backend is skipped when its construction reports `MissingDependency`.
/// Once a backend has been chosen it is handed out for the rest of the run
/// without re-checking the ones before it.
pub struct BackendResolver {
    order: Vec<BackendKind>,
    factory: BackendFactory,
    resolved: OnceCell<Arc<Backend>>,
}

impl BackendResolver {
    pub fn new(config: &Config) -> Self {
        let local = config.local.clone();
        let remote = config.remote.clone();
        Self::with_factory(config.backends.clone(), move |kind| match kind {
            BackendKind::Local => LocalBackend::new(&local).map(Backend::Local),
            BackendKind::Remote => RemoteBackend::new(&remote).map(Backend::Remote),
        })
    }

    pub fn with_factory(
        order: Vec<BackendKind>,
        factory: impl Fn(BackendKind) -> Result<Backend> + 'static,
    ) -> Self {
        Self {
            order,
            factory: Box::new(factory),
            resolved: OnceCell::new(),
        }
    }

    pub fn order(&self) -> &[BackendKind] {
        &self.order
    }

    /// The backend for this run, constructing it on first use
    pub fn resolve(&self) -> Result<Arc<Backend>> {
        if let Some(backend) = self.resolved.get() {
            return Ok(Arc::clone(backend));
        }

        for &kind in &self.order {
            match (self.factory)(kind) {
                Ok(backend) => {
                    tracing::debug!("Using {kind} compiler.");
                    let backend = self.resolved.get_or_init(|| Arc::new(backend));
                    return Ok(Arc::clone(backend));
                }
                Err(WatchError::MissingDependency(reason)) => {
                    tracing::debug!("Not using {kind} compiler. {reason}");
                }
                Err(other) => return Err(other),
            }
        }

        Err(WatchError::MissingDependency(
            "Could not instantiate any compiler".to_string(),
        ))
    }
}
