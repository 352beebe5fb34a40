//! Shared application state for the relay.
//!
//! Built once by `main` and injected into handlers through axum `State`.
//! Holds the loaded config and the emitter provider; neither is mutated
//! after construction, so handlers share it without locking.

use std::sync::Arc;

use mcstats_core::error::Result;

use crate::config::RelayConfig;
use crate::emitter::{EmitterFactory, EmitterProvider, MetricEmitter, UdpEmitterFactory};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: RelayConfig,
    emitters: EmitterProvider,
}

impl AppState {
    /// State that emits over UDP to `cfg.statsd`.
    pub fn new(cfg: RelayConfig) -> Self {
        let factory = Arc::new(UdpEmitterFactory::new(&cfg.statsd));
        Self::with_factory(cfg, factory)
    }

    /// State with a caller-supplied emitter factory. Handle reuse follows `cfg.env`.
    pub fn with_factory(cfg: RelayConfig, factory: Arc<dyn EmitterFactory>) -> Self {
        let emitters = EmitterProvider::for_mode(&cfg.env, factory);
        tracing::debug!(env = %cfg.env, shared = emitters.is_shared(), "emitter provider ready");
        Self {
            inner: Arc::new(AppStateInner { cfg, emitters }),
        }
    }

    pub fn cfg(&self) -> &RelayConfig {
        &self.inner.cfg
    }

    pub async fn emitter(&self) -> Result<Arc<MetricEmitter>> {
        self.inner.emitters.acquire().await
    }
}
