//! Metric emitter and handle acquisition.
//!
//! `MetricEmitter` exposes one call per metric kind and writes exactly one
//! datagram per call. The relay runs it with `always_send`, so a sample rate is
//! forwarded as metadata for the collector instead of being acted on here.
//!
//! `EmitterProvider` decides how handles are obtained:
//! - `Shared`: built on first use, then reused for the life of the process
//! - `PerCall`: a fresh handle for every request (test mode)

pub mod sink;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;

use mcstats_core::error::Result;
use mcstats_core::protocol::line;
use mcstats_core::{EmitOptions, MetricEvent, MetricKind, MetricValue};

use crate::config::{ExecMode, StatsdSection};

pub use sink::{MemorySink, MetricSink, UdpSink};

pub struct MetricEmitter {
    sink: Arc<dyn MetricSink>,
    always_send: bool,
}

impl MetricEmitter {
    /// Emitter that forwards every event regardless of sample rate.
    pub fn new(sink: Arc<dyn MetricSink>) -> Self {
        Self {
            sink,
            always_send: true,
        }
    }

    /// Drop events client-side according to their sample rate, like a stock statsd client.
    pub fn with_client_sampling(mut self) -> Self {
        self.always_send = false;
        self
    }

    pub fn always_send(&self) -> bool {
        self.always_send
    }

    pub async fn count(&self, name: &str, value: MetricValue, opts: &EmitOptions) -> Result<()> {
        self.send(MetricKind::Count, name, value, opts).await
    }

    pub async fn gauge(&self, name: &str, value: MetricValue, opts: &EmitOptions) -> Result<()> {
        self.send(MetricKind::Gauge, name, value, opts).await
    }

    pub async fn histogram(&self, name: &str, value: MetricValue, opts: &EmitOptions) -> Result<()> {
        self.send(MetricKind::Histogram, name, value, opts).await
    }

    pub async fn timing(&self, name: &str, value: MetricValue, opts: &EmitOptions) -> Result<()> {
        self.send(MetricKind::Timing, name, value, opts).await
    }

    pub async fn set(&self, name: &str, value: MetricValue, opts: &EmitOptions) -> Result<()> {
        self.send(MetricKind::Set, name, value, opts).await
    }

    /// Dispatch an event to the call matching its kind.
    pub async fn emit(&self, event: &MetricEvent) -> Result<()> {
        let MetricEvent {
            kind,
            name,
            value,
            options,
        } = event;
        match kind {
            MetricKind::Count => self.count(name, *value, options).await,
            MetricKind::Gauge => self.gauge(name, *value, options).await,
            MetricKind::Histogram => self.histogram(name, *value, options).await,
            MetricKind::Timing => self.timing(name, *value, options).await,
            MetricKind::Set => self.set(name, *value, options).await,
        }
    }

    async fn send(&self, kind: MetricKind, name: &str, value: MetricValue, opts: &EmitOptions) -> Result<()> {
        if !self.should_send(opts.sample_rate) {
            tracing::debug!(%kind, name, "sampled out client-side");
            return Ok(());
        }
        let datagram = line::encode_parts(kind, name, value, opts);
        self.sink.send(datagram).await?;
        Ok(())
    }

    fn should_send(&self, rate: Option<f64>) -> bool {
        match rate {
            _ if self.always_send => true,
            None => true,
            Some(r) if r >= 1.0 => true,
            Some(r) => rand::random::<f64>() < r,
        }
    }
}

/// Builds emitter handles. The relay uses [`UdpEmitterFactory`]; tests inject their own.
#[async_trait]
pub trait EmitterFactory: Send + Sync {
    async fn build(&self) -> Result<MetricEmitter>;
}

/// Factory for UDP emitters pointed at the configured collector.
#[derive(Debug, Clone)]
pub struct UdpEmitterFactory {
    host: String,
    port: u16,
}

impl UdpEmitterFactory {
    pub fn new(statsd: &StatsdSection) -> Self {
        Self {
            host: statsd.host.clone(),
            port: statsd.port,
        }
    }
}

#[async_trait]
impl EmitterFactory for UdpEmitterFactory {
    async fn build(&self) -> Result<MetricEmitter> {
        let sink = UdpSink::bind(&self.host, self.port).await?;
        tracing::debug!(target = %sink.target(), "statsd emitter ready");
        Ok(MetricEmitter::new(Arc::new(sink)))
    }
}

pub enum EmitterProvider {
    Shared {
        factory: Arc<dyn EmitterFactory>,
        cell: OnceCell<Arc<MetricEmitter>>,
    },
    PerCall {
        factory: Arc<dyn EmitterFactory>,
    },
}

impl EmitterProvider {
    pub fn shared(factory: Arc<dyn EmitterFactory>) -> Self {
        EmitterProvider::Shared {
            factory,
            cell: OnceCell::new(),
        }
    }

    pub fn per_call(factory: Arc<dyn EmitterFactory>) -> Self {
        EmitterProvider::PerCall { factory }
    }

    /// Test mode builds per call; every other mode shares one handle.
    pub fn for_mode(mode: &ExecMode, factory: Arc<dyn EmitterFactory>) -> Self {
        if mode.is_test() {
            Self::per_call(factory)
        } else {
            Self::shared(factory)
        }
    }

    pub fn is_shared(&self) -> bool {
        matches!(self, EmitterProvider::Shared { .. })
    }

    /// Get a handle. A failed shared build is not cached; the next call retries.
    pub async fn acquire(&self) -> Result<Arc<MetricEmitter>> {
        match self {
            EmitterProvider::Shared { factory, cell } => {
                let emitter = cell
                    .get_or_try_init(|| async { factory.build().await.map(Arc::new) })
                    .await?;
                Ok(Arc::clone(emitter))
            }
            EmitterProvider::PerCall { factory } => Ok(Arc::new(factory.build().await?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use bytes::Bytes;

    struct CountingFactory {
        sink: Arc<MemorySink>,
        builds: AtomicUsize,
        fail_first: bool,
    }

    impl CountingFactory {
        fn new(fail_first: bool) -> Self {
            Self {
                sink: Arc::new(MemorySink::new()),
                builds: AtomicUsize::new(0),
                fail_first,
            }
        }
    }

    #[async_trait]
    impl EmitterFactory for CountingFactory {
        async fn build(&self) -> Result<MetricEmitter> {
            let n = self.builds.fetch_add(1, Ordering::SeqCst);
            if self.fail_first && n == 0 {
                return Err(io::Error::new(io::ErrorKind::AddrNotAvailable, "no collector").into());
            }
            Ok(MetricEmitter::new(self.sink.clone()))
        }
    }

    struct DeadSink;

    #[async_trait]
    impl MetricSink for DeadSink {
        async fn send(&self, _datagram: Bytes) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"))
        }
    }

    fn opts(rate: Option<f64>) -> EmitOptions {
        EmitOptions {
            sample_rate: rate,
            tags: Vec::new(),
        }
    }

    #[tokio::test]
    async fn each_kind_writes_its_type_code() {
        let sink = Arc::new(MemorySink::new());
        let emitter = MetricEmitter::new(sink.clone());
        let v = MetricValue::Int(2);
        let o = opts(None);

        emitter.count("a", v, &o).await.unwrap();
        emitter.gauge("a", v, &o).await.unwrap();
        emitter.histogram("a", v, &o).await.unwrap();
        emitter.timing("a", v, &o).await.unwrap();
        emitter.set("a", v, &o).await.unwrap();

        assert_eq!(sink.lines(), ["a:2|c", "a:2|g", "a:2|h", "a:2|ms", "a:2|s"]);
    }

    #[tokio::test]
    async fn always_send_ignores_tiny_rates() {
        let sink = Arc::new(MemorySink::new());
        let emitter = MetricEmitter::new(sink.clone());
        assert!(emitter.always_send());

        let event = MetricEvent {
            kind: MetricKind::Count,
            name: "minecraft.kills".into(),
            value: MetricValue::Int(1),
            options: opts(Some(0.000_001)),
        };
        for _ in 0..200 {
            emitter.emit(&event).await.unwrap();
        }
        assert_eq!(sink.len(), 200);
        assert_eq!(sink.lines()[0], "minecraft.kills:1|c|@0.000001");
    }

    #[tokio::test]
    async fn client_sampling_keeps_full_rate() {
        let sink = Arc::new(MemorySink::new());
        let emitter = MetricEmitter::new(sink.clone()).with_client_sampling();
        assert!(!emitter.always_send());

        for _ in 0..20 {
            emitter.gauge("g", MetricValue::Int(1), &opts(Some(1.0))).await.unwrap();
            emitter.gauge("g", MetricValue::Int(1), &opts(None)).await.unwrap();
        }
        assert_eq!(sink.len(), 40);
    }

    #[tokio::test]
    async fn sink_failure_propagates() {
        let emitter = MetricEmitter::new(Arc::new(DeadSink));
        let err = emitter.count("a", MetricValue::Int(1), &opts(None)).await.unwrap_err();
        assert_eq!(err.client_code().http_status(), 500);
    }

    #[tokio::test]
    async fn shared_provider_builds_once() {
        let factory = Arc::new(CountingFactory::new(false));
        let provider = EmitterProvider::for_mode(&ExecMode::Production, factory.clone());
        assert!(provider.is_shared());

        let a = provider.acquire().await.unwrap();
        let b = provider.acquire().await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(factory.builds.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn shared_provider_retries_failed_build() {
        let factory = Arc::new(CountingFactory::new(true));
        let provider = EmitterProvider::shared(factory.clone());

        assert!(provider.acquire().await.is_err());
        assert!(provider.acquire().await.is_ok());
        assert!(provider.acquire().await.is_ok());
        assert_eq!(factory.builds.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_mode_builds_per_call() {
        let factory = Arc::new(CountingFactory::new(false));
        let provider = EmitterProvider::for_mode(&ExecMode::Test, factory.clone());
        assert!(!provider.is_shared());

        let a = provider.acquire().await.unwrap();
        let b = provider.acquire().await.unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(factory.builds.load(Ordering::SeqCst), 2);
    }
}
