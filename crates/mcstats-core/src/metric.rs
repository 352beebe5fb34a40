//! Metric event model.
//!
//! A `MetricEvent` lives for exactly one request: it is built by the translator,
//! handed to an emitter, and dropped.

use std::fmt;

/// The five statsd metric kinds the relay forwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Count,
    Gauge,
    Histogram,
    Timing,
    Set,
}

impl MetricKind {
    /// All kinds, in type-code table order.
    pub const ALL: [MetricKind; 5] = [
        MetricKind::Count,
        MetricKind::Gauge,
        MetricKind::Histogram,
        MetricKind::Timing,
        MetricKind::Set,
    ];

    /// Resolve an inbound type code (`t` field). Exact match only.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "c" => Some(MetricKind::Count),
            "g" => Some(MetricKind::Gauge),
            "h" => Some(MetricKind::Histogram),
            "ms" => Some(MetricKind::Timing),
            "s" => Some(MetricKind::Set),
            _ => None,
        }
    }

    /// Type suffix on the statsd wire.
    pub fn wire_code(self) -> &'static str {
        match self {
            MetricKind::Count => "c",
            MetricKind::Gauge => "g",
            MetricKind::Histogram => "h",
            MetricKind::Timing => "ms",
            MetricKind::Set => "s",
        }
    }

    /// Emitter operation name, used as a log field.
    pub fn method_name(self) -> &'static str {
        match self {
            MetricKind::Count => "count",
            MetricKind::Gauge => "gauge",
            MetricKind::Histogram => "histogram",
            MetricKind::Timing => "timing",
            MetricKind::Set => "set",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method_name())
    }
}

/// Numeric metric value. Integral unless the raw input carried a `.`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    Int(i64),
    Float(f64),
}

impl MetricValue {
    pub fn is_zero(&self) -> bool {
        match *self {
            MetricValue::Int(i) => i == 0,
            MetricValue::Float(f) => f == 0.0,
        }
    }
}

impl Default for MetricValue {
    fn default() -> Self {
        MetricValue::Int(0)
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            MetricValue::Int(i) => write!(f, "{i}"),
            MetricValue::Float(v) => write_float(f, v),
        }
    }
}

/// Render a float so it always reads as a float (`3` becomes `3.0`).
pub(crate) fn write_float(w: &mut impl fmt::Write, v: f64) -> fmt::Result {
    let s = v.to_string();
    if s.contains(['.', 'e', 'E']) || !v.is_finite() {
        w.write_str(&s)
    } else {
        write!(w, "{s}.0")
    }
}

/// Optional emission metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmitOptions {
    /// Sample rate forwarded to the collector. Always strictly positive when set.
    pub sample_rate: Option<f64>,
    /// `key:value` tags in arrival order. Empty means no tags segment.
    pub tags: Vec<String>,
}

impl EmitOptions {
    pub fn is_empty(&self) -> bool {
        self.sample_rate.is_none() && self.tags.is_empty()
    }
}

/// One metric emission, fully normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricEvent {
    pub kind: MetricKind,
    pub name: String,
    pub value: MetricValue,
    pub options: EmitOptions,
}
