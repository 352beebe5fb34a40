//! Request translator: parameter bag -> `MetricEvent`.
//!
//! Field map:
//! - `t` type code (`c|g|h|ms|s`); anything else rejects the request
//! - `s` stat suffix, appended to [`STAT_PREFIX`] verbatim
//! - `v` value, float if the raw text contains `.`, integer otherwise
//! - `r` sample rate, kept only when strictly positive
//! - `_*` tag fields, emitted as `key:value`; the leading `_` is dropped and
//!   colon runs in the key fold to a single `_`
//!
//! Numeric parsing is lenient on purpose: the longest numeric prefix wins and
//! text without one reads as zero. Nothing here fails except an unknown type code.

use crate::error::{Result, RelayError};
use crate::metric::{EmitOptions, MetricEvent, MetricKind, MetricValue};
use crate::params::Params;

/// Namespace prepended to every stat name.
pub const STAT_PREFIX: &str = "minecraft.";

/// Key prefix marking a tag field.
pub const TAG_SENTINEL: char = '_';

pub const FIELD_TYPE: &str = "t";
pub const FIELD_STAT: &str = "s";
pub const FIELD_VALUE: &str = "v";
pub const FIELD_RATE: &str = "r";

/// Translate a request into a metric event, or reject an unknown type code.
pub fn translate(params: &Params) -> Result<MetricEvent> {
    let code = params.get(FIELD_TYPE).unwrap_or_default();
    let kind = MetricKind::from_code(code)
        .ok_or_else(|| RelayError::UnsupportedMetricType(code.to_owned()))?;

    let name = build_stat_name(params.get(FIELD_STAT));
    let value = parse_number(params.get(FIELD_VALUE).unwrap_or_default());
    let sample_rate = parse_rate(params.get(FIELD_RATE));
    let tags = extract_tags(params);

    Ok(MetricEvent {
        kind,
        name,
        value,
        options: EmitOptions { sample_rate, tags },
    })
}

/// Prefix the stat suffix. No sanitization; a missing suffix yields the bare prefix.
pub fn build_stat_name(stat: Option<&str>) -> String {
    let stat = stat.unwrap_or_default();
    let mut name = String::with_capacity(STAT_PREFIX.len() + stat.len());
    name.push_str(STAT_PREFIX);
    name.push_str(stat);
    name
}

/// `"3"` -> `Int(3)`, `"3.0"` -> `Float(3.0)`, `"abc"` -> `Int(0)`.
pub fn parse_number(raw: &str) -> MetricValue {
    if raw.contains('.') {
        MetricValue::Float(lenient_f64(raw))
    } else {
        MetricValue::Int(lenient_i64(raw))
    }
}

/// Parse the rate field; only strictly positive rates survive.
pub fn parse_rate(raw: Option<&str>) -> Option<f64> {
    let rate = lenient_f64(raw.unwrap_or_default());
    (rate > 0.0).then_some(rate)
}

/// Collect `_`-prefixed fields as tags, one per value, in arrival order.
pub fn extract_tags(params: &Params) -> Vec<String> {
    let mut tags = Vec::new();
    for (key, values) in params.iter() {
        let Some(key) = key.strip_prefix(TAG_SENTINEL) else {
            continue;
        };
        let key = fold_colons(key);
        tags.extend(values.iter().map(|v| format!("{key}:{v}")));
    }
    tags
}

/// Replace each run of `:` with a single `_`.
fn fold_colons(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut in_run = false;
    for ch in key.chars() {
        if ch == ':' {
            if !in_run {
                out.push('_');
            }
            in_run = true;
        } else {
            out.push(ch);
            in_run = false;
        }
    }
    out
}

/// Scanner over the leading numeric prefix of a string.
struct Prefix<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Prefix<'a> {
    fn new(raw: &'a str) -> Self {
        let trimmed = raw.trim_start_matches(|c: char| c.is_ascii_whitespace());
        Self {
            bytes: trimmed.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    /// Consume an optional sign; returns true if negative.
    fn sign(&mut self) -> bool {
        match self.peek() {
            Some(b'-') => {
                self.pos += 1;
                true
            }
            Some(b'+') => {
                self.pos += 1;
                false
            }
            _ => false,
        }
    }

    /// Consume digits, allowing single underscores between digits.
    fn digits(&mut self, out: &mut String) -> usize {
        let mut n = 0;
        while let Some(b) = self.peek() {
            if b.is_ascii_digit() {
                out.push(char::from(b));
                self.pos += 1;
                n += 1;
            } else if b == b'_' && n > 0 && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
                self.pos += 1;
            } else {
                break;
            }
        }
        n
    }
}

fn lenient_i64(raw: &str) -> i64 {
    let mut scan = Prefix::new(raw);
    let negative = scan.sign();
    let mut digits = String::new();
    scan.digits(&mut digits);

    let mut acc: i64 = 0;
    for b in digits.bytes() {
        let d = i64::from(b - b'0');
        acc = acc.saturating_mul(10);
        acc = if negative {
            acc.saturating_sub(d)
        } else {
            acc.saturating_add(d)
        };
    }
    acc
}

fn lenient_f64(raw: &str) -> f64 {
    let mut scan = Prefix::new(raw);
    let negative = scan.sign();

    let mut int_part = String::new();
    let int_len = scan.digits(&mut int_part);

    let mut frac_part = String::new();
    if scan.peek() == Some(b'.') && scan.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
        scan.pos += 1;
        scan.digits(&mut frac_part);
    }

    if int_len == 0 && frac_part.is_empty() {
        return 0.0;
    }

    let mut exp_part = String::new();
    if matches!(scan.peek(), Some(b'e' | b'E')) {
        scan.pos += 1;
        let exp_negative = scan.sign();
        if scan.digits(&mut exp_part) > 0 && exp_negative {
            exp_part.insert(0, '-');
        }
    }

    let mut text = String::with_capacity(int_part.len() + frac_part.len() + exp_part.len() + 4);
    if negative {
        text.push('-');
    }
    text.push_str(if int_part.is_empty() { "0" } else { &int_part });
    text.push('.');
    text.push_str(if frac_part.is_empty() { "0" } else { &frac_part });
    if !exp_part.is_empty() {
        text.push('e');
        text.push_str(&exp_part);
    }

    match text.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}
