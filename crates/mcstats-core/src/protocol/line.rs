//! Statsd line encoding (DogStatsD flavour).
//!
//! Format: `<name>:<value>|<type>[|@<rate>][|#<tag>[,<tag>...]]`
//!
//! Rules:
//! - The rate segment is omitted when unset or exactly 1 (collector default).
//! - `|` and `,` are stripped from tag content; both would split the datagram.
//! - In names, `::` becomes `.` and each remaining `:`, `|`, `@` becomes `_`.

use std::fmt::Write;

use bytes::{Bytes, BytesMut};

use crate::metric::{write_float, EmitOptions, MetricEvent, MetricKind, MetricValue};

/// Encode one event into a single datagram payload.
pub fn encode(event: &MetricEvent) -> Bytes {
    encode_parts(event.kind, &event.name, event.value, &event.options)
}

/// Encode from borrowed parts, for callers that never build a `MetricEvent`.
pub fn encode_parts(kind: MetricKind, name: &str, value: MetricValue, options: &EmitOptions) -> Bytes {
    let mut buf = BytesMut::with_capacity(name.len() + 32);
    // Writing into BytesMut cannot fail.
    let _ = write_line(&mut buf, kind, name, value, options);
    buf.freeze()
}

fn write_line(
    buf: &mut BytesMut,
    kind: MetricKind,
    name: &str,
    value: MetricValue,
    options: &EmitOptions,
) -> std::fmt::Result {
    write_name(buf, name)?;
    write!(buf, ":{value}|{}", kind.wire_code())?;

    if let Some(rate) = options.sample_rate {
        if rate != 1.0 {
            buf.write_str("|@")?;
            write_float(buf, rate)?;
        }
    }

    if !options.tags.is_empty() {
        buf.write_str("|#")?;
        for (i, tag) in options.tags.iter().enumerate() {
            if i > 0 {
                buf.write_char(',')?;
            }
            for ch in tag.chars().filter(|c| !matches!(c, '|' | ',')) {
                buf.write_char(ch)?;
            }
        }
    }

    Ok(())
}

fn write_name(buf: &mut BytesMut, name: &str) -> std::fmt::Result {
    let mut chars = name.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            ':' if chars.peek() == Some(&':') => {
                chars.next();
                buf.write_char('.')?;
            }
            ':' | '|' | '@' => buf.write_char('_')?,
            other => buf.write_char(other)?,
        }
    }
    Ok(())
}
