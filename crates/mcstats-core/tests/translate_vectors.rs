//! Request translation vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use mcstats_core::protocol::line;
use mcstats_core::translate::translate;


#[test]
fn translate_vectors() {
    let files = [
        "count_with_tag.json",
        "gauge_float_rate.json",
        "timing_colon_tags.json",
        "histogram_zero_rate.json",
        "set_unit_rate.json",
        "unknown_type.json",
        "missing_type.json",
        "count_overflow_saturates.json",
        "gauge_negative_overflow_saturates.json",
    ];

    for f in files {
        let v = vector_loader::load(f);
        let res = translate(&v.params());

        if let Some(err) = v.expect_error {
            let e = res.expect_err("expected error");
            assert_eq!(e.client_code().as_str(), err.code, "vector={}", v.description);
            continue;
        }

        let event = res.expect("expected ok event");
        let ex = v.expect.expect("missing expect block");

        assert_eq!(event.kind.method_name(), ex.kind, "vector={}", v.description);
        assert_eq!(event.name, ex.name, "vector={}", v.description);
        assert_eq!(event.value.to_string(), ex.value, "vector={}", v.description);
        assert_eq!(event.options.sample_rate, ex.sample_rate, "vector={}", v.description);
        assert_eq!(event.options.tags, ex.tags, "vector={}", v.description);

        let encoded = line::encode(&event);
        assert_eq!(std::str::from_utf8(&encoded).unwrap(), ex.line, "vector={}", v.description);
    }
}

#[test]
fn every_type_code_resolves() {
    for (code, method) in [
        ("c", "count"),
        ("g", "gauge"),
        ("h", "histogram"),
        ("ms", "timing"),
        ("s", "set"),
    ] {
        let params = mcstats_core::Params::from_pairs([("t", code), ("s", "x"), ("v", "1")]);
        let event = translate(&params).unwrap();
        assert_eq!(event.kind.method_name(), method);
        assert_eq!(event.name, "minecraft.x");
    }
}
