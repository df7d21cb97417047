//! Shared proptest generators for telemetry domain types.

use proptest::prelude::*;
use telemetry_core::attributes::{AttrValue, Attributes};
use telemetry_core::logs::LogLevel;
use telemetry_core::span::SpanKind;

/// Generate attribute keys in dotted lowercase form.
pub fn attr_key_strategy() -> impl Strategy<Value = String> {
    "[a-z]{2,8}(\\.[a-z]{2,8}){0,2}"
}

/// Generate scalar attribute values across all supported types.
pub fn attr_value_strategy() -> impl Strategy<Value = AttrValue> {
    prop_oneof![
        "[a-zA-Z0-9 _-]{0,24}".prop_map(AttrValue::Str),
        any::<bool>().prop_map(AttrValue::Bool),
        any::<i64>().prop_map(AttrValue::Int),
        (-1.0e9..1.0e9f64).prop_map(AttrValue::Float),
    ]
}

/// Generate attribute maps of bounded size.
pub fn attributes_strategy() -> impl Strategy<Value = Attributes> {
    proptest::collection::hash_map(attr_key_strategy(), attr_value_strategy(), 0..6)
}

/// Generate span kinds.
pub fn span_kind_strategy() -> impl Strategy<Value = SpanKind> {
    prop_oneof![
        Just(SpanKind::Internal),
        Just(SpanKind::Server),
        Just(SpanKind::Client),
        Just(SpanKind::Producer),
        Just(SpanKind::Consumer),
    ]
}

/// Generate log levels.
pub fn log_level_strategy() -> impl Strategy<Value = LogLevel> {
    prop_oneof![
        Just(LogLevel::Debug),
        Just(LogLevel::Info),
        Just(LogLevel::Warn),
        Just(LogLevel::Error),
    ]
}

/// Generate dotted metric instrument names.
pub fn metric_name_strategy() -> impl Strategy<Value = String> {
    "[a-z]{2,8}\\.[a-z]{2,8}(\\.[a-z]{2,8})?"
}

/// Generate W3C Trace Context traceparent headers.
pub fn traceparent_strategy() -> impl Strategy<Value = String> {
    (
        Just("00"),
        "[0-9a-f]{32}",
        "[0-9a-f]{16}",
        prop_oneof![Just("00"), Just("01")],
    )
        .prop_map(|(version, trace_id, parent_id, flags)| {
            format!("{version}-{trace_id}-{parent_id}-{flags}")
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use telemetry_core::span::SpanContext;

    proptest! {
        #[test]
        fn prop_generated_traceparents_parse(header in traceparent_strategy()) {
            prop_assert!(SpanContext::parse_traceparent(&header).is_some());
        }

        #[test]
        fn prop_attributes_within_bounds(attributes in attributes_strategy()) {
            prop_assert!(attributes.len() < 6);
        }
    }
}
