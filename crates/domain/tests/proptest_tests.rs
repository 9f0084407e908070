//! Property-based tests for domain value objects
//!
//! These tests use proptest to verify invariants across many random inputs.

use domain::{LogRecord, ResourceAttributes, Severity, SpanContext, SpanId, TraceId};
use proptest::prelude::*;

// ============================================================================
// ResourceAttributes Property Tests
// ============================================================================

mod resource_attributes_tests {
    use super::*;

    proptest! {
        #[test]
        fn non_blank_values_are_accepted_trimmed(
            name in "[a-z][a-z0-9-]{0,20}",
            env in "[a-z]{1,10}",
            version in "[0-9]{1,3}\\.[0-9]{1,3}",
            pad in " {0,3}"
        ) {
            let attrs = ResourceAttributes::new(
                format!("{pad}{name}{pad}"),
                env.clone(),
                version.clone(),
            ).unwrap();
            prop_assert_eq!(attrs.service_name(), name.as_str());
            prop_assert_eq!(attrs.environment(), env.as_str());
            prop_assert_eq!(attrs.version(), version.as_str());
        }

        #[test]
        fn blank_values_are_rejected(blank in "[ \\t]{0,5}") {
            prop_assert!(ResourceAttributes::new(blank.clone(), "dev", "0.1").is_err());
            prop_assert!(ResourceAttributes::new("svc", blank.clone(), "0.1").is_err());
            prop_assert!(ResourceAttributes::new("svc", "dev", blank).is_err());
        }

        #[test]
        fn json_roundtrip_preserves_identity(
            name in "[a-z]{1,12}",
            env in "[a-z]{1,8}",
            version in "[0-9]\\.[0-9]"
        ) {
            let attrs = ResourceAttributes::new(name, env, version).unwrap();
            let json = serde_json::to_string(&attrs).unwrap();
            let back: ResourceAttributes = serde_json::from_str(&json).unwrap();
            prop_assert_eq!(back, attrs);
        }
    }
}

// ============================================================================
// Severity Property Tests
// ============================================================================

mod severity_tests {
    use super::*;

    fn any_severity() -> impl Strategy<Value = Severity> {
        prop_oneof![
            Just(Severity::Trace),
            Just(Severity::Debug),
            Just(Severity::Info),
            Just(Severity::Warning),
            Just(Severity::Error),
        ]
    }

    proptest! {
        #[test]
        fn display_parses_back(severity in any_severity()) {
            prop_assert_eq!(severity.to_string().parse::<Severity>().unwrap(), severity);
        }

        #[test]
        fn parsing_ignores_case(severity in any_severity()) {
            let upper = severity.as_str().to_uppercase();
            prop_assert_eq!(upper.parse::<Severity>().unwrap(), severity);
        }

        #[test]
        fn deserializes_in_any_case(severity in any_severity(), upper in any::<bool>()) {
            let name = if upper {
                severity.as_str().to_uppercase()
            } else {
                severity.as_str().to_string()
            };
            let parsed: Severity = serde_json::from_str(&format!("\"{name}\"")).unwrap();
            prop_assert_eq!(parsed, severity);
        }
    }
}

// ============================================================================
// LogRecord Property Tests
// ============================================================================

mod log_record_tests {
    use super::*;

    proptest! {
        #[test]
        fn record_ids_match_span(
            trace in any::<[u8; 16]>(),
            span in any::<[u8; 8]>(),
            iteration in 1u64..10_000
        ) {
            let context = SpanContext::new(TraceId::from_bytes(trace), SpanId::from_bytes(span));
            let resource = ResourceAttributes::new("otel-docs", "dev", "0.1").unwrap();
            let record = LogRecord::info("Did Work", context, resource).with_iteration(iteration);

            prop_assert_eq!(record.trace_id(), context.trace_id.to_string());
            prop_assert_eq!(record.span_id(), context.span_id.to_string());
            prop_assert_eq!(record.trace_id().len(), 32);
            prop_assert_eq!(record.iteration, iteration);
        }
    }
}
