/// Property-based tests for query building, list pagination and formatting
use customer360_dashboard::backend_client::to_query;
use customer360_dashboard::format::{format_number, format_rupiah};
use customer360_dashboard::models::CreditApplication;
use customer360_dashboard::views::customers::{showing_text, ListEvent, ListFilters};
use customer360_dashboard::views::profile::ProfileSummary;
use proptest::prelude::*;

fn query_pairs() -> impl Strategy<Value = Vec<(String, Option<String>)>> {
    prop::collection::vec(
        (
            prop::sample::select(vec!["q", "status", "gender", "segment", "limit"]),
            prop::option::of("[a-zA-Z0-9 &=]{0,8}"),
        )
            .prop_map(|(k, v)| (k.to_string(), v)),
        0..12,
    )
}

fn decode(query: &str) -> Vec<(String, String)> {
    url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
        .into_owned()
        .collect()
}

proptest! {
    #[test]
    fn test_query_never_contains_empty_values(pairs in query_pairs()) {
        let query = to_query(pairs.clone());

        if query.is_empty() {
            prop_assert!(pairs.iter().all(|(_, v)| v.as_deref().unwrap_or("").is_empty()));
        } else {
            prop_assert!(query.starts_with('?'));
            for (_, value) in decode(&query) {
                prop_assert!(!value.is_empty());
            }
        }
    }

    #[test]
    fn test_query_keys_appear_once_with_last_value(pairs in query_pairs()) {
        let decoded = decode(&to_query(pairs.clone()));

        let mut seen = std::collections::HashSet::new();
        for (key, value) in &decoded {
            prop_assert!(seen.insert(key.clone()), "duplicate key {}", key);

            let last = pairs
                .iter()
                .filter(|(k, v)| k == key && !v.as_deref().unwrap_or("").is_empty())
                .last()
                .and_then(|(_, v)| v.clone());
            prop_assert_eq!(Some(value.clone()), last);
        }
    }

    #[test]
    fn test_outstanding_total_is_sum_of_amounts(amounts in prop::collection::vec(0u32..5_000_000, 0..20)) {
        let apps: Vec<CreditApplication> = amounts
            .iter()
            .enumerate()
            .map(|(i, amount)| CreditApplication {
                // Alternate numeric and string encodings.
                outstanding_amount: Some(if i % 2 == 0 {
                    serde_json::json!(amount)
                } else {
                    serde_json::json!(amount.to_string())
                }),
                ..Default::default()
            })
            .collect();

        let summary = ProfileSummary::from_parts(&apps, &[]);
        let expected: f64 = amounts.iter().map(|a| f64::from(*a)).sum();

        prop_assert_eq!(summary.total_applications, amounts.len());
        prop_assert_eq!(summary.total_outstanding, expected);
    }

    #[test]
    fn test_showing_text_range(offset in 0u64..100_000, rows in 1usize..100, extra in 0u64..1000) {
        let total = offset + rows as u64 + extra;
        let text = showing_text(offset, rows, Some(total));

        prop_assert_eq!(
            text,
            format!("Showing {}–{} of {}", offset + 1, offset + rows as u64, total)
        );
    }

    #[test]
    fn test_filter_change_resets_offset(pages in 1u32..20, segment in "(Bronze|Silver|Gold|Premium)") {
        let mut filters = ListFilters::default();
        for _ in 0..pages {
            filters.apply(ListEvent::NextPage);
        }
        prop_assert_eq!(filters.offset, u64::from(pages) * u64::from(filters.limit));

        let refetch = filters.apply(ListEvent::SetSegment(segment.clone()));

        prop_assert!(refetch);
        prop_assert_eq!(filters.offset, 0);
        prop_assert_eq!(filters.segment, segment);
    }

    #[test]
    fn test_prev_never_goes_below_zero(limit in prop::sample::select(vec![10u32, 20, 50]), steps in 0usize..10) {
        let mut filters = ListFilters::with_page_size(limit);
        filters.apply(ListEvent::NextPage);
        for _ in 0..steps {
            filters.apply(ListEvent::PrevPage);
        }
        prop_assert!(filters.offset == 0 || filters.offset == u64::from(limit));
        prop_assert_eq!(filters.can_prev(), filters.offset > 0);
    }

    #[test]
    fn test_rupiah_digits_round_trip(n in 0u64..1_000_000_000_000) {
        let formatted = format_rupiah(n as f64);
        prop_assert!(formatted.starts_with("Rp "));

        let digits: String = formatted.chars().filter(|c| c.is_ascii_digit()).collect();
        prop_assert_eq!(digits, n.to_string());
    }

    #[test]
    fn test_number_grouping_uses_commas(n in 0u32..u32::MAX) {
        let formatted = format_number(f64::from(n));

        prop_assert_eq!(formatted.replace(',', ""), n.to_string());
        for group in formatted.split(',').skip(1) {
            prop_assert_eq!(group.len(), 3);
        }
    }
}
