use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Input / output types
// ---------------------------------------------------------------------------

/// One labelled numeric observation, e.g. `("18-25", 120.0)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub group: String,
    pub value: f64,
}

impl Observation {
    pub fn new(group: impl Into<String>, value: f64) -> Self {
        Self {
            group: group.into(),
            value,
        }
    }
}

/// Five-number summary of one group plus its interquartile range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupSummary {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub iqr: f64,
}

/// Order in which groups appear in a [`GroupedResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupOrder {
    /// Order of first appearance in the input.
    #[default]
    FirstSeen,
    /// Lexicographic order of the group key.
    Alphabetical,
}

#[derive(Debug, Error, PartialEq)]
pub enum SummaryError {
    #[error("cannot summarise an empty sequence of observations")]
    EmptyInput,
    #[error("group '{0}' has no values")]
    EmptyGroup(String),
    #[error("group '{group}' has a non-finite value ({value})")]
    NonFinite { group: String, value: f64 },
}

/// Per-group summaries, iterated in the order chosen at construction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GroupedResult {
    entries: Vec<(String, GroupSummary)>,
}

impl GroupedResult {
    pub fn get(&self, group: &str) -> Option<&GroupSummary> {
        self.entries
            .iter()
            .find(|(key, _)| key == group)
            .map(|(_, summary)| summary)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &GroupSummary)> {
        self.entries.iter().map(|(k, s)| (k.as_str(), s))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Smallest `min` and largest `max` across all groups.
    pub fn value_extent(&self) -> Option<(f64, f64)> {
        self.entries.iter().fold(None, |acc, (_, s)| match acc {
            None => Some((s.min, s.max)),
            Some((lo, hi)) => Some((lo.min(s.min), hi.max(s.max))),
        })
    }
}

// ---------------------------------------------------------------------------
// Calculator
// ---------------------------------------------------------------------------

/// Summarise observations per group, groups in first-seen order.
pub fn summarize(observations: &[Observation]) -> Result<GroupedResult, SummaryError> {
    summarize_ordered(observations, GroupOrder::FirstSeen)
}

/// Summarise observations per group with an explicit group ordering.
pub fn summarize_ordered(
    observations: &[Observation],
    order: GroupOrder,
) -> Result<GroupedResult, SummaryError> {
    if observations.is_empty() {
        return Err(SummaryError::EmptyInput);
    }
    if let Some(bad) = observations.iter().find(|o| !o.value.is_finite()) {
        return Err(SummaryError::NonFinite {
            group: bad.group.clone(),
            value: bad.value,
        });
    }

    // Partition, preserving relative order inside each group.
    let mut index: BTreeMap<&str, usize> = BTreeMap::new();
    let mut groups: Vec<(&str, Vec<f64>)> = Vec::new();
    for obs in observations {
        let slot = *index.entry(obs.group.as_str()).or_insert_with(|| {
            groups.push((obs.group.as_str(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(obs.value);
    }

    if order == GroupOrder::Alphabetical {
        groups.sort_by(|a, b| a.0.cmp(b.0));
    }

    let entries = groups
        .into_iter()
        .map(|(key, mut values)| {
            values.sort_unstable_by(f64::total_cmp);
            let summary =
                five_number_summary(&values).ok_or_else(|| SummaryError::EmptyGroup(key.to_string()))?;
            Ok((key.to_string(), summary))
        })
        .collect::<Result<Vec<_>, SummaryError>>()?;

    log::debug!("summarised {} observations into {} groups", observations.len(), entries.len());
    Ok(GroupedResult { entries })
}

/// Five-number summary of ascending-sorted values. `None` when empty.
pub fn five_number_summary(sorted: &[f64]) -> Option<GroupSummary> {
    let min = *sorted.first()?;
    let max = *sorted.last()?;
    let q1 = quantile_sorted(sorted, 0.25)?;
    let median = quantile_sorted(sorted, 0.50)?;
    let q3 = quantile_sorted(sorted, 0.75)?;
    Some(GroupSummary {
        min,
        q1,
        median,
        q3,
        max,
        iqr: q3 - q1,
    })
}

/// Linear-interpolation quantile over ascending-sorted data.
///
/// For `n` values the quantile at `p` sits at index `h = p·(n−1)`; a
/// fractional `h` interpolates between `x[⌊h⌋]` and `x[⌊h⌋+1]`.
///
/// Returns `None` for empty data or `p` outside `[0, 1]`.
pub fn quantile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    let n = sorted.len();
    if n == 0 || !(0.0..=1.0).contains(&p) {
        return None;
    }
    if n == 1 {
        return Some(sorted[0]);
    }

    let h = (n - 1) as f64 * p;
    let j = h.floor() as usize;
    let g = h - h.floor();

    if j + 1 >= n {
        Some(sorted[n - 1])
    } else {
        let (lo, hi) = (sorted[j], sorted[j + 1]);
        let span = hi - lo;
        let estimate = if span.is_finite() {
            lo + span * g
        } else {
            // `hi - lo` overflowed; the weighted form stays finite.
            lo * (1.0 - g) + hi * g
        };
        // Rounding must not push the estimate outside its bracket.
        Some(estimate.clamp(lo, hi))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(pairs: &[(&str, f64)]) -> Vec<Observation> {
        pairs.iter().map(|&(g, v)| Observation::new(g, v)).collect()
    }

    #[test]
    fn four_values_interpolate_quartiles() {
        let result = summarize(&obs(&[("G1", 10.0), ("G1", 20.0), ("G1", 30.0), ("G1", 40.0)])).unwrap();
        let s = result.get("G1").unwrap();
        assert_eq!(s.min, 10.0);
        assert_eq!(s.q1, 17.5);
        assert_eq!(s.median, 25.0);
        assert_eq!(s.q3, 32.5);
        assert_eq!(s.max, 40.0);
        assert_eq!(s.iqr, 15.0);
    }

    #[test]
    fn single_observation_collapses() {
        let result = summarize(&obs(&[("G1", 5.0)])).unwrap();
        let s = result.get("G1").unwrap();
        for v in [s.min, s.q1, s.median, s.q3, s.max] {
            assert_eq!(v, 5.0);
        }
        assert_eq!(s.iqr, 0.0);
    }

    #[test]
    fn empty_input_is_rejected() {
        assert_eq!(summarize(&[]), Err(SummaryError::EmptyInput));
    }

    #[test]
    fn two_groups_keep_their_keys() {
        let result = summarize(&obs(&[("G1", 1.0), ("G1", 2.0), ("G1", 3.0), ("G2", 100.0)])).unwrap();
        let keys: Vec<&str> = result.keys().collect();
        assert_eq!(keys, vec!["G1", "G2"]);
        assert_eq!(result.get("G2").unwrap().iqr, 0.0);
        assert_eq!(result.get("G1").unwrap().median, 2.0);
    }

    #[test]
    fn unsorted_input_is_sorted_per_group() {
        let result = summarize(&obs(&[("a", 40.0), ("b", 3.0), ("a", 10.0), ("a", 30.0), ("a", 20.0)])).unwrap();
        let s = result.get("a").unwrap();
        assert_eq!((s.min, s.q1, s.q3, s.max), (10.0, 17.5, 32.5, 40.0));
    }

    #[test]
    fn first_seen_vs_alphabetical_order() {
        let input = obs(&[("55+", 1.0), ("18-25", 2.0), ("26-40", 3.0), ("18-25", 4.0)]);
        let first_seen: Vec<String> = summarize(&input).unwrap().keys().map(String::from).collect();
        assert_eq!(first_seen, ["55+", "18-25", "26-40"]);

        let sorted: Vec<String> = summarize_ordered(&input, GroupOrder::Alphabetical)
            .unwrap()
            .keys()
            .map(String::from)
            .collect();
        assert_eq!(sorted, ["18-25", "26-40", "55+"]);
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let err = summarize(&obs(&[("a", 1.0), ("b", f64::NAN)])).unwrap_err();
        assert!(matches!(err, SummaryError::NonFinite { ref group, .. } if group == "b"));
    }

    #[test]
    fn value_extent_spans_groups() {
        let result = summarize(&obs(&[("a", 5.0), ("b", -2.0), ("b", 9.0)])).unwrap();
        assert_eq!(result.value_extent(), Some((-2.0, 9.0)));
    }

    #[test]
    fn quantile_bounds() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(quantile_sorted(&data, 0.0), Some(1.0));
        assert_eq!(quantile_sorted(&data, 1.0), Some(5.0));
        assert_eq!(quantile_sorted(&data, 0.5), Some(3.0));
        assert_eq!(quantile_sorted(&data, 1.5), None);
        assert_eq!(quantile_sorted(&[], 0.5), None);
        assert!(five_number_summary(&[]).is_none());
    }

    #[test]
    fn extreme_values_stay_finite() {
        let result = summarize(&obs(&[
            ("G", -1e308),
            ("G", -1e308),
            ("G", -1e308),
            ("G", 1e308),
            ("G", 1e308),
        ]))
        .unwrap();
        let s = result.get("G").unwrap();
        assert_eq!(s.q1, -1e308);
        assert_eq!(s.median, -1e308);
        assert_eq!(s.q3, 1e308);
        assert!(s.q1 <= s.median && s.median <= s.q3);

        assert_eq!(quantile_sorted(&[-f64::MAX, f64::MAX], 0.5), Some(0.0));
        let q1 = quantile_sorted(&[-f64::MAX, f64::MAX], 0.25).unwrap();
        assert!(q1.is_finite() && q1 < 0.0);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn observations() -> impl Strategy<Value = Vec<Observation>> {
        proptest::collection::vec(
            (
                prop::sample::select(vec!["a", "b", "c", "d"]),
                -1e9_f64..1e9,
            ),
            1..200,
        )
        .prop_map(|pairs| pairs.into_iter().map(|(g, v)| Observation::new(g, v)).collect())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(300))]

        #[test]
        fn summaries_are_ordered(input in observations()) {
            let result = summarize(&input).unwrap();
            for (key, s) in result.iter() {
                prop_assert!(s.min <= s.q1, "{key}: min {} > q1 {}", s.min, s.q1);
                prop_assert!(s.q1 <= s.median, "{key}: q1 {} > median {}", s.q1, s.median);
                prop_assert!(s.median <= s.q3, "{key}: median {} > q3 {}", s.median, s.q3);
                prop_assert!(s.q3 <= s.max, "{key}: q3 {} > max {}", s.q3, s.max);
                prop_assert!(s.iqr >= 0.0);
                prop_assert_eq!(s.iqr, s.q3 - s.q1);
            }
        }

        #[test]
        fn keys_match_distinct_input_groups(input in observations()) {
            let result = summarize(&input).unwrap();
            let mut expected: Vec<&str> = input.iter().map(|o| o.group.as_str()).collect();
            expected.sort_unstable();
            expected.dedup();
            let mut actual: Vec<&str> = result.keys().collect();
            actual.sort_unstable();
            prop_assert_eq!(actual, expected);
        }

        #[test]
        fn full_range_summaries_are_ordered(
            values in proptest::collection::vec(
                any::<f64>().prop_filter("finite", |v| v.is_finite()),
                1..50,
            )
        ) {
            let input: Vec<Observation> = values.iter().map(|&v| Observation::new("g", v)).collect();
            let result = summarize(&input).unwrap();
            let s = result.get("g").unwrap();
            prop_assert!(s.q1.is_finite() && s.median.is_finite() && s.q3.is_finite());
            prop_assert!(s.min <= s.q1 && s.q1 <= s.median);
            prop_assert!(s.median <= s.q3 && s.q3 <= s.max);
        }

        #[test]
        fn summarising_is_idempotent(input in observations()) {
            prop_assert_eq!(summarize(&input).unwrap(), summarize(&input).unwrap());
        }
    }
}
