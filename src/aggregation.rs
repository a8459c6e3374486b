use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;

use serde::Serialize;

// ── Metrics ─────────────────────────────────────────────────────────────────

/// Named numeric accessor over a record type.
///
/// `get` returns `None` when the field is missing or not numeric; such
/// rows are skipped by every numeric aggregation.
pub struct Metric<T> {
    pub name: &'static str,
    pub label: &'static str,
    pub get: fn(&T) -> Option<f64>,
}

impl<T> Metric<T> {
    pub const fn new(name: &'static str, label: &'static str, get: fn(&T) -> Option<f64>) -> Self {
        Self { name, label, get }
    }

    pub fn value(&self, row: &T) -> Option<f64> {
        (self.get)(row)
    }
}

impl<T> Clone for Metric<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Metric<T> {}

impl<T> std::fmt::Debug for Metric<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metric").field("name", &self.name).finish()
    }
}

// ── Aggregations ────────────────────────────────────────────────────────────

/// Declarative aggregation, executed once per group.
#[derive(Debug)]
pub struct Aggregation<T> {
    pub(crate) kind: AggKind<T>,
    alias: Option<&'static str>,
}

impl<T> Clone for Aggregation<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Aggregation<T> {}

#[derive(Debug)]
pub enum AggKind<T> {
    Count,
    Mean(Metric<T>),
    Max(Metric<T>),
    Sum(Metric<T>),
}

impl<T> Clone for AggKind<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for AggKind<T> {}

impl<T> Aggregation<T> {
    pub fn count() -> Self {
        Self::from_kind(AggKind::Count)
    }

    pub fn mean(metric: Metric<T>) -> Self {
        Self::from_kind(AggKind::Mean(metric))
    }

    pub fn max(metric: Metric<T>) -> Self {
        Self::from_kind(AggKind::Max(metric))
    }

    pub fn sum(metric: Metric<T>) -> Self {
        Self::from_kind(AggKind::Sum(metric))
    }

    fn from_kind(kind: AggKind<T>) -> Self {
        Self { kind, alias: None }
    }

    /// Rename the output column.
    pub fn alias(mut self, alias: &'static str) -> Self {
        self.alias = Some(alias);
        self
    }

    pub fn output_name(&self) -> String {
        if let Some(alias) = self.alias {
            return alias.to_string();
        }
        match &self.kind {
            AggKind::Count => "count".to_string(),
            AggKind::Mean(m) => format!("{}_avg", m.name),
            AggKind::Max(m) => format!("{}_max", m.name),
            AggKind::Sum(m) => format!("{}_sum", m.name),
        }
    }
}

/// One output row of [`group_and_aggregate`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRow<K> {
    pub key: K,
    pub values: Vec<(String, f64)>,
}

impl<K> GroupRow<K> {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    /// Like [`GroupRow::get`], reading an absent column as 0.0.
    pub fn value(&self, name: &str) -> f64 {
        self.get(name).unwrap_or(0.0)
    }
}

/// Apply a list of aggregations to the rows of a single group.
pub fn apply_builtin_aggregations<T>(
    group: &[&T],
    aggregations: &[Aggregation<T>],
) -> Vec<(String, f64)> {
    aggregations
        .iter()
        .map(|agg| {
            let value = match &agg.kind {
                AggKind::Count => group.len() as f64,
                AggKind::Mean(m) => mean_of(group.iter().copied(), *m),
                AggKind::Max(m) => max_of(group.iter().copied(), *m),
                AggKind::Sum(m) => sum_of(group.iter().copied(), *m),
            };
            (agg.output_name(), value)
        })
        .collect()
}

// ── Scalar reductions ───────────────────────────────────────────────────────

fn values<'a, T: 'a>(rows: impl IntoIterator<Item = &'a T>, metric: Metric<T>) -> Vec<f64> {
    rows.into_iter().filter_map(|r| metric.value(r)).collect()
}

/// Mean of the valid values; 0.0 when there are none.
pub fn mean_of<'a, T: 'a>(rows: impl IntoIterator<Item = &'a T>, metric: Metric<T>) -> f64 {
    let vals = values(rows, metric);
    if vals.is_empty() {
        0.0
    } else {
        vals.iter().sum::<f64>() / vals.len() as f64
    }
}

/// Max of the valid values; 0.0 when there are none.
pub fn max_of<'a, T: 'a>(rows: impl IntoIterator<Item = &'a T>, metric: Metric<T>) -> f64 {
    values(rows, metric).into_iter().reduce(f64::max).unwrap_or(0.0)
}

pub fn sum_of<'a, T: 'a>(rows: impl IntoIterator<Item = &'a T>, metric: Metric<T>) -> f64 {
    values(rows, metric).iter().sum()
}

/// `part / whole * 100`, or 0.0 for an empty whole.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

// ── Filtering ───────────────────────────────────────────────────────────────

/// Rows matching `pred`, in original order.
pub fn filter_rows<T: Clone>(rows: &[T], pred: impl Fn(&T) -> bool) -> Vec<T> {
    rows.iter().filter(|r| pred(r)).cloned().collect()
}

/// Rows whose `field` equals `value`, in original order. Empty is valid.
pub fn filter_by_flag<T: Clone, V: PartialEq>(
    rows: &[T],
    field: impl Fn(&T) -> V,
    value: V,
) -> Vec<T> {
    filter_rows(rows, |r| field(r) == value)
}

// ── Grouping ────────────────────────────────────────────────────────────────

/// Partition rows by key, groups in order of first occurrence.
pub fn partition_by<'a, T, K: Eq + Hash + Clone>(
    rows: &'a [T],
    key: impl Fn(&T) -> K,
) -> Vec<(K, Vec<&'a T>)> {
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<&'a T>)> = Vec::new();
    for row in rows {
        let k = key(row);
        match index.get(&k) {
            Some(&i) => groups[i].1.push(row),
            None => {
                index.insert(k.clone(), groups.len());
                groups.push((k, vec![row]));
            }
        }
    }
    groups
}

/// SQL-style `GROUP BY key` with one output column per aggregation.
pub fn group_and_aggregate<T, K: Eq + Hash + Clone>(
    rows: &[T],
    key: impl Fn(&T) -> K,
    aggregations: &[Aggregation<T>],
) -> Vec<GroupRow<K>> {
    partition_by(rows, key)
        .into_iter()
        .map(|(key, group)| GroupRow {
            values: apply_builtin_aggregations(&group, aggregations),
            key,
        })
        .collect()
}

/// Count per key, most frequent first; ties keep first-occurrence order.
pub fn value_counts<T, K: Eq + Hash + Clone>(rows: &[T], key: impl Fn(&T) -> K) -> Vec<(K, usize)> {
    let mut counts: Vec<(K, usize)> = partition_by(rows, key)
        .into_iter()
        .map(|(k, g)| (k, g.len()))
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Count per key, in the caller's category order. Categories with no rows
/// are kept with a zero count.
pub fn counts_in_order<T, K: Eq + Hash + Clone>(
    rows: &[T],
    key: impl Fn(&T) -> K,
    order: &[K],
) -> Vec<(K, usize)> {
    let counted: HashMap<K, usize> = partition_by(rows, key)
        .into_iter()
        .map(|(k, g)| (k, g.len()))
        .collect();
    order
        .iter()
        .map(|k| (k.clone(), counted.get(k).copied().unwrap_or(0)))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairCount<A, B> {
    pub first: A,
    pub second: B,
    pub count: usize,
}

/// Count per `(first, second)` key pair, in order of first occurrence.
pub fn count_by_pair<T, A: Eq + Hash + Clone, B: Eq + Hash + Clone>(
    rows: &[T],
    first: impl Fn(&T) -> A,
    second: impl Fn(&T) -> B,
) -> Vec<PairCount<A, B>> {
    partition_by(rows, |r| (first(r), second(r)))
        .into_iter()
        .map(|((first, second), g)| PairCount {
            first,
            second,
            count: g.len(),
        })
        .collect()
}

// ── Ordering and selection ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Stable sort by metric. Rows without a value go last in either order.
pub fn sort_by_metric<T: Clone>(rows: &[T], metric: Metric<T>, order: SortOrder) -> Vec<T> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| match (metric.value(a), metric.value(b)) {
        (Some(x), Some(y)) => match order {
            SortOrder::Ascending => x.total_cmp(&y),
            SortOrder::Descending => y.total_cmp(&x),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    sorted
}

/// The `n` rows with the largest metric, descending, ties in original order.
///
/// Returns fewer rows when the table is shorter than `n` and nothing for
/// `n == 0`. Rows without a metric value are never selected.
pub fn top_n_by_metric<T: Clone>(rows: &[T], metric: Metric<T>, n: usize) -> Vec<T> {
    if n == 0 {
        return Vec::new();
    }
    let valid: Vec<T> = filter_rows(rows, |r| metric.value(r).is_some());
    let mut top = sort_by_metric(&valid, metric, SortOrder::Descending);
    top.truncate(n);
    top
}

// ── Per-region expansion ────────────────────────────────────────────────────

/// A source row paired with one of the region codes it lists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expanded<T> {
    pub region: String,
    pub record: T,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionValue {
    pub region: String,
    pub value: f64,
}

/// Fan each row out into one row per comma-separated region code.
///
/// Codes are trimmed; empty codes are dropped, so a blank field yields
/// no rows. The record itself is copied unchanged.
pub fn expand_regions<T: Clone>(rows: &[T], field: impl Fn(&T) -> &str) -> Vec<Expanded<T>> {
    rows.iter()
        .flat_map(|row| {
            field(row)
                .split(',')
                .map(str::trim)
                .filter(|code| !code.is_empty())
                .map(|code| Expanded {
                    region: code.to_string(),
                    record: row.clone(),
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Mean of `metric` per region code, for a choropleth.
pub fn region_heatmap<T: Clone>(
    rows: &[T],
    field: impl Fn(&T) -> &str,
    metric: Metric<T>,
) -> Vec<RegionValue> {
    let expanded = expand_regions(rows, field);
    partition_by(&expanded, |e| e.region.clone())
        .into_iter()
        .map(|(region, group)| RegionValue {
            value: mean_of(group.iter().map(|e| &e.record), metric),
            region,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        name: &'static str,
        group: &'static str,
        regions: &'static str,
        score: Option<f64>,
    }

    const SCORE: Metric<Row> = Metric::new("score", "Score", |r| r.score);

    fn row(name: &'static str, group: &'static str, score: Option<f64>) -> Row {
        Row {
            name,
            group,
            regions: "",
            score,
        }
    }

    fn table() -> Vec<Row> {
        vec![
            row("a", "x", Some(3.0)),
            row("b", "y", Some(8.0)),
            row("c", "x", None),
            row("d", "z", Some(8.0)),
            row("e", "y", Some(1.0)),
        ]
    }

    #[test]
    fn group_counts_sum_to_table_length() {
        let rows = table();
        let grouped = group_and_aggregate(&rows, |r| r.group, &[Aggregation::count()]);
        let total: f64 = grouped.iter().map(|g| g.value("count")).sum();
        assert_eq!(total as usize, rows.len());
        let keys: Vec<_> = grouped.iter().map(|g| g.key).collect();
        assert_eq!(keys, vec!["x", "y", "z"]);
    }

    #[test]
    fn mean_skips_missing_values() {
        let rows = table();
        let grouped = group_and_aggregate(
            &rows,
            |r| r.group,
            &[
                Aggregation::mean(SCORE).alias("avg"),
                Aggregation::max(SCORE),
            ],
        );
        assert_eq!(grouped[0].get("avg"), Some(3.0));
        assert_eq!(grouped[0].get("score_max"), Some(3.0));
        assert_eq!(grouped[1].get("avg"), Some(4.5));
    }

    #[test]
    fn aggregations_over_nothing_are_zero() {
        let empty: Vec<Row> = Vec::new();
        assert_eq!(mean_of(&empty, SCORE), 0.0);
        assert_eq!(max_of(&empty, SCORE), 0.0);
        assert_eq!(sum_of(&empty, SCORE), 0.0);
        assert!(group_and_aggregate(&empty, |r| r.group, &[Aggregation::count()]).is_empty());
        assert_eq!(percentage(3, 0), 0.0);
    }

    #[test]
    fn filter_is_idempotent_and_keeps_order() {
        let rows = table();
        let once = filter_by_flag(&rows, |r| r.group, "y");
        let twice = filter_by_flag(&once, |r| r.group, "y");
        assert_eq!(once, twice);
        assert_eq!(
            once.iter().map(|r| r.name).collect::<Vec<_>>(),
            vec!["b", "e"]
        );
        assert!(filter_by_flag(&rows, |r| r.group, "none").is_empty());
    }

    #[test]
    fn top_n_is_stable_and_descending() {
        let rows = table();
        let top = top_n_by_metric(&rows, SCORE, 3);
        assert_eq!(
            top.iter().map(|r| r.name).collect::<Vec<_>>(),
            vec!["b", "d", "a"]
        );
        assert!(top_n_by_metric(&rows, SCORE, 0).is_empty());
    }

    #[test]
    fn top_n_larger_than_table_returns_every_valued_row() {
        let rows = vec![
            row("a", "x", Some(2.0)),
            row("b", "x", Some(9.0)),
            row("c", "x", Some(4.0)),
            row("d", "x", Some(7.0)),
        ];
        let top = top_n_by_metric(&rows, SCORE, 10);
        assert_eq!(top.len(), 4);
        let scores: Vec<f64> = top.iter().filter_map(|r| r.score).collect();
        assert_eq!(scores, vec![9.0, 7.0, 4.0, 2.0]);
    }

    #[test]
    fn value_counts_most_frequent_first() {
        let rows = table();
        let counts = value_counts(&rows, |r| r.group);
        assert_eq!(counts, vec![("x", 2), ("y", 2), ("z", 1)]);
    }

    #[test]
    fn counts_in_order_keeps_empty_categories() {
        let rows = table();
        let counts = counts_in_order(&rows, |r| r.group, &["z", "w", "x"]);
        assert_eq!(counts, vec![("z", 1), ("w", 0), ("x", 2)]);
    }

    #[test]
    fn expansion_fans_out_one_row_per_code() {
        let src = Row {
            name: "rattler",
            group: "g",
            regions: "FL, GA, TX",
            score: Some(6.0),
        };
        let expanded = expand_regions(std::slice::from_ref(&src), |r| r.regions);
        assert_eq!(expanded.len(), 3);
        let codes: Vec<_> = expanded.iter().map(|e| e.region.as_str()).collect();
        assert_eq!(codes, vec!["FL", "GA", "TX"]);
        assert!(expanded.iter().all(|e| e.record == src));
    }

    #[test]
    fn heatmap_averages_after_fan_out() {
        let rows = vec![
            Row {
                name: "a",
                group: "g",
                regions: "FL,GA",
                score: Some(8.0),
            },
            Row {
                name: "b",
                group: "g",
                regions: " FL ",
                score: Some(2.0),
            },
            Row {
                name: "c",
                group: "g",
                regions: "",
                score: Some(10.0),
            },
        ];
        let heat = region_heatmap(&rows, |r| r.regions, SCORE);
        assert_eq!(
            heat,
            vec![
                RegionValue {
                    region: "FL".into(),
                    value: 5.0
                },
                RegionValue {
                    region: "GA".into(),
                    value: 8.0
                },
            ]
        );
    }

    #[test]
    fn pair_counts_follow_first_occurrence() {
        let rows = table();
        let pairs = count_by_pair(&rows, |r| r.group, |r| r.score.is_some());
        assert_eq!(pairs[0].first, "x");
        assert!(pairs[0].second);
        assert_eq!(pairs.iter().map(|p| p.count).sum::<usize>(), rows.len());
    }
}
