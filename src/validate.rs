use serde::Serialize;
use tracing::warn;

use crate::aggregation::Metric;
use crate::loader::DataSource;
use crate::model::{self, FarmingCountry, MediaAppearance, Named};
use crate::schema::Dataset;

pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundsViolation {
    pub dataset: Dataset,
    pub record: String,
    pub column: &'static str,
    pub value: f64,
}

/// Records whose `metric` lies outside `[0, 10]`. Missing values pass.
pub fn score_bounds_violations<T: Named>(
    dataset: Dataset,
    rows: &[T],
    metric: Metric<T>,
) -> Vec<BoundsViolation> {
    rows.iter()
        .filter_map(|r| {
            let value = metric.value(r)?;
            (!(SCORE_MIN..=SCORE_MAX).contains(&value)).then(|| BoundsViolation {
                dataset,
                record: r.display_name().to_string(),
                column: metric.name,
                value,
            })
        })
        .collect()
}

/// Check every score column of the datasets that load. Datasets that fail
/// to load are skipped here; [`DataSource::verify_sources`] reports them.
pub fn audit_scores(source: &DataSource) -> Vec<BoundsViolation> {
    let mut found = Vec::new();
    if let Ok(rows) = source.load_us_snakes() {
        found.extend(score_bounds_violations(
            Dataset::UsSnakes,
            &rows,
            model::lethality(),
        ));
    }
    if let Ok(rows) = source.load_global_snakes() {
        found.extend(score_bounds_violations(
            Dataset::GlobalSnakes,
            &rows,
            model::lethality(),
        ));
    }
    if let Ok(rows) = source.load_media() {
        found.extend(score_bounds_violations(
            Dataset::Media,
            &rows,
            MediaAppearance::ACCURACY,
        ));
    }
    if let Ok(rows) = source.load_farming() {
        found.extend(score_bounds_violations(
            Dataset::Farming,
            &rows,
            FarmingCountry::ETHICAL_SCORE,
        ));
    }
    for v in &found {
        warn!(
            dataset = %v.dataset,
            record = %v.record,
            column = v.column,
            value = v.value,
            "score outside 0-10"
        );
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Flag, GlobalSnake};

    fn snake(name: &str, lethality: f64) -> GlobalSnake {
        GlobalSnake {
            continent: "Asia".to_string(),
            species_name: "Ophiophagus hannah".to_string(),
            common_name: name.to_string(),
            lethality_score: lethality,
            avg_length_cm: 300.0,
            max_length_cm: 550.0,
            venomous: Flag::Yes,
            venom_type: "Neurotoxic".to_string(),
            conservation_status: "Vulnerable".to_string(),
        }
    }

    #[test]
    fn flags_only_out_of_range_scores() {
        let rows = vec![snake("ok", 10.0), snake("too high", 11.5), snake("zero", 0.0)];
        let found = score_bounds_violations(Dataset::GlobalSnakes, &rows, model::lethality());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].record, "too high");
        assert_eq!(found[0].column, "lethality_score");
    }
}
