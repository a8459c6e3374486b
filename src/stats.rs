use serde::Serialize;

use crate::aggregation::{max_of, mean_of, Metric};
use crate::error::DashError;
use crate::model::{self, Flag, SnakeRecord, UsSnake};

/// Scores at or above this count as highly lethal.
pub const HIGH_LETHALITY_THRESHOLD: f64 = 7.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LethalityStats {
    pub avg_lethality: f64,
    pub max_lethality: f64,
    pub high_lethality_count: usize,
}

/// Lethality summary over the venomous rows of `rows`.
///
/// Non-venomous rows are ignored, so passing an already filtered subset
/// gives the same result. No venomous rows yields all zeros.
pub fn lethality_stats<T: SnakeRecord>(rows: &[T]) -> LethalityStats {
    let metric: Metric<T> = model::lethality();
    let venomous: Vec<&T> = rows
        .iter()
        .filter(|r| r.venomous() == Flag::Yes)
        .collect();
    LethalityStats {
        avg_lethality: mean_of(venomous.iter().copied(), metric),
        max_lethality: max_of(venomous.iter().copied(), metric),
        high_lethality_count: venomous
            .iter()
            .filter(|r| r.lethality_score() >= HIGH_LETHALITY_THRESHOLD)
            .count(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizeStats {
    pub avg_length: f64,
    pub max_length: f64,
    /// Name of the species with the greatest max length; first one wins a tie.
    pub largest_species: Option<String>,
}

impl SizeStats {
    pub fn largest_species(&self) -> Result<&str, DashError> {
        self.largest_species
            .as_deref()
            .ok_or_else(|| DashError::NoData("largest species of an empty table".to_string()))
    }
}

pub fn size_stats<T: SnakeRecord>(rows: &[T]) -> SizeStats {
    let mut largest: Option<&T> = None;
    for row in rows {
        // Strict comparison keeps the earliest row on ties.
        if largest.map_or(true, |l| row.max_length_cm() > l.max_length_cm()) {
            largest = Some(row);
        }
    }
    SizeStats {
        avg_length: mean_of(rows, model::avg_length()),
        max_length: max_of(rows, model::max_length()),
        largest_species: largest.map(|r| r.display_name().to_string()),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvasiveIndicator {
    pub count: usize,
    pub species: Vec<String>,
}

pub fn invasive_indicator(rows: &[UsSnake]) -> InvasiveIndicator {
    let species: Vec<String> = rows
        .iter()
        .filter(|r| r.invasive.is_yes())
        .map(|r| r.common_name.clone())
        .collect();
    InvasiveIndicator {
        count: species.len(),
        species,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::filter_by_flag;

    fn snake(name: &str, lethality: f64, venomous: Flag, max_len: f64) -> UsSnake {
        UsSnake {
            states: "FL".to_string(),
            common_name: name.to_string(),
            lethality_score: lethality,
            venomous,
            venom_type: "Hemotoxic".to_string(),
            avg_length_cm: max_len / 2.0,
            max_length_cm: max_len,
            conservation_status: "Least Concern".to_string(),
            invasive: Flag::No,
        }
    }

    #[test]
    fn empty_subset_is_all_zero() {
        let stats = lethality_stats::<UsSnake>(&[]);
        assert_eq!(
            stats,
            LethalityStats {
                avg_lethality: 0.0,
                max_lethality: 0.0,
                high_lethality_count: 0,
            }
        );
    }

    #[test]
    fn venomous_filter_then_stats() {
        let rows = vec![
            snake("a", 9.0, Flag::Yes, 100.0),
            snake("b", 5.0, Flag::Yes, 100.0),
            snake("c", 7.0, Flag::No, 100.0),
        ];
        let venomous = filter_by_flag(&rows, |r| r.venomous, Flag::Yes);
        let scores: Vec<f64> = venomous.iter().map(|r| r.lethality_score).collect();
        assert_eq!(scores, vec![9.0, 5.0]);

        let stats = lethality_stats(&venomous);
        assert_eq!(stats.avg_lethality, 7.0);
        assert_eq!(stats.max_lethality, 9.0);
        // Only 9 reaches the threshold; the 7 belongs to a harmless species.
        assert_eq!(stats.high_lethality_count, 1);
        assert_eq!(lethality_stats(&rows), stats);
    }

    #[test]
    fn threshold_is_inclusive() {
        let rows = vec![
            snake("a", 7.0, Flag::Yes, 10.0),
            snake("b", 6.9, Flag::Yes, 10.0),
        ];
        assert_eq!(lethality_stats(&rows).high_lethality_count, 1);
    }

    #[test]
    fn largest_species_tie_goes_to_first() {
        let rows = vec![
            snake("short", 1.0, Flag::No, 80.0),
            snake("first long", 1.0, Flag::No, 250.0),
            snake("second long", 1.0, Flag::No, 250.0),
        ];
        let stats = size_stats(&rows);
        assert_eq!(stats.max_length, 250.0);
        assert_eq!(stats.largest_species().unwrap(), "first long");
    }

    #[test]
    fn largest_species_of_nothing_is_no_data() {
        let stats = size_stats::<UsSnake>(&[]);
        assert_eq!(stats.avg_length, 0.0);
        assert!(matches!(stats.largest_species(), Err(DashError::NoData(_))));
    }

    #[test]
    fn invasive_species_in_row_order() {
        let mut python = snake("Burmese Python", 3.0, Flag::No, 500.0);
        python.invasive = Flag::Yes;
        let mut boa = snake("Boa", 2.0, Flag::No, 300.0);
        boa.invasive = Flag::Yes;
        let rows = vec![python, snake("Garter", 0.0, Flag::No, 60.0), boa];
        let indicator = invasive_indicator(&rows);
        assert_eq!(indicator.count, 2);
        assert_eq!(indicator.species, vec!["Burmese Python", "Boa"]);
    }
}
