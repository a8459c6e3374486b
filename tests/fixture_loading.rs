use std::path::PathBuf;

use snakey::aggregation::{filter_by_flag, mean_of};
use snakey::loader::{snakes_in_state, DataSource};
use snakey::model::{AnimalWelfare, ConservationImpact, Flag, MediaAppearance, RegulationLevel, Role};
use snakey::schema::Dataset;
use snakey::stats::{invasive_indicator, lethality_stats, size_stats};
use snakey::validate::audit_scores;

fn source() -> DataSource {
    DataSource::new(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures"))
}

#[test]
fn every_fixture_verifies() {
    let checks = source().verify_sources();
    assert_eq!(checks.len(), 5);
    let counts: Vec<(Dataset, usize)> = checks
        .iter()
        .map(|c| (c.dataset, *c.records.as_ref().expect("fixture loads")))
        .collect();
    assert_eq!(
        counts,
        vec![
            (Dataset::UsSnakes, 9),
            (Dataset::GlobalSnakes, 11),
            (Dataset::Domesticated, 5),
            (Dataset::Media, 7),
            (Dataset::Farming, 5),
        ]
    );
    assert!(checks.iter().all(|c| c.bytes.unwrap_or(0) > 0));
}

#[test]
fn fixture_scores_are_in_range() {
    assert!(audit_scores(&source()).is_empty());
}

#[test]
fn us_summary_statistics() {
    let rows = source().load_us_snakes().expect("us snakes");
    let venomous = filter_by_flag(&rows, |r| r.venomous, Flag::Yes);
    assert_eq!(venomous.len(), 5);

    // 9, 9, 7, 5, 6
    let lethality = lethality_stats(&rows);
    assert!((lethality.avg_lethality - 7.2).abs() < 1e-9);
    assert_eq!(lethality.max_lethality, 9.0);
    assert_eq!(lethality.high_lethality_count, 3);
    assert_eq!(lethality_stats(&venomous), lethality);

    let size = size_stats(&rows);
    assert_eq!(size.largest_species().expect("non-empty"), "Burmese Python");
    assert_eq!(size.max_length, 574.0);

    let invasive = invasive_indicator(&rows);
    assert_eq!(invasive.count, 2);
    assert_eq!(invasive.species, vec!["Burmese Python", "Boa Constrictor"]);
}

#[test]
fn state_filter_splits_the_state_list() {
    let rows = source().load_us_snakes().expect("us snakes");
    let florida: Vec<String> = snakes_in_state(&rows, "FL")
        .into_iter()
        .map(|r| r.common_name)
        .collect();
    assert_eq!(
        florida,
        vec![
            "Eastern Diamondback Rattlesnake",
            "Eastern Coral Snake",
            "Cottonmouth",
            "Burmese Python",
            "Boa Constrictor",
            "Eastern Indigo Snake",
        ]
    );
    assert!(snakes_in_state(&rows, "F").is_empty());
}

#[test]
fn media_lenient_columns() {
    let rows = source().load_media().expect("media");
    let by_title = |t: &str| rows.iter().find(|r| r.title == t).expect("title present");

    let norse = by_title("Norse Mythology");
    assert_eq!(norse.year, None);
    assert_eq!(norse.accuracy_rating, None);
    assert_eq!(norse.protagonist_antagonist, Some(Role::Neutral));

    assert_eq!(by_title("Planet Earth II").protagonist_antagonist, None);
    assert_eq!(by_title("The Jungle Book").year, Some(1967));

    // "N/A" ratings stay out of the mean: (2 + 5 + 1 + 3 + 9) / 5
    assert!((mean_of(&rows, MediaAppearance::ACCURACY) - 4.0).abs() < 1e-9);
}

#[test]
fn farming_categories() {
    let rows = source().load_farming().expect("farming");
    let by_country = |c: &str| rows.iter().find(|r| r.country == c).expect("country present");

    assert_eq!(by_country("Indonesia").animal_welfare_rating, AnimalWelfare::WildHarvest);
    assert_eq!(
        by_country("Malaysia").animal_welfare_rating,
        AnimalWelfare::Rated("Fair".to_string())
    );
    assert_eq!(by_country("India").regulation_level, RegulationLevel::StrictBan);
    assert_eq!(by_country("Vietnam").conservation_direction(), ConservationImpact::Mixed);
    assert_eq!(by_country("Malaysia").conservation_direction(), ConservationImpact::Neutral);
    assert_eq!(by_country("Indonesia").annual_production_skins, 150_000);
}
