use std::collections::HashSet;

use crate::aggregation::{count_by_pair, filter_by_flag, group_and_aggregate, top_n_by_metric, Aggregation};
use crate::charts::{
    bar, grouped_bar, series_from_pairs, stacked_bar, top_species_bar, Axes, BarColor,
};
use crate::config::{lethality_colors, SET2};
use crate::error::DashError;
use crate::layout::{Alert, Block, Column, Page, Tone};
use crate::loader::{snakes_by_continent, DataSource};
use crate::model::{self, Flag, GlobalSnake};
use crate::pages::NOT_AVAILABLE;
use crate::stats::size_stats;

/// Continents given their own breakdown panel, in display order.
pub const BREAKDOWN_CONTINENTS: [&str; 5] =
    ["Africa", "Asia", "Australia", "Europe", "South America"];

#[derive(Debug, Clone, PartialEq)]
pub struct ContinentSummary {
    pub continent: String,
    pub species_count: usize,
    pub most_lethal: Option<String>,
    pub largest: Option<String>,
}

pub fn continent_summary(rows: &[GlobalSnake], continent: &str) -> ContinentSummary {
    let local = snakes_by_continent(rows, continent);
    let top_name = |metric| {
        top_n_by_metric(&local, metric, 1)
            .into_iter()
            .next()
            .map(|r| r.common_name)
    };
    ContinentSummary {
        continent: continent.to_string(),
        species_count: local.len(),
        most_lethal: top_name(model::lethality()),
        largest: top_name(model::max_length()),
    }
}

pub fn render(source: &DataSource) -> Result<Page, DashError> {
    let rows = source.load_global_snakes()?;
    let venomous = filter_by_flag(&rows, |r| r.venomous, Flag::Yes);

    let stats = group_and_aggregate(
        &rows,
        |r| r.continent.clone(),
        &[
            Aggregation::count().alias("species_count"),
            Aggregation::mean(model::lethality()).alias("avg_lethality"),
            Aggregation::mean(model::avg_length()).alias("avg_length"),
        ],
    );
    let continents: Vec<String> = stats.iter().map(|g| g.key.clone()).collect();
    let counts: Vec<f64> = stats.iter().map(|g| g.value("species_count")).collect();
    let avg_lethality: Vec<f64> = stats.iter().map(|g| g.value("avg_lethality")).collect();

    let count_chart = bar(
        "global-species-by-continent",
        "Snake Species Count by Continent",
        &continents,
        &counts,
        Axes::new("Continent", "Number of Species"),
        BarColor::ShadeBy {
            scale: "Reds",
            values: &avg_lethality,
            label: "Average Lethality",
        },
    );
    let lethality_chart = bar(
        "global-lethality-by-continent",
        "Average Lethality Score by Continent",
        &continents,
        &avg_lethality,
        Axes::new("Continent", "Average Lethality Score"),
        BarColor::scale("YlOrRd"),
    );

    let venom_pairs = count_by_pair(
        &venomous,
        |r| r.continent.clone(),
        |r| r.venom_type.clone(),
    );
    let venom_chart = grouped_bar(
        "global-venom-by-continent",
        "Venom Types by Continent",
        &series_from_pairs(&venom_pairs),
        Axes::new("Continent", "Number of Species"),
        &SET2,
    );
    let status_pairs = count_by_pair(
        &rows,
        |r| r.continent.clone(),
        |r| r.conservation_status.clone(),
    );
    let status_chart = stacked_bar(
        "global-conservation-by-continent",
        "Conservation Status by Continent",
        &series_from_pairs(&status_pairs),
        Axes::new("Continent", "Number of Species"),
    );

    let distinct: HashSet<&str> = rows.iter().map(|r| r.continent.as_str()).collect();
    let size = size_stats(&rows);

    let breakdown: Vec<Column> = BREAKDOWN_CONTINENTS
        .iter()
        .map(|c| {
            let s = continent_summary(&rows, c);
            Column::new(
                4,
                Block::List {
                    heading: s.continent,
                    items: vec![
                        format!("Species count: {}", s.species_count),
                        format!(
                            "Most lethal: {}",
                            s.most_lethal.as_deref().unwrap_or(NOT_AVAILABLE)
                        ),
                        format!(
                            "Largest: {}",
                            s.largest.as_deref().unwrap_or(NOT_AVAILABLE)
                        ),
                    ],
                },
            )
        })
        .collect();

    let page = Page::new("Global Snake Overview")
        .intro(
            Alert::new(Tone::Info, "Exploring Snakes Around the World").paragraph(
                "This page provides insights into snake species across different continents, \
                 comparing their characteristics, lethality, and conservation status.",
            ),
        )
        .card(rows.len().to_string(), "Global Species", Tone::Primary)
        .card(venomous.len().to_string(), "Venomous Species", Tone::Danger)
        .card(format!("{:.0} cm", size.avg_length), "Average Length", Tone::Success)
        .card(distinct.len().to_string(), "Continents Covered", Tone::Info)
        .row(vec![
            Column::half(Block::chart(count_chart)),
            Column::half(Block::chart(lethality_chart)),
        ])
        .row(vec![
            Column::half(Block::chart(top_species_bar(
                "global-top-lethal",
                &venomous,
                model::lethality(),
                15,
                Some(lethality_colors::for_score),
                "World's 15 Most Lethal Snakes",
            ))),
            Column::half(Block::chart(top_species_bar(
                "global-top-largest",
                &rows,
                model::max_length(),
                10,
                None,
                "World's 10 Largest Snakes",
            ))),
        ])
        .row(vec![
            Column::half(Block::chart(venom_chart)),
            Column::half(Block::chart(status_chart)),
        ])
        .heading("Continental Breakdown")
        .row(breakdown);
    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snake(continent: &str, name: &str, lethality: f64, max_len: f64) -> GlobalSnake {
        GlobalSnake {
            continent: continent.to_string(),
            species_name: String::new(),
            common_name: name.to_string(),
            lethality_score: lethality,
            avg_length_cm: max_len / 2.0,
            max_length_cm: max_len,
            venomous: Flag::Yes,
            venom_type: "Neurotoxic".to_string(),
            conservation_status: "Least Concern".to_string(),
        }
    }

    #[test]
    fn summary_picks_most_lethal_and_largest() {
        let rows = vec![
            snake("Africa", "Black Mamba", 9.5, 430.0),
            snake("Africa", "African Rock Python", 2.0, 600.0),
            snake("Asia", "King Cobra", 8.5, 550.0),
        ];
        let s = continent_summary(&rows, "Africa");
        assert_eq!(s.species_count, 2);
        assert_eq!(s.most_lethal.as_deref(), Some("Black Mamba"));
        assert_eq!(s.largest.as_deref(), Some("African Rock Python"));
    }

    #[test]
    fn empty_continent_has_no_answers() {
        let s = continent_summary(&[], "Europe");
        assert_eq!(s.species_count, 0);
        assert_eq!(s.most_lethal, None);
        assert_eq!(s.largest, None);
    }
}
