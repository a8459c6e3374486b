use serde_json::json;

use crate::aggregation::{
    filter_by_flag, group_and_aggregate, mean_of, top_n_by_metric, value_counts, Aggregation,
};
use crate::charts::{
    bar, category_histogram, pie, scatter, split_counts, Axes, BarColor, Coloring, ScatterPoint,
};
use crate::config::{colors, SET3};
use crate::error::DashError;
use crate::layout::{Alert, Block, Column, Page, Table, TableCell, Tone};
use crate::loader::DataSource;
use crate::model::{CareDifficulty, DomesticatedSnake};

/// Species whose domestication story gets its own card.
pub const FEATURED_SPECIES: [&str; 4] = [
    "Ball Python",
    "Corn Snake",
    "Western Hognose Snake",
    "Boa Constrictor",
];

fn care_palette(group: &str) -> Option<&'static str> {
    group.parse::<CareDifficulty>().ok().map(CareDifficulty::color)
}

fn care_tone(level: CareDifficulty) -> Tone {
    match level {
        CareDifficulty::Beginner => Tone::Success,
        CareDifficulty::Intermediate => Tone::Warning,
        CareDifficulty::Advanced => Tone::Danger,
    }
}

/// Species count per first-domesticated era, eras in lexical order.
pub fn domestication_timeline(rows: &[DomesticatedSnake]) -> Vec<(String, usize)> {
    let count = Aggregation::count();
    let mut eras: Vec<(String, usize)> =
        group_and_aggregate(rows, |r| r.first_domesticated_era.clone(), &[count])
            .into_iter()
            .map(|row| {
                let n = row.value(&count.output_name()) as usize;
                (row.key, n)
            })
            .collect();
    eras.sort_by(|a, b| a.0.cmp(&b.0));
    eras
}

pub fn render(source: &DataSource) -> Result<Page, DashError> {
    let rows = source.load_domesticated()?;
    let beginner = filter_by_flag(&rows, |r| r.care_difficulty, CareDifficulty::Beginner);

    let popularity = top_n_by_metric(&rows, DomesticatedSnake::POPULARITY, 10);
    let popularity_chart = bar(
        "pet-popularity",
        "Top 10 Most Popular Pet Snakes",
        &popularity.iter().map(|r| r.common_name.clone()).collect::<Vec<_>>(),
        &popularity.iter().map(|r| r.popularity_score).collect::<Vec<_>>(),
        Axes::new("Species", "Popularity Score"),
        BarColor::scale("Viridis"),
    )
    .with_layout("xaxis", json!({ "title": { "text": "Species" }, "tickangle": -45 }));

    let points: Vec<ScatterPoint> = rows
        .iter()
        .map(|r| ScatterPoint {
            x: json!(r.avg_cost_usd),
            y: json!(r.popularity_score),
            size: Some(r.avg_lifespan_years),
            group: r.care_difficulty.as_str().to_string(),
            shade: None,
            text: r.common_name.clone(),
        })
        .collect();
    let cost_chart = scatter(
        "pet-cost-vs-popularity",
        "Cost vs Popularity of Pet Snakes",
        &points,
        Axes::new("Average Cost (USD)", "Popularity Score"),
        Coloring::Groups {
            legend: "Care Difficulty",
            palette: care_palette,
        },
    );

    let (levels, level_counts) = split_counts(value_counts(&rows, |r| r.domestication_level.clone()));
    let level_chart = pie(
        "pet-domestication-levels",
        "Domestication Levels",
        &levels,
        &level_counts,
        &SET3,
    );

    let difficulty_order: Vec<&str> = CareDifficulty::ALL.iter().map(|c| c.as_str()).collect();
    let difficulty_chart = category_histogram(
        "pet-care-difficulty",
        "Care Difficulty Distribution",
        &rows
            .iter()
            .map(|r| r.care_difficulty.as_str().to_string())
            .collect::<Vec<_>>(),
        &difficulty_order,
        Axes::new("Care Difficulty", "Number of Species"),
        colors::INFO,
    );

    let (temperaments, temperament_counts) =
        split_counts(value_counts(&rows, |r| r.temperament.clone()));
    let temperament_chart = bar(
        "pet-temperament",
        "Temperament Distribution",
        &temperaments,
        &temperament_counts,
        Axes::new("Temperament", "Number of Species"),
        BarColor::scale("Blues"),
    );

    let (eras, era_counts) = split_counts(domestication_timeline(&rows));
    let timeline_chart = bar(
        "pet-domestication-timeline",
        "Domestication Timeline",
        &eras,
        &era_counts,
        Axes::new("Era", "Number of Species"),
        BarColor::scale("Greens"),
    );

    let mut table = Table::new(&[
        "Species",
        "Popularity",
        "Avg Cost (USD)",
        "Lifespan (years)",
        "Care Difficulty",
        "Temperament",
        "Origin",
    ]);
    for r in &rows {
        table.push_row(vec![
            r.common_name.as_str().into(),
            format!("{:.0}", r.popularity_score).into(),
            format!("${:.0}", r.avg_cost_usd).into(),
            format!("{:.0}", r.avg_lifespan_years).into(),
            TableCell::toned(r.care_difficulty.as_str(), Some(care_tone(r.care_difficulty))),
            r.temperament.as_str().into(),
            r.origin.as_str().into(),
        ]);
    }

    let reasons: Vec<Column> = FEATURED_SPECIES
        .iter()
        .filter_map(|name| rows.iter().find(|r| r.common_name == *name))
        .map(|r| {
            Column::half(Block::text(
                &r.common_name,
                None,
                r.reasons_for_domestication.clone(),
            ))
        })
        .collect();

    let mut page = Page::new("Domesticated Snakes")
        .intro(
            Alert::new(Tone::Info, "The World of Pet Snakes").paragraph(
                "Explore the most popular snake species kept as pets, their care \
                 requirements, costs, and the history of their domestication.",
            ),
        )
        .card(rows.len().to_string(), "Species Profiled", Tone::Primary)
        .card(beginner.len().to_string(), "Beginner-Friendly", Tone::Success)
        .card(
            format!("${:.0}", mean_of(&rows, DomesticatedSnake::COST)),
            "Average Cost",
            Tone::Warning,
        )
        .card(
            format!("{:.0} yrs", mean_of(&rows, DomesticatedSnake::LIFESPAN)),
            "Average Lifespan",
            Tone::Info,
        )
        .row(vec![Column::full(Block::chart(popularity_chart))])
        .row(vec![Column::full(Block::captioned(
            "Cost, Popularity and Care",
            "Bubble size represents average lifespan. Colours show care difficulty.",
            cost_chart,
        ))])
        .row(vec![
            Column::half(Block::chart(level_chart)),
            Column::half(Block::chart(difficulty_chart)),
        ])
        .row(vec![
            Column::half(Block::chart(temperament_chart)),
            Column::half(Block::chart(timeline_chart)),
        ])
        .heading("Species Details")
        .row(vec![Column::full(Block::Table(table))]);
    if !reasons.is_empty() {
        page = page.heading("Reasons for Domestication");
        for pair in reasons.chunks(2) {
            page = page.row(pair.to_vec());
        }
    }
    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pet(name: &str, era: &str) -> DomesticatedSnake {
        DomesticatedSnake {
            common_name: name.to_string(),
            popularity_score: 5.0,
            avg_cost_usd: 100.0,
            avg_lifespan_years: 20.0,
            care_difficulty: CareDifficulty::Beginner,
            temperament: "Docile".to_string(),
            domestication_level: "Fully Domesticated".to_string(),
            first_domesticated_era: era.to_string(),
            origin: "Africa".to_string(),
            reasons_for_domestication: String::new(),
        }
    }

    #[test]
    fn timeline_is_sorted_by_era() {
        let rows = vec![pet("a", "1990s"), pet("b", "1970s"), pet("c", "1990s")];
        assert_eq!(
            domestication_timeline(&rows),
            vec![("1970s".to_string(), 1), ("1990s".to_string(), 2)]
        );
    }

    #[test]
    fn care_palette_knows_every_level() {
        for level in CareDifficulty::ALL {
            assert_eq!(care_palette(level.as_str()), Some(level.color()));
        }
        assert_eq!(care_palette("Expert"), None);
    }
}
