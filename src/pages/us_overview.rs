use crate::aggregation::filter_by_flag;
use crate::charts::{
    conservation_status_bar, lethality_heatmap, size_distribution, size_vs_lethality,
    top_species_bar, venom_type_pie,
};
use crate::config::lethality_colors;
use crate::error::DashError;
use crate::layout::{Alert, Block, Column, Page, Tone};
use crate::loader::DataSource;
use crate::model::{self, Flag};
use crate::pages::NOT_AVAILABLE;
use crate::stats::{invasive_indicator, lethality_stats, size_stats, HIGH_LETHALITY_THRESHOLD};

pub fn render(source: &DataSource) -> Result<Page, DashError> {
    let rows = source.load_us_snakes()?;
    let venomous = filter_by_flag(&rows, |r| r.venomous, Flag::Yes);
    let lethality = lethality_stats(&venomous);
    let size = size_stats(&rows);
    let invasive = invasive_indicator(&rows);

    let page = Page::new("United States Snake Overview")
        .card(rows.len().to_string(), "Total Species", Tone::Primary)
        .card(venomous.len().to_string(), "Venomous Species", Tone::Danger)
        .card(invasive.count.to_string(), "Invasive Species", Tone::Warning)
        .card(
            size.largest_species().unwrap_or(NOT_AVAILABLE),
            "Largest Species",
            Tone::Info,
        )
        .row(vec![Column::full(Block::captioned(
            "Lethality Heatmap",
            "This map shows the average lethality score of venomous snakes by state. \
             Darker red indicates higher average lethality.",
            lethality_heatmap(
                "us-lethality-map",
                &rows,
                "Average Snake Lethality by US State",
            ),
        ))])
        .row(vec![
            Column::half(Block::chart(venom_type_pie(
                "us-venom-types",
                &rows,
                "Venom Types of US Snakes",
            ))),
            Column::half(Block::chart(conservation_status_bar(
                "us-conservation",
                &rows,
                "Conservation Status of US Snakes",
            ))),
        ])
        .row(vec![
            Column::half(Block::chart(size_distribution(
                "us-size-distribution",
                &rows,
                "Distribution of Snake Sizes in the US",
            ))),
            Column::half(Block::captioned(
                "Most Lethal Species",
                &format!(
                    "Venomous species average {:.1} on the lethality scale, peaking at {:.1}; \
                     {} score {} or higher.",
                    lethality.avg_lethality,
                    lethality.max_lethality,
                    lethality.high_lethality_count,
                    HIGH_LETHALITY_THRESHOLD,
                ),
                top_species_bar(
                    "us-top-lethal",
                    &venomous,
                    model::lethality(),
                    10,
                    Some(lethality_colors::for_score),
                    "Top 10 Most Lethal US Snakes",
                ),
            )),
        ])
        .row(vec![Column::full(Block::captioned(
            "Size vs Lethality Analysis",
            "Explore the relationship between snake size and venom lethality. \
             Bubble size represents maximum recorded length.",
            size_vs_lethality(
                "us-size-vs-lethality",
                &rows,
                "Snake Size vs Lethality in the US",
            ),
        ))])
        .row(vec![Column::full(Block::Alert(
            Alert::new(Tone::Warning, "Invasive Species Alert")
                .paragraph(format!(
                    "There are {} invasive snake species in the United States:",
                    invasive.count
                ))
                .items(invasive.species)
                .footer(
                    "These species, primarily found in Florida, pose threats to native \
                     ecosystems and wildlife.",
                ),
        ))]);
    Ok(page)
}
