use serde_json::json;

use crate::aggregation::{
    counts_in_order, filter_by_flag, mean_of, sort_by_metric, value_counts, SortOrder,
};
use crate::charts::{
    bar, choropleth, horizontal_bar, no_palette, pie, scatter, split_counts, Axes, BarColor,
    ChoroplethStyle, Coloring, Geo, ScatterPoint,
};
use crate::config::SET3;
use crate::error::DashError;
use crate::layout::{Alert, Block, Column, Page, Table, TableCell, Tone};
use crate::loader::DataSource;
use crate::model::{ConservationImpact, FarmingCountry, Flag, RegulationLevel};
use crate::pages::{first_unique, thousands};

const LOW_ETHICS: f64 = 4.0;
const HIGH_ETHICS: f64 = 7.0;

fn ethics_tone(score: f64) -> Option<Tone> {
    if score < LOW_ETHICS {
        Some(Tone::Danger)
    } else if score >= HIGH_ETHICS {
        Some(Tone::Success)
    } else {
        None
    }
}

fn impact_tone(impact: ConservationImpact) -> Option<Tone> {
    match impact {
        ConservationImpact::Positive => Some(Tone::Success),
        ConservationImpact::Negative | ConservationImpact::Mixed => Some(Tone::Warning),
        ConservationImpact::Neutral => None,
    }
}

/// Summary figures shown in the header cards.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeSummary {
    pub total_skins: u64,
    pub avg_ethical_score: f64,
    pub certified: usize,
    pub banned: usize,
}

impl TradeSummary {
    pub fn of(rows: &[FarmingCountry]) -> Self {
        Self {
            total_skins: rows.iter().map(|r| r.annual_production_skins).sum(),
            avg_ethical_score: mean_of(rows, FarmingCountry::ETHICAL_SCORE),
            certified: filter_by_flag(rows, |r| r.certification_available, Flag::Yes).len(),
            banned: filter_by_flag(rows, |r| r.regulation_level, RegulationLevel::StrictBan).len(),
        }
    }
}

/// Country count per regulation level, most restrictive first, zeros kept.
pub fn regulation_counts(rows: &[FarmingCountry]) -> Vec<(RegulationLevel, usize)> {
    counts_in_order(rows, |r| r.regulation_level, &RegulationLevel::ALL)
}

pub fn render(source: &DataSource) -> Result<Page, DashError> {
    let rows = source.load_farming()?;
    let summary = TradeSummary::of(&rows);

    let countries: Vec<String> = rows.iter().map(|r| r.country.clone()).collect();
    let production: Vec<f64> = rows
        .iter()
        .filter_map(|r| FarmingCountry::PRODUCTION.value(r))
        .collect();
    let hover: Vec<String> = rows
        .iter()
        .map(|r| {
            format!(
                "{}<br>{} ({})<br>Ethical score: {}",
                r.country, r.primary_species_farmed, r.farming_method, r.ethical_score
            )
        })
        .collect();
    let production_map = choropleth(
        "farming-production-map",
        "Annual Snakeskin Production by Country",
        &countries,
        &production,
        &hover,
        ChoroplethStyle {
            geo: Geo::Countries,
            scale: "Reds",
            colorbar: "Annual Production (skins)",
            z_range: None,
        },
    )
    .with_height(500);

    let ranked = sort_by_metric(&rows, FarmingCountry::ETHICAL_SCORE, SortOrder::Ascending);
    let ethical_chart = horizontal_bar(
        "farming-ethical-scores",
        "Ethical Scores by Country (0-10 scale)",
        &ranked.iter().map(|r| r.country.clone()).collect::<Vec<_>>(),
        &ranked.iter().map(|r| r.ethical_score).collect::<Vec<_>>(),
        Axes::new("Ethical Score", "Country"),
        BarColor::Scale {
            scale: "RdYlGn",
            reverse: false,
            range: Some((0.0, 10.0)),
        },
    )
    .with_height(600);

    let (methods, method_counts) = split_counts(value_counts(&rows, |r| r.farming_method.clone()));
    let method_chart = pie(
        "farming-methods",
        "Distribution of Farming Methods",
        &methods,
        &method_counts,
        &SET3,
    );

    let welfare_points: Vec<ScatterPoint> = rows
        .iter()
        .filter_map(|r| {
            let rating = r.animal_welfare_rating.rating()?;
            Some(ScatterPoint {
                x: json!(rating),
                y: json!(r.sustainability_rating),
                size: FarmingCountry::PRODUCTION.value(r),
                group: String::new(),
                shade: Some(r.ethical_score),
                text: format!("{} ({})", r.country, r.primary_species_farmed),
            })
        })
        .collect();
    let welfare_chart = scatter(
        "farming-welfare-vs-sustainability",
        "Animal Welfare vs Sustainability",
        &welfare_points,
        Axes::new("Animal Welfare Rating", "Sustainability Rating"),
        Coloring::Scale {
            scale: "Viridis",
            label: "Ethical Score",
        },
    )
    .with_height(500);

    let regulation = regulation_counts(&rows);
    let regulation_chart = bar(
        "farming-regulation",
        "Regulation Levels Across Countries",
        &regulation
            .iter()
            .map(|(l, _)| l.as_str().to_string())
            .collect::<Vec<_>>(),
        &regulation.iter().map(|(_, n)| *n as f64).collect::<Vec<_>>(),
        Axes::new("Regulation Level", "Number of Countries"),
        BarColor::scale("Blues"),
    );

    let production_points: Vec<ScatterPoint> = rows
        .iter()
        .map(|r| ScatterPoint {
            x: json!(r.annual_production_skins),
            y: json!(r.ethical_score),
            size: FarmingCountry::PRODUCTION.value(r),
            group: r.farming_method.clone(),
            shade: None,
            text: format!("{} ({})", r.country, r.primary_species_farmed),
        })
        .collect();
    let production_chart = scatter(
        "farming-production-vs-ethics",
        "Production Volume vs Ethical Standards",
        &production_points,
        Axes::new("Annual Production (skins)", "Ethical Score"),
        Coloring::Groups {
            legend: "Farming Method",
            palette: no_palette,
        },
    )
    .with_log_x()
    .with_height(500);

    let mut table = Table::new(&[
        "Country",
        "Primary Species",
        "Method",
        "Annual Production",
        "Ethical Score",
        "Welfare",
        "Sustainability",
        "Regulation",
        "Conservation Impact",
        "Impact Direction",
    ]);
    for r in &rows {
        let direction = r.conservation_direction();
        table.push_row(vec![
            r.country.as_str().into(),
            r.primary_species_farmed.as_str().into(),
            r.farming_method.as_str().into(),
            thousands(r.annual_production_skins).into(),
            TableCell::toned(format!("{}", r.ethical_score), ethics_tone(r.ethical_score)),
            r.animal_welfare_rating.to_string().into(),
            r.sustainability_rating.as_str().into(),
            r.regulation_level.as_str().into(),
            TableCell::toned(r.conservation_impact.as_str(), impact_tone(direction)),
            direction.as_str().into(),
        ]);
    }

    let page = Page::new("Snakeskin Farming Ethics")
        .intro(
            Alert::new(Tone::Info, "Understanding the Snakeskin Trade").paragraph(
                "The global snakeskin trade involves millions of snakes annually, sourced through \
                 both farming and wild harvest. This page examines the ethical dimensions of this \
                 industry, including animal welfare, sustainability, and the economic realities of \
                 snake farming across different countries and regulatory environments.",
            ),
        )
        .card(thousands(summary.total_skins), "Total Annual Skins", Tone::Primary)
        .card(
            format!("{:.1}/10", summary.avg_ethical_score),
            "Average Ethical Score",
            Tone::Warning,
        )
        .card(summary.certified.to_string(), "With Certification", Tone::Success)
        .card(summary.banned.to_string(), "Countries Banned", Tone::Danger)
        .row(vec![Column::full(Block::captioned(
            "Global Snakeskin Production",
            "This map shows the distribution of snakeskin production globally. \
             Darker colors indicate higher production volumes.",
            production_map,
        ))])
        .row(vec![
            Column::new(8, Block::chart(ethical_chart)),
            Column::new(4, Block::chart(method_chart)),
        ])
        .row(vec![Column::full(Block::captioned(
            "Animal Welfare vs Environmental Sustainability",
            "This chart compares animal welfare standards against environmental sustainability. \
             Bubble size represents production volume. Note: Wild harvest operations are \
             excluded as they don't have welfare ratings.",
            welfare_chart,
        ))])
        .row(vec![
            Column::half(Block::chart(regulation_chart)),
            Column::half(Block::captioned(
                "Production vs Ethics",
                "Examining whether high production correlates with lower ethical standards.",
                production_chart,
            )),
        ])
        .heading("Key Findings")
        .row(vec![
            Column::half(Block::text(
                "Wild Harvest Concerns",
                Some(Tone::Danger),
                "Countries relying on wild harvest (particularly in Southeast Asia) often have \
                 weak regulation and lower ethical scores. This threatens wild python populations \
                 and raises animal welfare concerns during capture and transport.",
            )),
            Column::half(Block::text(
                "Intensive Farming Issues",
                Some(Tone::Warning),
                "Countries with intensive farming operations (China, Vietnam) produce high volumes \
                 but frequently have poor animal welfare standards, including cramped enclosures, \
                 lack of veterinary care, and inhumane slaughter methods.",
            )),
        ])
        .row(vec![
            Column::half(Block::text(
                "Successful Regulation Examples",
                Some(Tone::Success),
                "Australia demonstrates that strong regulation can enable sustainable wild \
                 harvest. Their strict quotas, full traceability, and enforcement result in the \
                 highest ethical scores while maintaining ecological balance.",
            )),
            Column::half(Block::text(
                "Economic vs Ethical Balance",
                Some(Tone::Info),
                "Countries where snakeskin farming provides significant economic value \
                 (Indonesia, Thailand, Colombia) are beginning to adopt better practices and \
                 certification programs, showing that economic importance can drive improvement.",
            )),
        ])
        .heading("Common Issues and Best Practices")
        .row(vec![
            Column::half(Block::List {
                heading: "Common Issues".to_string(),
                items: first_unique(rows.iter().map(|r| r.common_issues.as_str()), 10),
            }),
            Column::half(Block::List {
                heading: "Best Practices".to_string(),
                items: first_unique(rows.iter().map(|r| r.best_practices.as_str()), 10),
            }),
        ])
        .heading("Detailed Country Data")
        .row(vec![Column::full(Block::Table(table))])
        .row(vec![Column::full(Block::Alert(
            Alert::new(Tone::Success, "Consumer Recommendations")
                .paragraph("If purchasing snakeskin products:")
                .items(
                    [
                        "Look for certification from recognized wildlife trade organizations \
                         (CITES compliance)",
                        "Prefer products from countries with strong regulation (Australia, \
                         certified operations in Malaysia/Thailand)",
                        "Avoid products from countries with poor ethical scores or weak regulation",
                        "Consider alternatives: many fashion brands now offer high-quality \
                         synthetic snake patterns",
                        "Research the brand's supply chain transparency and animal welfare policies",
                    ]
                    .map(String::from),
                ),
        ))]);
    Ok(page)
}
