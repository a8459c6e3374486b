use serde_json::json;

use crate::aggregation::{
    counts_in_order, filter_rows, mean_of, percentage, sort_by_metric, top_n_by_metric, SortOrder,
};
use crate::charts::{category_histogram, histogram, pie, scatter, Axes, Coloring, ScatterPoint};
use crate::config::colors;
use crate::error::DashError;
use crate::layout::{Alert, Block, Column, Page, Table, TableCell, Tone};
use crate::loader::DataSource;
use crate::model::{ImpactLevel, MediaAppearance, Role};
use crate::pages::NOT_AVAILABLE;

const ROLES: [Role; 3] = [Role::Antagonist, Role::Protagonist, Role::Neutral];
const UNDEFINED_ROLE_COLOR: &str = "#BDC3C7";

fn role_label(role: Option<Role>) -> &'static str {
    role.map_or(NOT_AVAILABLE, Role::as_str)
}

fn role_palette(group: &str) -> Option<&'static str> {
    if group == NOT_AVAILABLE {
        return Some(UNDEFINED_ROLE_COLOR);
    }
    ROLES.into_iter().find(|r| r.as_str() == group).map(Role::color)
}

fn role_tone(role: Option<Role>) -> Option<Tone> {
    match role? {
        Role::Antagonist => Some(Tone::Danger),
        Role::Protagonist => Some(Tone::Success),
        Role::Neutral => None,
    }
}

/// Role tallies over the rows that define one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoleBreakdown {
    pub defined: usize,
    pub antagonists: usize,
    pub protagonists: usize,
}

impl RoleBreakdown {
    pub fn of(rows: &[MediaAppearance]) -> Self {
        let count = |role: Role| {
            rows.iter()
                .filter(|r| r.protagonist_antagonist == Some(role))
                .count()
        };
        Self {
            defined: rows
                .iter()
                .filter(|r| r.protagonist_antagonist.is_some())
                .count(),
            antagonists: count(Role::Antagonist),
            protagonists: count(Role::Protagonist),
        }
    }

    /// Share of antagonists among defined roles; 0 when none are defined.
    pub fn antagonist_share(&self) -> f64 {
        percentage(self.antagonists, self.defined)
    }
}

/// The ten highest-impact appearances that carry a year.
pub fn most_influential(rows: &[MediaAppearance]) -> Vec<MediaAppearance> {
    let dated = filter_rows(rows, |r| r.year.is_some());
    top_n_by_metric(&dated, MediaAppearance::IMPACT_SCORE, 10)
}

pub fn render(source: &DataSource) -> Result<Page, DashError> {
    let rows = source.load_media()?;
    let roles = RoleBreakdown::of(&rows);
    let rated = filter_rows(&rows, |r| r.accuracy_rating.is_some());
    let avg_accuracy = if rated.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        format!("{:.1}/10", mean_of(&rated, MediaAppearance::ACCURACY))
    };

    let role_counts: Vec<(Role, usize)> = counts_in_order(
        &filter_rows(&rows, |r| r.protagonist_antagonist.is_some()),
        |r| r.protagonist_antagonist.unwrap_or(Role::Neutral),
        &ROLES,
    )
    .into_iter()
    .filter(|(_, n)| *n > 0)
    .collect();
    let role_chart = pie(
        "media-roles",
        "Snakes as Protagonists vs Antagonists",
        &role_counts
            .iter()
            .map(|(r, _)| r.as_str().to_string())
            .collect::<Vec<_>>(),
        &role_counts.iter().map(|(_, n)| *n as f64).collect::<Vec<_>>(),
        &role_counts.iter().map(|(r, _)| r.color()).collect::<Vec<_>>(),
    );

    let media_types: Vec<String> = rows.iter().map(|r| r.media_type.clone()).collect();
    let type_chart = category_histogram(
        "media-types",
        "Snake Appearances by Media Type",
        &media_types,
        &[],
        Axes::new("Media Type", "Number of Appearances"),
        colors::INFO,
    );

    // Undated rows sort last and drop out.
    let points: Vec<ScatterPoint> = sort_by_metric(&rows, MediaAppearance::YEAR, SortOrder::Ascending)
        .iter()
        .filter_map(|r| {
            let year = r.year?;
            let score = r.impact_level().score();
            Some(ScatterPoint {
                x: json!(year),
                y: json!(score),
                size: Some(f64::from(score)),
                group: role_label(r.protagonist_antagonist).to_string(),
                shade: None,
                text: format!("{} ({})", r.title, r.snake_character),
            })
        })
        .collect();
    let timeline_chart = scatter(
        "media-impact-timeline",
        "Cultural Impact of Snake Characters Over Time",
        &points,
        Axes::new("Year", "Cultural Impact (1 = Low, 4 = Very High)"),
        Coloring::Groups {
            legend: "Role",
            palette: role_palette,
        },
    )
    .with_height(500);

    let impact_order: Vec<&str> = ImpactLevel::DESCENDING.iter().map(|l| l.as_str()).collect();
    let impact_chart = category_histogram(
        "media-impact-levels",
        "Distribution of Cultural Impact",
        &rows
            .iter()
            .map(|r| r.impact_level().as_str().to_string())
            .collect::<Vec<_>>(),
        &impact_order,
        Axes::new("Impact Level", "Number of Appearances"),
        "#E67E22",
    );

    let accuracy_chart = histogram(
        "media-accuracy",
        "Accuracy of Snake Portrayals (0-10 scale)",
        &rated.iter().filter_map(|r| r.accuracy_rating).collect::<Vec<_>>(),
        10,
        Axes::new("Accuracy Rating", "Number of Portrayals"),
        "#9B59B6",
    );

    let mut influential = Table::new(&["Title", "Character", "Year", "Alignment"]);
    for r in most_influential(&rows) {
        influential.push_row(vec![
            r.title.as_str().into(),
            r.snake_character.as_str().into(),
            r.year.map_or_else(String::new, |y| y.to_string()).into(),
            role_label(r.protagonist_antagonist).into(),
        ]);
    }

    let mut appearances = Table::new(&[
        "Title",
        "Type",
        "Year",
        "Character",
        "Role",
        "Alignment",
        "Cultural Impact",
        "Accuracy",
    ]);
    for r in &rows {
        appearances.push_row(vec![
            r.title.as_str().into(),
            r.media_type.as_str().into(),
            r.year.map_or_else(String::new, |y| y.to_string()).into(),
            r.snake_character.as_str().into(),
            r.role.as_str().into(),
            TableCell::toned(
                role_label(r.protagonist_antagonist),
                role_tone(r.protagonist_antagonist),
            ),
            r.cultural_impact.as_str().into(),
            r.accuracy_rating
                .map_or_else(|| NOT_AVAILABLE.to_string(), |a| format!("{a}"))
                .into(),
        ]);
    }

    let page = Page::new("Snakes in Media and Culture")
        .intro(
            Alert::new(Tone::Info, "Demystifying Snake Representation").paragraph(
                "Snakes have played significant roles in human storytelling throughout history, \
                 from ancient mythology to modern cinema. This page explores how snakes are \
                 portrayed in media, whether as villains, heroes, or symbols, and how accurate \
                 these portrayals are.",
            ),
        )
        .card(rows.len().to_string(), "Media Appearances", Tone::Primary)
        .card(roles.antagonists.to_string(), "As Antagonists", Tone::Danger)
        .card(roles.protagonists.to_string(), "As Protagonists", Tone::Success)
        .card(avg_accuracy.clone(), "Avg Accuracy", Tone::Warning)
        .row(vec![
            Column::half(Block::chart(role_chart)),
            Column::half(Block::chart(type_chart)),
        ])
        .row(vec![Column::full(Block::captioned(
            "Cultural Impact Timeline",
            "This visualization shows how snake characters have appeared across different eras, \
             sized by their cultural impact. Ancient mythology entries show the earliest influence.",
            timeline_chart,
        ))])
        .row(vec![
            Column::half(Block::chart(impact_chart)),
            Column::half(Block::chart(accuracy_chart)),
        ])
        .heading("Most Influential Snake Characters")
        .row(vec![Column::full(Block::Table(influential))])
        .heading("Key Insights")
        .row(vec![
            Column::half(Block::text(
                "The Villain Stereotype",
                Some(Tone::Danger),
                format!(
                    "Out of {} portrayals with defined roles, {} ({:.1}%) cast snakes as \
                     antagonists. This reinforces negative stereotypes and contributes to \
                     ophidiophobia (fear of snakes).",
                    roles.defined,
                    roles.antagonists,
                    roles.antagonist_share(),
                ),
            )),
            Column::half(Block::text(
                "Accuracy Concerns",
                Some(Tone::Warning),
                format!(
                    "The average accuracy rating of {avg_accuracy} indicates that most media \
                     portrayals take significant creative liberties with snake behavior, size, \
                     and capabilities, often for dramatic effect."
                ),
            )),
        ])
        .row(vec![
            Column::half(Block::text(
                "Positive Representation",
                Some(Tone::Success),
                "Notable positive portrayals include Viper from Kung Fu Panda, various video game \
                 characters like Solid Snake, and Kaa from the original Jungle Book (as an ally). \
                 These help balance the narrative around snakes.",
            )),
            Column::half(Block::text(
                "Cultural Significance",
                Some(Tone::Info),
                "Ancient mythologies (Egyptian Apophis, Norse Jörmungandr, Aztec Quetzalcoatl, \
                 Biblical Serpent) show that snake symbolism has been deeply embedded in human \
                 culture for millennia, often representing both danger and wisdom.",
            )),
        ])
        .heading("Notable Snake Appearances")
        .row(vec![Column::full(Block::Table(appearances))]);
    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn appearance(title: &str, year: Option<i32>, role: Option<Role>, impact: &str) -> MediaAppearance {
        MediaAppearance {
            title: title.to_string(),
            media_type: "Film".to_string(),
            year,
            snake_character: "Kaa".to_string(),
            role: "Villain".to_string(),
            protagonist_antagonist: role,
            cultural_impact: impact.to_string(),
            accuracy_rating: None,
        }
    }

    #[test]
    fn antagonist_share_ignores_undefined_roles() {
        let rows = vec![
            appearance("a", None, Some(Role::Antagonist), "High"),
            appearance("b", None, Some(Role::Protagonist), "Low"),
            appearance("c", None, None, "Low"),
            appearance("d", None, Some(Role::Antagonist), "Low"),
        ];
        let roles = RoleBreakdown::of(&rows);
        assert_eq!(roles.defined, 3);
        assert_eq!(roles.antagonists, 2);
        assert!((roles.antagonist_share() - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn antagonist_share_is_zero_without_roles() {
        let rows = vec![appearance("a", None, None, "Low")];
        assert_eq!(RoleBreakdown::of(&rows).antagonist_share(), 0.0);
    }

    #[test]
    fn influential_needs_a_year_and_ranks_by_impact() {
        let rows = vec![
            appearance("undated", None, None, "Very High"),
            appearance("medium", Some(1990), None, "Medium"),
            appearance("very high", Some(1967), None, "Very High - iconic"),
            appearance("high", Some(2008), None, "High"),
        ];
        let titles: Vec<String> = most_influential(&rows).into_iter().map(|r| r.title).collect();
        assert_eq!(titles, vec!["very high", "high", "medium"]);
    }

    #[test]
    fn undefined_role_has_its_own_colour() {
        assert_eq!(role_palette(NOT_AVAILABLE), Some(UNDEFINED_ROLE_COLOR));
        assert_eq!(role_palette("Antagonist"), Some(Role::Antagonist.color()));
        assert_eq!(role_palette("Villain"), None);
    }
}
