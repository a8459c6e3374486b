use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::aggregation::Metric;
use crate::config::colors;
use crate::error::DashError;
use crate::schema::{domesticated, farming, flag, global, media, us};

// ── Categorical types ───────────────────────────────────────────────────────

/// Binary Yes/No column value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Flag {
    Yes,
    No,
}

impl Flag {
    pub fn is_yes(self) -> bool {
        self == Flag::Yes
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Yes => flag::YES,
            Self::No => flag::NO,
        }
    }
}

impl FromStr for Flag {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            flag::YES => Ok(Self::Yes),
            flag::NO => Ok(Self::No),
            other => Err(DashError::UnknownCategory {
                kind: "flag",
                value: other.to_string(),
            }),
        }
    }
}

/// Care difficulty of a pet species. Ordered Beginner < Intermediate < Advanced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum CareDifficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl CareDifficulty {
    pub const ALL: [CareDifficulty; 3] = [Self::Beginner, Self::Intermediate, Self::Advanced];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Self::Beginner => colors::SUCCESS,
            Self::Intermediate => colors::WARNING,
            Self::Advanced => colors::SECONDARY,
        }
    }
}

impl FromStr for CareDifficulty {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DashError::UnknownCategory {
                kind: "care difficulty",
                value: s.to_string(),
            })
    }
}

/// Cultural impact bucket derived from the free-text impact column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ImpactLevel {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl ImpactLevel {
    /// Highest first, the order the impact histogram reads in.
    pub const DESCENDING: [ImpactLevel; 4] = [Self::VeryHigh, Self::High, Self::Medium, Self::Low];

    /// "Very High" is checked before "High" since the latter is a substring.
    pub fn classify(text: &str) -> Self {
        if text.contains("Very High") {
            Self::VeryHigh
        } else if text.contains("High") {
            Self::High
        } else if text.contains("Medium") {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn score(self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
            Self::VeryHigh => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::VeryHigh => "Very High",
        }
    }
}

/// How a snake character is cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Role {
    Protagonist,
    Antagonist,
    Neutral,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Protagonist => "Protagonist",
            Self::Antagonist => "Antagonist",
            Self::Neutral => "Neutral",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Self::Protagonist => colors::SUCCESS,
            Self::Antagonist => colors::SECONDARY,
            Self::Neutral => "#95A5A6",
        }
    }

    /// Blank and "N/A" mean the role is undefined.
    pub fn parse_optional(s: &str) -> Result<Option<Self>, DashError> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("N/A") {
            return Ok(None);
        }
        [Self::Protagonist, Self::Antagonist, Self::Neutral]
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s))
            .map(Some)
            .ok_or_else(|| DashError::UnknownCategory {
                kind: "role",
                value: s.to_string(),
            })
    }
}

/// Regulation of the skin trade, most restrictive first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RegulationLevel {
    StrictBan,
    Strict,
    Moderate,
    Weak,
    Unregulated,
}

impl RegulationLevel {
    pub const ALL: [RegulationLevel; 5] = [
        Self::StrictBan,
        Self::Strict,
        Self::Moderate,
        Self::Weak,
        Self::Unregulated,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::StrictBan => "Strict Ban",
            Self::Strict => "Strict",
            Self::Moderate => "Moderate",
            Self::Weak => "Weak",
            Self::Unregulated => "Unregulated",
        }
    }
}

impl FromStr for RegulationLevel {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let level = match s.trim().to_ascii_lowercase().as_str() {
            "strict ban" | "ban" | "banned" => Self::StrictBan,
            "strict" | "strong" | "high" => Self::Strict,
            "moderate" | "medium" => Self::Moderate,
            "weak" | "low" | "limited" | "minimal" => Self::Weak,
            "none" | "unregulated" | "no regulation" => Self::Unregulated,
            _ => {
                return Err(DashError::UnknownCategory {
                    kind: "regulation level",
                    value: s.to_string(),
                })
            }
        };
        Ok(level)
    }
}

/// Reading of the conservation-impact free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ConservationImpact {
    Positive,
    Negative,
    Mixed,
    Neutral,
}

impl ConservationImpact {
    pub fn classify(text: &str) -> Self {
        match (text.contains("Positive"), text.contains("Negative")) {
            (true, true) => Self::Mixed,
            (true, false) => Self::Positive,
            (false, true) => Self::Negative,
            (false, false) => Self::Neutral,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "Positive",
            Self::Negative => "Negative",
            Self::Mixed => "Mixed",
            Self::Neutral => "Neutral",
        }
    }
}

/// Animal welfare rating; wild-harvest operations have none.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum AnimalWelfare {
    Rated(String),
    WildHarvest,
}

impl AnimalWelfare {
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s == farming::WILD_WELFARE {
            Self::WildHarvest
        } else {
            Self::Rated(s.to_string())
        }
    }

    pub fn rating(&self) -> Option<&str> {
        match self {
            Self::Rated(r) => Some(r),
            Self::WildHarvest => None,
        }
    }
}

impl fmt::Display for AnimalWelfare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rated(r) => f.write_str(r),
            Self::WildHarvest => f.write_str(farming::WILD_WELFARE),
        }
    }
}

// ── Record traits ───────────────────────────────────────────────────────────

/// A record with a name fit for chart labels and lists.
pub trait Named {
    fn display_name(&self) -> &str;
}

/// Shared shape of the regional and global species tables.
pub trait SnakeRecord: Named {
    fn venomous(&self) -> Flag;
    fn venom_type(&self) -> &str;
    fn lethality_score(&self) -> f64;
    fn avg_length_cm(&self) -> f64;
    fn max_length_cm(&self) -> f64;
    fn conservation_status(&self) -> &str;
}

// ── Records ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsSnake {
    /// Comma-delimited state codes, e.g. "FL, GA, TX".
    pub states: String,
    pub common_name: String,
    pub lethality_score: f64,
    pub venomous: Flag,
    pub venom_type: String,
    pub avg_length_cm: f64,
    pub max_length_cm: f64,
    pub conservation_status: String,
    pub invasive: Flag,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalSnake {
    pub continent: String,
    pub species_name: String,
    pub common_name: String,
    pub lethality_score: f64,
    pub avg_length_cm: f64,
    pub max_length_cm: f64,
    pub venomous: Flag,
    pub venom_type: String,
    pub conservation_status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomesticatedSnake {
    pub common_name: String,
    pub popularity_score: f64,
    pub avg_cost_usd: f64,
    pub avg_lifespan_years: f64,
    pub care_difficulty: CareDifficulty,
    pub temperament: String,
    pub domestication_level: String,
    pub first_domesticated_era: String,
    pub origin: String,
    pub reasons_for_domestication: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaAppearance {
    pub title: String,
    pub media_type: String,
    pub year: Option<i32>,
    pub snake_character: String,
    pub role: String,
    pub protagonist_antagonist: Option<Role>,
    pub cultural_impact: String,
    /// `None` for "N/A" and anything else that is not a number.
    pub accuracy_rating: Option<f64>,
}

impl MediaAppearance {
    pub fn impact_level(&self) -> ImpactLevel {
        ImpactLevel::classify(&self.cultural_impact)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FarmingCountry {
    pub country: String,
    pub primary_species_farmed: String,
    pub farming_method: String,
    pub annual_production_skins: u64,
    pub ethical_score: f64,
    pub animal_welfare_rating: AnimalWelfare,
    pub sustainability_rating: String,
    pub regulation_level: RegulationLevel,
    pub certification_available: Flag,
    pub conservation_impact: String,
    pub common_issues: String,
    pub best_practices: String,
}

impl FarmingCountry {
    pub fn conservation_direction(&self) -> ConservationImpact {
        ConservationImpact::classify(&self.conservation_impact)
    }
}

impl Named for UsSnake {
    fn display_name(&self) -> &str {
        &self.common_name
    }
}

impl Named for GlobalSnake {
    fn display_name(&self) -> &str {
        &self.common_name
    }
}

impl Named for DomesticatedSnake {
    fn display_name(&self) -> &str {
        &self.common_name
    }
}

impl Named for MediaAppearance {
    fn display_name(&self) -> &str {
        &self.title
    }
}

impl Named for FarmingCountry {
    fn display_name(&self) -> &str {
        &self.country
    }
}

macro_rules! impl_snake_record {
    ($ty:ty) => {
        impl SnakeRecord for $ty {
            fn venomous(&self) -> Flag {
                self.venomous
            }
            fn venom_type(&self) -> &str {
                &self.venom_type
            }
            fn lethality_score(&self) -> f64 {
                self.lethality_score
            }
            fn avg_length_cm(&self) -> f64 {
                self.avg_length_cm
            }
            fn max_length_cm(&self) -> f64 {
                self.max_length_cm
            }
            fn conservation_status(&self) -> &str {
                &self.conservation_status
            }
        }
    };
}

impl_snake_record!(UsSnake);
impl_snake_record!(GlobalSnake);

// ── Metrics ─────────────────────────────────────────────────────────────────

fn snake_lethality<T: SnakeRecord>(r: &T) -> Option<f64> {
    Some(r.lethality_score())
}

fn snake_avg_length<T: SnakeRecord>(r: &T) -> Option<f64> {
    Some(r.avg_length_cm())
}

fn snake_max_length<T: SnakeRecord>(r: &T) -> Option<f64> {
    Some(r.max_length_cm())
}

/// Lethality score of any species record.
pub fn lethality<T: SnakeRecord>() -> Metric<T> {
    Metric::new(us::LETHALITY_SCORE, "Lethality Score", snake_lethality::<T>)
}

pub fn avg_length<T: SnakeRecord>() -> Metric<T> {
    Metric::new(global::AVG_LENGTH_CM, "Average Length (cm)", snake_avg_length::<T>)
}

pub fn max_length<T: SnakeRecord>() -> Metric<T> {
    Metric::new(global::MAX_LENGTH_CM, "Max Length (cm)", snake_max_length::<T>)
}

impl DomesticatedSnake {
    pub const POPULARITY: Metric<DomesticatedSnake> = Metric::new(
        domesticated::POPULARITY_SCORE,
        "Popularity Score",
        |r| Some(r.popularity_score),
    );
    pub const COST: Metric<DomesticatedSnake> = Metric::new(
        domesticated::AVG_COST_USD,
        "Average Cost (USD)",
        |r| Some(r.avg_cost_usd),
    );
    pub const LIFESPAN: Metric<DomesticatedSnake> = Metric::new(
        domesticated::AVG_LIFESPAN_YEARS,
        "Average Lifespan (years)",
        |r| Some(r.avg_lifespan_years),
    );
}

impl MediaAppearance {
    pub const ACCURACY: Metric<MediaAppearance> = Metric::new(
        media::ACCURACY_RATING,
        "Accuracy Rating",
        |r| r.accuracy_rating,
    );
    pub const IMPACT_SCORE: Metric<MediaAppearance> = Metric::new(
        "impact_score",
        "Impact Score",
        |r| Some(f64::from(r.impact_level().score())),
    );
    pub const YEAR: Metric<MediaAppearance> =
        Metric::new(media::YEAR, "Year", |r| r.year.map(f64::from));
}

impl FarmingCountry {
    pub const ETHICAL_SCORE: Metric<FarmingCountry> = Metric::new(
        farming::ETHICAL_SCORE,
        "Ethical Score",
        |r| Some(r.ethical_score),
    );
    pub const PRODUCTION: Metric<FarmingCountry> = Metric::new(
        farming::ANNUAL_PRODUCTION_SKINS,
        "Annual Production (skins)",
        |r| Some(r.annual_production_skins as f64),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn care_difficulty_orders_beginner_first() {
        let mut levels = vec![
            CareDifficulty::Advanced,
            CareDifficulty::Beginner,
            CareDifficulty::Intermediate,
        ];
        levels.sort();
        assert_eq!(levels, CareDifficulty::ALL.to_vec());
        assert_eq!(
            "intermediate".parse::<CareDifficulty>().unwrap(),
            CareDifficulty::Intermediate
        );
        assert!("Expert".parse::<CareDifficulty>().is_err());
    }

    #[test]
    fn impact_level_checks_very_high_before_high() {
        assert_eq!(ImpactLevel::classify("Very High - iconic"), ImpactLevel::VeryHigh);
        assert_eq!(ImpactLevel::classify("High"), ImpactLevel::High);
        assert_eq!(ImpactLevel::classify("Medium"), ImpactLevel::Medium);
        assert_eq!(ImpactLevel::classify("Niche"), ImpactLevel::Low);
        assert_eq!(ImpactLevel::VeryHigh.score(), 4);
    }

    #[test]
    fn role_treats_na_as_absent() {
        assert_eq!(Role::parse_optional("N/A").unwrap(), None);
        assert_eq!(Role::parse_optional("").unwrap(), None);
        assert_eq!(
            Role::parse_optional("Antagonist").unwrap(),
            Some(Role::Antagonist)
        );
        assert!(Role::parse_optional("Sidekick").is_err());
    }

    #[test]
    fn regulation_level_parses_synonyms_and_orders_by_restriction() {
        assert_eq!(
            "Strict Ban".parse::<RegulationLevel>().unwrap(),
            RegulationLevel::StrictBan
        );
        assert_eq!(
            "medium".parse::<RegulationLevel>().unwrap(),
            RegulationLevel::Moderate
        );
        assert!(RegulationLevel::StrictBan < RegulationLevel::Weak);
        assert!("Sometimes".parse::<RegulationLevel>().is_err());
    }

    #[test]
    fn flag_is_strict() {
        assert_eq!(" Yes ".parse::<Flag>().unwrap(), Flag::Yes);
        assert!("yes please".parse::<Flag>().is_err());
    }

    #[test]
    fn conservation_impact_reads_markers() {
        assert_eq!(
            ConservationImpact::classify("Positive - funds habitat protection"),
            ConservationImpact::Positive
        );
        assert_eq!(
            ConservationImpact::classify("Negative: depletes wild stock"),
            ConservationImpact::Negative
        );
        assert_eq!(
            ConservationImpact::classify("Positive locally, Negative regionally"),
            ConservationImpact::Mixed
        );
    }

    #[test]
    fn wild_harvest_has_no_welfare_rating() {
        assert_eq!(AnimalWelfare::parse(" N/A (Wild) ").rating(), None);
        assert_eq!(AnimalWelfare::parse("Poor").rating(), Some("Poor"));
    }

    #[test]
    fn category_colors_come_from_the_palette() {
        assert_eq!(CareDifficulty::Beginner.color(), colors::SUCCESS);
        assert_eq!(Role::Antagonist.color(), colors::SECONDARY);
    }
}
