use std::fmt;

use serde::Serialize;

// ── Datasets ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Dataset {
    UsSnakes,
    GlobalSnakes,
    Domesticated,
    Media,
    Farming,
}

impl Dataset {
    pub const ALL: [Dataset; 5] = [
        Dataset::UsSnakes,
        Dataset::GlobalSnakes,
        Dataset::Domesticated,
        Dataset::Media,
        Dataset::Farming,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            Self::UsSnakes => "us_snake_species.csv",
            Self::GlobalSnakes => "global_snake_species.csv",
            Self::Domesticated => "domesticated_snakes.csv",
            Self::Media => "snakes_in_media.csv",
            Self::Farming => "snakeskin_farming.csv",
        }
    }

    pub fn required_columns(self) -> &'static [&'static str] {
        match self {
            Self::UsSnakes => &us::REQUIRED,
            Self::GlobalSnakes => &global::REQUIRED,
            Self::Domesticated => &domesticated::REQUIRED,
            Self::Media => &media::REQUIRED,
            Self::Farming => &farming::REQUIRED,
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::UsSnakes => "US Snakes",
            Self::GlobalSnakes => "Global Snakes",
            Self::Domesticated => "Domesticated Snakes",
            Self::Media => "Media Snakes",
            Self::Farming => "Farming Data",
        };
        f.write_str(name)
    }
}

// ── Shared flag values ──────────────────────────────────────────────────────
pub mod flag {
    pub const YES: &str = "Yes";
    pub const NO: &str = "No";
}

// ── US snake columns ────────────────────────────────────────────────────────
pub mod us {
    pub const STATES: &str = "states";
    pub const COMMON_NAME: &str = "common_name";
    pub const LETHALITY_SCORE: &str = "lethality_score";
    pub const VENOMOUS: &str = "venomous";
    pub const VENOM_TYPE: &str = "venom_type";
    pub const AVG_LENGTH_CM: &str = "avg_length_cm";
    pub const MAX_LENGTH_CM: &str = "max_length_cm";
    pub const CONSERVATION_STATUS: &str = "conservation_status";
    pub const INVASIVE: &str = "invasive";

    pub const REQUIRED: [&str; 9] = [
        STATES,
        COMMON_NAME,
        LETHALITY_SCORE,
        VENOMOUS,
        VENOM_TYPE,
        AVG_LENGTH_CM,
        MAX_LENGTH_CM,
        CONSERVATION_STATUS,
        INVASIVE,
    ];
}

// ── Global snake columns ────────────────────────────────────────────────────
pub mod global {
    pub const CONTINENT: &str = "continent";
    pub const SPECIES_NAME: &str = "species_name";
    pub const COMMON_NAME: &str = "common_name";
    pub const LETHALITY_SCORE: &str = "lethality_score";
    pub const AVG_LENGTH_CM: &str = "avg_length_cm";
    pub const MAX_LENGTH_CM: &str = "max_length_cm";
    pub const VENOMOUS: &str = "venomous";
    pub const VENOM_TYPE: &str = "venom_type";
    pub const CONSERVATION_STATUS: &str = "conservation_status";

    pub const REQUIRED: [&str; 9] = [
        CONTINENT,
        SPECIES_NAME,
        COMMON_NAME,
        LETHALITY_SCORE,
        AVG_LENGTH_CM,
        MAX_LENGTH_CM,
        VENOMOUS,
        VENOM_TYPE,
        CONSERVATION_STATUS,
    ];
}

// ── Domesticated snake columns ──────────────────────────────────────────────
pub mod domesticated {
    pub const COMMON_NAME: &str = "common_name";
    pub const POPULARITY_SCORE: &str = "popularity_score";
    pub const AVG_COST_USD: &str = "avg_cost_usd";
    pub const AVG_LIFESPAN_YEARS: &str = "avg_lifespan_years";
    pub const CARE_DIFFICULTY: &str = "care_difficulty";
    pub const TEMPERAMENT: &str = "temperament";
    pub const DOMESTICATION_LEVEL: &str = "domestication_level";
    pub const FIRST_DOMESTICATED_ERA: &str = "first_domesticated_era";
    pub const ORIGIN: &str = "origin";
    pub const REASONS_FOR_DOMESTICATION: &str = "reasons_for_domestication";

    pub const REQUIRED: [&str; 10] = [
        COMMON_NAME,
        POPULARITY_SCORE,
        AVG_COST_USD,
        AVG_LIFESPAN_YEARS,
        CARE_DIFFICULTY,
        TEMPERAMENT,
        DOMESTICATION_LEVEL,
        FIRST_DOMESTICATED_ERA,
        ORIGIN,
        REASONS_FOR_DOMESTICATION,
    ];
}

// ── Media appearance columns ────────────────────────────────────────────────
pub mod media {
    pub const TITLE: &str = "title";
    pub const MEDIA_TYPE: &str = "media_type";
    pub const YEAR: &str = "year";
    pub const SNAKE_CHARACTER: &str = "snake_character";
    pub const ROLE: &str = "role";
    pub const PROTAGONIST_ANTAGONIST: &str = "protagonist_antagonist";
    pub const CULTURAL_IMPACT: &str = "cultural_impact";
    pub const ACCURACY_RATING: &str = "accuracy_rating";

    pub const REQUIRED: [&str; 8] = [
        TITLE,
        MEDIA_TYPE,
        YEAR,
        SNAKE_CHARACTER,
        ROLE,
        PROTAGONIST_ANTAGONIST,
        CULTURAL_IMPACT,
        ACCURACY_RATING,
    ];
}

// ── Farming country columns ─────────────────────────────────────────────────
pub mod farming {
    pub const COUNTRY: &str = "country";
    pub const PRIMARY_SPECIES_FARMED: &str = "primary_species_farmed";
    pub const FARMING_METHOD: &str = "farming_method";
    pub const ANNUAL_PRODUCTION_SKINS: &str = "annual_production_skins";
    pub const ETHICAL_SCORE: &str = "ethical_score";
    pub const ANIMAL_WELFARE_RATING: &str = "animal_welfare_rating";
    pub const SUSTAINABILITY_RATING: &str = "sustainability_rating";
    pub const REGULATION_LEVEL: &str = "regulation_level";
    pub const CERTIFICATION_AVAILABLE: &str = "certification_available";
    pub const CONSERVATION_IMPACT: &str = "conservation_impact";
    pub const COMMON_ISSUES: &str = "common_issues";
    pub const BEST_PRACTICES: &str = "best_practices";

    /// Welfare rating used by wild-harvest operations.
    pub const WILD_WELFARE: &str = "N/A (Wild)";

    pub const REQUIRED: [&str; 12] = [
        COUNTRY,
        PRIMARY_SPECIES_FARMED,
        FARMING_METHOD,
        ANNUAL_PRODUCTION_SKINS,
        ETHICAL_SCORE,
        ANIMAL_WELFARE_RATING,
        SUSTAINABILITY_RATING,
        REGULATION_LEVEL,
        CERTIFICATION_AVAILABLE,
        CONSERVATION_IMPACT,
        COMMON_ISSUES,
        BEST_PRACTICES,
    ];
}
