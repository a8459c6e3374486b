use std::env;
use std::path::PathBuf;

pub const ENV_BIND: &str = "SNAKEY_BIND";
pub const ENV_DATA_DIR: &str = "SNAKEY_DATA_DIR";
pub const ENV_LOG_JSON: &str = "SNAKEY_LOG_JSON";

pub const DEFAULT_BIND: &str = "0.0.0.0:8050";
pub const DEFAULT_DATA_DIR: &str = "data/raw";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub bind_addr: String,
    pub data_dir: PathBuf,
    pub log_json: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            log_json: false,
        }
    }
}

impl DashboardConfig {
    /// Defaults overridden by `SNAKEY_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: lookup(ENV_BIND)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.bind_addr),
            data_dir: lookup(ENV_DATA_DIR)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            log_json: lookup(ENV_LOG_JSON)
                .as_deref()
                .and_then(parse_bool)
                .unwrap_or(defaults.log_json),
        }
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v {
        "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
        "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
        _ => None,
    }
}

// ── Palette ─────────────────────────────────────────────────────────────────

pub mod colors {
    pub const PRIMARY: &str = "#2C3E50";
    pub const SECONDARY: &str = "#E74C3C";
    pub const SUCCESS: &str = "#27AE60";
    pub const WARNING: &str = "#F39C12";
    pub const INFO: &str = "#3498DB";
    pub const BACKGROUND: &str = "#ECF0F1";
    pub const TEXT: &str = "#2C3E50";
}

/// Lethality bands on the 0-10 scale.
pub mod lethality_colors {
    /// 0-3
    pub const LOW: &str = "#27AE60";
    /// 4-6
    pub const MEDIUM: &str = "#F39C12";
    /// 7-8
    pub const HIGH: &str = "#E74C3C";
    /// 9-10
    pub const EXTREME: &str = "#8B0000";

    pub fn for_score(score: f64) -> &'static str {
        if score >= 9.0 {
            EXTREME
        } else if score >= 7.0 {
            HIGH
        } else if score >= 4.0 {
            MEDIUM
        } else {
            LOW
        }
    }
}

/// Plotly's qualitative "Set3" and "Set2" sequences.
pub const SET3: [&str; 12] = [
    "#8dd3c7", "#ffffb3", "#bebada", "#fb8072", "#80b1d3", "#fdb462", "#b3de69", "#fccde5",
    "#d9d9d9", "#bc80bd", "#ccebc5", "#ffed6f",
];
pub const SET2: [&str; 8] = [
    "#66c2a5", "#fc8d62", "#8da0cb", "#e78ac3", "#a6d854", "#ffd92f", "#e5c494", "#b3b3b3",
];
