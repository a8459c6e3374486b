pub mod domesticated;
pub mod farming;
pub mod global_view;
pub mod media;
pub mod us_overview;

use crate::error::DashError;
use crate::layout::Page;
use crate::loader::DataSource;

pub type Renderer = fn(&DataSource) -> Result<Page, DashError>;

#[derive(Debug, Clone, Copy)]
pub struct Route {
    pub path: &'static str,
    pub render: Renderer,
}

/// Static path → renderer table.
pub static ROUTES: [Route; 5] = [
    Route {
        path: "/",
        render: us_overview::render,
    },
    Route {
        path: "/global",
        render: global_view::render,
    },
    Route {
        path: "/domesticated",
        render: domesticated::render,
    },
    Route {
        path: "/media",
        render: media::render,
    },
    Route {
        path: "/farming",
        render: farming::render,
    },
];

pub fn lookup(path: &str) -> Option<&'static Route> {
    ROUTES.iter().find(|r| r.path == path)
}

/// Value shown when a lookup has no answer.
pub(crate) const NOT_AVAILABLE: &str = "N/A";

/// `1234567` → `"1,234,567"`.
pub(crate) fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// First `limit` distinct non-empty values, in order of appearance.
pub(crate) fn first_unique<'a>(values: impl IntoIterator<Item = &'a str>, limit: usize) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for v in values {
        if seen.len() == limit {
            break;
        }
        if !v.is_empty() && !seen.iter().any(|s| s == v) {
            seen.push(v.to_string());
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousands_separators() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1000), "1,000");
        assert_eq!(thousands(1234567), "1,234,567");
    }

    #[test]
    fn first_unique_skips_blanks_and_repeats() {
        let got = first_unique(["a", "", "b", "a", "c"], 2);
        assert_eq!(got, vec!["a", "b"]);
    }

    #[test]
    fn every_nav_path_has_a_route() {
        for (path, _) in crate::layout::NAV_LINKS {
            assert!(lookup(path).is_some(), "no route for {path}");
        }
        assert!(lookup("/missing").is_none());
    }
}
