use serde::Serialize;

use crate::charts::{escape_html, Chart};
use crate::config::colors;
use crate::error::DashError;

pub const BRAND: &str = "Snakey Dashboard";
const BOOTSTRAP_CSS: &str = "https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css";
const PLOTLY_JS: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// `(path, label)` for every navigation link, in display order.
pub const NAV_LINKS: [(&str, &str); 5] = [
    ("/", "US Overview"),
    ("/global", "Global View"),
    ("/domesticated", "Domesticated Snakes"),
    ("/media", "Snakes in Media"),
    ("/farming", "Farming Ethics"),
];

// ── Page model ──────────────────────────────────────────────────────────────

/// Bootstrap contextual colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Tone {
    Primary,
    Success,
    Warning,
    Danger,
    Info,
}

impl Tone {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Danger => "danger",
            Self::Info => "info",
        }
    }
}

/// Headline number with a caption.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Card {
    pub value: String,
    pub label: String,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Alert {
    pub heading: String,
    pub paragraphs: Vec<String>,
    pub items: Vec<String>,
    pub footer: Option<String>,
    pub tone: Option<Tone>,
}

impl Alert {
    pub fn new(tone: Tone, heading: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            tone: Some(tone),
            ..Self::default()
        }
    }

    pub fn paragraph(mut self, text: impl Into<String>) -> Self {
        self.paragraphs.push(text.into());
        self
    }

    pub fn items(mut self, items: impl IntoIterator<Item = String>) -> Self {
        self.items.extend(items);
        self
    }

    pub fn footer(mut self, text: impl Into<String>) -> Self {
        self.footer = Some(text.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableCell {
    pub text: String,
    pub tone: Option<Tone>,
}

impl TableCell {
    pub fn toned(text: impl Into<String>, tone: Option<Tone>) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }
}

impl From<String> for TableCell {
    fn from(text: String) -> Self {
        Self::toned(text, None)
    }
}

impl From<&str> for TableCell {
    fn from(text: &str) -> Self {
        Self::toned(text, None)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<TableCell>>,
}

impl Table {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<TableCell>) {
        self.rows.push(row);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Block {
    Chart {
        heading: Option<String>,
        caption: Option<String>,
        chart: Chart,
    },
    Text {
        heading: String,
        tone: Option<Tone>,
        body: String,
    },
    List {
        heading: String,
        items: Vec<String>,
    },
    Table(Table),
    Alert(Alert),
}

impl Block {
    pub fn chart(chart: Chart) -> Self {
        Block::Chart {
            heading: None,
            caption: None,
            chart,
        }
    }

    pub fn captioned(heading: &str, caption: &str, chart: Chart) -> Self {
        Block::Chart {
            heading: Some(heading.to_string()),
            caption: Some(caption.to_string()),
            chart,
        }
    }

    pub fn text(heading: &str, tone: Option<Tone>, body: impl Into<String>) -> Self {
        Block::Text {
            heading: heading.to_string(),
            tone,
            body: body.into(),
        }
    }
}

/// A block and its share of the 12-column grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub width: u8,
    pub block: Block,
}

impl Column {
    pub fn new(width: u8, block: Block) -> Self {
        Self {
            width: width.clamp(1, 12),
            block,
        }
    }

    pub fn full(block: Block) -> Self {
        Self::new(12, block)
    }

    pub fn half(block: Block) -> Self {
        Self::new(6, block)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Section {
    Heading(String),
    Row(Vec<Column>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub title: String,
    pub intro: Option<Alert>,
    pub cards: Vec<Card>,
    pub sections: Vec<Section>,
}

impl Page {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            intro: None,
            cards: Vec::new(),
            sections: Vec::new(),
        }
    }

    pub fn intro(mut self, alert: Alert) -> Self {
        self.intro = Some(alert);
        self
    }

    pub fn card(mut self, value: impl Into<String>, label: &str, tone: Tone) -> Self {
        self.cards.push(Card {
            value: value.into(),
            label: label.to_string(),
            tone,
        });
        self
    }

    pub fn heading(mut self, text: &str) -> Self {
        self.sections.push(Section::Heading(text.to_string()));
        self
    }

    pub fn row(mut self, columns: Vec<Column>) -> Self {
        self.sections.push(Section::Row(columns));
        self
    }

    pub fn charts(&self) -> impl Iterator<Item = &Chart> {
        self.blocks().filter_map(|b| match b {
            Block::Chart { chart, .. } => Some(chart),
            _ => None,
        })
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.sections.iter().flat_map(|s| match s {
            Section::Row(cols) => cols.iter().map(|c| &c.block).collect::<Vec<_>>(),
            Section::Heading(_) => Vec::new(),
        })
    }

    pub fn card_value(&self, label: &str) -> Option<&str> {
        self.cards
            .iter()
            .find(|c| c.label == label)
            .map(|c| c.value.as_str())
    }
}

// ── Rendering ───────────────────────────────────────────────────────────────

/// Full HTML document for `page`, with `active_path` highlighted in the nav.
pub fn render_document(page: &Page, active_path: &str) -> Result<String, DashError> {
    let mut body = String::new();
    body.push_str(&format!(
        r#"<h1 class="mt-4 mb-4 text-center">{}</h1>"#,
        escape_html(&page.title)
    ));
    if let Some(intro) = &page.intro {
        body.push_str(&row_html(&alert_html(intro)));
    }
    if !page.cards.is_empty() {
        let width = (12 / page.cards.len()).max(1);
        let cols: String = page
            .cards
            .iter()
            .map(|c| format!(r#"<div class="col-md-{width}">{}</div>"#, card_html(c)))
            .collect();
        body.push_str(&row_html(&cols));
    }
    for section in &page.sections {
        match section {
            Section::Heading(text) => body.push_str(&format!(
                r#"<h2 class="mt-5 mb-4">{}</h2>"#,
                escape_html(text)
            )),
            Section::Row(columns) => {
                let mut cols = String::new();
                for col in columns {
                    cols.push_str(&format!(
                        r#"<div class="col-md-{}">{}</div>"#,
                        col.width,
                        block_html(&col.block)?
                    ));
                }
                body.push_str(&row_html(&cols));
            }
        }
    }
    Ok(shell(&page.title, active_path, &body))
}

pub fn not_found_page() -> String {
    shell(
        "404: Page not found",
        "",
        r#"<h1 class="text-center">404: Page not found</h1>
<p class="text-center">The page you're looking for doesn't exist.</p>"#,
    )
}

/// Page shown when a renderer fails, e.g. on a missing data file.
pub fn error_page(active_path: &str, message: &str) -> String {
    shell(
        "Error",
        active_path,
        &format!(
            r#"<div class="alert alert-danger mt-4"><h5 class="alert-heading">This page could not be rendered</h5><p class="mb-0">{}</p></div>"#,
            escape_html(message)
        ),
    )
}

fn shell(title: &str, active_path: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | {BRAND}</title>
<link rel="stylesheet" href="{BOOTSTRAP_CSS}">
<script src="{PLOTLY_JS}" charset="utf-8"></script>
</head>
<body style="background-color: {background}; color: {text};">
{nav}
<div class="container-fluid" style="padding: 20px;">
{body}
</div>
</body>
</html>
"#,
        title = escape_html(title),
        background = colors::BACKGROUND,
        text = colors::TEXT,
        nav = navbar_html(active_path),
    )
}

pub fn navbar_html(active_path: &str) -> String {
    let links: String = NAV_LINKS
        .iter()
        .map(|(path, label)| {
            let active = *path == active_path;
            format!(
                r#"<li class="nav-item"><a class="nav-link{}" href="{path}"{}>{label}</a></li>"#,
                if active { " active" } else { "" },
                if active { r#" aria-current="page""# } else { "" },
            )
        })
        .collect();
    format!(
        r#"<nav class="navbar navbar-expand-lg navbar-dark bg-dark">
<div class="container-fluid">
<a class="navbar-brand" href="/">{BRAND}</a>
<ul class="navbar-nav ms-auto">{links}</ul>
</div>
</nav>"#
    )
}

fn row_html(inner: &str) -> String {
    format!(r#"<div class="row mb-4">{inner}</div>"#)
}

fn card_html(card: &Card) -> String {
    let tone = card.tone.as_str();
    format!(
        r#"<div class="card border-{tone}"><div class="card-body"><h4 class="card-title text-center">{}</h4><p class="card-text text-center text-muted">{}</p></div></div>"#,
        escape_html(&card.value),
        escape_html(&card.label),
    )
}

fn alert_html(alert: &Alert) -> String {
    let tone = alert.tone.unwrap_or(Tone::Info).as_str();
    let mut html = format!(
        r#"<div class="col"><div class="alert alert-{tone}"><h5 class="alert-heading">{}</h5>"#,
        escape_html(&alert.heading)
    );
    for p in &alert.paragraphs {
        html.push_str(&format!("<p>{}</p>", escape_html(p)));
    }
    if !alert.items.is_empty() {
        html.push_str(&list_html(&alert.items));
    }
    if let Some(footer) = &alert.footer {
        html.push_str(&format!(
            r#"<hr><p class="mb-0">{}</p>"#,
            escape_html(footer)
        ));
    }
    html.push_str("</div></div>");
    html
}

fn list_html(items: &[String]) -> String {
    let lis: String = items
        .iter()
        .map(|i| format!("<li>{}</li>", escape_html(i)))
        .collect();
    format!("<ul>{lis}</ul>")
}

fn block_html(block: &Block) -> Result<String, DashError> {
    let inner = match block {
        Block::Chart {
            heading,
            caption,
            chart,
        } => {
            let mut html = String::new();
            if let Some(h) = heading {
                html.push_str(&format!(r#"<h5 class="card-title">{}</h5>"#, escape_html(h)));
            }
            if let Some(c) = caption {
                html.push_str(&format!(
                    r#"<p class="card-text text-muted">{}</p>"#,
                    escape_html(c)
                ));
            }
            html.push_str(&chart.to_html()?);
            html
        }
        Block::Text {
            heading,
            tone,
            body,
        } => {
            let class = tone
                .map(|t| format!(" text-{}", t.as_str()))
                .unwrap_or_default();
            format!(
                r#"<h5 class="card-title{class}">{}</h5><p>{}</p>"#,
                escape_html(heading),
                escape_html(body)
            )
        }
        Block::List { heading, items } => format!(
            r#"<h5 class="card-title">{}</h5>{}"#,
            escape_html(heading),
            list_html(items)
        ),
        Block::Table(table) => table_html(table),
        Block::Alert(alert) => return Ok(alert_html(alert)),
    };
    Ok(format!(
        r#"<div class="card mb-3 h-100"><div class="card-body">{inner}</div></div>"#
    ))
}

fn table_html(table: &Table) -> String {
    let head: String = table
        .columns
        .iter()
        .map(|c| format!(r#"<th scope="col">{}</th>"#, escape_html(c)))
        .collect();
    let body: String = table
        .rows
        .iter()
        .map(|row| {
            let cells: String = row
                .iter()
                .map(|cell| match cell.tone {
                    Some(t) => format!(
                        r#"<td class="table-{}">{}</td>"#,
                        t.as_str(),
                        escape_html(&cell.text)
                    ),
                    None => format!("<td>{}</td>", escape_html(&cell.text)),
                })
                .collect();
            format!("<tr>{cells}</tr>")
        })
        .collect();
    format!(
        r#"<div class="table-responsive"><table class="table table-striped table-sm"><thead class="table-dark"><tr>{head}</tr></thead><tbody>{body}</tbody></table></div>"#
    )
}
