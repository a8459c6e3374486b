use serde::Serialize;
use serde_json::{json, Value};

use crate::aggregation::{
    filter_by_flag, partition_by, region_heatmap, top_n_by_metric, value_counts, Metric,
    PairCount,
};
use crate::config::{colors, SET3};
use crate::error::DashError;
use crate::model::{self, Flag, Named, SnakeRecord, UsSnake};

pub const DEFAULT_HEIGHT: u32 = 400;

// ── Chart ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub id: String,
    pub title: String,
    pub height: u32,
    pub figure: Value,
}

impl Chart {
    pub fn new(id: &str, title: &str, data: Vec<Value>, mut layout: Value) -> Self {
        layout["title"] = json!({ "text": title });
        layout["height"] = json!(DEFAULT_HEIGHT);
        Self {
            id: id.to_string(),
            title: title.to_string(),
            height: DEFAULT_HEIGHT,
            figure: json!({ "data": data, "layout": layout }),
        }
    }

    pub fn with_height(mut self, height: u32) -> Self {
        self.height = height;
        self.figure["layout"]["height"] = json!(height);
        self
    }

    /// Set one top-level layout key, replacing any previous value.
    pub fn with_layout(mut self, key: &str, value: Value) -> Self {
        self.figure["layout"][key] = value;
        self
    }

    /// Switch the x axis to a log scale, keeping its title.
    pub fn with_log_x(mut self) -> Self {
        self.figure["layout"]["xaxis"]["type"] = json!("log");
        self
    }

    pub fn traces(&self) -> &[Value] {
        self.figure["data"].as_array().map(Vec::as_slice).unwrap_or(&[])
    }

    /// `<div>` placeholder plus the `Plotly.newPlot` call that fills it.
    pub fn to_html(&self) -> Result<String, DashError> {
        let id_js = script_safe_json(&Value::String(self.id.clone()))?;
        let figure_js = script_safe_json(&self.figure)?;
        Ok(format!(
            r##"<div id="{id}" class="chart" style="min-height:{height}px;"></div>
<script>Plotly.newPlot({id_js}, {figure_js}, {{"responsive": true, "displaylogo": false}});</script>"##,
            id = escape_html(&self.id),
            height = self.height,
        ))
    }
}

/// Serialize to JSON that cannot terminate or open markup inside `<script>`.
///
/// `<`, `>` and `&` only ever occur inside JSON strings, where the unicode
/// escapes are equivalent.
pub fn script_safe_json(value: &Value) -> Result<String, DashError> {
    let raw = serde_json::to_string(value)?;
    Ok(raw
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026"))
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

// ── Options ─────────────────────────────────────────────────────────────────

/// Axis titles.
#[derive(Debug, Clone, Copy)]
pub struct Axes<'a> {
    pub x: &'a str,
    pub y: &'a str,
}

impl<'a> Axes<'a> {
    pub fn new(x: &'a str, y: &'a str) -> Self {
        Self { x, y }
    }

    fn layout(&self) -> Value {
        json!({
            "xaxis": { "title": { "text": self.x } },
            "yaxis": { "title": { "text": self.y } },
        })
    }
}

/// How bars are filled.
#[derive(Debug, Clone, Copy)]
pub enum BarColor<'a> {
    Solid(&'a str),
    /// One colour per bar, in bar order.
    PerBar(&'a [&'a str]),
    /// Shade each bar by its own value.
    Scale {
        scale: &'a str,
        reverse: bool,
        range: Option<(f64, f64)>,
    },
    /// Shade each bar by a companion series of the same length.
    ShadeBy {
        scale: &'a str,
        values: &'a [f64],
        label: &'a str,
    },
}

impl<'a> BarColor<'a> {
    pub fn scale(scale: &'a str) -> Self {
        BarColor::Scale {
            scale,
            reverse: false,
            range: None,
        }
    }

    fn marker(&self, values: &[f64]) -> Value {
        match *self {
            BarColor::Solid(c) => json!({ "color": c }),
            BarColor::PerBar(cs) => json!({ "color": cs }),
            BarColor::Scale {
                scale,
                reverse,
                range,
            } => {
                let mut marker = json!({
                    "color": values,
                    "colorscale": scale,
                    "reversescale": reverse,
                    "showscale": true,
                });
                if let Some((lo, hi)) = range {
                    marker["cmin"] = json!(lo);
                    marker["cmax"] = json!(hi);
                }
                marker
            }
            BarColor::ShadeBy {
                scale,
                values: shade,
                label,
            } => json!({
                "color": shade,
                "colorscale": scale,
                "showscale": true,
                "colorbar": { "title": { "text": label } },
            }),
        }
    }
}

/// One named bar series of a stacked or grouped chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub x: Vec<String>,
    pub y: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub x: Value,
    pub y: Value,
    /// Bubble area driver; `None` draws the default marker size.
    pub size: Option<f64>,
    pub group: String,
    pub shade: Option<f64>,
    pub text: String,
}

#[derive(Debug, Clone, Copy)]
pub enum Coloring<'a> {
    /// One trace per distinct `group`, first occurrence first.
    Groups {
        legend: &'a str,
        palette: fn(&str) -> Option<&'static str>,
    },
    /// A single trace shaded by `shade` on a continuous scale.
    Scale { scale: &'a str, label: &'a str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Geo {
    UsStates,
    Countries,
}

#[derive(Debug, Clone, Copy)]
pub struct ChoroplethStyle<'a> {
    pub geo: Geo,
    pub scale: &'a str,
    pub colorbar: &'a str,
    pub z_range: Option<(f64, f64)>,
}

/// Leave every group on the plotly default colour cycle.
pub fn no_palette(_: &str) -> Option<&'static str> {
    None
}

// ── Generic builders ────────────────────────────────────────────────────────

pub fn bar(
    id: &str,
    title: &str,
    x: &[String],
    y: &[f64],
    axes: Axes<'_>,
    color: BarColor<'_>,
) -> Chart {
    let trace = json!({
        "type": "bar",
        "x": x,
        "y": y,
        "marker": color.marker(y),
    });
    Chart::new(id, title, vec![trace], axes.layout())
}

/// Horizontal bars, largest at the top.
pub fn horizontal_bar(
    id: &str,
    title: &str,
    categories: &[String],
    values: &[f64],
    axes: Axes<'_>,
    color: BarColor<'_>,
) -> Chart {
    let trace = json!({
        "type": "bar",
        "orientation": "h",
        "x": values,
        "y": categories,
        "marker": color.marker(values),
    });
    let mut layout = axes.layout();
    layout["yaxis"]["categoryorder"] = json!("total ascending");
    Chart::new(id, title, vec![trace], layout)
}

fn multi_bar(
    id: &str,
    title: &str,
    series: &[Series],
    axes: Axes<'_>,
    mode: &str,
    palette: &[&str],
) -> Chart {
    let data = series
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let mut trace = json!({ "type": "bar", "name": s.name, "x": s.x, "y": s.y });
            if !palette.is_empty() {
                trace["marker"] = json!({ "color": palette[i % palette.len()] });
            }
            trace
        })
        .collect();
    let mut layout = axes.layout();
    layout["barmode"] = json!(mode);
    Chart::new(id, title, data, layout)
}

pub fn stacked_bar(id: &str, title: &str, series: &[Series], axes: Axes<'_>) -> Chart {
    multi_bar(id, title, series, axes, "stack", &[])
}

pub fn grouped_bar(
    id: &str,
    title: &str,
    series: &[Series],
    axes: Axes<'_>,
    palette: &[&str],
) -> Chart {
    multi_bar(id, title, series, axes, "group", palette)
}

/// Pie chart; `colors` is either empty (plotly default), a cycling
/// palette, or one colour per label.
pub fn pie(id: &str, title: &str, labels: &[String], values: &[f64], colors: &[&str]) -> Chart {
    let mut trace = json!({
        "type": "pie",
        "labels": labels,
        "values": values,
    });
    if !colors.is_empty() {
        let per_label: Vec<&str> = (0..labels.len()).map(|i| colors[i % colors.len()]).collect();
        trace["marker"] = json!({ "colors": per_label });
    }
    Chart::new(id, title, vec![trace], json!({}))
}

pub fn scatter(
    id: &str,
    title: &str,
    points: &[ScatterPoint],
    axes: Axes<'_>,
    coloring: Coloring<'_>,
) -> Chart {
    let max_size = points
        .iter()
        .filter_map(|p| p.size)
        .fold(0.0_f64, f64::max);

    let trace_for = |name: Option<&str>, pts: &[&ScatterPoint]| {
        let mut marker = json!({});
        if max_size > 0.0 {
            marker["size"] = json!(pts.iter().map(|p| p.size.unwrap_or(0.0)).collect::<Vec<_>>());
            marker["sizemode"] = json!("area");
            // Largest bubble gets a 40px diameter.
            marker["sizeref"] = json!(2.0 * max_size / (40.0 * 40.0));
            marker["sizemin"] = json!(4);
        }
        let mut trace = json!({
            "type": "scatter",
            "mode": "markers",
            "x": pts.iter().map(|p| &p.x).collect::<Vec<_>>(),
            "y": pts.iter().map(|p| &p.y).collect::<Vec<_>>(),
            "text": pts.iter().map(|p| p.text.as_str()).collect::<Vec<_>>(),
            "marker": marker,
        });
        if let Some(name) = name {
            trace["name"] = json!(name);
        }
        trace
    };

    let mut layout = axes.layout();
    let data = match coloring {
        Coloring::Groups { legend, palette } => {
            layout["legend"] = json!({ "title": { "text": legend } });
            partition_by(points, |p| p.group.clone())
                .into_iter()
                .map(|(group, pts)| {
                    let mut trace = trace_for(Some(group.as_str()), pts.as_slice());
                    if let Some(c) = palette(&group) {
                        trace["marker"]["color"] = json!(c);
                    }
                    trace
                })
                .collect()
        }
        Coloring::Scale { scale, label } => {
            let all: Vec<&ScatterPoint> = points.iter().collect();
            let mut trace = trace_for(None, all.as_slice());
            trace["marker"]["color"] = json!(points.iter().map(|p| p.shade).collect::<Vec<_>>());
            trace["marker"]["colorscale"] = json!(scale);
            trace["marker"]["showscale"] = json!(true);
            trace["marker"]["colorbar"] = json!({ "title": { "text": label } });
            vec![trace]
        }
    };
    Chart::new(id, title, data, layout)
}

/// Numeric histogram with a target bin count.
pub fn histogram(
    id: &str,
    title: &str,
    values: &[f64],
    nbins: u32,
    axes: Axes<'_>,
    color: &str,
) -> Chart {
    let trace = json!({
        "type": "histogram",
        "x": values,
        "nbinsx": nbins,
        "marker": { "color": color },
    });
    Chart::new(id, title, vec![trace], axes.layout()).with_layout("showlegend", json!(false))
}

/// Counts of categorical values. A non-empty `order` fixes the category
/// order on the axis; otherwise categories appear as first seen.
pub fn category_histogram(
    id: &str,
    title: &str,
    values: &[String],
    order: &[&str],
    axes: Axes<'_>,
    color: &str,
) -> Chart {
    let trace = json!({
        "type": "histogram",
        "x": values,
        "marker": { "color": color },
    });
    let mut layout = axes.layout();
    if !order.is_empty() {
        layout["xaxis"]["categoryorder"] = json!("array");
        layout["xaxis"]["categoryarray"] = json!(order);
    }
    Chart::new(id, title, vec![trace], layout)
}

pub fn choropleth(
    id: &str,
    title: &str,
    locations: &[String],
    z: &[f64],
    hover: &[String],
    style: ChoroplethStyle<'_>,
) -> Chart {
    let mut trace = json!({
        "type": "choropleth",
        "locations": locations,
        "z": z,
        "colorscale": style.scale,
        "colorbar": { "title": { "text": style.colorbar } },
    });
    if !hover.is_empty() {
        trace["text"] = json!(hover);
    }
    if let Some((lo, hi)) = style.z_range {
        trace["zmin"] = json!(lo);
        trace["zmax"] = json!(hi);
    }
    let layout = match style.geo {
        Geo::UsStates => {
            trace["locationmode"] = json!("USA-states");
            json!({ "geo": { "scope": "usa" } })
        }
        Geo::Countries => {
            trace["locationmode"] = json!("country names");
            json!({ "geo": { "showframe": false, "projection": { "type": "natural earth" } } })
        }
    };
    Chart::new(id, title, vec![trace], layout)
}

// ── Snake charts ────────────────────────────────────────────────────────────

/// Mean lethality per US state, 0-10 colour range.
pub fn lethality_heatmap(id: &str, rows: &[UsSnake], title: &str) -> Chart {
    let heat = region_heatmap(rows, |r| r.states.as_str(), model::lethality());
    let states: Vec<String> = heat.iter().map(|h| h.region.clone()).collect();
    let values: Vec<f64> = heat.iter().map(|h| h.value).collect();
    choropleth(
        id,
        title,
        &states,
        &values,
        &[],
        ChoroplethStyle {
            geo: Geo::UsStates,
            scale: "Reds",
            colorbar: "Lethality Score",
            z_range: Some((0.0, 10.0)),
        },
    )
    .with_height(600)
}

pub fn size_distribution<T: SnakeRecord>(id: &str, rows: &[T], title: &str) -> Chart {
    let lengths: Vec<f64> = rows.iter().map(|r| r.avg_length_cm()).collect();
    histogram(
        id,
        title,
        &lengths,
        30,
        Axes::new("Average Length (cm)", "Number of Species"),
        colors::PRIMARY,
    )
}

/// Venom types among the venomous rows.
pub fn venom_type_pie<T: SnakeRecord + Clone>(id: &str, rows: &[T], title: &str) -> Chart {
    let venomous = filter_by_flag(rows, |r| r.venomous(), Flag::Yes);
    let counts = value_counts(&venomous, |r| r.venom_type().to_string());
    let (labels, values) = split_counts(counts);
    pie(id, title, &labels, &values, &SET3)
}

pub fn conservation_status_bar<T: SnakeRecord>(id: &str, rows: &[T], title: &str) -> Chart {
    let counts = value_counts(rows, |r| r.conservation_status().to_string());
    let (labels, values) = split_counts(counts);
    bar(
        id,
        title,
        &labels,
        &values,
        Axes::new("Conservation Status", "Number of Species"),
        BarColor::Scale {
            scale: "RdYlGn",
            reverse: true,
            range: None,
        },
    )
    .with_layout("showlegend", json!(false))
}

/// Top `n` rows by `metric` as horizontal bars. With `band`, each bar is
/// coloured from its own value; otherwise bars share the Viridis scale.
pub fn top_species_bar<T: Named + Clone>(
    id: &str,
    rows: &[T],
    metric: Metric<T>,
    n: usize,
    band: Option<fn(f64) -> &'static str>,
    title: &str,
) -> Chart {
    let top = top_n_by_metric(rows, metric, n);
    let names: Vec<String> = top.iter().map(|r| r.display_name().to_string()).collect();
    let values: Vec<f64> = top.iter().filter_map(|r| metric.value(r)).collect();
    let banded: Vec<&str> = band
        .map(|f| values.iter().map(|v| f(*v)).collect())
        .unwrap_or_default();
    let color = match band {
        Some(_) => BarColor::PerBar(&banded),
        None => BarColor::scale("Viridis"),
    };
    horizontal_bar(
        id,
        title,
        &names,
        &values,
        Axes::new(metric.label, "Species"),
        color,
    )
}

/// Venomous rows only: average length against lethality, bubble by max
/// length, one colour per venom type.
pub fn size_vs_lethality<T: SnakeRecord>(id: &str, rows: &[T], title: &str) -> Chart {
    let points: Vec<ScatterPoint> = rows
        .iter()
        .filter(|r| r.venomous().is_yes())
        .map(|r| ScatterPoint {
            x: json!(r.avg_length_cm()),
            y: json!(r.lethality_score()),
            size: Some(r.max_length_cm()),
            group: r.venom_type().to_string(),
            shade: None,
            text: r.display_name().to_string(),
        })
        .collect();
    scatter(
        id,
        title,
        &points,
        Axes::new("Average Length (cm)", "Lethality Score"),
        Coloring::Groups {
            legend: "Venom Type",
            palette: no_palette,
        },
    )
    .with_height(500)
}

/// One series per distinct `second` key, x along the `first` keys.
pub fn series_from_pairs(pairs: &[PairCount<String, String>]) -> Vec<Series> {
    partition_by(pairs, |p| p.second.clone())
        .into_iter()
        .map(|(name, group)| Series {
            name,
            x: group.iter().map(|p| p.first.clone()).collect(),
            y: group.iter().map(|p| p.count as f64).collect(),
        })
        .collect()
}

/// Split `(label, count)` pairs into parallel label and value columns.
pub fn split_counts(counts: Vec<(String, usize)>) -> (Vec<String>, Vec<f64>) {
    counts.into_iter().map(|(k, n)| (k, n as f64)).unzip()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::lethality_colors::{HIGH, LOW, MEDIUM};

    fn snake(states: &str, name: &str, lethality: f64, venomous: Flag, venom: &str) -> UsSnake {
        UsSnake {
            states: states.to_string(),
            common_name: name.to_string(),
            lethality_score: lethality,
            venomous,
            venom_type: venom.to_string(),
            avg_length_cm: 100.0,
            max_length_cm: 150.0,
            conservation_status: "Least Concern".to_string(),
            invasive: Flag::No,
        }
    }

    fn rows() -> Vec<UsSnake> {
        vec![
            snake("FL, GA", "Eastern Diamondback", 8.0, Flag::Yes, "Hemotoxic"),
            snake("FL", "Coral Snake", 6.0, Flag::Yes, "Neurotoxic"),
            snake("TX", "Rat Snake", 0.0, Flag::No, "None"),
        ]
    }

    #[test]
    fn script_embedding_cannot_close_the_tag() {
        let fig = json!({ "title": "</script><script>alert(1)</script>" });
        let out = script_safe_json(&fig).unwrap();
        assert!(!out.contains("</script>"));
        let back: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(back, fig);
    }

    #[test]
    fn chart_html_mounts_plot_into_its_div() {
        let chart = bar(
            "demo",
            "Demo",
            &["a".to_string()],
            &[1.0],
            Axes::new("x", "y"),
            BarColor::Solid(colors::INFO),
        );
        let html = chart.to_html().unwrap();
        assert!(html.contains(r#"<div id="demo""#));
        assert!(html.contains(r#"Plotly.newPlot("demo""#));
        assert_eq!(chart.figure["layout"]["title"]["text"], "Demo");
    }

    #[test]
    fn heatmap_uses_state_codes_and_fixed_range() {
        let chart = lethality_heatmap("map", &rows(), "Lethality");
        let trace = &chart.traces()[0];
        assert_eq!(trace["locationmode"], "USA-states");
        assert_eq!(trace["locations"], json!(["FL", "GA", "TX"]));
        assert_eq!(trace["z"], json!([7.0, 8.0, 0.0]));
        assert_eq!(trace["zmin"], 0.0);
        assert_eq!(trace["zmax"], 10.0);
        assert_eq!(chart.height, 600);
    }

    #[test]
    fn venom_pie_counts_only_venomous() {
        let chart = venom_type_pie("pie", &rows(), "Venom");
        let trace = &chart.traces()[0];
        assert_eq!(trace["labels"], json!(["Hemotoxic", "Neurotoxic"]));
        assert_eq!(trace["values"], json!([1.0, 1.0]));
    }

    #[test]
    fn scatter_groups_by_venom_type() {
        let chart = size_vs_lethality("sc", &rows(), "Size");
        let names: Vec<&str> = chart
            .traces()
            .iter()
            .filter_map(|t| t["name"].as_str())
            .collect();
        assert_eq!(names, vec!["Hemotoxic", "Neurotoxic"]);
    }

    #[test]
    fn top_species_bar_is_descending() {
        let chart = top_species_bar("top", &rows(), model::lethality(), 2, None, "Top");
        let trace = &chart.traces()[0];
        assert_eq!(trace["y"], json!(["Eastern Diamondback", "Coral Snake"]));
        assert_eq!(trace["orientation"], "h");
        assert_eq!(trace["marker"]["colorscale"], "Viridis");
    }

    #[test]
    fn banded_bars_follow_lethality_colors() {
        let chart = top_species_bar(
            "top",
            &rows(),
            model::lethality(),
            3,
            Some(crate::config::lethality_colors::for_score),
            "Top",
        );
        let marker = &chart.traces()[0]["marker"];
        assert_eq!(marker["color"], json!([HIGH, MEDIUM, LOW]));
        assert!(marker.get("colorscale").is_none());
    }

    #[test]
    fn category_histogram_fixes_order() {
        let chart = category_histogram(
            "h",
            "Care",
            &["Advanced".to_string(), "Beginner".to_string()],
            &["Beginner", "Intermediate", "Advanced"],
            Axes::new("Care", "Count"),
            colors::INFO,
        );
        assert_eq!(
            chart.figure["layout"]["xaxis"]["categoryarray"],
            json!(["Beginner", "Intermediate", "Advanced"])
        );
    }

    #[test]
    fn pair_counts_become_one_series_per_second_key() {
        let pair = |a: &str, b: &str, n| PairCount {
            first: a.to_string(),
            second: b.to_string(),
            count: n,
        };
        let series = series_from_pairs(&[
            pair("Africa", "Neurotoxic", 3),
            pair("Africa", "Hemotoxic", 2),
            pair("Asia", "Neurotoxic", 4),
        ]);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].name, "Neurotoxic");
        assert_eq!(series[0].x, vec!["Africa", "Asia"]);
        assert_eq!(series[0].y, vec![3.0, 4.0]);
    }

    #[test]
    fn html_escaping() {
        assert_eq!(escape_html(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }
}
