use crate::client::models::{ChartType, Row};
use crate::widget::table::display_value;
use serde::Serialize;
use serde_json::Value;

pub const DEFAULT_PALETTE: [&str; 5] = ["#0088FE", "#00C49F", "#FFBB28", "#FF8042", "#8884d8"];
pub const SERIES_COLOR: &str = "#8884d8";

// Used when the first row has a single column
const FALLBACK_VALUE_KEY: &str = "value";

/// Fixed-size list of sector colors, handed out by row index.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<String>,
}

impl Palette {
    pub fn new(colors: Vec<String>) -> Self {
        if colors.is_empty() {
            return Self::default();
        }
        Self { colors }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn color(&self, index: usize) -> &str {
        &self.colors[index % self.len()]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    Bar,
    Line,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    pub category: String,
    /// None when the cell is missing or not numeric
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sector {
    pub label: String,
    pub magnitude: Option<f64>,
    pub color: String,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ChartEncoding {
    /// Category on the horizontal axis, one plotted series
    Series {
        series: SeriesKind,
        category_key: String,
        value_key: String,
        color: String,
        points: Vec<Point>,
    },
    Pie {
        category_key: String,
        value_key: String,
        sectors: Vec<Sector>,
    },
}

impl ChartEncoding {
    pub fn category_key(&self) -> &str {
        match self {
            ChartEncoding::Series { category_key, .. } | ChartEncoding::Pie { category_key, .. } => {
                category_key
            }
        }
    }

    pub fn value_key(&self) -> &str {
        match self {
            ChartEncoding::Series { value_key, .. } | ChartEncoding::Pie { value_key, .. } => {
                value_key
            }
        }
    }

    /// Largest plotted value, used to scale bars
    pub fn max_value(&self) -> f64 {
        match self {
            ChartEncoding::Series { points, .. } => {
                points.iter().filter_map(|p| p.value).fold(0.0, f64::max)
            }
            ChartEncoding::Pie { sectors, .. } => {
                sectors.iter().filter_map(|s| s.magnitude).fold(0.0, f64::max)
            }
        }
    }
}

/// Derives the chart for a result, or None when there is nothing to draw.
/// Table, Trend and unrecognized chart types fall back to the table view.
pub fn encode(chart_type: Option<&ChartType>, rows: &[Row], palette: &Palette) -> Option<ChartEncoding> {
    let chart_type = chart_type?;
    let first = rows.first()?;

    let mut keys = first.keys();
    let category_key = keys.next()?.clone();
    let value_key = keys
        .next()
        .cloned()
        .unwrap_or_else(|| FALLBACK_VALUE_KEY.to_string());

    let series = match chart_type {
        ChartType::Bar => SeriesKind::Bar,
        ChartType::Line => SeriesKind::Line,
        ChartType::Pie => return Some(encode_pie(rows, category_key, value_key, palette)),
        ChartType::Table | ChartType::Trend | ChartType::Unknown => return None,
    };

    let points = rows
        .iter()
        .map(|row| Point {
            category: category_of(row, &category_key),
            value: numeric(row.get(&value_key)),
        })
        .collect();

    Some(ChartEncoding::Series {
        series,
        category_key,
        value_key,
        color: SERIES_COLOR.to_string(),
        points,
    })
}

fn encode_pie(rows: &[Row], category_key: String, value_key: String, palette: &Palette) -> ChartEncoding {
    let magnitudes: Vec<Option<f64>> = rows.iter().map(|row| numeric(row.get(&value_key))).collect();
    let total: f64 = magnitudes.iter().flatten().sum();

    let sectors = rows
        .iter()
        .zip(magnitudes)
        .enumerate()
        .map(|(index, (row, magnitude))| Sector {
            label: category_of(row, &category_key),
            magnitude,
            color: palette.color(index).to_string(),
            percent: match magnitude {
                Some(m) if total > 0.0 => m * 100.0 / total,
                _ => 0.0,
            },
        })
        .collect();

    ChartEncoding::Pie {
        category_key,
        value_key,
        sectors,
    }
}

fn category_of(row: &Row, key: &str) -> String {
    row.get(key).map(display_value).unwrap_or_default()
}

// Numbers plot as-is; numeric text (DECIMAL columns often arrive as strings) is parsed.
// "NaN" and "inf" parse as f64 but are not plottable magnitudes.
fn numeric(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}
