use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One record of a tabular result. Key order is the order the service sent
/// (serde_json is built with `preserve_order`).
pub type Row = Map<String, Value>;

// Request body for the query service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub question: String,
    #[serde(default = "default_true")]
    pub include_analysis: bool,
    #[serde(default = "default_true")]
    pub use_cache: bool,
}

impl QueryRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            include_analysis: true,
            use_cache: true,
        }
    }
}

// Response body from the query service.
// Everything is defaulted so a sparse body still deserializes; the renderers
// deal with whatever is missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub question: String,
    #[serde(rename = "sql", default)]
    pub generated_query: String,
    #[serde(rename = "data", default)]
    pub rows: Vec<Row>,
    #[serde(default)]
    pub execution_time_ms: u64,
    #[serde(default)]
    pub row_count: u64,
    #[serde(default)]
    pub analysis: Option<Analysis>,
    #[serde(default)]
    pub cached: bool,
    /// Plain answer for questions the service did not turn into a query
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_response: Option<String>,
}

impl QueryResponse {
    pub fn chart_type(&self) -> Option<&ChartType> {
        self.analysis.as_ref().and_then(|a| a.chart_type.as_ref())
    }
}

/// Narrative generated by the service alongside the rows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub insights: Vec<Insight>,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub suggested_questions: Vec<String>,
    #[serde(default)]
    pub chart_type: Option<ChartType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub significance: Significance,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Significance {
    High,
    Medium,
    // Anything the service sends that isn't High/Medium is shown as Low
    #[default]
    #[serde(other)]
    Low,
}

impl Significance {
    /// Border color used for the insight card
    pub fn color(&self) -> &'static str {
        match self {
            Significance::High => "#f00",
            Significance::Medium => "#fa0",
            Significance::Low => "#0a0",
        }
    }

    pub fn color_name(&self) -> &'static str {
        match self {
            Significance::High => "red",
            Significance::Medium => "amber",
            Significance::Low => "green",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartType {
    Bar,
    Line,
    Pie,
    Table,
    Trend,
    #[serde(other)]
    Unknown,
}

impl ChartType {
    pub fn label(&self) -> &'static str {
        match self {
            ChartType::Bar => "Bar",
            ChartType::Line => "Line",
            ChartType::Pie => "Pie",
            ChartType::Table => "Table",
            ChartType::Trend => "Trend",
            ChartType::Unknown => "Unknown",
        }
    }
}

fn default_true() -> bool {
    true
}
