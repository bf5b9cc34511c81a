// The widget: one session, and the views derived from whatever result it holds.
// Nothing here knows about HTTP or HTML; the web module and the text renderer
// both consume a WidgetView.
pub mod chart;
pub mod controller;
pub mod insights;
pub mod table;
pub mod text;

use chrono::{DateTime, Utc};
use serde::Serialize;

use chart::{ChartEncoding, Palette};
use controller::{ControllerState, ResultSession};
use insights::InsightPanel;
use table::TableView;

#[derive(Debug, Clone, Serialize)]
pub struct ResultMeta {
    pub execution_time_ms: u64,
    pub cached: bool,
    pub generated_query: String,
    pub row_count: u64,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultView {
    pub question: String,
    pub insights: Option<InsightPanel>,
    pub chart_type: Option<&'static str>,
    pub chart: Option<ChartEncoding>,
    pub table: Option<TableView>,
    pub text_response: Option<String>,
    pub meta: ResultMeta,
}

/// Everything a renderer needs to draw the widget
#[derive(Debug, Clone, Serialize)]
pub struct WidgetView {
    pub state: ControllerState,
    pub question: String,
    pub include_analysis: bool,
    pub loading: bool,
    pub error: Option<String>,
    pub stale: bool,
    pub result: Option<ResultView>,
}

impl WidgetView {
    pub fn from_session(session: &ResultSession, state: ControllerState, palette: &Palette) -> Self {
        let result = session.result.as_ref().map(|response| {
            let chart_type = response.chart_type();
            ResultView {
                question: response.question.clone(),
                insights: response.analysis.as_ref().map(InsightPanel::from_analysis),
                chart_type: chart_type.map(|c| c.label()),
                chart: chart::encode(chart_type, &response.rows, palette),
                table: table::render(&response.rows),
                text_response: response.text_response.clone(),
                meta: ResultMeta {
                    execution_time_ms: response.execution_time_ms,
                    cached: response.cached,
                    generated_query: response.generated_query.clone(),
                    row_count: response.row_count,
                    completed_at: session.completed_at,
                },
            }
        });

        Self {
            state,
            question: session.question.clone(),
            include_analysis: session.include_analysis,
            loading: session.loading,
            error: session.error.clone(),
            stale: session.stale,
            result,
        }
    }
}
