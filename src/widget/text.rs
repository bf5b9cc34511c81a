use crate::client::QueryService;
use crate::config::WidgetConfig;
use crate::widget::WidgetView;
use crate::widget::chart::{ChartEncoding, Palette};
use crate::widget::controller::{ResultController, SubmitRejected};
use std::fmt::Write;
use thiserror::Error;
use tracing::{info, warn};

const BAR_WIDTH: f64 = 40.0;

/// Plain-text rendering of the widget for terminal use.
pub fn render_text(view: &WidgetView) -> String {
    let mut out = String::new();

    if view.loading {
        let _ = writeln!(out, "Loading: {}", view.question);
    }
    if let Some(error) = &view.error {
        let _ = writeln!(out, "Error: {}", error);
    }

    let Some(result) = &view.result else {
        return out;
    };

    if view.stale {
        let _ = writeln!(out, "(previous result for \"{}\")", result.question);
    }

    if let Some(answer) = &result.text_response {
        let _ = writeln!(out, "{}\n", answer);
    }

    if let Some(panel) = &result.insights {
        let _ = writeln!(out, "== {} ==\n", panel.headline);
        for insight in &panel.insights {
            let _ = writeln!(
                out,
                "({}) {}",
                insight.significance.color_name(),
                insight.title
            );
            let _ = writeln!(out, "      {}", insight.description);
        }
        if !panel.explanation.is_empty() {
            let _ = writeln!(out, "\n{}", panel.explanation);
        }
    }

    if let Some(chart) = &result.chart {
        let _ = writeln!(
            out,
            "\nChart ({}): {} by {}",
            result.chart_type.unwrap_or_default(),
            chart.value_key(),
            chart.category_key()
        );
        write_chart(&mut out, chart);
    }

    if let Some(table) = &result.table {
        let _ = writeln!(out, "\nData ({} rows)", result.meta.row_count);
        let widths: Vec<usize> = table
            .columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                table
                    .rows
                    .iter()
                    .filter_map(|row| row.get(i))
                    .map(|cell| cell.chars().count())
                    .chain(std::iter::once(column.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        write_row(&mut out, &table.columns, &widths);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        write_row(&mut out, &rule, &widths);
        for row in &table.rows {
            write_row(&mut out, row, &widths);
        }
    }

    if let Some(panel) = &result.insights {
        if !panel.suggested_questions.is_empty() {
            let _ = writeln!(out, "\nNext questions:");
            for question in &panel.suggested_questions {
                let _ = writeln!(out, "  * {}", question);
            }
        }
    }

    let _ = write!(out, "\nExecution time: {}ms", result.meta.execution_time_ms);
    if result.meta.cached {
        let _ = write!(out, " | cached");
    }
    let _ = writeln!(out);
    if !result.meta.generated_query.is_empty() {
        let _ = writeln!(out, "SQL: {}", result.meta.generated_query);
    }

    out
}

#[derive(Debug, Error)]
pub enum AskError {
    #[error(transparent)]
    Rejected(#[from] SubmitRejected),

    /// The query failed; `output` still holds the rendered widget
    #[error("{message}")]
    Failed { message: String, output: String },
}

/// Runs one submit cycle and renders the outcome for the terminal.
pub async fn ask<S>(config: &WidgetConfig, service: &S, question: &str) -> Result<String, AskError>
where
    S: QueryService + ?Sized,
{
    let mut controller = ResultController::new(config);
    controller.set_question(question);

    let state = controller.submit(service).await?;
    info!("Question answered with state {:?}", state);

    let palette = Palette::new(config.palette.clone());
    let view = WidgetView::from_session(controller.session(), state, &palette);
    let output = render_text(&view);

    match view.error {
        Some(message) => {
            warn!("Query did not succeed: {}", message);
            Err(AskError::Failed { message, output })
        }
        None => Ok(output),
    }
}

fn write_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = width))
        .collect();
    let _ = writeln!(out, "{}", padded.join(" | ").trim_end());
}

fn write_chart(out: &mut String, chart: &ChartEncoding) {
    let max = chart.max_value();
    let scale = |value: f64| {
        if max > 0.0 {
            (value / max * BAR_WIDTH).round() as usize
        } else {
            0
        }
    };

    match chart {
        ChartEncoding::Series { points, .. } => {
            for point in points {
                let value = point.value.unwrap_or(0.0);
                let _ = writeln!(out, "{:>12} {} {}", point.category, "#".repeat(scale(value)), value);
            }
        }
        ChartEncoding::Pie { sectors, .. } => {
            for sector in sectors {
                let _ = writeln!(out, "{}: {:.0}%", sector.label, sector.percent);
            }
        }
    }
}
