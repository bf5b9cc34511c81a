use crate::client::models::Row;
use serde::Serialize;
use serde_json::Value;

/// Generic projection of a result set: the first row's keys are the columns,
/// every row is rendered in the order the service sent it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableView {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub row_count: usize,
}

pub fn render(rows: &[Row]) -> Option<TableView> {
    let first = rows.first()?;
    let columns: Vec<String> = first.keys().cloned().collect();

    // Rows that don't carry a declared column get an empty cell; extra keys are ignored
    let body = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|column| row.get(column).map(display_value).unwrap_or_default())
                .collect()
        })
        .collect::<Vec<Vec<String>>>();

    Some(TableView {
        columns,
        row_count: body.len(),
        rows: body,
    })
}

/// Display text for one cell
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}
