//! Todo export rendering (CSV and JSON).

use tasklane_core::error::AppError;
use tasklane_entity::todo::Todo;

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Comma-separated values.
    Csv,
    /// Pretty-printed JSON array.
    Json,
}

impl ExportFormat {
    /// Parses a format from a query-string value.
    pub fn parse(value: &str) -> Result<Self, AppError> {
        match value {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(AppError::validation(format!(
                "Unknown export format '{other}', expected 'csv' or 'json'"
            ))),
        }
    }
}

/// Renders todos in the requested format, returning the body and its
/// content type.
pub fn render(todos: &[Todo], format: ExportFormat) -> Result<(Vec<u8>, &'static str), AppError> {
    match format {
        ExportFormat::Json => {
            let body = serde_json::to_vec_pretty(todos)?;
            Ok((body, "application/json"))
        }
        ExportFormat::Csv => Ok((to_csv(todos).into_bytes(), "text/csv")),
    }
}

const CSV_HEADER: &str =
    "id,title,description,status,priority,category,due_date,started_at,completed_at,created_at";

fn to_csv(todos: &[Todo]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');

    for todo in todos {
        let row = [
            todo.id.to_string(),
            csv_escape(&todo.title),
            csv_escape(todo.description.as_deref().unwrap_or("")),
            todo.status.to_string(),
            todo.priority.to_string(),
            csv_escape(todo.category.as_deref().unwrap_or("")),
            todo.due_date.map(|d| d.to_rfc3339()).unwrap_or_default(),
            todo.started_at.map(|d| d.to_rfc3339()).unwrap_or_default(),
            todo.completed_at.map(|d| d.to_rfc3339()).unwrap_or_default(),
            todo.created_at.to_rfc3339(),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }

    out
}

/// Quotes a field when it contains a delimiter, quote, or newline.
fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Utc;
    use uuid::Uuid;

    use tasklane_entity::todo::{TodoPriority, TodoStatus};

    fn todo_titled(title: &str) -> Todo {
        Todo {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: title.to_string(),
            description: None,
            priority: TodoPriority::Medium,
            category: Some("home".to_string()),
            due_date: None,
            status: TodoStatus::Todo,
            started_at: None,
            completed_at: None,
            attachment_count: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_csv_has_header_and_one_row_per_todo() {
        let todos = vec![todo_titled("a"), todo_titled("b")];
        let csv = to_csv(&todos);
        let lines: Vec<&str> = csv.trim_end().lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("id,title"));
    }

    #[test]
    fn test_csv_escapes_commas_and_quotes() {
        let todos = vec![todo_titled("hello, \"world\"")];
        let csv = to_csv(&todos);
        assert!(csv.contains("\"hello, \"\"world\"\"\""));
    }

    #[test]
    fn test_parse_rejects_unknown_format() {
        assert!(ExportFormat::parse("xml").is_err());
        assert_eq!(ExportFormat::parse("csv").unwrap(), ExportFormat::Csv);
    }
}
