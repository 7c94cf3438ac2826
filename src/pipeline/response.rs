//! Parsing of completion text into a summary and suggestions.

use crate::config::ResponseFormat;
use serde_json::Value;

use super::types::SummaryResult;

/// Marker separating the summary from the suggestions in marker-formatted completions.
pub const SUGGESTIONS_MARKER: &str = "Improvement Suggestions:";
const SUMMARY_LABEL: &str = "Summary:";

/// Parse a completion according to the format the prompt asked for.
///
/// JSON completions that do not match the two-field contract are parsed with the marker rule.
pub fn parse_completion(output: &str, format: ResponseFormat) -> SummaryResult {
    if format == ResponseFormat::Json {
        if let Some(result) = parse_json_contract(output) {
            return result;
        }
        tracing::debug!("Completion is not a JSON summary object; using marker parsing");
    }
    parse_marked_sections(output)
}

/// Split on the first [`SUGGESTIONS_MARKER`]; without it the whole output is the summary.
pub fn parse_marked_sections(output: &str) -> SummaryResult {
    let output = output.trim();
    match output.split_once(SUGGESTIONS_MARKER) {
        Some((before, after)) => {
            let before = before.trim();
            let summary = before.strip_prefix(SUMMARY_LABEL).unwrap_or(before);
            SummaryResult {
                summary: summary.trim().to_string(),
                suggestions: after.trim().to_string(),
            }
        }
        None => SummaryResult {
            summary: output.to_string(),
            suggestions: String::new(),
        },
    }
}

fn parse_json_contract(output: &str) -> Option<SummaryResult> {
    let value: Value = serde_json::from_str(strip_code_fence(output.trim())).ok()?;
    let object = value.as_object()?;
    let summary = field_text(object.get("summary")?)?;
    let suggestions = match object.get("suggestions") {
        Some(value) => field_text(value)?,
        None => String::new(),
    };
    Some(SummaryResult {
        summary,
        suggestions,
    })
}

fn strip_code_fence(text: &str) -> &str {
    let Some(inner) = text.strip_prefix("```") else {
        return text;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.trim().to_string()),
        Value::Null => Some(String::new()),
        Value::Array(items) => {
            let lines = items
                .iter()
                .map(|item| item.as_str().map(bullet))
                .collect::<Option<Vec<_>>>()?;
            Some(lines.join("\n"))
        }
        _ => None,
    }
}

fn bullet(item: &str) -> String {
    let item = item.trim();
    if item.starts_with('•') || item.starts_with('-') || item.starts_with('*') {
        item.to_string()
    } else {
        format!("• {item}")
    }
}
