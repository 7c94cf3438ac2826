//! Prompt templates for the map (per-chunk) and reduce (combine) calls.

use crate::config::ResponseFormat;

use super::chunking::Chunk;
use super::types::SummaryType;

const MARKER_LAYOUT: &str = "Summary:
• point 1
• point 2

Improvement Suggestions:
• suggestion 1
• suggestion 2";

const JSON_LAYOUT: &str = r#"{"summary": "• point 1\n• point 2", "suggestions": "• suggestion 1\n• suggestion 2"}"#;

fn layout_instruction(format: ResponseFormat, strict: bool) -> String {
    match format {
        ResponseFormat::Markers if strict => {
            format!("Return the result in this strict format:\n\n{MARKER_LAYOUT}")
        }
        ResponseFormat::Markers => format!("Return in this format:\n\n{MARKER_LAYOUT}"),
        ResponseFormat::Json => format!(
            "Return only a JSON object with exactly two string fields, \"summary\" and \
             \"suggestions\", each holding bullet points separated by newlines:\n\n{JSON_LAYOUT}"
        ),
    }
}

/// Build the per-chunk prompt asking for a summary and 3–5 suggestions.
pub fn chunk_prompt(format: ResponseFormat, summary_type: SummaryType, chunk: &Chunk<'_>) -> String {
    format!(
        "You are an assistant that provides two outputs for the text below:
1. A {summary_type} summary in clear bullet points (•).
2. 3–5 improvement suggestions in bullet points (•).

{layout}

---

Text chunk {number}:
{text}
",
        layout = layout_instruction(format, true),
        number = chunk.number(),
        text = chunk.text,
    )
}

/// Build the reduce prompt merging newline-joined partial summaries and suggestions.
pub fn combine_prompt(
    format: ResponseFormat,
    summary_type: SummaryType,
    summaries: &str,
    suggestions: &str,
) -> String {
    format!(
        "Combine the following into clean, final outputs.

Final {summary_type} Summary (bullet points only):
{summaries}

Final Improvement Suggestions (merge, remove duplicates, keep 3–7 bullet points):
{suggestions}

{layout}
",
        layout = layout_instruction(format, false),
    )
}
