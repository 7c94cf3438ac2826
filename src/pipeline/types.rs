//! Core data types and error definitions for the analysis pipeline.

use crate::{extraction::ExtractionError, llm::LlmClientError};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Errors produced while splitting text into chunks.
#[derive(Debug, Error)]
pub enum ChunkingError {
    /// The configured chunk size can never hold a character.
    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,
}

/// A per-chunk LLM failure. Non-fatal: the chunk is replaced by a placeholder.
#[derive(Debug, Error)]
#[error("chunk {chunk}: {source}")]
pub struct SummarizationError {
    /// 1-based chunk number.
    pub chunk: usize,
    /// Underlying client failure.
    #[source]
    pub source: LlmClientError,
}

/// Failure of the final merge call. Non-fatal: partial results are concatenated instead.
#[derive(Debug, Error)]
#[error("combination failed: {0}")]
pub struct CombinationError(#[source] pub LlmClientError);

/// Errors that end the processing of a single file.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The document bytes could not be turned into text.
    #[error("{0}")]
    Extraction(#[from] ExtractionError),
    /// The summarizer was configured with an unusable chunk size.
    #[error("{0}")]
    Chunking(#[from] ChunkingError),
    /// The blocking extraction task panicked or was cancelled.
    #[error("extraction task failed: {0}")]
    Worker(String),
}

/// Caller-selected summary granularity embedded in the prompts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryType {
    /// Brief summary (default).
    #[default]
    Short,
    /// Moderately detailed summary.
    Medium,
    /// Detailed summary.
    Long,
}

impl SummaryType {
    /// Parse a form value case-insensitively, falling back to [`SummaryType::Short`].
    pub fn parse_or_default(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }

    /// Lowercase label used in prompts and responses.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Medium => "medium",
            Self::Long => "long",
        }
    }
}

impl std::str::FromStr for SummaryType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "short" => Ok(Self::Short),
            "medium" => Ok(Self::Medium),
            "long" => Ok(Self::Long),
            _ => Err(()),
        }
    }
}

impl fmt::Display for SummaryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary text plus improvement suggestions; suggestions may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SummaryResult {
    /// Bulleted summary.
    pub summary: String,
    /// Bulleted improvement suggestions.
    pub suggestions: String,
}

/// Result of summarizing one chunk (map phase).
pub type PartialResult = SummaryResult;

/// Deduplicated result for a whole document (reduce phase).
pub type FinalResult = SummaryResult;

/// Final result of a document together with how the map/reduce run went.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisReport {
    /// Merged summary and suggestions.
    pub result: FinalResult,
    /// Number of chunks sent through the map phase.
    pub chunk_count: usize,
    /// Chunks replaced by an error placeholder.
    pub failed_chunks: usize,
    /// Whether the reduce call failed and partial results were concatenated.
    pub combine_degraded: bool,
}

/// An uploaded file, owned by the orchestrator for the duration of one request.
#[derive(Debug, Clone)]
pub struct Document {
    /// Declared file name.
    pub name: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl Document {
    /// Bundle a name with its bytes.
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Per-file result reported to callers, one per input file in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FileOutcome {
    /// The file was summarized.
    Analyzed(AnalyzedFile),
    /// The file could not be processed.
    Failed(FailedFile),
}

impl FileOutcome {
    /// Name of the file this outcome belongs to.
    pub fn name(&self) -> &str {
        match self {
            Self::Analyzed(file) => &file.name,
            Self::Failed(file) => &file.name,
        }
    }
}

/// Successful per-file result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyzedFile {
    /// Declared file name.
    pub name: String,
    /// First 500 characters of the extracted text, newlines flattened.
    pub text_preview: String,
    /// Granularity the summary was requested with.
    pub summary_type: SummaryType,
    /// Final bulleted summary.
    pub summary: String,
    /// Final bulleted suggestions.
    pub suggestions: String,
}

/// Error record for a file that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedFile {
    /// Declared file name.
    pub name: String,
    /// Human-readable failure description.
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn summary_type_falls_back_to_short() {
        assert_eq!(SummaryType::parse_or_default("LONG"), SummaryType::Long);
        assert_eq!(SummaryType::parse_or_default("medium"), SummaryType::Medium);
        assert_eq!(SummaryType::parse_or_default("verbose"), SummaryType::Short);
        assert_eq!(SummaryType::parse_or_default(""), SummaryType::Short);
    }

    #[test]
    fn outcomes_serialize_without_tags() {
        let analyzed = FileOutcome::Analyzed(AnalyzedFile {
            name: "a.pdf".into(),
            text_preview: "hello".into(),
            summary_type: SummaryType::Medium,
            summary: "• a".into(),
            suggestions: "• b".into(),
        });
        let failed = FileOutcome::Failed(FailedFile {
            name: "b.pdf".into(),
            error: "Failed to process: invalid PDF: bad".into(),
        });

        assert_eq!(
            serde_json::to_value(&analyzed).expect("json"),
            json!({
                "name": "a.pdf",
                "text_preview": "hello",
                "summary_type": "medium",
                "summary": "• a",
                "suggestions": "• b"
            })
        );
        assert_eq!(
            serde_json::to_value(&failed).expect("json"),
            json!({ "name": "b.pdf", "error": "Failed to process: invalid PDF: bad" })
        );
    }
}
