//! Map-reduce summarization over chunked text.
//!
//! Each chunk is summarized on its own (map), then a single call merges all partial results
//! (reduce). Calls are issued one at a time. LLM failures never abort a document: a failed
//! chunk becomes a placeholder, and a failed merge degrades to concatenating the partials.

use crate::config::{Config, ResponseFormat};
use crate::llm::{ChatClient, ChatRequest};
use std::sync::Arc;

use super::chunking::{Chunk, DEFAULT_MAX_CHARS, chunk_text};
use super::prompts::{chunk_prompt, combine_prompt};
use super::response::parse_completion;
use super::types::{
    AnalysisReport, ChunkingError, CombinationError, FinalResult, PartialResult,
    SummarizationError, SummaryType,
};

/// Model parameters and chunking limits for the summarizer.
#[derive(Debug, Clone, PartialEq)]
pub struct SummarizerSettings {
    /// Model identifier sent with every call.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Output ceiling for map calls.
    pub chunk_max_tokens: u32,
    /// Output ceiling for the reduce call.
    pub combine_max_tokens: u32,
    /// Maximum characters per chunk.
    pub max_chars: usize,
    /// Completion layout requested from the model.
    pub response_format: ResponseFormat,
}

impl Default for SummarizerSettings {
    fn default() -> Self {
        Self {
            model: "llama3-8b-8192".into(),
            temperature: 0.5,
            chunk_max_tokens: 800,
            combine_max_tokens: 1000,
            max_chars: DEFAULT_MAX_CHARS,
            response_format: ResponseFormat::Markers,
        }
    }
}

impl SummarizerSettings {
    /// Derive settings from the loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.llm_model.clone(),
            temperature: config.llm_temperature,
            chunk_max_tokens: config.llm_chunk_max_tokens,
            combine_max_tokens: config.llm_combine_max_tokens,
            max_chars: config.chunk_max_chars,
            response_format: config.llm_response_format,
        }
    }
}

/// Summarizes extracted text through a [`ChatClient`].
pub struct Summarizer {
    client: Arc<dyn ChatClient>,
    settings: SummarizerSettings,
}

impl Summarizer {
    /// Create a summarizer over a shared client.
    pub fn new(client: Arc<dyn ChatClient>, settings: SummarizerSettings) -> Self {
        Self { client, settings }
    }

    /// Summarize a document's text.
    ///
    /// Blank text returns an empty result without contacting the model.
    pub async fn analyze_text(
        &self,
        text: &str,
        summary_type: SummaryType,
    ) -> Result<AnalysisReport, ChunkingError> {
        if text.trim().is_empty() {
            return Ok(AnalysisReport::default());
        }

        let chunks = chunk_text(text, self.settings.max_chars)?;
        let mut partials = Vec::with_capacity(chunks.len());
        let mut failed_chunks = 0;
        for chunk in &chunks {
            match self.summarize_chunk(chunk, summary_type).await {
                Ok(partial) => partials.push(partial),
                Err(error) => {
                    tracing::warn!(
                        chunk = error.chunk,
                        error = %error.source,
                        "Chunk summarization failed; using placeholder"
                    );
                    failed_chunks += 1;
                    partials.push(PartialResult {
                        summary: format!(
                            "[Error summarizing chunk {}: {}]",
                            error.chunk, error.source
                        ),
                        suggestions: String::new(),
                    });
                }
            }
        }

        let (result, combine_degraded) = match self.combine(&partials, summary_type).await {
            Ok(result) => (result, false),
            Err(error) => {
                tracing::warn!(
                    error = %error,
                    "Combining partial summaries failed; returning raw concatenation"
                );
                (concatenate_partials(&partials), true)
            }
        };

        tracing::debug!(
            chunks = chunks.len(),
            failed_chunks,
            combine_degraded,
            "Document summarized"
        );
        Ok(AnalysisReport {
            result,
            chunk_count: chunks.len(),
            failed_chunks,
            combine_degraded,
        })
    }

    async fn summarize_chunk(
        &self,
        chunk: &Chunk<'_>,
        summary_type: SummaryType,
    ) -> Result<PartialResult, SummarizationError> {
        let prompt = chunk_prompt(self.settings.response_format, summary_type, chunk);
        let output = self
            .client
            .complete(self.request(prompt, self.settings.chunk_max_tokens))
            .await
            .map_err(|source| SummarizationError {
                chunk: chunk.number(),
                source,
            })?;
        Ok(parse_completion(&output, self.settings.response_format))
    }

    async fn combine(
        &self,
        partials: &[PartialResult],
        summary_type: SummaryType,
    ) -> Result<FinalResult, CombinationError> {
        let PartialResult {
            summary,
            suggestions,
        } = concatenate_partials(partials);
        let prompt = combine_prompt(
            self.settings.response_format,
            summary_type,
            &summary,
            &suggestions,
        );
        let output = self
            .client
            .complete(self.request(prompt, self.settings.combine_max_tokens))
            .await
            .map_err(CombinationError)?;
        Ok(parse_completion(&output, self.settings.response_format))
    }

    fn request(&self, prompt: String, max_tokens: u32) -> ChatRequest {
        ChatRequest {
            model: self.settings.model.clone(),
            prompt,
            temperature: self.settings.temperature,
            max_tokens,
            json_response: self.settings.response_format == ResponseFormat::Json,
        }
    }
}

/// Newline-join all partial summaries and all non-empty partial suggestions.
fn concatenate_partials(partials: &[PartialResult]) -> FinalResult {
    let summary = partials
        .iter()
        .map(|partial| partial.summary.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    let suggestions = partials
        .iter()
        .map(|partial| partial.suggestions.as_str())
        .filter(|suggestions| !suggestions.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    FinalResult {
        summary,
        suggestions,
    }
}
