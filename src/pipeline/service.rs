//! Analysis service coordinating extraction, chunked summarization, and outcome assembly.

use crate::{
    config::Config,
    extraction::{DocumentExtractor, DocumentFormat, TextExtractor, resolve_and_extract},
    llm::{LlmClientError, build_chat_client},
    metrics::{AnalysisMetrics, MetricsSnapshot},
};
use async_trait::async_trait;
use std::sync::Arc;

use super::summarize::{Summarizer, SummarizerSettings};
use super::types::{
    AnalysisError, AnalysisReport, AnalyzedFile, Document, FailedFile, FileOutcome, SummaryType,
};

const PREVIEW_CHARS: usize = 500;
const PREVIEW_ELLIPSIS: &str = " ...";

/// Runs the document-to-summary pipeline for uploaded files.
///
/// The service owns the extractor, the summarizer (and through it the shared LLM client), and
/// the metrics registry. Construct it once at start-up and share it through an `Arc`.
pub struct AnalysisService {
    extractor: Arc<dyn TextExtractor>,
    summarizer: Summarizer,
    metrics: Arc<AnalysisMetrics>,
}

/// Abstraction over the pipeline used by external surfaces (HTTP, CLI).
#[async_trait]
pub trait AnalysisApi: Send + Sync {
    /// Analyze each document independently, returning one outcome per input in input order.
    async fn analyze_documents(
        &self,
        documents: Vec<Document>,
        summary_type: SummaryType,
    ) -> Vec<FileOutcome>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl AnalysisService {
    /// Assemble a service from its collaborators.
    pub fn new(extractor: Arc<dyn TextExtractor>, summarizer: Summarizer) -> Self {
        Self {
            extractor,
            summarizer,
            metrics: Arc::new(AnalysisMetrics::new()),
        }
    }

    /// Build the production service: Tesseract-backed extraction and the configured LLM client.
    pub fn from_config(config: &Config) -> Result<Self, LlmClientError> {
        tracing::info!("Initializing chat client");
        let client = build_chat_client(config)?;
        let extractor =
            DocumentExtractor::with_tesseract(&config.tesseract_cmd, &config.tesseract_lang);
        Ok(Self::new(
            Arc::new(extractor),
            Summarizer::new(client, SummarizerSettings::from_config(config)),
        ))
    }

    /// Analyze documents sequentially; a failing file never affects the others.
    pub async fn analyze_documents(
        &self,
        documents: Vec<Document>,
        summary_type: SummaryType,
    ) -> Vec<FileOutcome> {
        let mut outcomes = Vec::with_capacity(documents.len());
        for document in documents {
            outcomes.push(self.analyze_document(document, summary_type).await);
        }
        outcomes
    }

    /// Analyze a single document, converting any failure into an error outcome.
    pub async fn analyze_document(
        &self,
        document: Document,
        summary_type: SummaryType,
    ) -> FileOutcome {
        let Document { name, bytes } = document;
        match self.process(&name, bytes, summary_type).await {
            Ok((text, report)) => {
                self.metrics.record_document(
                    report.chunk_count as u64,
                    report.failed_chunks as u64,
                    report.combine_degraded,
                );
                tracing::info!(
                    file = %name,
                    chunks = report.chunk_count,
                    failed_chunks = report.failed_chunks,
                    combine_degraded = report.combine_degraded,
                    "File analyzed"
                );
                FileOutcome::Analyzed(AnalyzedFile {
                    text_preview: build_preview(&text),
                    name,
                    summary_type,
                    summary: report.result.summary,
                    suggestions: report.result.suggestions,
                })
            }
            Err(error) => {
                self.metrics.record_failure();
                tracing::warn!(file = %name, error = %error, "File processing failed");
                FileOutcome::Failed(FailedFile {
                    name,
                    error: format!("Failed to process: {error}"),
                })
            }
        }
    }

    async fn process(
        &self,
        name: &str,
        bytes: Vec<u8>,
        summary_type: SummaryType,
    ) -> Result<(String, AnalysisReport), AnalysisError> {
        let format = DocumentFormat::from_filename(name);
        let extractor = Arc::clone(&self.extractor);
        let size = bytes.len();
        let extraction = tokio::task::spawn_blocking(move || {
            resolve_and_extract(extractor.as_ref(), format, &bytes)
        })
        .await
        .map_err(|error| AnalysisError::Worker(error.to_string()))??;

        tracing::debug!(
            file = name,
            format = format.as_str(),
            method = ?extraction.method,
            bytes = size,
            chars = extraction.text.chars().count(),
            "Text extracted"
        );

        let report = self
            .summarizer
            .analyze_text(&extraction.text, summary_type)
            .await?;
        Ok((extraction.text, report))
    }

    /// Return the current analysis metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[async_trait]
impl AnalysisApi for AnalysisService {
    async fn analyze_documents(
        &self,
        documents: Vec<Document>,
        summary_type: SummaryType,
    ) -> Vec<FileOutcome> {
        AnalysisService::analyze_documents(self, documents, summary_type).await
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        AnalysisService::metrics_snapshot(self)
    }
}

/// First 500 characters of `text` with newlines flattened to spaces, plus `" ..."` when cut.
pub fn build_preview(text: &str) -> String {
    let mut preview = text
        .chars()
        .take(PREVIEW_CHARS)
        .map(|c| if c == '\n' { ' ' } else { c })
        .collect::<String>();
    if text.chars().nth(PREVIEW_CHARS).is_some() {
        preview.push_str(PREVIEW_ELLIPSIS);
    }
    preview
}
