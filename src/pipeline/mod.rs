//! Document analysis pipeline: extraction, chunking, map-reduce summarization, and outcomes.

pub mod chunking;
pub mod prompts;
pub mod response;
mod service;
mod summarize;
pub mod types;

pub use chunking::{Chunk, chunk_text};
pub use service::{AnalysisApi, AnalysisService, build_preview};
pub use summarize::{Summarizer, SummarizerSettings};
pub use types::{
    AnalysisError, AnalysisReport, AnalyzedFile, ChunkingError, CombinationError, Document,
    FailedFile, FileOutcome, FinalResult, PartialResult, SummarizationError, SummaryResult,
    SummaryType,
};
