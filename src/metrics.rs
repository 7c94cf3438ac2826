use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing analysis activity since startup.
#[derive(Default)]
pub struct AnalysisMetrics {
    documents_analyzed: AtomicU64,
    documents_failed: AtomicU64,
    chunks_summarized: AtomicU64,
    chunk_failures: AtomicU64,
    combine_fallbacks: AtomicU64,
}

impl AnalysisMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a document that produced a result, with its chunk-level statistics.
    pub fn record_document(&self, chunk_count: u64, chunk_failures: u64, combine_degraded: bool) {
        self.documents_analyzed.fetch_add(1, Ordering::Relaxed);
        self.chunks_summarized
            .fetch_add(chunk_count, Ordering::Relaxed);
        self.chunk_failures
            .fetch_add(chunk_failures, Ordering::Relaxed);
        if combine_degraded {
            self.combine_fallbacks.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a document whose processing ended in an error outcome.
    pub fn record_failure(&self) {
        self.documents_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            documents_analyzed: self.documents_analyzed.load(Ordering::Relaxed),
            documents_failed: self.documents_failed.load(Ordering::Relaxed),
            chunks_summarized: self.chunks_summarized.load(Ordering::Relaxed),
            chunk_failures: self.chunk_failures.load(Ordering::Relaxed),
            combine_fallbacks: self.combine_fallbacks.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of analysis counters used for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Documents that produced a summary outcome.
    pub documents_analyzed: u64,
    /// Documents that produced an error outcome.
    pub documents_failed: u64,
    /// Chunks sent through the map phase.
    pub chunks_summarized: u64,
    /// Chunks whose LLM call failed and were replaced by a placeholder.
    pub chunk_failures: u64,
    /// Documents whose reduce call failed and fell back to raw concatenation.
    pub combine_fallbacks: u64,
}
