#![deny(missing_docs)]

//! Core library for the DocDigest document summarization service.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// PDF text-layer and OCR text extraction.
pub mod extraction;
/// Chat completion clients for the supported LLM providers.
pub mod llm;
/// Structured logging and tracing setup.
pub mod logging;
/// Analysis metrics helpers.
pub mod metrics;
/// Chunking, map-reduce summarization, and per-file outcomes.
pub mod pipeline;
