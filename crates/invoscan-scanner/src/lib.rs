//! Invoscan Scanner - document pipelines and batch orchestration.
//!
//! This crate turns a list of document locations into a [`ScanOutcome`]:
//! each document is fetched, its text searched for IBAN candidates, the
//! candidates validated and the survivors checked against the blacklist.
//!
//! # Features
//!
//! - Bounded concurrency across documents (default 10 in flight)
//! - Typed failures ([`ScanFailure`]) with a kind discriminant per outcome
//! - Fail-fast aggregation: the first failure by submission order decides
//! - PDF text extraction off the async runtime
//!
//! # Example
//!
//! ```rust,ignore
//! use invoscan_scanner::ScanOrchestrator;
//! use std::sync::Arc;
//!
//! let orchestrator = ScanOrchestrator::from_config(&config, Arc::new(database))?;
//! let outcome = orchestrator
//!     .process_documents(vec!["https://example.com/invoice.pdf".to_string()])
//!     .await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod error;
pub mod fetcher;
pub mod orchestrator;
pub mod outcome;
pub mod pipeline;
pub mod reconciler;

// Re-export commonly used types
pub use error::{FailureKind, FetchError, Result, ScanFailure};
pub use fetcher::{DocumentFetcher, HttpDocumentFetcher, RawDocument};
pub use orchestrator::{ScanOrchestrator, DEFAULT_MAX_CONCURRENT_PIPELINES};
pub use outcome::ScanOutcome;
pub use pipeline::{DocumentPipeline, PipelineStage};
pub use reconciler::{BlacklistReconciler, Reconciliation};
