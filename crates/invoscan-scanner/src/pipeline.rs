//! Per-document pipeline.
//!
//! `Start -> Fetched -> Extracted -> Validated -> Reconciled -> Done`, with
//! any stage able to end the run in a [`ScanFailure`]. Runs share nothing
//! but the read-only collaborators.

use crate::error::{Result, ScanFailure};
use crate::fetcher::DocumentFetcher;
use crate::reconciler::BlacklistReconciler;
use invoscan_core::{BlacklistLookup, DocumentLocation};
use invoscan_iban::{IbanExtractor, IbanRules, IbanValidator};
use std::fmt;
use std::sync::Arc;

/// Stage a pipeline run has reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    /// Nothing done yet
    Start,
    /// Document downloaded and decoded
    Fetched,
    /// Candidates extracted
    Extracted,
    /// Candidates validated
    Validated,
    /// Blacklist checked
    Reconciled,
    /// Finished successfully
    Done,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::Fetched => "fetched",
            Self::Extracted => "extracted",
            Self::Validated => "validated",
            Self::Reconciled => "reconciled",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Runs fetch, extraction, validation and reconciliation for one document.
#[derive(Clone)]
pub struct DocumentPipeline {
    fetcher: Arc<dyn DocumentFetcher>,
    extractor: IbanExtractor,
    validator: IbanValidator,
    reconciler: BlacklistReconciler,
}

impl DocumentPipeline {
    /// Create a pipeline; extraction and validation share `rules`.
    #[must_use]
    pub fn new(
        fetcher: Arc<dyn DocumentFetcher>,
        lookup: Arc<dyn BlacklistLookup>,
        rules: Arc<IbanRules>,
    ) -> Self {
        Self {
            fetcher,
            extractor: IbanExtractor::new(rules.clone()),
            validator: IbanValidator::new(rules),
            reconciler: BlacklistReconciler::new(lookup),
        }
    }

    /// Process the document at `raw_location`, returning its clear IBANs.
    ///
    /// # Errors
    /// Returns the `ScanFailure` of the stage that ended the run.
    pub async fn run(&self, raw_location: &str) -> Result<Vec<String>> {
        let mut stage = PipelineStage::Start;
        let result = self.run_stages(raw_location, &mut stage).await;

        match &result {
            Ok(clear) => tracing::info!("Document done with {} clear IBAN(s)", clear.len()),
            Err(failure) if failure.is_domain_outcome() => {
                tracing::info!("Document ended after {} stage: {}", stage, failure.kind());
            }
            Err(failure) => {
                tracing::error!("Document failed after {} stage: {}", stage, failure);
            }
        }

        result
    }

    async fn run_stages(&self, raw_location: &str, stage: &mut PipelineStage) -> Result<Vec<String>> {
        let location = DocumentLocation::new(raw_location)?;
        let document = self.fetcher.fetch(&location).await?;
        advance(stage, PipelineStage::Fetched);

        let candidates: Vec<String> = self.extractor.extract(&document.text).into_iter().collect();
        drop(document);
        if candidates.is_empty() {
            return Err(ScanFailure::NoIbanFound {
                location: location.to_string(),
            });
        }
        advance(stage, PipelineStage::Extracted);

        let validated = self.validator.validate_all(&candidates);
        if validated.is_empty() {
            return Err(ScanFailure::AllInvalid { candidates });
        }
        advance(stage, PipelineStage::Validated);

        let reconciliation = self.reconciler.reconcile(&validated).await?;
        advance(stage, PipelineStage::Reconciled);
        if reconciliation.has_blocked() {
            return Err(ScanFailure::Blacklisted {
                blocked: reconciliation.blocked,
                clear: reconciliation.clear,
            });
        }

        advance(stage, PipelineStage::Done);
        Ok(reconciliation.clear)
    }
}

impl fmt::Debug for DocumentPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentPipeline")
            .field("validator", &self.validator)
            .field("reconciler", &self.reconciler)
            .finish_non_exhaustive()
    }
}

fn advance(stage: &mut PipelineStage, next: PipelineStage) {
    tracing::debug!("Pipeline stage {} -> {}", stage, next);
    *stage = next;
}
