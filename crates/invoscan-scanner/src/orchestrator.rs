//! Scan orchestrator for processing batches of documents.
//!
//! This module provides the `ScanOrchestrator` which runs one
//! [`DocumentPipeline`] per location with bounded concurrency and reduces
//! the results in submission order.

use crate::error::{Result, ScanFailure};
use crate::fetcher::{DocumentFetcher, HttpDocumentFetcher};
use crate::outcome::ScanOutcome;
use crate::pipeline::DocumentPipeline;
use futures::stream::{FuturesUnordered, StreamExt};
use invoscan_core::{AppConfig, BlacklistLookup};
use invoscan_iban::IbanRules;
use std::sync::Arc;
use tracing::Instrument;

/// Default number of pipelines in flight at once.
pub const DEFAULT_MAX_CONCURRENT_PIPELINES: usize = 10;

/// Runs document pipelines concurrently and aggregates their results.
#[derive(Debug, Clone)]
pub struct ScanOrchestrator {
    /// Shared per-document pipeline
    pipeline: Arc<DocumentPipeline>,
    /// Maximum concurrent pipelines
    max_concurrent_pipelines: usize,
}

impl ScanOrchestrator {
    /// Create a new orchestrator.
    #[must_use]
    pub fn new(
        fetcher: Arc<dyn DocumentFetcher>,
        lookup: Arc<dyn BlacklistLookup>,
        rules: Arc<IbanRules>,
    ) -> Self {
        Self {
            pipeline: Arc::new(DocumentPipeline::new(fetcher, lookup, rules)),
            max_concurrent_pipelines: DEFAULT_MAX_CONCURRENT_PIPELINES,
        }
    }

    /// Build an orchestrator with an HTTP fetcher and the configured rules.
    ///
    /// # Errors
    /// Returns `ScanFailure::Internal` if the rule table or HTTP client
    /// cannot be built.
    pub fn from_config(config: &AppConfig, lookup: Arc<dyn BlacklistLookup>) -> Result<Self> {
        let rules = IbanRules::from_config(&config.validation)
            .map_err(|e| ScanFailure::Internal(format!("invalid validation rules: {e}")))?;
        let fetcher = HttpDocumentFetcher::new(&config.scanning)
            .map_err(|e| ScanFailure::Internal(e.to_string()))?;

        Ok(Self::new(Arc::new(fetcher), lookup, Arc::new(rules))
            .with_max_concurrent_pipelines(config.scanning.max_concurrent_pipelines))
    }

    /// Set the maximum number of concurrent pipelines (at least one).
    #[must_use]
    pub fn with_max_concurrent_pipelines(mut self, max: usize) -> Self {
        self.max_concurrent_pipelines = max.max(1);
        self
    }

    /// Current concurrency bound.
    #[must_use]
    pub fn max_concurrent_pipelines(&self) -> usize {
        self.max_concurrent_pipelines
    }

    /// Scan every location and aggregate the result.
    ///
    /// Every pipeline runs to completion. If any failed, the failure of the
    /// earliest location in submission order is returned; otherwise the
    /// clear lists are concatenated in submission order, without
    /// deduplication across documents.
    ///
    /// # Errors
    /// Returns `ScanFailure::MalformedLocation` for an empty batch, otherwise
    /// the first pipeline failure by submission order.
    pub async fn process_documents(&self, locations: Vec<String>) -> Result<ScanOutcome> {
        if locations.is_empty() {
            return Err(ScanFailure::MalformedLocation {
                reason: "no document locations supplied".to_string(),
            });
        }

        let span = tracing::info_span!(
            "process_documents",
            documents = locations.len(),
            max_concurrent = self.max_concurrent_pipelines
        );

        async move {
            tracing::info!("Scanning {} document(s)", locations.len());
            let results = self.run_all(locations).await;
            let outcome = reduce(results);

            match &outcome {
                Ok(outcome) => tracing::info!(
                    "Scan finished with {} valid IBAN(s)",
                    outcome.valid_ibans.len()
                ),
                Err(failure) => tracing::info!("Scan finished with {}", failure.kind()),
            }

            outcome
        }
        .instrument(span)
        .await
    }

    /// Run one pipeline per location, keeping at most
    /// `max_concurrent_pipelines` in flight, and return results indexed by
    /// submission order.
    async fn run_all(&self, locations: Vec<String>) -> Vec<Option<Result<Vec<String>>>> {
        let mut results: Vec<Option<Result<Vec<String>>>> = Vec::new();
        results.resize_with(locations.len(), || None);

        let mut futures = FuturesUnordered::new();

        for (index, location) in locations.into_iter().enumerate() {
            futures.push(self.run_pipeline(index, location));

            // Respect concurrency limit
            while futures.len() >= self.max_concurrent_pipelines {
                if let Some((index, result)) = futures.next().await {
                    results[index] = Some(result);
                }
            }
        }

        // Collect remaining results
        while let Some((index, result)) = futures.next().await {
            results[index] = Some(result);
        }

        results
    }

    async fn run_pipeline(&self, index: usize, location: String) -> (usize, Result<Vec<String>>) {
        let span = tracing::info_span!("pipeline", index, location = %location);
        let result = self.pipeline.run(&location).instrument(span).await;
        (index, result)
    }
}

/// Fail-fast reduction: first failure by index wins, otherwise concatenate.
fn reduce(results: Vec<Option<Result<Vec<String>>>>) -> Result<ScanOutcome> {
    let mut valid_ibans = Vec::new();

    for (index, result) in results.into_iter().enumerate() {
        match result {
            Some(Ok(clear)) => valid_ibans.extend(clear),
            Some(Err(failure)) => return Err(failure),
            None => {
                return Err(ScanFailure::Internal(format!(
                    "pipeline {index} produced no result"
                )))
            }
        }
    }

    Ok(ScanOutcome::clear(valid_ibans))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;

    fn ok(ibans: &[&str]) -> Option<Result<Vec<String>>> {
        Some(Ok(ibans.iter().map(|s| (*s).to_string()).collect()))
    }

    #[test]
    fn test_reduce_concatenates_without_dedup() {
        let outcome = reduce(vec![
            ok(&["DE44500105175407324931"]),
            ok(&["GB29NWBK60161331926819", "DE44500105175407324931"]),
        ])
        .expect("success");

        assert_eq!(
            outcome.valid_ibans,
            vec![
                "DE44500105175407324931",
                "GB29NWBK60161331926819",
                "DE44500105175407324931"
            ]
        );
        assert!(outcome.blacklisted_ibans.is_empty());
    }

    #[test]
    fn test_reduce_reports_first_failure_by_index() {
        let failure = reduce(vec![
            ok(&["DE44500105175407324931"]),
            Some(Err(ScanFailure::NoIbanFound {
                location: "https://example.com/b.pdf".to_string(),
            })),
            Some(Err(ScanFailure::Internal("later".to_string()))),
        ])
        .expect_err("failure");

        assert_eq!(failure.kind(), FailureKind::NoIbanFound);
    }

    #[test]
    fn test_reduce_missing_result_is_internal() {
        let failure = reduce(vec![ok(&[]), None]).expect_err("missing");
        assert_eq!(failure.kind(), FailureKind::Internal);
    }

    #[test]
    fn test_concurrency_bound_is_at_least_one() {
        let orchestrator = ScanOrchestrator::from_config(
            &AppConfig::default(),
            Arc::new(std::collections::HashSet::<String>::new()),
        )
        .expect("orchestrator");
        assert_eq!(
            orchestrator.max_concurrent_pipelines(),
            DEFAULT_MAX_CONCURRENT_PIPELINES
        );
        assert_eq!(
            orchestrator
                .with_max_concurrent_pipelines(0)
                .max_concurrent_pipelines(),
            1
        );
    }
}
