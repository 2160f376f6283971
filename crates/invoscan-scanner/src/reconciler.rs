//! Blacklist reconciliation.

use crate::error::{Result, ScanFailure};
use invoscan_core::BlacklistLookup;
use std::sync::Arc;

/// Validated IBANs split by blacklist membership, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Not blacklisted
    pub clear: Vec<String>,
    /// Blacklisted
    pub blocked: Vec<String>,
}

impl Reconciliation {
    /// Whether any IBAN is blacklisted.
    #[must_use]
    pub fn has_blocked(&self) -> bool {
        !self.blocked.is_empty()
    }
}

/// Partitions validated IBANs with one batched blacklist lookup.
#[derive(Clone)]
pub struct BlacklistReconciler {
    lookup: Arc<dyn BlacklistLookup>,
}

impl BlacklistReconciler {
    /// Create a reconciler over `lookup`.
    #[must_use]
    pub fn new(lookup: Arc<dyn BlacklistLookup>) -> Self {
        Self { lookup }
    }

    /// Split `validated` into clear and blocked IBANs.
    ///
    /// # Errors
    /// Returns `ScanFailure::Internal` if the lookup fails.
    pub async fn reconcile(&self, validated: &[String]) -> Result<Reconciliation> {
        if validated.is_empty() {
            return Ok(Reconciliation::default());
        }

        let listed = self.lookup.lookup_any(validated).await.map_err(|e| {
            tracing::error!("Blacklist lookup failed: {}", e);
            ScanFailure::Internal(e.to_string())
        })?;

        let (blocked, clear): (Vec<String>, Vec<String>) = validated
            .iter()
            .cloned()
            .partition(|iban| listed.contains(iban));

        for iban in &blocked {
            tracing::warn!("Blacklisted IBAN found: {}", iban);
        }

        Ok(Reconciliation { clear, blocked })
    }
}

impl std::fmt::Debug for BlacklistReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlacklistReconciler").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingLookup {
        listed: HashSet<String>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl BlacklistLookup for CountingLookup {
        async fn lookup_any(&self, candidates: &[String]) -> invoscan_core::Result<HashSet<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.listed.lookup_any(candidates).await
        }
    }

    struct FailingLookup;

    #[async_trait]
    impl BlacklistLookup for FailingLookup {
        async fn lookup_any(&self, _: &[String]) -> invoscan_core::Result<HashSet<String>> {
            Err(invoscan_core::InvoscanError::Lookup("store offline".to_string()))
        }
    }

    fn ibans(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| (*s).to_string()).collect()
    }

    #[tokio::test]
    async fn test_partition_with_single_lookup() {
        let lookup = Arc::new(CountingLookup {
            listed: HashSet::from(["FR7630006000011234567890189".to_string()]),
            calls: AtomicUsize::new(0),
        });
        let reconciler = BlacklistReconciler::new(lookup.clone());

        let result = reconciler
            .reconcile(&ibans(&[
                "DE44500105175407324931",
                "FR7630006000011234567890189",
                "GB29NWBK60161331926819",
            ]))
            .await
            .expect("reconcile");

        assert_eq!(result.clear, ibans(&["DE44500105175407324931", "GB29NWBK60161331926819"]));
        assert_eq!(result.blocked, ibans(&["FR7630006000011234567890189"]));
        assert!(result.has_blocked());
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_input_skips_lookup() {
        let lookup = Arc::new(CountingLookup {
            listed: HashSet::new(),
            calls: AtomicUsize::new(0),
        });
        let reconciler = BlacklistReconciler::new(lookup.clone());

        let result = reconciler.reconcile(&[]).await.expect("reconcile");
        assert_eq!(result, Reconciliation::default());
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_lookup_failure_is_internal() {
        let reconciler = BlacklistReconciler::new(Arc::new(FailingLookup));
        let err = reconciler
            .reconcile(&ibans(&["DE44500105175407324931"]))
            .await
            .expect_err("lookup failure");
        assert!(matches!(err, ScanFailure::Internal(_)));
    }
}
