//! Single-pass audit of an authority's certificate inventory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::AuditConfig;
use crate::pki::{
    AuditError, AuditResult, InventoryWalker, MatchRecord, Matcher, PkiBackend,
    fetch_revocation_list,
};

/// What to do when a single certificate cannot be fetched or decoded.
///
/// Failures reading the CRL or the inventory listing are always fatal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Abort the run on the first failing certificate.
    #[default]
    FailFast,
    /// Log the failure, record it in the report and continue.
    SkipInvalid,
}

/// Outcome of a completed audit run
#[derive(Debug, Default)]
pub struct AuditReport {
    /// Matching certificates, in inventory order.
    pub records: Vec<MatchRecord>,
    /// Certificates skipped under [`FailurePolicy::SkipInvalid`].
    pub failures: Vec<AuditError>,
    /// Number of certificates decoded.
    pub scanned: usize,
}

pub struct Auditor<'a, B> {
    backend: &'a B,
    config: &'a AuditConfig,
}

impl<'a, B: PkiBackend> Auditor<'a, B> {
    pub fn new(backend: &'a B, config: &'a AuditConfig) -> Self {
        Self { backend, config }
    }

    /// Runs the audit, judging expiry against the current time.
    pub async fn run(&self) -> AuditResult<AuditReport> {
        self.run_at(None).await
    }

    /// Runs the audit with a pinned observation time, or the wall clock
    /// read just before the inventory is walked when `now` is `None`.
    pub async fn run_at(&self, now: Option<DateTime<Utc>>) -> AuditResult<AuditReport> {
        let authority = self.config.mount.as_str();

        let revocations = fetch_revocation_list(self.backend, authority).await?;
        let mut walker = InventoryWalker::open(self.backend, authority).await?;

        let now = now.unwrap_or_else(Utc::now);
        let matcher = Matcher::new(&revocations, &self.config.search, now);
        let mut report = AuditReport::default();

        while let Some(entry) = walker.next_entry().await {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => match self.config.failure_policy {
                    FailurePolicy::FailFast => return Err(e),
                    FailurePolicy::SkipInvalid => {
                        warn!("Skipping: {}", e);
                        report.failures.push(e);
                        continue;
                    }
                },
            };

            report.scanned += 1;
            if let Some(record) = matcher.evaluate(&entry.serial, &entry.certificate) {
                report.records.push(record);
            }
        }

        info!(
            "Audited {} of {} certificates of {}: {} matched, {} skipped",
            report.scanned,
            walker.total(),
            authority,
            report.records.len(),
            report.failures.len()
        );
        Ok(report)
    }
}
