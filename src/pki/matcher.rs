use chrono::{DateTime, Utc};
use serde::Serialize;

use super::certificate::Certificate;
use super::crl::RevocationList;

/// Audit result for one certificate whose common name matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchRecord {
    pub common_name: String,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub serial: String,
    pub revoked: bool,
    pub expired: bool,
}

/// Filters certificates by common name and derives their status against a
/// CRL at a fixed observation time.
#[derive(Debug, Clone, Copy)]
pub struct Matcher<'a> {
    revocations: &'a RevocationList,
    search: &'a str,
    now: DateTime<Utc>,
}

impl<'a> Matcher<'a> {
    pub fn new(revocations: &'a RevocationList, search: &'a str, now: DateTime<Utc>) -> Self {
        Self {
            revocations,
            search,
            now,
        }
    }

    /// Case-sensitive substring match; an empty term matches every name.
    pub fn matches(&self, certificate: &Certificate) -> bool {
        certificate.common_name.contains(self.search)
    }

    pub fn is_expired(&self, certificate: &Certificate) -> bool {
        self.now > certificate.not_after
    }

    /// Produces a record for `certificate`, listed under `serial`, when its
    /// common name contains the search term.
    pub fn evaluate(&self, serial: &str, certificate: &Certificate) -> Option<MatchRecord> {
        if !self.matches(certificate) {
            return None;
        }

        Some(MatchRecord {
            common_name: certificate.common_name.clone(),
            valid_from: certificate.not_before,
            valid_until: certificate.not_after,
            serial: serial.to_string(),
            revoked: self.revocations.is_revoked(&certificate.serial),
            expired: self.is_expired(certificate),
        })
    }
}
