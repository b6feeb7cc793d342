//! Certificate Revocation List (CRL) retrieval
//!
//! The CRL of an authority is read once per audit and reduced to the set of
//! revoked serial numbers.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use x509_parser::pem::parse_x509_pem;
use x509_parser::prelude::*;

use super::backend::PkiBackend;
use super::certificate::asn1_time_to_utc;
use super::errors::{AuditError, AuditResult, DecodeError, Target};
use super::serial::SerialNumber;

/// Serial numbers revoked by an authority as of the CRL's issuance.
#[derive(Debug, Clone, Default)]
pub struct RevocationList {
    revoked: HashSet<SerialNumber>,
    pub issuer: String,
    pub this_update: Option<DateTime<Utc>>,
    pub next_update: Option<DateTime<Utc>>,
}

impl RevocationList {
    /// Decodes the first PEM block of `pem` as an X.509 CRL.
    pub fn from_pem(pem: &str) -> Result<Self, DecodeError> {
        let (_, block) =
            parse_x509_pem(pem.as_bytes()).map_err(|e| DecodeError::Pem(e.to_string()))?;
        Self::from_der(&block.contents)
    }

    pub fn from_der(der: &[u8]) -> Result<Self, DecodeError> {
        let (_, crl) = CertificateRevocationList::from_der(der)
            .map_err(|e| DecodeError::X509(e.to_string()))?;

        let revoked = crl
            .iter_revoked_certificates()
            .map(|entry| SerialNumber::from_biguint(&entry.user_certificate))
            .collect();

        Ok(Self {
            revoked,
            issuer: crl.issuer().to_string(),
            this_update: Some(asn1_time_to_utc(crl.last_update())?),
            next_update: crl.next_update().map(asn1_time_to_utc).transpose()?,
        })
    }

    pub fn is_revoked(&self, serial: &SerialNumber) -> bool {
        self.revoked.contains(serial)
    }

    pub fn len(&self) -> usize {
        self.revoked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.revoked.is_empty()
    }
}

impl FromIterator<SerialNumber> for RevocationList {
    fn from_iter<I: IntoIterator<Item = SerialNumber>>(iter: I) -> Self {
        Self {
            revoked: iter.into_iter().collect(),
            ..Self::default()
        }
    }
}

/// Reads and decodes the current CRL of `authority`.
pub async fn fetch_revocation_list<B: PkiBackend>(
    backend: &B,
    authority: &str,
) -> AuditResult<RevocationList> {
    let target = Target::Crl {
        authority: authority.to_string(),
    };

    debug!("Fetching CRL of {}", authority);
    let payload = backend
        .read_crl(authority)
        .await
        .map_err(|source| AuditError::BackendUnavailable {
            target: target.clone(),
            source,
        })?;

    let crl = RevocationList::from_pem(&payload.0).map_err(|e| e.at(target))?;

    info!(
        "Loaded CRL of {} issued by {}: {} revoked certificates",
        authority,
        crl.issuer,
        crl.len()
    );
    Ok(crl)
}
