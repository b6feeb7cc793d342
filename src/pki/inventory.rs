use std::vec::IntoIter;

use tracing::{debug, info, warn};

use super::backend::PkiBackend;
use super::certificate::Certificate;
use super::errors::{AuditError, AuditResult, Target};
use super::serial::SerialNumber;

/// A decoded certificate together with the identifier it was listed under.
#[derive(Debug, Clone)]
pub struct InventoryEntry {
    pub serial: String,
    pub certificate: Certificate,
}

/// Walks an authority's certificate inventory one backend round trip at a
/// time.
///
/// The serial list is read when the walker is opened; each call to
/// [`InventoryWalker::next_entry`] fetches and decodes the next certificate.
/// The walker is consumed as it goes and cannot be restarted.
pub struct InventoryWalker<'a, B> {
    backend: &'a B,
    authority: String,
    serials: IntoIter<String>,
    total: usize,
}

impl<'a, B: PkiBackend> InventoryWalker<'a, B> {
    pub async fn open(backend: &'a B, authority: &str) -> AuditResult<Self> {
        let serials = backend
            .list_certificate_serials(authority)
            .await
            .map_err(|source| AuditError::BackendUnavailable {
                target: Target::Inventory {
                    authority: authority.to_string(),
                },
                source,
            })?
            .0;

        info!("{} lists {} certificates", authority, serials.len());

        Ok(Self {
            backend,
            authority: authority.to_string(),
            total: serials.len(),
            serials: serials.into_iter(),
        })
    }

    /// Number of serials in the inventory listing.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Fetches and decodes the next certificate, or `None` once the listing
    /// is exhausted.
    pub async fn next_entry(&mut self) -> Option<AuditResult<InventoryEntry>> {
        let serial = self.serials.next()?;
        Some(self.fetch(serial).await)
    }

    async fn fetch(&self, serial: String) -> AuditResult<InventoryEntry> {
        let target = Target::Certificate {
            authority: self.authority.clone(),
            serial: serial.clone(),
        };

        let payload = self
            .backend
            .read_certificate(&self.authority, &serial)
            .await
            .map_err(|source| AuditError::BackendUnavailable {
                target: target.clone(),
                source,
            })?;

        let certificate = Certificate::from_pem(&payload.0).map_err(|e| e.at(target))?;
        debug!(
            "Decoded certificate {} ({})",
            serial, certificate.common_name
        );

        if SerialNumber::from_identifier(&serial).is_some_and(|listed| listed != certificate.serial)
        {
            warn!(
                "Certificate listed as {} carries serial {}",
                serial, certificate.serial
            );
        }

        Ok(InventoryEntry {
            serial,
            certificate,
        })
    }
}
