use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::pki::errors::BackendError;

use super::{CertificatePayload, CrlPayload, PkiBackend, SerialList};

#[derive(Debug, Default)]
struct Authority {
    crl: Option<String>,
    // Insertion order is the listing order.
    certificates: Vec<(String, Option<String>)>,
}

/// In-process backend holding authorities in memory.
///
/// Certificates can be listed without a payload to model an inventory entry
/// whose read returns nothing.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    authorities: Arc<RwLock<HashMap<String, Authority>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_crl(&self, authority: &str, pem: impl Into<String>) -> &Self {
        self.with_authority(authority, |a| a.crl = Some(pem.into()));
        self
    }

    pub fn add_certificate(&self, authority: &str, serial: &str, pem: impl Into<String>) -> &Self {
        let pem = pem.into();
        self.with_authority(authority, |a| {
            a.certificates.push((serial.to_string(), Some(pem)))
        });
        self
    }

    /// Lists `serial` without storing a certificate for it.
    pub fn add_dangling_serial(&self, authority: &str, serial: &str) -> &Self {
        self.with_authority(authority, |a| {
            a.certificates.push((serial.to_string(), None))
        });
        self
    }

    fn with_authority(&self, authority: &str, f: impl FnOnce(&mut Authority)) {
        let mut guard = self
            .authorities
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(guard.entry(authority.to_string()).or_default());
    }

    fn read<T>(&self, authority: &str, f: impl FnOnce(&Authority) -> Option<T>) -> Option<T> {
        let guard = self
            .authorities
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.get(authority).and_then(f)
    }
}

impl PkiBackend for MemoryBackend {
    async fn read_crl(&self, authority: &str) -> Result<CrlPayload, BackendError> {
        self.read(authority, |a| a.crl.clone())
            .map(CrlPayload)
            .ok_or_else(|| BackendError::NoData {
                path: format!("{authority}/cert/crl"),
            })
    }

    async fn list_certificate_serials(&self, authority: &str) -> Result<SerialList, BackendError> {
        self.read(authority, |a| {
            (!a.certificates.is_empty())
                .then(|| a.certificates.iter().map(|(s, _)| s.clone()).collect())
        })
        .map(SerialList)
        .ok_or_else(|| BackendError::NoData {
            path: format!("{authority}/certs"),
        })
    }

    async fn read_certificate(
        &self,
        authority: &str,
        serial: &str,
    ) -> Result<CertificatePayload, BackendError> {
        self.read(authority, |a| {
            a.certificates
                .iter()
                .find(|(s, _)| s == serial)
                .and_then(|(_, pem)| pem.clone())
        })
        .map(CertificatePayload)
        .ok_or_else(|| BackendError::NoData {
            path: format!("{authority}/cert/{serial}"),
        })
    }
}
