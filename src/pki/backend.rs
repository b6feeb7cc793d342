//! PKI backend seam.
//!
//! The audit pipeline only needs three read operations from the system that
//! stores an authority's certificates. Responses are decoded into typed
//! payloads at this boundary.

mod memory;
mod vault;

pub use memory::MemoryBackend;
pub use vault::{VaultBackend, VaultSettings};

use std::future::Future;

use super::errors::BackendError;

/// PEM-encoded CRL as served by the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrlPayload(pub String);

/// PEM-encoded certificate as served by the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificatePayload(pub String);

/// Serial identifiers known to an authority, in backend order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SerialList(pub Vec<String>);

/// Read access to an authority's CRL and certificate inventory.
pub trait PkiBackend: Send + Sync {
    /// Reads the current CRL of `authority`.
    fn read_crl(
        &self,
        authority: &str,
    ) -> impl Future<Output = Result<CrlPayload, BackendError>> + Send;

    /// Lists the serial identifiers of every certificate issued by `authority`.
    fn list_certificate_serials(
        &self,
        authority: &str,
    ) -> impl Future<Output = Result<SerialList, BackendError>> + Send;

    /// Reads one certificate of `authority` by serial identifier.
    fn read_certificate(
        &self,
        authority: &str,
        serial: &str,
    ) -> impl Future<Output = Result<CertificatePayload, BackendError>> + Send;
}
