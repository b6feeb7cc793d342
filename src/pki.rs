pub mod backend;
pub mod certificate;
pub mod crl;
pub mod errors;
pub mod inventory;
pub mod matcher;
pub mod serial;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use backend::{MemoryBackend, PkiBackend, VaultBackend, VaultSettings};
pub use certificate::Certificate;
pub use crl::{RevocationList, fetch_revocation_list};
pub use errors::{AuditError, AuditResult, BackendError, Target};
pub use inventory::{InventoryEntry, InventoryWalker};
pub use matcher::{MatchRecord, Matcher};
pub use serial::SerialNumber;
