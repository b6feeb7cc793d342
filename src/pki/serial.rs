use std::fmt;

use serde::Serialize;
use x509_parser::num_bigint::BigUint;

/// Canonical form of a certificate serial number.
///
/// Serials are arbitrary-precision unsigned integers. Encoders are free to
/// pad them with leading zero bytes, so equality is defined on the base-10
/// rendering of the integer rather than on the raw DER bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SerialNumber(String);

impl SerialNumber {
    pub fn from_biguint(value: &BigUint) -> Self {
        Self(value.to_str_radix(10))
    }

    /// Big-endian unsigned bytes, as found in a DER INTEGER body.
    pub fn from_bytes_be(bytes: &[u8]) -> Self {
        Self::from_biguint(&BigUint::from_bytes_be(bytes))
    }

    /// Parses a Vault-style serial identifier such as `1f:0a:3c` or
    /// `1f-0a-3c`.
    ///
    /// Returns `None` when the identifier is not hex octets.
    pub fn from_identifier(identifier: &str) -> Option<Self> {
        let digits: String = identifier
            .chars()
            .filter(|c| *c != ':' && *c != '-')
            .collect();
        if digits.is_empty() {
            return None;
        }
        let padded = if digits.len() % 2 == 1 {
            format!("0{digits}")
        } else {
            digits
        };
        hex::decode(padded)
            .ok()
            .map(|bytes| Self::from_bytes_be(&bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
