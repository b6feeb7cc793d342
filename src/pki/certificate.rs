use chrono::{DateTime, Utc};
use x509_parser::der_parser::asn1_rs::Tag;
use x509_parser::pem::parse_x509_pem;
use x509_parser::prelude::*;

use super::errors::DecodeError;
use super::serial::SerialNumber;

/// Structural fields of an issued certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    pub common_name: String,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
    pub serial: SerialNumber,
}

impl Certificate {
    /// Decodes the first PEM block of `pem` as an X.509 certificate.
    ///
    /// Only the structure is parsed; signatures and chains are not checked.
    pub fn from_pem(pem: &str) -> Result<Self, DecodeError> {
        let (_, block) =
            parse_x509_pem(pem.as_bytes()).map_err(|e| DecodeError::Pem(e.to_string()))?;
        Self::from_der(&block.contents)
    }

    pub fn from_der(der: &[u8]) -> Result<Self, DecodeError> {
        let (_, cert) =
            X509Certificate::from_der(der).map_err(|e| DecodeError::X509(e.to_string()))?;

        let common_name = match cert.subject().iter_common_name().last() {
            Some(attr) => match attr.as_str() {
                Ok(name) => name.to_string(),
                Err(e) => {
                    let value = attr.attr_value();
                    directory_string(value.tag(), value.data)
                        .ok_or_else(|| DecodeError::CommonName(e.to_string()))?
                }
            },
            None => String::new(),
        };

        let validity = cert.validity();

        Ok(Self {
            common_name,
            not_before: asn1_time_to_utc(validity.not_before)?,
            not_after: asn1_time_to_utc(validity.not_after)?,
            serial: SerialNumber::from_biguint(&cert.tbs_certificate.serial),
        })
    }
}

/// Decodes the string types `as_str` leaves out: BMPString (UTF-16BE),
/// UniversalString (UTF-32BE), and T61String/VisibleString, which are read as
/// UTF-8 when valid and as Latin-1 otherwise.
fn directory_string(tag: Tag, data: &[u8]) -> Option<String> {
    match tag {
        Tag::BmpString => {
            if data.len() % 2 != 0 {
                return None;
            }
            let units: Vec<u16> = data
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16(&units).ok()
        }
        Tag::UniversalString => {
            if data.len() % 4 != 0 {
                return None;
            }
            data.chunks_exact(4)
                .map(|quad| char::from_u32(u32::from_be_bytes([quad[0], quad[1], quad[2], quad[3]])))
                .collect()
        }
        Tag::T61String | Tag::VisibleString => Some(match std::str::from_utf8(data) {
            Ok(text) => text.to_string(),
            Err(_) => data.iter().map(|&b| char::from(b)).collect(),
        }),
        _ => None,
    }
}

pub(crate) fn asn1_time_to_utc(time: ASN1Time) -> Result<DateTime<Utc>, DecodeError> {
    let timestamp = time.timestamp();
    DateTime::<Utc>::from_timestamp(timestamp, 0).ok_or(DecodeError::Time(timestamp))
}
