use std::fmt;

use thiserror::Error;

/// Errors raised by a [`PkiBackend`](super::backend::PkiBackend).
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP error {status} at {path}")]
    Status { status: u16, path: String },

    #[error("no value found at {path}")]
    NoData { path: String },

    #[error("timeout while reading {path}")]
    Timeout { path: String },

    #[error("malformed response from {path}: {reason}")]
    Malformed { path: String, reason: String },

    #[error("invalid CA bundle {path}: {reason}")]
    CaBundle { path: String, reason: String },
}

/// The backend object an audit step was working on when it failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Crl { authority: String },
    Inventory { authority: String },
    Certificate { authority: String, serial: String },
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Crl { authority } => write!(f, "CRL of `{authority}`"),
            Target::Inventory { authority } => write!(f, "certificate list of `{authority}`"),
            Target::Certificate { authority, serial } => {
                write!(f, "certificate `{serial}` of `{authority}`")
            }
        }
    }
}

/// Audit pipeline errors
#[derive(Error, Debug)]
pub enum AuditError {
    #[error("backend unavailable while reading {target}: {source}")]
    BackendUnavailable {
        target: Target,
        #[source]
        source: BackendError,
    },

    #[error("failed to decode {target}: {reason}")]
    Decode { target: Target, reason: String },
}

impl AuditError {
    pub fn target(&self) -> &Target {
        match self {
            AuditError::BackendUnavailable { target, .. } | AuditError::Decode { target, .. } => {
                target
            }
        }
    }
}

/// Convenient Result type alias
pub type AuditResult<T> = Result<T, AuditError>;

/// Structural decode failure, before the caller attaches a [`Target`].
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("no PEM block found: {0}")]
    Pem(String),

    #[error("X.509 parsing failed: {0}")]
    X509(String),

    #[error("unreadable subject common name: {0}")]
    CommonName(String),

    #[error("validity time out of range: {0}")]
    Time(i64),
}

impl DecodeError {
    pub(crate) fn at(self, target: Target) -> AuditError {
        AuditError::Decode {
            target,
            reason: self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failing_target() {
        let err = AuditError::BackendUnavailable {
            target: Target::Certificate {
                authority: "pki".into(),
                serial: "04".into(),
            },
            source: BackendError::NoData {
                path: "pki/cert/04".into(),
            },
        };
        assert_eq!(
            err.to_string(),
            "backend unavailable while reading certificate `04` of `pki`: no value found at pki/cert/04"
        );

        let err = DecodeError::Pem("unexpected end".into()).at(Target::Crl {
            authority: "pki_int".into(),
        });
        assert!(err.to_string().starts_with("failed to decode CRL of `pki_int`"));
        assert_eq!(
            err.target(),
            &Target::Crl {
                authority: "pki_int".into()
            }
        );
    }
}
