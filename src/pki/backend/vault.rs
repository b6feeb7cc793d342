use std::path::PathBuf;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::time::timeout;
use tracing::debug;
use url::Url;

use crate::pki::errors::BackendError;

use super::{CertificatePayload, CrlPayload, PkiBackend, SerialList};

const TOKEN_HEADER: &str = "X-Vault-Token";
const NAMESPACE_HEADER: &str = "X-Vault-Namespace";

/// Connection settings for a Vault server
#[derive(Debug, Clone)]
pub struct VaultSettings {
    pub address: String,
    pub token: Option<SecretString>,
    pub namespace: Option<String>,
    pub ca_cert: Option<PathBuf>,
    pub skip_verify: bool,
    pub timeout: Duration,
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: Option<T>,
}

#[derive(Deserialize)]
struct CertificateData {
    certificate: String,
}

#[derive(Deserialize)]
struct KeysData {
    keys: Vec<String>,
}

/// Wrapper that accepts any `data` object, used for token lookups.
#[derive(Deserialize)]
struct AnyData {}

/// Reads CRLs and certificates from a Vault PKI secrets engine.
#[derive(Debug, Clone)]
pub struct VaultBackend {
    client: Client,
    base: Url,
    token: Option<SecretString>,
    namespace: Option<String>,
    request_timeout: Duration,
}

impl VaultBackend {
    /// Returns an error if the address is not a URL or the HTTP client
    /// cannot be initialized
    pub fn new(settings: VaultSettings) -> Result<Self, BackendError> {
        let mut address = settings.address.clone();
        if !address.ends_with('/') {
            address.push('/');
        }
        let base = Url::parse(&address).map_err(|e| BackendError::Malformed {
            path: settings.address.clone(),
            reason: e.to_string(),
        })?;

        let mut builder = Client::builder().danger_accept_invalid_certs(settings.skip_verify);

        if let Some(path) = &settings.ca_cert {
            let bundle = std::fs::read(path).map_err(|e| BackendError::CaBundle {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
            for cert in reqwest::Certificate::from_pem_bundle(&bundle)? {
                builder = builder.add_root_certificate(cert);
            }
        }

        Ok(Self {
            client: builder.build()?,
            base,
            token: settings.token,
            namespace: settings.namespace,
            request_timeout: settings.timeout,
        })
    }

    /// Looks up the configured token, failing if Vault rejects it.
    pub async fn verify_token(&self) -> Result<(), BackendError> {
        let path = "auth/token/lookup-self";
        let request = self.client.get(self.url(path)?);
        let _: AnyData = self.send(path, request).await?;
        debug!("Vault token accepted");
        Ok(())
    }

    fn url(&self, path: &str) -> Result<Url, BackendError> {
        self.base
            .join(&format!("v1/{path}"))
            .map_err(|e| BackendError::Malformed {
                path: path.to_string(),
                reason: e.to_string(),
            })
    }

    fn authorize(&self, mut request: RequestBuilder) -> RequestBuilder {
        if let Some(token) = &self.token {
            request = request.header(TOKEN_HEADER, token.expose_secret());
        }
        if let Some(namespace) = &self.namespace {
            request = request.header(NAMESPACE_HEADER, namespace);
        }
        request
    }

    async fn send<T: DeserializeOwned>(
        &self,
        path: &str,
        request: RequestBuilder,
    ) -> Result<T, BackendError> {
        debug!("Reading {} from Vault", path);

        // One deadline covers the headers and the body.
        let exchange = async {
            let response = self.authorize(request).send().await?;
            let status = response.status();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>((status, body))
        };
        let (status, body) = match timeout(self.request_timeout, exchange).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(BackendError::Timeout {
                    path: path.to_string(),
                });
            }
        };

        if status == StatusCode::NOT_FOUND {
            return Err(BackendError::NoData {
                path: path.to_string(),
            });
        }
        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }

        let envelope: Envelope<T> =
            serde_json::from_str(&body).map_err(|e| BackendError::Malformed {
                path: path.to_string(),
                reason: e.to_string(),
            })?;

        envelope.data.ok_or_else(|| BackendError::NoData {
            path: path.to_string(),
        })
    }
}

impl PkiBackend for VaultBackend {
    async fn read_crl(&self, authority: &str) -> Result<CrlPayload, BackendError> {
        let path = format!("{authority}/cert/crl");
        let request = self.client.get(self.url(&path)?);
        let data: CertificateData = self.send(&path, request).await?;
        Ok(CrlPayload(data.certificate))
    }

    async fn list_certificate_serials(&self, authority: &str) -> Result<SerialList, BackendError> {
        let path = format!("{authority}/certs");
        let request = self
            .client
            .get(self.url(&path)?)
            .query(&[("list", "true")]);
        let data: KeysData = self.send(&path, request).await?;
        Ok(SerialList(data.keys))
    }

    async fn read_certificate(
        &self,
        authority: &str,
        serial: &str,
    ) -> Result<CertificatePayload, BackendError> {
        let path = format!("{authority}/cert/{serial}");
        let request = self.client.get(self.url(&path)?);
        let data: CertificateData = self.send(&path, request).await?;
        Ok(CertificatePayload(data.certificate))
    }
}
