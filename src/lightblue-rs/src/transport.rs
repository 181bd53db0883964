//! HTTP transport.
//!
//! [`Transport`] is the seam between the client and the network. The
//! client hands it a finished JSON body and gets back the raw response
//! body. HTTP status codes are not interpreted here; error replies from the
//! data service still carry a JSON envelope.

use async_trait::async_trait;
use lightblue_core::CrudOperation;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use std::time::Duration;

use crate::config::ClientConfig;
use crate::{ClientError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Post,
    Put,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Post => "POST",
            Self::Put => "PUT",
        }
    }
}

impl From<CrudOperation> for Method {
    fn from(op: CrudOperation) -> Self {
        match op {
            CrudOperation::Insert => Self::Put,
            CrudOperation::Find
            | CrudOperation::Save
            | CrudOperation::Update
            | CrudOperation::Delete => Self::Post,
        }
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, method: Method, url: &str, body: Vec<u8>) -> Result<Vec<u8>>;
}

/// reqwest-backed transport, optionally authenticating with a PEM client
/// certificate
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

fn read_pem(path: &str) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| ClientError::Config(format!("Cannot read {}: {}", path, e)))
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();

        if config.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_secs));
        }
        if config.insecure_skip_verify {
            tracing::warn!("TLS certificate verification is disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }
        if !config.ca_cert_path.is_empty() {
            let cert = reqwest::Certificate::from_pem(&read_pem(&config.ca_cert_path)?)?;
            builder = builder.add_root_certificate(cert);
        }
        if !config.cert_file.is_empty() {
            let mut pem = read_pem(&config.cert_file)?;
            if !config.key_file.is_empty() && config.key_file != config.cert_file {
                pem.push(b'\n');
                pem.extend(read_pem(&config.key_file)?);
            }
            builder = builder.identity(reqwest::Identity::from_pem(&pem)?);
            tracing::debug!(cert_file = %config.cert_file, "Using client certificate");
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, method: Method, url: &str, body: Vec<u8>) -> Result<Vec<u8>> {
        let request = match method {
            Method::Post => self.client.post(url),
            Method::Put => self.client.put(url),
        };
        let response = request
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, url, "Data service replied with a non-success status");
        }
        Ok(response.bytes().await?.to_vec())
    }
}
