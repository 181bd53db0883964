//! Lightblue Client Library
//!
//! Async HTTP client for a Lightblue data service: CRUD calls and the
//! lock service, on top of the request and response model in
//! `lightblue-core`.

mod client;
pub mod config;
mod lock;
pub mod transport;

pub use client::Client;
pub use config::ClientConfig;
pub use lightblue_core::{Document, RequestError, Response};
pub use transport::{HttpTransport, Method, Transport};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error(transparent)]
    Protocol(#[from] lightblue_core::Error),

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Lock service error: {0}")]
    Lock(RequestError),

    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;
