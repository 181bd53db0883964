use lightblue_core::{
    decode_response, encode_request, CrudOperation, DataRequest, DeleteRequest, Document,
    EntityData, FindRequest, InsertRequest, RequestHeader, Response, SaveRequest, UpdateRequest,
};

use crate::config::ClientConfig;
use crate::transport::{HttpTransport, Method, Transport};
use crate::{ClientError, Result};

/// Lightblue data service client
///
/// The entity data type of each call is picked by the caller: `Vec<T>` for
/// any number of documents, `Option<T>` when at most one is expected, or
/// `Vec<Document>` to keep them generic.
pub struct Client<T = HttpTransport> {
    data_service_uri: String,
    pub(crate) transport: T,
}

impl Client<HttpTransport> {
    /// Create a client over HTTP from the given configuration
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        Ok(Self::with_transport(config.data_service_uri.clone(), transport))
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(data_service_uri: impl Into<String>, transport: T) -> Self {
        Self {
            data_service_uri: data_service_uri.into(),
            transport,
        }
    }

    pub fn data_service_uri(&self) -> &str {
        &self.data_service_uri
    }

    /// Build `{data_service_uri}/{segments...}`. Each segment is
    /// percent-encoded, so `/` or `?` inside an entity name stays in its
    /// own path segment.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<String> {
        let invalid = |reason: String| ClientError::InvalidUrl {
            url: self.data_service_uri.clone(),
            reason,
        };
        let mut url =
            reqwest::Url::parse(&self.data_service_uri).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("cannot be a base URL".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url.into())
    }

    /// Send a raw body and return the raw reply
    pub async fn call(&self, method: Method, url: &str, body: Vec<u8>) -> Result<Vec<u8>> {
        tracing::debug!(?method, url, bytes = body.len(), "Sending request");
        self.transport.send(method, url, body).await
    }

    /// Send an encoded request body for `operation` and decode the reply
    #[tracing::instrument(skip(self, header, body), fields(entity = %header.entity_name))]
    pub async fn data_call<D: EntityData>(
        &self,
        header: &RequestHeader,
        operation: CrudOperation,
        body: Vec<u8>,
    ) -> Result<Response<D>> {
        let mut segments = vec![operation.as_str(), header.entity_name.as_str()];
        if !header.entity_version.is_empty() {
            segments.push(header.entity_version.as_str());
        }
        let url = self.endpoint(&segments)?;

        let reply = self.call(Method::from(operation), &url, body).await?;
        let response = decode_response(&reply)?;
        Ok(response)
    }

    /// Encode and send any data request
    pub async fn send<R: DataRequest, D: EntityData>(&self, request: &R) -> Result<Response<D>> {
        let body = encode_request(request)?;
        self.data_call(request.header(), R::OPERATION, body).await
    }

    pub async fn find<D: EntityData>(&self, request: &FindRequest) -> Result<Response<D>> {
        self.send(request).await
    }

    pub async fn insert<D: EntityData>(&self, request: &InsertRequest) -> Result<Response<D>> {
        self.send(request).await
    }

    pub async fn save<D: EntityData>(&self, request: &SaveRequest) -> Result<Response<D>> {
        self.send(request).await
    }

    pub async fn update<D: EntityData>(&self, request: &UpdateRequest) -> Result<Response<D>> {
        self.send(request).await
    }

    /// Delete returns no documents, only counts and errors
    pub async fn delete(&self, request: &DeleteRequest) -> Result<Response<Vec<Document>>> {
        self.send(request).await
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// A sent request as seen by the transport
    #[derive(Debug, Clone)]
    pub struct Sent {
        pub method: Method,
        pub url: String,
        pub body: String,
    }

    /// Replays canned replies and records what was sent
    #[derive(Default)]
    pub struct MockTransport {
        replies: Mutex<VecDeque<Vec<u8>>>,
        pub sent: Mutex<Vec<Sent>>,
    }

    impl MockTransport {
        pub fn replying(replies: &[&str]) -> Self {
            Self {
                replies: Mutex::new(replies.iter().map(|r| r.as_bytes().to_vec()).collect()),
                sent: Mutex::new(Vec::new()),
            }
        }

        pub fn last(&self) -> Sent {
            self.sent.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn send(&self, method: Method, url: &str, body: Vec<u8>) -> Result<Vec<u8>> {
            self.sent.lock().unwrap().push(Sent {
                method,
                url: url.to_string(),
                body: String::from_utf8(body).unwrap(),
            });
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| ClientError::Transport("no reply queued".into()))
        }
    }

    pub fn client(replies: &[&str]) -> Client<MockTransport> {
        Client::with_transport("http://lb.test/rest/data", MockTransport::replying(replies))
    }
}
