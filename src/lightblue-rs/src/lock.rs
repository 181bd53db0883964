//! Lock service calls.
//!
//! Every call posts `{operation, domain, callerId, resourceId[, ttl]}` to
//! `{data_service_uri}/lock`. The reply carries a string `result`, or
//! `status: ERROR` with a list of errors.

use lightblue_core::response::decode_request_error;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client::Client;
use crate::transport::{Method, Transport};
use crate::{ClientError, Result};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LockRequest<'a> {
    operation: &'static str,
    domain: &'a str,
    caller_id: &'a str,
    resource_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    ttl: Option<String>,
}

#[derive(Deserialize)]
struct LockReply {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    errors: Vec<Map<String, Value>>,
}

impl<T: Transport> Client<T> {
    async fn lock_call(&self, request: LockRequest<'_>) -> Result<String> {
        let url = self.endpoint(&["lock"])?;
        let body = serde_json::to_vec(&request).map_err(|source| {
            lightblue_core::Error::Encoding {
                what: "lock request",
                source,
            }
        })?;
        let reply = self.call(Method::Post, &url, body).await?;

        let reply: LockReply = serde_json::from_slice(&reply)
            .map_err(|e| ClientError::InvalidResponse(format!("lock reply: {}", e)))?;
        if reply.status.as_deref() == Some("ERROR") {
            let first = reply.errors.first().ok_or_else(|| {
                ClientError::InvalidResponse("lock reply has ERROR status but no errors".to_string())
            })?;
            let error = decode_request_error(first)?;
            tracing::debug!(operation = request.operation, %error, "Lock call failed");
            return Err(ClientError::Lock(error));
        }
        reply
            .result
            .ok_or_else(|| ClientError::InvalidResponse("lock reply has no result".to_string()))
    }

    /// Acquire a lock on `resource_id`. A positive `ttl` (milliseconds)
    /// overrides the service default.
    pub async fn acquire(
        &self,
        domain: &str,
        caller_id: &str,
        resource_id: &str,
        ttl: i64,
    ) -> Result<bool> {
        let result = self
            .lock_call(LockRequest {
                operation: "acquire",
                domain,
                caller_id,
                resource_id,
                ttl: (ttl > 0).then(|| ttl.to_string()),
            })
            .await?;
        Ok(result == "true")
    }

    pub async fn release(&self, domain: &str, caller_id: &str, resource_id: &str) -> Result<bool> {
        let result = self
            .lock_call(LockRequest {
                operation: "release",
                domain,
                caller_id,
                resource_id,
                ttl: None,
            })
            .await?;
        Ok(result == "true")
    }

    /// Number of times `caller_id` holds the lock
    pub async fn lock_count(&self, domain: &str, caller_id: &str, resource_id: &str) -> Result<i64> {
        let result = self
            .lock_call(LockRequest {
                operation: "count",
                domain,
                caller_id,
                resource_id,
                ttl: None,
            })
            .await?;
        result
            .parse()
            .map_err(|_| ClientError::InvalidResponse(format!("lock count is not a number: {}", result)))
    }

    /// Refresh the lock's expiration
    pub async fn ping(&self, domain: &str, caller_id: &str, resource_id: &str) -> Result<bool> {
        let result = self
            .lock_call(LockRequest {
                operation: "ping",
                domain,
                caller_id,
                resource_id,
                ttl: None,
            })
            .await?;
        Ok(result == "true")
    }
}
