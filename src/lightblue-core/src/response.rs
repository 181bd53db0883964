//! Response envelope decoding.
//!
//! The envelope fields are decoded the same way for every request. The
//! `processed` documents are decoded into the caller's choice of
//! [`EntityData`]:
//!
//! - `Vec<T>` decodes every returned document as a `T`
//! - `Option<T>` expects at most one document and fails with
//!   [`Error::Cardinality`] when the service returns more
//! - `Vec<Document>` (see [`decode_response_untyped`]) keeps them generic

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use serde_json::{Map, Value};
use std::fmt;

use crate::error::{Error, Result};
use crate::Document;

/// Operation status reported by the data service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OpStatus {
    Complete,
    Partial,
    Async,
    Error,
}

/// Per-document metadata, in the same order as the returned documents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultMetadata {
    pub document_version: String,
}

impl fmt::Display for ResultMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "docver: {}", self.document_version)
    }
}

/// A request-level error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestError {
    pub context: String,
    pub error_code: String,
    pub msg: String,
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ctx: {}, err: {}, msg: {}",
            self.context, self.error_code, self.msg
        )
    }
}

/// Errors about specific documents. The documents are always generic,
/// whatever entity data type the caller asked for.
#[derive(Debug, Clone, PartialEq)]
pub struct DataError {
    pub entity_data: Vec<Document>,
    pub errors: Vec<RequestError>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Response<D> {
    pub entity_name: String,
    pub entity_version: String,
    pub hostname: String,
    pub status: OpStatus,
    pub modified_count: i64,
    pub match_count: i64,
    pub task_handle: String,
    pub session: String,
    pub result_metadata: Vec<ResultMetadata>,
    pub entity_data: D,
    pub data_errors: Vec<DataError>,
    pub errors: Vec<RequestError>,
}

impl<D> Response<D> {
    /// True if the service reported a failure, either through the status or
    /// through request-level errors
    pub fn is_error(&self) -> bool {
        self.status == OpStatus::Error || !self.errors.is_empty()
    }
}

impl<D: fmt::Debug> fmt::Display for Response<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "entity: {}, ver: {}, hostname: {}, status: {:?}, matchCount: {}, modifiedCount: {}, \
             rmd: {:?}, entityData: {:?}, dataErrors: {:?}, errors: {:?}",
            self.entity_name,
            self.entity_version,
            self.hostname,
            self.status,
            self.match_count,
            self.modified_count,
            self.result_metadata,
            self.entity_data,
            self.data_errors,
            self.errors
        )
    }
}

/// Shape of the `processed` documents in a [`Response`]
pub trait EntityData: Sized {
    fn from_processed(processed: Option<&RawValue>) -> Result<Self>;
}

impl<T: DeserializeOwned> EntityData for Vec<T> {
    fn from_processed(processed: Option<&RawValue>) -> Result<Self> {
        match processed {
            Some(raw) => serde_json::from_str(raw.get()).map_err(Error::DataDecode),
            None => Ok(Vec::new()),
        }
    }
}

impl<T: DeserializeOwned> EntityData for Option<T> {
    fn from_processed(processed: Option<&RawValue>) -> Result<Self> {
        let mut docs = Vec::<T>::from_processed(processed)?;
        match docs.len() {
            0 | 1 => Ok(docs.pop()),
            count => {
                tracing::debug!(count, "Single-result response carried multiple documents");
                Err(Error::Cardinality { count })
            }
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEnvelope {
    #[serde(default)]
    entity: Option<String>,
    #[serde(default)]
    entity_version: Option<String>,
    #[serde(default)]
    hostname: Option<String>,
    status: OpStatus,
    #[serde(default)]
    modified_count: Option<i64>,
    #[serde(default)]
    match_count: Option<i64>,
    #[serde(default, alias = "TaskHandle")]
    task_handle: Option<String>,
    #[serde(default, alias = "Session")]
    session: Option<String>,
    #[serde(default)]
    result_metadata: Option<Value>,
    #[serde(default)]
    data_errors: Option<Value>,
    #[serde(default)]
    errors: Option<Value>,
    #[serde(default)]
    processed: Option<Box<RawValue>>,
}

/// Decode a data service response, typing the documents as `D`
pub fn decode_response<D: EntityData>(body: &[u8]) -> Result<Response<D>> {
    let raw: RawEnvelope = serde_json::from_slice(body).map_err(Error::EnvelopeDecode)?;

    let entity_data = D::from_processed(raw.processed.as_deref())?;
    let errors = envelope_records("errors", raw.errors.as_ref())?
        .into_iter()
        .map(decode_request_error)
        .collect::<Result<Vec<_>>>()?;
    let data_errors = envelope_records("dataErrors", raw.data_errors.as_ref())?
        .into_iter()
        .map(decode_data_error)
        .collect::<Result<Vec<_>>>()?;
    let result_metadata = envelope_records("resultMetadata", raw.result_metadata.as_ref())?
        .into_iter()
        .map(decode_result_metadata)
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(
        status = ?raw.status,
        matched = raw.match_count.unwrap_or_default(),
        modified = raw.modified_count.unwrap_or_default(),
        errors = errors.len(),
        data_errors = data_errors.len(),
        "Decoded response"
    );

    Ok(Response {
        entity_name: raw.entity.unwrap_or_default(),
        entity_version: raw.entity_version.unwrap_or_default(),
        hostname: raw.hostname.unwrap_or_default(),
        status: raw.status,
        modified_count: raw.modified_count.unwrap_or_default(),
        match_count: raw.match_count.unwrap_or_default(),
        task_handle: raw.task_handle.unwrap_or_default(),
        session: raw.session.unwrap_or_default(),
        result_metadata,
        entity_data,
        data_errors,
        errors,
    })
}

/// Decode a data service response, keeping the documents generic
pub fn decode_response_untyped(body: &[u8]) -> Result<Response<Vec<Document>>> {
    decode_response(body)
}

fn required_str(
    record: &'static str,
    obj: &Map<String, Value>,
    field: &'static str,
) -> Result<String> {
    match obj.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        _ => Err(Error::field(record, field, "string")),
    }
}

/// Decode a `{context, errorCode, msg}` record. All three must be strings.
pub fn decode_request_error(obj: &Map<String, Value>) -> Result<RequestError> {
    Ok(RequestError {
        context: required_str("request error", obj, "context")?,
        error_code: required_str("request error", obj, "errorCode")?,
        msg: required_str("request error", obj, "msg")?,
    })
}

fn as_objects<'a>(
    record: &'static str,
    field: &'static str,
    value: &'a Value,
) -> Result<Vec<&'a Map<String, Value>>> {
    let malformed = || Error::field(record, field, "array of objects");
    value
        .as_array()
        .ok_or_else(malformed)?
        .iter()
        .map(|item| item.as_object().ok_or_else(malformed))
        .collect()
}

/// A required list of objects inside a record
fn objects<'a>(
    record: &'static str,
    obj: &'a Map<String, Value>,
    field: &'static str,
) -> Result<Vec<&'a Map<String, Value>>> {
    as_objects(record, field, obj.get(field).unwrap_or(&Value::Null))
}

/// An optional list of objects at the top of the envelope. Missing and
/// `null` are both empty.
fn envelope_records<'a>(
    field: &'static str,
    value: Option<&'a Value>,
) -> Result<Vec<&'a Map<String, Value>>> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(value) => as_objects("response", field, value),
    }
}

/// Decode a `{entityData: [...], errors: [...]}` record
pub fn decode_data_error(obj: &Map<String, Value>) -> Result<DataError> {
    let errors = objects("data error", obj, "errors")?
        .into_iter()
        .map(decode_request_error)
        .collect::<Result<Vec<_>>>()?;
    let entity_data = objects("data error", obj, "entityData")?
        .into_iter()
        .cloned()
        .collect();
    Ok(DataError {
        entity_data,
        errors,
    })
}

fn decode_result_metadata(obj: &Map<String, Value>) -> Result<ResultMetadata> {
    Ok(ResultMetadata {
        document_version: required_str("result metadata", obj, "documentVersion")?,
    })
}
