//! Lightblue Core Library
//!
//! Data model for talking to a Lightblue data service:
//! - Literal values and field references
//! - Query, update, projection and sort expressions
//! - Request envelopes for find, insert, save, update and delete
//! - Response decoding into typed or generic documents
//!
//! This crate performs no I/O. See `lightblue-rs` for the HTTP client.

pub mod error;
pub mod execution;
mod json;
pub mod literal;
pub mod projection;
pub mod query;
pub mod range;
pub mod request;
pub mod response;
pub mod sort;
pub mod update;

/// A generic JSON document
pub type Document = serde_json::Map<String, serde_json::Value>;

// Re-export commonly used types
pub use error::{Error, Result};
pub use execution::{MongoExecutionOptions, ReadPreference};
pub use literal::{value_of, Literal, RValue, ValueOf};
pub use projection::{Projection, ProjectionPart};
pub use query::Query;
pub use range::Range;
pub use request::{
    encode_request, CrudOperation, DataRequest, DeleteRequest, DocData, FindRequest,
    InsertRequest, ProjectionAndRange, RequestHeader, SaveRequest, UpdateRequest,
};
pub use response::{
    decode_response, decode_response_untyped, DataError, EntityData, OpStatus, RequestError,
    Response, ResultMetadata,
};
pub use sort::{Sort, SortKey};
pub use update::{Update, UpdateOp};
