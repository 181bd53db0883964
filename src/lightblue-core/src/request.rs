//! Request envelopes for the five CRUD operations.
//!
//! Every request serializes into a single JSON object. Fields that carry
//! their default value are left out: an empty entity name or version, an
//! unset client id or execution options, an empty projection, query or sort,
//! and a range equal to [`Range::ALL`].

use serde::{Serialize, Serializer};
use serde_json::value::RawValue;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::json::ensure_finite;
use crate::projection::Projection;
use crate::query::Query;
use crate::range::Range;
use crate::sort::Sort;
use crate::update::Update;
use crate::Document;

/// CRUD operation, also the first path segment of the data service URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrudOperation {
    Find,
    Insert,
    Save,
    Update,
    Delete,
}

impl CrudOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Find => "find",
            Self::Insert => "insert",
            Self::Save => "save",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    /// HTTP method the data service expects for this operation
    pub fn http_method(&self) -> &'static str {
        match self {
            Self::Insert => "PUT",
            Self::Find | Self::Save | Self::Update | Self::Delete => "POST",
        }
    }
}

impl std::fmt::Display for CrudOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Common portion of all data requests
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestHeader {
    pub entity_name: String,
    pub entity_version: String,
    pub client_id: Option<Value>,
    pub execution_options: Option<Value>,
}

impl RequestHeader {
    pub fn new(entity_name: impl Into<String>) -> Self {
        Self {
            entity_name: entity_name.into(),
            ..Default::default()
        }
    }

    pub fn with_version(mut self, entity_version: impl Into<String>) -> Self {
        self.entity_version = entity_version.into();
        self
    }

    pub fn with_client_id<T: Serialize + ?Sized>(mut self, client_id: &T) -> Result<Self> {
        self.client_id = Some(to_value("client id", client_id)?);
        Ok(self)
    }

    pub fn with_execution_options<T: Serialize + ?Sized>(mut self, options: &T) -> Result<Self> {
        self.execution_options = Some(to_value("execution options", options)?);
        Ok(self)
    }
}

/// `serde_json::to_value` that refuses NaN and infinities instead of
/// turning them into `null`
fn to_value<T: Serialize + ?Sized>(what: &'static str, value: &T) -> Result<Value> {
    ensure_finite(value).map_err(|e| Error::encoding(what, e))?;
    serde_json::to_value(value).map_err(|e| Error::encoding(what, e))
}

/// Implemented by the requests that can project and window their results
pub trait ProjectionAndRange {
    fn projection(&self) -> &Projection;
    fn range(&self) -> Range;
}

/// A request that can be sent to the data service
pub trait DataRequest: Serialize {
    const OPERATION: CrudOperation;

    fn header(&self) -> &RequestHeader;
}

/// Serialize a request body
pub fn encode_request<R: DataRequest>(request: &R) -> Result<Vec<u8>> {
    serde_json::to_vec(request).map_err(|e| Error::encoding("request", e))
}

/// Document payload of insert and save requests, already encoded as a JSON array
#[derive(Debug, Clone)]
pub struct DocData(Box<RawValue>);

impl DocData {
    /// Pre-encoded documents, passed through verbatim
    pub fn raw(json: &[u8]) -> Result<Self> {
        serde_json::from_slice(json)
            .map(Self)
            .map_err(|e| Error::encoding("document data", e))
    }

    /// A single generic document, sent as a one-element array
    pub fn document(doc: &Document) -> Result<Self> {
        Self::encode(&[doc])
    }

    pub fn documents(docs: &[Document]) -> Result<Self> {
        Self::encode(docs)
    }

    /// Any serializable value. A value that does not serialize to a JSON
    /// array is wrapped in a one-element array.
    pub fn from_value<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        match to_value("document data", value)? {
            array @ Value::Array(_) => Self::encode(&array),
            single => Self::encode(&[single]),
        }
    }

    fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        serde_json::value::to_raw_value(value)
            .map(Self)
            .map_err(|e| Error::encoding("document data", e))
    }

    pub fn get(&self) -> &str {
        self.0.get()
    }
}

impl PartialEq for DocData {
    fn eq(&self, other: &Self) -> bool {
        self.get() == other.get()
    }
}

/// The union of all request fields, in wire order
#[derive(Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct Envelope<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    client: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a RawValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    document_versions: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    entity: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    entity_version: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    execution: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    only_if_current: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    projection: Option<&'a Projection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    query: Option<&'a Query>,
    #[serde(skip_serializing_if = "Option::is_none")]
    range: Option<Range>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sort: Option<&'a Sort>,
    #[serde(skip_serializing_if = "Option::is_none")]
    update: Option<&'a Update>,
    #[serde(skip_serializing_if = "Option::is_none")]
    upsert: Option<bool>,
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

impl<'a> Envelope<'a> {
    fn new(header: &'a RequestHeader) -> Self {
        Self {
            client: header.client_id.as_ref(),
            entity: non_empty(&header.entity_name),
            entity_version: non_empty(&header.entity_version),
            execution: header.execution_options.as_ref(),
            ..Default::default()
        }
    }

    fn projection_and_range<R: ProjectionAndRange>(mut self, request: &'a R) -> Self {
        let projection = request.projection();
        if !projection.is_empty() {
            self.projection = Some(projection);
        }
        let range = request.range();
        if !range.is_all() {
            self.range = Some(range);
        }
        self
    }

    fn query(mut self, query: &'a Query) -> Self {
        if !query.is_empty() {
            self.query = Some(query);
        }
        self
    }

    fn if_current(mut self, if_current_only: bool, versions: &'a [String]) -> Self {
        if if_current_only {
            self.only_if_current = Some(true);
            self.document_versions = Some(versions);
        }
        self
    }
}

macro_rules! projection_and_range {
    ($($request:ty),*) => {
        $(
            impl ProjectionAndRange for $request {
                fn projection(&self) -> &Projection {
                    &self.projection
                }

                fn range(&self) -> Range {
                    self.range
                }
            }
        )*
    };
}

projection_and_range!(FindRequest, InsertRequest, SaveRequest, UpdateRequest);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindRequest {
    pub header: RequestHeader,
    pub query: Query,
    pub projection: Projection,
    pub sort: Sort,
    pub range: Range,
}

impl FindRequest {
    pub fn new(entity_name: impl Into<String>) -> Self {
        Self {
            header: RequestHeader::new(entity_name),
            ..Default::default()
        }
    }

    pub fn with_header(mut self, header: RequestHeader) -> Self {
        self.header = header;
        self
    }

    pub fn with_query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }

    pub fn with_projection(mut self, projection: impl Into<Projection>) -> Self {
        self.projection = projection.into();
        self
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_range(mut self, range: Range) -> Self {
        self.range = range;
        self
    }
}

impl Serialize for FindRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut envelope = Envelope::new(&self.header)
            .projection_and_range(self)
            .query(&self.query);
        if !self.sort.is_empty() {
            envelope.sort = Some(&self.sort);
        }
        envelope.serialize(serializer)
    }
}

impl DataRequest for FindRequest {
    const OPERATION: CrudOperation = CrudOperation::Find;

    fn header(&self) -> &RequestHeader {
        &self.header
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertRequest {
    pub header: RequestHeader,
    pub projection: Projection,
    pub range: Range,
    pub data: DocData,
}

impl InsertRequest {
    pub fn new(entity_name: impl Into<String>, data: DocData) -> Self {
        Self {
            header: RequestHeader::new(entity_name),
            projection: Projection::default(),
            range: Range::ALL,
            data,
        }
    }

    pub fn with_header(mut self, header: RequestHeader) -> Self {
        self.header = header;
        self
    }

    /// Fields of the inserted documents to return
    pub fn with_projection(mut self, projection: impl Into<Projection>) -> Self {
        self.projection = projection.into();
        self
    }

    pub fn with_range(mut self, range: Range) -> Self {
        self.range = range;
        self
    }
}

impl Serialize for InsertRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut envelope = Envelope::new(&self.header).projection_and_range(self);
        envelope.data = Some(&*self.data.0);
        envelope.serialize(serializer)
    }
}

impl DataRequest for InsertRequest {
    const OPERATION: CrudOperation = CrudOperation::Insert;

    fn header(&self) -> &RequestHeader {
        &self.header
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    pub header: RequestHeader,
    pub projection: Projection,
    pub range: Range,
    pub data: DocData,
    pub upsert: bool,
    pub if_current_only: bool,
    pub document_versions: Vec<String>,
}

impl SaveRequest {
    pub fn new(entity_name: impl Into<String>, data: DocData) -> Self {
        Self {
            header: RequestHeader::new(entity_name),
            projection: Projection::default(),
            range: Range::ALL,
            data,
            upsert: false,
            if_current_only: false,
            document_versions: Vec::new(),
        }
    }

    pub fn with_header(mut self, header: RequestHeader) -> Self {
        self.header = header;
        self
    }

    pub fn with_projection(mut self, projection: impl Into<Projection>) -> Self {
        self.projection = projection.into();
        self
    }

    pub fn with_range(mut self, range: Range) -> Self {
        self.range = range;
        self
    }

    pub fn with_upsert(mut self, upsert: bool) -> Self {
        self.upsert = upsert;
        self
    }

    /// Save only the documents whose versions are still `versions`
    pub fn only_if_current(mut self, versions: impl IntoIterator<Item = String>) -> Self {
        self.if_current_only = true;
        self.document_versions = versions.into_iter().collect();
        self
    }
}

impl Serialize for SaveRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut envelope = Envelope::new(&self.header)
            .projection_and_range(self)
            .if_current(self.if_current_only, &self.document_versions);
        envelope.data = Some(&*self.data.0);
        envelope.upsert = Some(self.upsert);
        envelope.serialize(serializer)
    }
}

impl DataRequest for SaveRequest {
    const OPERATION: CrudOperation = CrudOperation::Save;

    fn header(&self) -> &RequestHeader {
        &self.header
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateRequest {
    pub header: RequestHeader,
    pub query: Query,
    pub update: Update,
    pub projection: Projection,
    pub range: Range,
    pub if_current_only: bool,
    pub document_versions: Vec<String>,
}

impl UpdateRequest {
    pub fn new(entity_name: impl Into<String>, query: Query, update: Update) -> Self {
        Self {
            header: RequestHeader::new(entity_name),
            query,
            update,
            projection: Projection::default(),
            range: Range::ALL,
            if_current_only: false,
            document_versions: Vec::new(),
        }
    }

    pub fn with_header(mut self, header: RequestHeader) -> Self {
        self.header = header;
        self
    }

    pub fn with_projection(mut self, projection: impl Into<Projection>) -> Self {
        self.projection = projection.into();
        self
    }

    pub fn with_range(mut self, range: Range) -> Self {
        self.range = range;
        self
    }

    pub fn only_if_current(mut self, versions: impl IntoIterator<Item = String>) -> Self {
        self.if_current_only = true;
        self.document_versions = versions.into_iter().collect();
        self
    }
}

impl Serialize for UpdateRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut envelope = Envelope::new(&self.header)
            .projection_and_range(self)
            .query(&self.query)
            .if_current(self.if_current_only, &self.document_versions);
        envelope.update = Some(&self.update);
        envelope.serialize(serializer)
    }
}

impl DataRequest for UpdateRequest {
    const OPERATION: CrudOperation = CrudOperation::Update;

    fn header(&self) -> &RequestHeader {
        &self.header
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteRequest {
    pub header: RequestHeader,
    pub query: Query,
}

impl DeleteRequest {
    pub fn new(entity_name: impl Into<String>, query: Query) -> Self {
        Self {
            header: RequestHeader::new(entity_name),
            query,
        }
    }

    pub fn with_header(mut self, header: RequestHeader) -> Self {
        self.header = header;
        self
    }
}

impl Serialize for DeleteRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        Envelope::new(&self.header)
            .query(&self.query)
            .serialize(serializer)
    }
}

impl DataRequest for DeleteRequest {
    const OPERATION: CrudOperation = CrudOperation::Delete;

    fn header(&self) -> &RequestHeader {
        &self.header
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::literal::Literal;
    use crate::projection::include_tree;
    use crate::query::{and, cmp_value, RelationalOp};
    use serde_json::json;
    use std::collections::HashMap;

    fn wire<T: Serialize>(v: &T) -> String {
        serde_json::to_string(v).unwrap()
    }

    #[test]
    fn test_find_request() {
        let q = and([
            cmp_value("f1", RelationalOp::Eq, Literal::int(1)),
            cmp_value("f1", RelationalOp::Eq, Literal::string("str")),
        ]);
        let req = FindRequest::new("test")
            .with_query(q)
            .with_projection(include_tree("*"))
            .with_range(Range::EMPTY);

        assert_eq!(
            wire(&req),
            r#"{"entity":"test","projection":[{"field":"*","include":true,"recursive":true}],"query":{"$and":[{"field":"f1","op":"=","rvalue":1},{"field":"f1","op":"=","rvalue":"str"}]},"range":[0,-1]}"#
        );
    }

    #[test]
    fn test_find_request_omits_defaults() {
        let req = FindRequest::new("test");
        assert_eq!(wire(&req), r#"{"entity":"test"}"#);

        let req = FindRequest::default();
        assert_eq!(wire(&req), "{}");
    }

    #[test]
    fn test_find_request_with_sort_and_header() {
        let header = RequestHeader::new("user")
            .with_version("1.0.0")
            .with_client_id("app-1")
            .unwrap()
            .with_execution_options(&json!({"readPreference": "primary"}))
            .unwrap();
        let req = FindRequest::new("ignored")
            .with_header(header)
            .with_sort(Sort::asc("name"))
            .with_range(Range::new(10, 19));

        assert_eq!(
            wire(&req),
            r#"{"client":"app-1","entity":"user","entityVersion":"1.0.0","execution":{"readPreference":"primary"},"range":[10,19],"sort":{"name":"$asc"}}"#
        );
    }

    #[test]
    fn test_insert_request() {
        let data = DocData::raw(br#"[{"a":1}]"#).unwrap();
        let req = InsertRequest::new("test", data).with_projection(include_tree("_id"));
        assert_eq!(
            wire(&req),
            r#"{"data":[{"a":1}],"entity":"test","projection":[{"field":"_id","include":true,"recursive":true}]}"#
        );
    }

    #[test]
    fn test_save_request_upsert_always_present() {
        let data = DocData::raw(b"[]").unwrap();
        let req = SaveRequest::new("test", data.clone());
        assert_eq!(wire(&req), r#"{"data":[],"entity":"test","upsert":false}"#);

        let req = SaveRequest::new("test", data)
            .with_upsert(true)
            .only_if_current(vec!["v1".to_string(), "v2".to_string()]);
        assert_eq!(
            wire(&req),
            r#"{"data":[],"documentVersions":["v1","v2"],"entity":"test","onlyIfCurrent":true,"upsert":true}"#
        );
    }

    #[test]
    fn test_update_request() {
        let mut update = Update::new();
        update.set("x", Literal::int(2));
        let req = UpdateRequest::new(
            "test",
            cmp_value("_id", RelationalOp::Eq, Literal::string("abc")),
            update,
        )
        .with_range(Range::up_to(0));
        assert_eq!(
            wire(&req),
            r#"{"entity":"test","query":{"field":"_id","op":"=","rvalue":"abc"},"range":[0,0],"update":{"$set":{"x":2}}}"#
        );

        let req = req.only_if_current(Vec::new());
        assert_eq!(
            wire(&req),
            r#"{"documentVersions":[],"entity":"test","onlyIfCurrent":true,"query":{"field":"_id","op":"=","rvalue":"abc"},"range":[0,0],"update":{"$set":{"x":2}}}"#
        );
    }

    #[test]
    fn test_delete_request() {
        let req = DeleteRequest::new(
            "test",
            cmp_value("_id", RelationalOp::Eq, Literal::string("abc")),
        )
        .with_header(RequestHeader::new("test").with_version("2"));
        assert_eq!(
            wire(&req),
            r#"{"entity":"test","entityVersion":"2","query":{"field":"_id","op":"=","rvalue":"abc"}}"#
        );
    }

    #[test]
    fn test_empty_query_never_emitted() {
        let req = DeleteRequest::new("test", Query::default());
        assert_eq!(wire(&req), r#"{"entity":"test"}"#);
    }

    #[test]
    fn test_encode_request() {
        let body = encode_request(&FindRequest::new("test")).unwrap();
        assert_eq!(body, br#"{"entity":"test"}"#.to_vec());
        assert_eq!(FindRequest::OPERATION.as_str(), "find");
        assert_eq!(DeleteRequest::OPERATION.to_string(), "delete");
        assert_eq!(InsertRequest::OPERATION.http_method(), "PUT");
        assert_eq!(SaveRequest::OPERATION.http_method(), "POST");
    }

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Sample {
        string_value: String,
        int_value: i64,
        string_array: Vec<String>,
        obj_array: Vec<Sample>,
    }

    #[test]
    fn test_doc_data_wraps_single_struct() {
        let sample = Sample {
            string_value: "strvalue".to_string(),
            int_value: 123,
            string_array: vec!["1".to_string(), "2".to_string(), "3".to_string()],
            obj_array: vec![Sample {
                string_value: "nestedStr".to_string(),
                int_value: 234,
                string_array: Vec::new(),
                obj_array: Vec::new(),
            }],
        };
        let data = DocData::from_value(&sample).unwrap();
        let decoded: Value = serde_json::from_str(data.get()).unwrap();

        assert_eq!(decoded[0]["stringValue"], "strvalue");
        assert_eq!(decoded[0]["intValue"], 123);
        assert_eq!(decoded[0]["stringArray"], json!(["1", "2", "3"]));
        assert_eq!(decoded[0]["objArray"][0]["stringValue"], "nestedStr");
        assert_eq!(decoded[0]["objArray"][0]["intValue"], 234);
    }

    #[test]
    fn test_doc_data_wraps_map() {
        let mut map = HashMap::new();
        map.insert("string1", "str1");
        map.insert("string2", "str2");
        let data = DocData::from_value(&map).unwrap();
        let decoded: Vec<HashMap<String, String>> = serde_json::from_str(data.get()).unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0]["string1"], "str1");
        assert_eq!(decoded[0]["string2"], "str2");
    }

    #[test]
    fn test_doc_data_keeps_sequences() {
        let data = DocData::from_value(&vec![json!({"a": 1}), json!({"a": 2})]).unwrap();
        assert_eq!(data.get(), r#"[{"a":1},{"a":2}]"#);
    }

    #[test]
    fn test_doc_data_documents() {
        let doc: Document = serde_json::from_str(r#"{"k":"v"}"#).unwrap();
        assert_eq!(DocData::document(&doc).unwrap().get(), r#"[{"k":"v"}]"#);
        assert_eq!(
            DocData::documents(&[doc.clone(), doc]).unwrap().get(),
            r#"[{"k":"v"},{"k":"v"}]"#
        );
    }

    #[test]
    fn test_doc_data_raw_is_verbatim() {
        let data = DocData::raw(br#"[{"a": 1,  "b": [true]}]"#).unwrap();
        assert_eq!(data.get(), r#"[{"a": 1,  "b": [true]}]"#);
        assert!(matches!(
            DocData::raw(b"[{").unwrap_err(),
            Error::Encoding { .. }
        ));
    }

    #[test]
    fn test_non_finite_double_fails_to_encode() {
        for n in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let req = FindRequest::new("e")
                .with_query(cmp_value("x", RelationalOp::Lt, Literal::double(n)));
            assert!(matches!(
                encode_request(&req).unwrap_err(),
                Error::Encoding { what: "request", .. }
            ));

            let mut update = Update::new();
            update.set("x", Literal::double(n));
            let req = UpdateRequest::new("e", Query::default(), update);
            assert!(encode_request(&req).is_err());
        }
    }

    #[test]
    fn test_doc_data_rejects_non_finite_floats() {
        assert!(matches!(
            DocData::from_value(&vec![f64::NAN]).unwrap_err(),
            Error::Encoding {
                what: "document data",
                ..
            }
        ));

        let mut doc = HashMap::new();
        doc.insert("score", f64::INFINITY);
        assert!(DocData::from_value(&doc).is_err());

        assert!(RequestHeader::new("e")
            .with_execution_options(&json!({"ok": 1}))
            .is_ok());
        assert!(RequestHeader::new("e").with_client_id(&f64::NAN).is_err());
    }

    #[test]
    fn test_doc_data_encoding_failure() {
        let mut bad = HashMap::new();
        bad.insert((1, 2), "tuple keys are not JSON object keys");
        assert!(matches!(
            DocData::from_value(&bad).unwrap_err(),
            Error::Encoding { .. }
        ));
    }
}
