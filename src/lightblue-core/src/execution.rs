//! Execution options understood by the Mongo-backed data service.
//!
//! Attach them to a request with [`RequestHeader::with_execution_options`].
//!
//! [`RequestHeader::with_execution_options`]: crate::request::RequestHeader::with_execution_options

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReadPreference {
    Nearest,
    PrimaryPreferred,
    Primary,
    Secondary,
    SecondaryPreferred,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MongoExecutionOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_preference: Option<ReadPreference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_concern: Option<String>,
    #[serde(rename = "maxQueryTimeMS", skip_serializing_if = "Option::is_none")]
    pub max_query_time_ms: Option<u64>,
}

impl MongoExecutionOptions {
    pub fn is_empty(&self) -> bool {
        self.read_preference.is_none()
            && self.write_concern.is_none()
            && self.max_query_time_ms.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{FindRequest, RequestHeader};

    #[test]
    fn test_wire_names() {
        let opts = MongoExecutionOptions {
            read_preference: Some(ReadPreference::SecondaryPreferred),
            write_concern: Some("majority".to_string()),
            max_query_time_ms: Some(500),
        };
        assert_eq!(
            serde_json::to_string(&opts).unwrap(),
            r#"{"readPreference":"secondaryPreferred","writeConcern":"majority","maxQueryTimeMS":500}"#
        );
        assert!(!opts.is_empty());
    }

    #[test]
    fn test_unset_fields_omitted() {
        let opts = MongoExecutionOptions::default();
        assert!(opts.is_empty());
        assert_eq!(serde_json::to_string(&opts).unwrap(), "{}");
    }

    #[test]
    fn test_parse_read_preference() {
        let pref: ReadPreference = serde_json::from_str(r#""primaryPreferred""#).unwrap();
        assert_eq!(pref, ReadPreference::PrimaryPreferred);
        assert!(serde_json::from_str::<ReadPreference>(r#""tertiary""#).is_err());
    }

    #[test]
    fn test_attached_to_request() {
        let opts = MongoExecutionOptions {
            read_preference: Some(ReadPreference::Nearest),
            ..Default::default()
        };
        let header = RequestHeader::new("user")
            .with_execution_options(&opts)
            .unwrap();
        let req = FindRequest::new("user").with_header(header);
        assert_eq!(
            serde_json::to_string(&req).unwrap(),
            r#"{"entity":"user","execution":{"readPreference":"nearest"}}"#
        );
    }
}
