/// Errors raised while encoding requests or decoding responses
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to encode {what}: {source}")]
    Encoding {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Malformed response envelope: {0}")]
    EnvelopeDecode(#[source] serde_json::Error),

    #[error("Entity data does not match the requested type: {0}")]
    DataDecode(#[source] serde_json::Error),

    #[error("More than one result for a non-array resultset ({count} documents)")]
    Cardinality { count: usize },

    #[error("{record}: field `{field}` is missing or is not a {expected}")]
    FieldDecode {
        record: &'static str,
        field: &'static str,
        expected: &'static str,
    },
}

impl Error {
    pub(crate) fn encoding(what: &'static str, source: serde_json::Error) -> Self {
        Self::Encoding { what, source }
    }

    pub(crate) fn field(record: &'static str, field: &'static str, expected: &'static str) -> Self {
        Self::FieldDecode {
            record,
            field,
            expected,
        }
    }

    /// True for the single-result cardinality violation
    pub fn is_cardinality(&self) -> bool {
        matches!(self, Self::Cardinality { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
