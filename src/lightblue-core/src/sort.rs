use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;

/// A field and sort direction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub descending: bool,
}

impl SortKey {
    pub fn new(field: impl Into<String>, descending: bool) -> Self {
        Self {
            field: field.into(),
            descending,
        }
    }

    fn direction(&self) -> &'static str {
        if self.descending {
            "$desc"
        } else {
            "$asc"
        }
    }
}

impl Serialize for SortKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.field, self.direction())?;
        map.end()
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::json::write_json(f, self)
    }
}

/// Ordered list of sort keys
///
/// A single key serializes as a bare object, anything else as an array.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sort {
    keys: Vec<SortKey>,
}

impl Sort {
    /// Build a sort from `(field, direction)` pairs, where a negative
    /// direction sorts descending. Keys appear on the wire in iteration
    /// order, so a `HashMap` argument yields an unspecified key order.
    pub fn by<F: Into<String>>(fields: impl IntoIterator<Item = (F, i32)>) -> Self {
        Self {
            keys: fields
                .into_iter()
                .map(|(field, dir)| SortKey::new(field, dir < 0))
                .collect(),
        }
    }

    pub fn from_keys(keys: impl IntoIterator<Item = SortKey>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::default().then_asc(field)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::default().then_desc(field)
    }

    pub fn then_asc(mut self, field: impl Into<String>) -> Self {
        self.keys.push(SortKey::new(field, false));
        self
    }

    pub fn then_desc(mut self, field: impl Into<String>) -> Self {
        self.keys.push(SortKey::new(field, true));
        self
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl Serialize for Sort {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.keys.as_slice() {
            [key] => key.serialize(serializer),
            keys => keys.serialize(serializer),
        }
    }
}
