//! Update expressions.
//!
//! ```
//! use lightblue_core::{value_of, Literal, Update};
//!
//! let mut u = Update::new();
//! u.set("name", Literal::string("x")).add("count", Literal::int(1));
//! assert_eq!(
//!     serde_json::to_string(&u).unwrap(),
//!     r#"[{"$set":{"name":"x"}},{"$add":{"count":1}}]"#
//! );
//!
//! let mut single = Update::new();
//! single.set("copy", value_of("orig"));
//! assert_eq!(
//!     serde_json::to_string(&single).unwrap(),
//!     r#"{"$set":{"copy":{"$valueof":"orig"}}}"#
//! );
//! ```

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;

use crate::literal::RValue;
use crate::query::Query;

/// Which array elements a `$foreach` visits
#[derive(Debug, Clone, PartialEq)]
pub enum ForEachSelector {
    /// `"$all"`
    All,
    Matching(Query),
}

/// What a `$foreach` does to each selected element
#[derive(Debug, Clone, PartialEq)]
pub enum ForEachAction {
    /// `"$remove"`
    Remove,
    Update(Update),
}

#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOp {
    /// `{$set: {field: value}}`
    Set { field: String, value: RValue },
    /// `{$unset: field}`
    Unset { field: String },
    /// `{$add: {field: value}}`, a numeric increment
    Add { field: String, value: RValue },
    /// `{$append: {field: [values]}}`
    Append { field: String, values: Vec<RValue> },
    /// `{$insert: {field: [values]}}`, where `field` ends with the insertion index
    Insert { field: String, values: Vec<RValue> },
    /// `{$foreach: {field: selector, $update: action}}`
    ForEach {
        field: String,
        selector: ForEachSelector,
        action: ForEachAction,
    },
}

/// Single-entry object `{key: value}`
struct Entry<'a, V: ?Sized>(&'a str, &'a V);

impl<V: Serialize + ?Sized> Serialize for Entry<'_, V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.0, self.1)?;
        map.end()
    }
}

struct ForEachBody<'a> {
    field: &'a str,
    selector: &'a ForEachSelector,
    action: &'a ForEachAction,
}

impl Serialize for ForEachBody<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        match self.selector {
            ForEachSelector::All => map.serialize_entry(self.field, "$all")?,
            ForEachSelector::Matching(query) => map.serialize_entry(self.field, query)?,
        }
        match self.action {
            ForEachAction::Remove => map.serialize_entry("$update", "$remove")?,
            ForEachAction::Update(update) => map.serialize_entry("$update", update)?,
        }
        map.end()
    }
}

impl Serialize for UpdateOp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            Self::Set { field, value } => map.serialize_entry("$set", &Entry(field, value))?,
            Self::Unset { field } => map.serialize_entry("$unset", field)?,
            Self::Add { field, value } => map.serialize_entry("$add", &Entry(field, value))?,
            Self::Append { field, values } => {
                map.serialize_entry("$append", &Entry(field, values.as_slice()))?
            }
            Self::Insert { field, values } => {
                map.serialize_entry("$insert", &Entry(field, values.as_slice()))?
            }
            Self::ForEach {
                field,
                selector,
                action,
            } => map.serialize_entry(
                "$foreach",
                &ForEachBody {
                    field,
                    selector,
                    action,
                },
            )?,
        }
        map.end()
    }
}

/// An ordered list of update operations
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Update {
    ops: Vec<UpdateOp>,
}

impl Update {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, op: UpdateOp) -> &mut Self {
        self.ops.push(op);
        self
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<RValue>) -> &mut Self {
        self.push(UpdateOp::Set {
            field: field.into(),
            value: value.into(),
        })
    }

    pub fn unset(&mut self, field: impl Into<String>) -> &mut Self {
        self.push(UpdateOp::Unset {
            field: field.into(),
        })
    }

    /// Increment a numeric field
    pub fn add(&mut self, field: impl Into<String>, value: impl Into<RValue>) -> &mut Self {
        self.push(UpdateOp::Add {
            field: field.into(),
            value: value.into(),
        })
    }

    pub fn append<V: Into<RValue>>(
        &mut self,
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> &mut Self {
        self.push(UpdateOp::Append {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        })
    }

    pub fn insert<V: Into<RValue>>(
        &mut self,
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> &mut Self {
        self.push(UpdateOp::Insert {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        })
    }

    pub fn for_each(
        &mut self,
        field: impl Into<String>,
        selector: ForEachSelector,
        action: ForEachAction,
    ) -> &mut Self {
        self.push(UpdateOp::ForEach {
            field: field.into(),
            selector,
            action,
        })
    }

    pub fn ops(&self) -> &[UpdateOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl From<UpdateOp> for Update {
    fn from(op: UpdateOp) -> Self {
        Self { ops: vec![op] }
    }
}

impl Serialize for Update {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.ops.as_slice() {
            [op] => op.serialize(serializer),
            ops => ops.serialize(serializer),
        }
    }
}

impl fmt::Display for Update {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::json::write_json(f, self)
    }
}
