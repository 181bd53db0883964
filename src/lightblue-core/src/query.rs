//! Query expressions.
//!
//! A [`Query`] is an immutable node of a boolean expression tree. Nodes are
//! built with the free functions of this module and composed by value:
//!
//! Only a top-level empty query is dropped, by the request envelopes. An
//! empty query passed as an operand of [`not`], [`and`], [`or`] or
//! [`array_match`] is kept and written as `{}`.
//!
//! ```
//! use lightblue_core::query::{and, cmp_value, RelationalOp};
//! use lightblue_core::Literal;
//!
//! let q = and([
//!     cmp_value("status", RelationalOp::Eq, Literal::string("active")),
//!     cmp_value("age", RelationalOp::Gte, Literal::int(21)),
//! ]);
//! assert_eq!(
//!     q.to_string(),
//!     r#"{"$and":[{"field":"status","op":"=","rvalue":"active"},{"field":"age","op":">=","rvalue":21}]}"#
//! );
//! ```

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;

use crate::literal::{Literal, RValue};

/// Binary comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RelationalOp {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    Neq,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Gte,
}

/// Set membership operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NaryOp {
    #[serde(rename = "$in")]
    In,
    #[serde(rename = "$nin")]
    Nin,
}

/// Array containment operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ArrayOp {
    #[serde(rename = "$any")]
    Any,
    #[serde(rename = "$all")]
    All,
    #[serde(rename = "$none")]
    None,
}

/// Regular expression options. Only the flags set to `true` go on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegexOptions {
    pub case_insensitive: bool,
    pub extended: bool,
    pub multiline: bool,
    pub dotall: bool,
}

/// An opaque query expression. `Query::default()` is the empty query.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Query {
    node: Node,
}

#[derive(Debug, Clone, PartialEq, Default)]
enum Node {
    #[default]
    Empty,
    Value {
        field: String,
        op: RelationalOp,
        rvalue: RValue,
    },
    Field {
        field: String,
        op: RelationalOp,
        rfield: String,
    },
    ValueList {
        field: String,
        op: NaryOp,
        values: Vec<Literal>,
    },
    FieldValues {
        field: String,
        op: NaryOp,
        rfield: String,
    },
    Regex {
        field: String,
        pattern: String,
        options: RegexOptions,
    },
    Not(Box<Query>),
    And(Vec<Query>),
    Or(Vec<Query>),
    ArrayContains {
        array: String,
        op: ArrayOp,
        values: Vec<Literal>,
    },
    ArrayMatch {
        array: String,
        elem_match: Box<Query>,
    },
}

impl Query {
    fn from_node(node: Node) -> Self {
        Self { node }
    }

    /// True only for the zero-constructed query
    pub fn is_empty(&self) -> bool {
        matches!(self.node, Node::Empty)
    }
}

/// `{ field: <field>, op: <op>, rvalue: <rvalue> }`
pub fn cmp_value(field: impl Into<String>, op: RelationalOp, rvalue: impl Into<RValue>) -> Query {
    Query::from_node(Node::Value {
        field: field.into(),
        op,
        rvalue: rvalue.into(),
    })
}

/// `{ field: <field>, op: <op>, rfield: <rfield> }`
pub fn cmp_field(field: impl Into<String>, op: RelationalOp, rfield: impl Into<String>) -> Query {
    Query::from_node(Node::Field {
        field: field.into(),
        op,
        rfield: rfield.into(),
    })
}

/// `{ field: <field>, op: $in|$nin, values: [<values>] }`
pub fn cmp_value_list<L: Into<Literal>>(
    field: impl Into<String>,
    op: NaryOp,
    values: impl IntoIterator<Item = L>,
) -> Query {
    Query::from_node(Node::ValueList {
        field: field.into(),
        op,
        values: values.into_iter().map(Into::into).collect(),
    })
}

/// `{ field: <field>, op: $in|$nin, rfield: <rfield> }`, where `rfield` is an array field
pub fn cmp_field_values(
    field: impl Into<String>,
    op: NaryOp,
    rfield: impl Into<String>,
) -> Query {
    Query::from_node(Node::FieldValues {
        field: field.into(),
        op,
        rfield: rfield.into(),
    })
}

/// `{ field: <field>, regex: <pattern>, caseInsensitive?, extended?, multiline?, dotall? }`
pub fn cmp_regex(field: impl Into<String>, pattern: impl Into<String>, options: RegexOptions) -> Query {
    Query::from_node(Node::Regex {
        field: field.into(),
        pattern: pattern.into(),
        options,
    })
}

/// `{ array: <array>, contains: $any|$all|$none, values: [<values>] }`
pub fn array_contains<L: Into<Literal>>(
    array: impl Into<String>,
    op: ArrayOp,
    values: impl IntoIterator<Item = L>,
) -> Query {
    Query::from_node(Node::ArrayContains {
        array: array.into(),
        op,
        values: values.into_iter().map(Into::into).collect(),
    })
}

/// `{ array: <array>, elemMatch: <query> }`
pub fn array_match(array: impl Into<String>, elem_match: Query) -> Query {
    Query::from_node(Node::ArrayMatch {
        array: array.into(),
        elem_match: Box::new(elem_match),
    })
}

/// `{ $not: <query> }`
pub fn not(query: Query) -> Query {
    Query::from_node(Node::Not(Box::new(query)))
}

/// `{ $and: [<queries>] }`
pub fn and(queries: impl IntoIterator<Item = Query>) -> Query {
    Query::from_node(Node::And(queries.into_iter().collect()))
}

/// `{ $or: [<queries>] }`
pub fn or(queries: impl IntoIterator<Item = Query>) -> Query {
    Query::from_node(Node::Or(queries.into_iter().collect()))
}

// Keys are written in lexicographic order so the wire form is stable.
impl Serialize for Query {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        match &self.node {
            Node::Empty => {}
            Node::Value { field, op, rvalue } => {
                map.serialize_entry("field", field)?;
                map.serialize_entry("op", op)?;
                map.serialize_entry("rvalue", rvalue)?;
            }
            Node::Field { field, op, rfield } => {
                map.serialize_entry("field", field)?;
                map.serialize_entry("op", op)?;
                map.serialize_entry("rfield", rfield)?;
            }
            Node::ValueList { field, op, values } => {
                map.serialize_entry("field", field)?;
                map.serialize_entry("op", op)?;
                map.serialize_entry("values", values)?;
            }
            Node::FieldValues { field, op, rfield } => {
                map.serialize_entry("field", field)?;
                map.serialize_entry("op", op)?;
                map.serialize_entry("rfield", rfield)?;
            }
            Node::Regex {
                field,
                pattern,
                options,
            } => {
                if options.case_insensitive {
                    map.serialize_entry("caseInsensitive", &true)?;
                }
                if options.dotall {
                    map.serialize_entry("dotall", &true)?;
                }
                if options.extended {
                    map.serialize_entry("extended", &true)?;
                }
                map.serialize_entry("field", field)?;
                if options.multiline {
                    map.serialize_entry("multiline", &true)?;
                }
                map.serialize_entry("regex", pattern)?;
            }
            Node::Not(query) => map.serialize_entry("$not", query)?,
            Node::And(queries) => map.serialize_entry("$and", queries)?,
            Node::Or(queries) => map.serialize_entry("$or", queries)?,
            Node::ArrayContains { array, op, values } => {
                map.serialize_entry("array", array)?;
                map.serialize_entry("contains", op)?;
                map.serialize_entry("values", values)?;
            }
            Node::ArrayMatch { array, elem_match } => {
                map.serialize_entry("array", array)?;
                map.serialize_entry("elemMatch", elem_match)?;
            }
        }
        map.end()
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::json::write_json(f, self)
    }
}
