//! Projection expressions.
//!
//! A [`Projection`] is an ordered list of parts. Parts are written in the
//! order they were added, and a projection always serializes as a JSON
//! array, even with a single part.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::query::Query;
use crate::range::Range;
use crate::sort::Sort;

#[derive(Debug, Clone, PartialEq)]
pub enum ProjectionPart {
    /// `{ field, include, recursive }`
    Field {
        field: String,
        include: bool,
        recursive: bool,
    },
    /// `{ field, include, range: [from,to], projection?, sort? }`
    Range {
        field: String,
        include: bool,
        range: Range,
        projection: Option<Projection>,
        sort: Option<Sort>,
    },
    /// `{ field, include, match: <query>, projection?, sort? }`
    Match {
        field: String,
        include: bool,
        query: Query,
        projection: Option<Projection>,
        sort: Option<Sort>,
    },
}

impl Serialize for ProjectionPart {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        match self {
            Self::Field {
                field,
                include,
                recursive,
            } => {
                map.serialize_entry("field", field)?;
                map.serialize_entry("include", include)?;
                map.serialize_entry("recursive", recursive)?;
            }
            Self::Range {
                field,
                include,
                range,
                projection,
                sort,
            } => {
                map.serialize_entry("field", field)?;
                map.serialize_entry("include", include)?;
                if let Some(projection) = projection {
                    map.serialize_entry("projection", projection)?;
                }
                map.serialize_entry("range", range)?;
                if let Some(sort) = sort {
                    map.serialize_entry("sort", sort)?;
                }
            }
            Self::Match {
                field,
                include,
                query,
                projection,
                sort,
            } => {
                map.serialize_entry("field", field)?;
                map.serialize_entry("include", include)?;
                map.serialize_entry("match", query)?;
                if let Some(projection) = projection {
                    map.serialize_entry("projection", projection)?;
                }
                if let Some(sort) = sort {
                    map.serialize_entry("sort", sort)?;
                }
            }
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Projection {
    parts: Vec<ProjectionPart>,
}

impl Projection {
    pub fn new(parts: impl IntoIterator<Item = ProjectionPart>) -> Self {
        Self {
            parts: parts.into_iter().collect(),
        }
    }

    /// Append parts after the existing ones
    pub fn add(&mut self, parts: impl IntoIterator<Item = ProjectionPart>) -> &mut Self {
        self.parts.extend(parts);
        self
    }

    pub fn parts(&self) -> &[ProjectionPart] {
        &self.parts
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

impl FromIterator<ProjectionPart> for Projection {
    fn from_iter<I: IntoIterator<Item = ProjectionPart>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl From<ProjectionPart> for Projection {
    fn from(part: ProjectionPart) -> Self {
        Self { parts: vec![part] }
    }
}

impl Serialize for Projection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.parts.serialize(serializer)
    }
}

pub fn project_field(field: impl Into<String>, include: bool, recursive: bool) -> ProjectionPart {
    ProjectionPart::Field {
        field: field.into(),
        include,
        recursive,
    }
}

pub fn include_field(field: impl Into<String>, recursive: bool) -> ProjectionPart {
    project_field(field, true, recursive)
}

pub fn exclude_field(field: impl Into<String>, recursive: bool) -> ProjectionPart {
    project_field(field, false, recursive)
}

/// Include `field` and everything below it
pub fn include_tree(field: impl Into<String>) -> ProjectionPart {
    include_field(field, true)
}

/// Exclude `field` and everything below it
pub fn exclude_tree(field: impl Into<String>) -> ProjectionPart {
    exclude_field(field, true)
}

/// Project the elements of an array within `range`
pub fn project_range(
    field: impl Into<String>,
    include: bool,
    range: Range,
    projection: Option<Projection>,
    sort: Option<Sort>,
) -> ProjectionPart {
    ProjectionPart::Range {
        field: field.into(),
        include,
        range,
        projection,
        sort,
    }
}

pub fn include_range(
    field: impl Into<String>,
    range: Range,
    projection: Option<Projection>,
    sort: Option<Sort>,
) -> ProjectionPart {
    project_range(field, true, range, projection, sort)
}

pub fn exclude_range(
    field: impl Into<String>,
    range: Range,
    projection: Option<Projection>,
    sort: Option<Sort>,
) -> ProjectionPart {
    project_range(field, false, range, projection, sort)
}

/// Project the elements of an array that match `query`
pub fn project_matching(
    field: impl Into<String>,
    include: bool,
    query: Query,
    projection: Option<Projection>,
    sort: Option<Sort>,
) -> ProjectionPart {
    ProjectionPart::Match {
        field: field.into(),
        include,
        query,
        projection,
        sort,
    }
}

pub fn include_matching(
    field: impl Into<String>,
    query: Query,
    projection: Option<Projection>,
    sort: Option<Sort>,
) -> ProjectionPart {
    project_matching(field, true, query, projection, sort)
}

pub fn exclude_matching(
    field: impl Into<String>,
    query: Query,
    projection: Option<Projection>,
    sort: Option<Sort>,
) -> ProjectionPart {
    project_matching(field, false, query, projection, sort)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::literal::Literal;
    use crate::query::{cmp_value, RelationalOp};

    fn wire(p: &Projection) -> String {
        serde_json::to_string(p).unwrap()
    }

    #[test]
    fn test_empty_projection() {
        let p = Projection::default();
        assert!(p.is_empty());
        assert_eq!(wire(&p), "[]");
    }

    #[test]
    fn test_single_part_never_collapses() {
        let p = Projection::new([include_tree("*")]);
        assert_eq!(wire(&p), r#"[{"field":"*","include":true,"recursive":true}]"#);
    }

    #[test]
    fn test_field_variants() {
        let p = Projection::new([
            include_field("a", false),
            exclude_field("b", true),
            exclude_tree("c"),
            project_field("d", true, false),
        ]);
        assert_eq!(
            wire(&p),
            concat!(
                r#"[{"field":"a","include":true,"recursive":false},"#,
                r#"{"field":"b","include":false,"recursive":true},"#,
                r#"{"field":"c","include":false,"recursive":true},"#,
                r#"{"field":"d","include":true,"recursive":false}]"#
            )
        );
    }

    #[test]
    fn test_add_preserves_caller_order() {
        let mut p = Projection::new([include_field("z", false)]);
        p.add([include_field("a", false), include_field("z", false)]);
        let fields: Vec<_> = p
            .parts()
            .iter()
            .map(|part| match part {
                ProjectionPart::Field { field, .. } => field.as_str(),
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(fields, vec!["z", "a", "z"]);
    }

    #[test]
    fn test_range_projection_without_nested() {
        let p = Projection::from(include_range("arr", Range::new(0, 9), None, None));
        assert_eq!(wire(&p), r#"[{"field":"arr","include":true,"range":[0,9]}]"#);
    }

    #[test]
    fn test_range_projection_with_nested() {
        let p = Projection::from(exclude_range(
            "arr",
            Range::starting_at(2),
            Some(Projection::new([include_field("x", false)])),
            Some(Sort::desc("x")),
        ));
        assert_eq!(
            wire(&p),
            r#"[{"field":"arr","include":false,"projection":[{"field":"x","include":true,"recursive":false}],"range":[2,null],"sort":{"x":"$desc"}}]"#
        );
    }

    #[test]
    fn test_match_projection() {
        let q = cmp_value("x", RelationalOp::Eq, Literal::int(1));
        let p = Projection::from(include_matching("arr", q.clone(), None, None));
        assert_eq!(
            wire(&p),
            r#"[{"field":"arr","include":true,"match":{"field":"x","op":"=","rvalue":1}}]"#
        );

        let p = Projection::from(exclude_matching(
            "arr",
            q,
            Some(Projection::new([include_tree("y")])),
            Some(Sort::asc("y")),
        ));
        assert_eq!(
            wire(&p),
            r#"[{"field":"arr","include":false,"match":{"field":"x","op":"=","rvalue":1},"projection":[{"field":"y","include":true,"recursive":true}],"sort":{"y":"$asc"}}]"#
        );
    }
}
