use serde::ser::SerializeTuple;
use serde::{Serialize, Serializer};

/// Inclusive `[from, to]` window over a resultset or an array.
///
/// `to == None` is unbounded and goes on the wire as `null`. A range with
/// `to < from` is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub from: u64,
    pub to: Option<i64>,
}

impl Range {
    /// Everything, `[0, null]`. Requests omit this range.
    pub const ALL: Range = Range { from: 0, to: None };

    /// A deliberately empty window, `[0, -1]`
    pub const EMPTY: Range = Range {
        from: 0,
        to: Some(-1),
    };

    pub fn new(from: u64, to: i64) -> Self {
        Self { from, to: Some(to) }
    }

    /// From `from` to the end of the resultset
    pub fn starting_at(from: u64) -> Self {
        Self { from, to: None }
    }

    /// From the start up to and including `to`
    pub fn up_to(to: i64) -> Self {
        Self { from: 0, to: Some(to) }
    }

    pub fn is_all(&self) -> bool {
        *self == Self::ALL
    }
}

impl Default for Range {
    fn default() -> Self {
        Self::ALL
    }
}

impl Serialize for Range {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(&self.from)?;
        tuple.serialize_element(&self.to)?;
        tuple.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_wire_form() {
        assert_eq!(serde_json::to_string(&Range::EMPTY).unwrap(), "[0,-1]");
        assert_eq!(serde_json::to_string(&Range::ALL).unwrap(), "[0,null]");
        assert_eq!(serde_json::to_string(&Range::new(5, 9)).unwrap(), "[5,9]");
        assert_eq!(serde_json::to_string(&Range::starting_at(10)).unwrap(), "[10,null]");
        assert_eq!(serde_json::to_string(&Range::up_to(4)).unwrap(), "[0,4]");
    }

    #[test]
    fn test_is_all() {
        assert!(Range::ALL.is_all());
        assert!(Range::default().is_all());
        assert!(Range::starting_at(0).is_all());
        assert!(!Range::starting_at(1).is_all());
        assert!(!Range::EMPTY.is_all());
    }
}
