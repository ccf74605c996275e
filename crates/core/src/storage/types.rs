use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A raw document as held by the remote store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

/// Comparison applied by a [`Filter`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterOp {
    /// Field equals the value.
    Eq,
    /// Field equals one of the values in the (array) value.
    In,
    /// Field is an array containing the value.
    Contains,
}

/// A single field predicate of a [`Query`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::Eq,
            value: value.into(),
        }
    }

    pub fn is_in(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::In,
            value: Value::Array(values),
        }
    }

    pub fn contains(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::Contains,
            value: value.into(),
        }
    }
}

/// Ordering direction for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Ascending,
    Descending,
}

/// A filtered, ordered, paginated list query.
///
/// Pagination is cursor based: `start_after` names the id of the last
/// document of the previous page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order_by: Option<(String, Direction)>,
    pub limit: Option<usize>,
    pub start_after: Option<String>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some((field.into(), direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn start_after(mut self, cursor: Option<&str>) -> Self {
        self.start_after = cursor.map(str::to_string);
        self
    }

    /// Shorthand for the newest-first pages used by every feed listing.
    pub fn newest_first(limit: usize, cursor: Option<&str>) -> Self {
        Self::new()
            .order_by("created_at", Direction::Descending)
            .limit(limit)
            .start_after(cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_builder() {
        let query = Query::new()
            .filter(Filter::eq("author_id", "u1"))
            .order_by("created_at", Direction::Descending)
            .limit(10)
            .start_after(Some("p9"));

        assert_eq!(query.filters, vec![Filter::eq("author_id", "u1")]);
        assert_eq!(
            query.order_by,
            Some(("created_at".to_string(), Direction::Descending))
        );
        assert_eq!(query.limit, Some(10));
        assert_eq!(query.start_after.as_deref(), Some("p9"));
    }

    #[test]
    fn test_in_filter_wraps_values_in_array() {
        let filter = Filter::is_in("author_id", vec![json!("u1"), json!("u2")]);
        assert_eq!(filter.op, FilterOp::In);
        assert_eq!(filter.value, json!(["u1", "u2"]));
    }

    #[test]
    fn test_newest_first() {
        let query = Query::newest_first(5, None);
        assert!(query.filters.is_empty());
        assert_eq!(query.limit, Some(5));
        assert_eq!(query.start_after, None);
    }
}
