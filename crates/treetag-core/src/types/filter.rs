//! Filter predicates understood by the remote gateway.

use serde::{Deserialize, Serialize};

/// Filter comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    /// Exact equality.
    Eq,
    /// Not equal.
    Ne,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// Case-insensitive pattern match (`%` wildcards).
    ILike,
    /// List membership.
    In,
    /// `IS NULL` check.
    IsNull,
}

impl FilterOp {
    /// Operator keyword used in REST query strings (`eq`, `ilike`, ...).
    pub fn as_rest(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "neq",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::ILike => "ilike",
            Self::In => "in",
            Self::IsNull => "is",
        }
    }
}

/// A dynamic filter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// A string value (timestamps travel as RFC 3339 strings).
    String(String),
    /// An integer value.
    Integer(i64),
    /// A floating-point value.
    Float(f64),
    /// A boolean value.
    Boolean(bool),
    /// A list of string values (for `IN`).
    StringList(Vec<String>),
    /// Null / no value (for `IS NULL`).
    Null,
}

impl FilterValue {
    /// Render the value the way a REST query string expects it.
    pub fn as_param(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            Self::Integer(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Boolean(b) => b.to_string(),
            Self::StringList(items) => format!("({})", items.join(",")),
            Self::Null => "null".to_string(),
        }
    }
}

/// A single filter condition on a named column.
///
/// Columns of an embedded relation are addressed as `relation.column`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterField {
    /// The column name to filter on.
    pub field: String,
    /// The comparison operator.
    pub op: FilterOp,
    /// The value to compare against.
    pub value: FilterValue,
}

impl FilterField {
    /// Create a new filter field.
    pub fn new(field: impl Into<String>, op: FilterOp, value: FilterValue) -> Self {
        Self {
            field: field.into(),
            op,
            value,
        }
    }

    /// Shorthand for an equality filter.
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOp::Eq, FilterValue::String(value.into()))
    }

    /// Shorthand for a case-insensitive pattern filter.
    pub fn ilike(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(field, FilterOp::ILike, FilterValue::String(pattern.into()))
    }

    /// Case-insensitive substring match: `%term%`.
    pub fn contains(field: impl Into<String>, term: &str) -> Self {
        Self::ilike(field, format!("%{term}%"))
    }

    /// Shorthand for a greater-or-equal filter.
    pub fn gte(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOp::Gte, FilterValue::String(value.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_wraps_term() {
        let f = FilterField::contains("common_name", "An");
        assert_eq!(f.op, FilterOp::ILike);
        assert_eq!(f.value, FilterValue::String("%An%".to_string()));
    }

    #[test]
    fn test_list_param() {
        let v = FilterValue::StringList(vec!["a".into(), "b".into()]);
        assert_eq!(v.as_param(), "(a,b)");
    }
}
