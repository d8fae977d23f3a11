//! Filter, ordering, and embedding evaluation over JSON rows.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde_json::Value;

use treetag_core::types::filter::{FilterField, FilterOp, FilterValue};

/// An embedded relation requested in a column projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Embed {
    /// Relation (table) name.
    pub name: String,
    /// `!inner`: drop rows whose relation is missing.
    pub inner: bool,
}

/// Embedded relations in a projection such as `*, trees!inner(*), locations(id, name)`.
pub(crate) fn parse_embeds(columns: &str) -> Vec<Embed> {
    let mut embeds = Vec::new();
    let mut depth = 0usize;
    let mut token = String::new();

    for ch in columns.chars().chain(std::iter::once(',')) {
        match ch {
            '(' => {
                if depth == 0 {
                    let head = token.trim();
                    let (name, inner) = match head.split_once('!') {
                        Some((name, hint)) => (name, hint.trim() == "inner"),
                        None => (head, false),
                    };
                    if !name.is_empty() {
                        embeds.push(Embed {
                            name: name.to_string(),
                            inner,
                        });
                    }
                }
                depth += 1;
            }
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => token.clear(),
            _ if depth == 0 => token.push(ch),
            _ => {}
        }
    }
    embeds
}

/// Value at a column path: `col`, `relation.col`, or `relation(col)`.
pub(crate) fn lookup<'a>(row: &'a Value, path: &str) -> Option<&'a Value> {
    let normalized = path.replace('(', ".").replace(')', "");
    normalized
        .split('.')
        .try_fold(row, |value, key| value.get(key))
}

/// Scalar rendered as text for comparison with filter parameters.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Whether `row` satisfies `filter`.
pub(crate) fn matches(row: &Value, filter: &FilterField) -> bool {
    let value = lookup(row, &filter.field);
    let text = value.and_then(scalar_text);

    match filter.op {
        FilterOp::IsNull => value.is_none_or(Value::is_null),
        FilterOp::Eq => text.as_deref() == Some(filter.value.as_param().as_str()),
        FilterOp::Ne => text.as_deref() != Some(filter.value.as_param().as_str()),
        FilterOp::ILike => text.is_some_and(|t| like(&t, &filter.value.as_param())),
        FilterOp::In => match (&filter.value, text) {
            (FilterValue::StringList(items), Some(t)) => items.iter().any(|i| *i == t),
            _ => false,
        },
        FilterOp::Gt | FilterOp::Gte | FilterOp::Lt | FilterOp::Lte => {
            let Some(text) = text else {
                return false;
            };
            let ordering = compare_text(&text, &filter.value.as_param());
            match filter.op {
                FilterOp::Gt => ordering == Ordering::Greater,
                FilterOp::Gte => ordering != Ordering::Less,
                FilterOp::Lt => ordering == Ordering::Less,
                _ => ordering != Ordering::Greater,
            }
        }
    }
}

/// Case-insensitive `%`-wildcard match.
pub(crate) fn like(text: &str, pattern: &str) -> bool {
    let text = text.to_lowercase();
    let pattern = pattern.to_lowercase();
    let parts: Vec<&str> = pattern.split('%').collect();

    if parts.len() == 1 {
        return text == pattern;
    }

    let mut rest = text.as_str();
    let last = parts.len() - 1;
    for (i, part) in parts.iter().enumerate() {
        if part.is_empty() {
            continue;
        }
        if i == 0 {
            match rest.strip_prefix(part) {
                Some(r) => rest = r,
                None => return false,
            }
        } else if i == last {
            return rest.ends_with(part);
        } else {
            match rest.find(part) {
                Some(pos) => rest = &rest[pos + part.len()..],
                None => return false,
            }
        }
    }
    true
}

/// Numbers compare numerically, timestamps chronologically, the rest as
/// case-folded strings.
pub(crate) fn compare_text(a: &str, b: &str) -> Ordering {
    if let (Ok(x), Ok(y)) = (a.parse::<f64>(), b.parse::<f64>()) {
        return x.partial_cmp(&y).unwrap_or(Ordering::Equal);
    }
    if let (Some(x), Some(y)) = (parse_time(a), parse_time(b)) {
        return x.cmp(&y);
    }
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

/// Ordering of two rows on a column; missing values sort last.
pub(crate) fn compare_rows(a: &Value, b: &Value, path: &str) -> Ordering {
    let x = lookup(a, path).and_then(scalar_text);
    let y = lookup(b, path).and_then(scalar_text);
    match (x, y) {
        (Some(x), Some(y)) => compare_text(&x, &y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn parse_time(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
