//! Translation of request query strings into typed list queries.
//!
//! A query string such as
//!
//! ```text
//! difficulty=easy&price[lt]=500&duration=5&duration=7&sort=-price&fields=name,price
//! ```
//!
//! is split into:
//! - a [`Filter`] over the document fields, with the bare comparison keywords
//!   (`gte`, `gt`, `lte`, `lt`) turned into store operators (`$gte`, ...)
//! - sort keys, a field projection and optional pagination taken from the
//!   reserved keys (`sort`, `fields`, `page`, `limit`)
//!
//! Anything that does not fit this shape is rejected with a [`QueryError`]
//! instead of being passed through to the store.

use serde_json::{Map, Number, Value};
use std::{cmp::Ordering, collections::BTreeMap};

use crate::QueryError;

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;

/// Keys that control the shape of the result rather than filtering it.
///
/// `limits` is accepted and ignored for compatibility with older clients.
pub const RESERVED_KEYS: &[&str] = &["page", "sort", "limit", "limits", "fields"];

/// Page size used when only `page` is given.
pub const DEFAULT_PAGE_LIMIT: usize = 100;

/// Comparison keywords accepted inside brackets, e.g. `price[gte]=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Gte,
    Gt,
    Lte,
    Lt,
}

impl ComparisonOperator {
    pub fn parse(keyword: &str) -> Option<Self> {
        match keyword {
            "gte" => Some(ComparisonOperator::Gte),
            "gt" => Some(ComparisonOperator::Gt),
            "lte" => Some(ComparisonOperator::Lte),
            "lt" => Some(ComparisonOperator::Lt),
            _ => None,
        }
    }

    /// Store-side spelling of the operator.
    pub fn as_operator(self) -> &'static str {
        match self {
            ComparisonOperator::Gte => "$gte",
            ComparisonOperator::Gt => "$gt",
            ComparisonOperator::Lte => "$lte",
            ComparisonOperator::Lt => "$lt",
        }
    }

    fn accepts(self, ordering: Ordering) -> bool {
        match self {
            ComparisonOperator::Gte => ordering != Ordering::Less,
            ComparisonOperator::Gt => ordering == Ordering::Greater,
            ComparisonOperator::Lte => ordering != Ordering::Greater,
            ComparisonOperator::Lt => ordering == Ordering::Less,
        }
    }
}

/// Constraint on a single field.
///
/// Values are kept as the raw strings from the query and cast against the
/// stored value when matching, the way the store casts against its schema.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// The field equals any of the values.
    AnyOf(Vec<String>),

    /// Every comparison holds.
    Compare(Vec<(ComparisonOperator, String)>),
}

/// Per-field constraints, combined with AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: BTreeMap<String, Condition>,
}

impl Filter {
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn condition(&self, field: &str) -> Option<&Condition> {
        self.clauses.get(field)
    }

    fn add_equals(&mut self, field: &str, value: &str) -> Result<(), QueryError> {
        match self
            .clauses
            .entry(field.to_string())
            .or_insert_with(|| Condition::AnyOf(Vec::new()))
        {
            Condition::AnyOf(values) => {
                values.push(value.to_string());
                Ok(())
            }
            Condition::Compare(_) => Err(QueryError::ConflictingConditions {
                field: field.to_string(),
            }),
        }
    }

    fn add_comparison(
        &mut self,
        field: &str,
        operator: ComparisonOperator,
        value: &str,
    ) -> Result<(), QueryError> {
        match self
            .clauses
            .entry(field.to_string())
            .or_insert_with(|| Condition::Compare(Vec::new()))
        {
            Condition::Compare(comparisons) => {
                comparisons.push((operator, value.to_string()));
                Ok(())
            }
            Condition::AnyOf(_) => Err(QueryError::ConflictingConditions {
                field: field.to_string(),
            }),
        }
    }

    /// Render the filter as a store filter expression.
    ///
    /// `price[gte]=100&difficulty=easy` renders as
    /// `{"difficulty": "easy", "price": {"$gte": 100}}`. Repeated equality
    /// values render as `{"$in": [...]}`.
    pub fn to_document(&self) -> Value {
        let mut document = Map::new();

        for (field, condition) in &self.clauses {
            let rendered = match condition {
                Condition::AnyOf(values) => match values.as_slice() {
                    [single] => render_scalar(single),
                    many => {
                        let mut operator = Map::new();
                        operator.insert(
                            "$in".to_string(),
                            Value::Array(many.iter().map(|v| render_scalar(v)).collect()),
                        );
                        Value::Object(operator)
                    }
                },
                Condition::Compare(comparisons) => {
                    let mut operators = Map::new();
                    for (operator, value) in comparisons {
                        operators.insert(operator.as_operator().to_string(), render_scalar(value));
                    }
                    Value::Object(operators)
                }
            };
            document.insert(field.clone(), rendered);
        }

        Value::Object(document)
    }

    /// Whether a stored document satisfies every clause.
    ///
    /// Array fields match when any element matches.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::Cast` if a filter value cannot be cast to the
    /// type of a stored number or boolean. Every clause is checked, so the
    /// outcome does not depend on clause order.
    pub fn matches(&self, document: &Value) -> Result<bool, QueryError> {
        let mut matched = true;
        for (field, condition) in &self.clauses {
            let value = lookup(document, field);
            let clause = match condition {
                Condition::AnyOf(values) => {
                    let mut any = false;
                    for raw in values {
                        any |= value_matches(field, value, raw, |o| o == Ordering::Equal)?;
                    }
                    any
                }
                Condition::Compare(comparisons) => {
                    let mut all = true;
                    for (operator, raw) in comparisons {
                        all &= value_matches(field, value, raw, |o| operator.accepts(o))?;
                    }
                    all
                }
            };
            matched &= clause;
        }
        Ok(matched)
    }
}

/// One sort criterion; `-field` in the query string sorts descending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub descending: bool,
}

/// Field selection applied to each returned document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Projection {
    #[default]
    All,

    /// Only these fields, plus `_id`.
    Include(Vec<String>),

    /// Every field except these.
    Exclude(Vec<String>),
}

impl Projection {
    fn parse(raw: &str) -> Result<Self, QueryError> {
        let mut included = Vec::new();
        let mut excluded = Vec::new();

        for field in split_list(raw) {
            match field.strip_prefix('-') {
                Some(name) => excluded.push(checked_field(name, field)?),
                None => included.push(checked_field(field, field)?),
            }
        }

        match (included.is_empty(), excluded.is_empty()) {
            (true, true) => Ok(Projection::All),
            (false, true) => Ok(Projection::Include(included)),
            (true, false) => Ok(Projection::Exclude(excluded)),
            (false, false) => Err(QueryError::MixedProjection),
        }
    }

    pub fn apply(&self, document: Value) -> Value {
        match (self, document) {
            (Projection::Include(keep), Value::Object(mut fields)) => {
                fields.retain(|key, _| key == "_id" || keep.iter().any(|k| k == key));
                Value::Object(fields)
            }
            (Projection::Exclude(drop), Value::Object(mut fields)) => {
                fields.retain(|key, _| !drop.iter().any(|k| k == key));
                Value::Object(fields)
            }
            (_, document) => document,
        }
    }
}

/// 1-based page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
}

impl Pagination {
    pub fn skip(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// Everything a list request asks of the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub filter: Filter,
    pub sort: Vec<SortKey>,
    pub projection: Projection,
    pub pagination: Option<Pagination>,
}

impl ListQuery {
    /// Parse a raw (percent-encoded) query string.
    ///
    /// # Errors
    ///
    /// Returns `QueryError` if a key is malformed, an operator is not one of
    /// `gte`, `gt`, `lte`, `lt`, or `page`/`limit` are not positive integers.
    pub fn parse(raw: &str) -> Result<Self, QueryError> {
        Self::from_pairs(url::form_urlencoded::parse(raw.as_bytes()))
    }

    /// Build a query from already decoded key/value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, QueryError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut query = ListQuery::default();
        let mut page = None;
        let mut limit = None;
        let mut fields = Vec::new();

        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref());
            match key {
                "page" => page = Some(parse_positive(key, value)?),
                "limit" => limit = Some(parse_positive(key, value)?),
                "limits" => {}
                "sort" => {
                    for field in split_list(value) {
                        query.sort.push(match field.strip_prefix('-') {
                            Some(name) => SortKey {
                                field: checked_field(name, field)?,
                                descending: true,
                            },
                            None => SortKey {
                                field: checked_field(field, field)?,
                                descending: false,
                            },
                        });
                    }
                }
                "fields" => fields.push(value.to_string()),
                _ => match parse_filter_key(key)? {
                    (field, Some(operator)) => query.filter.add_comparison(field, operator, value)?,
                    (field, None) => query.filter.add_equals(field, value)?,
                },
            }
        }

        query.projection = Projection::parse(&fields.join(","))?;
        query.pagination = match (page, limit) {
            (None, None) => None,
            (page, limit) => Some(Pagination {
                page: page.unwrap_or(1),
                limit: limit.unwrap_or(DEFAULT_PAGE_LIMIT),
            }),
        };

        Ok(query)
    }
}

/// Order two documents by the given sort keys.
pub fn compare_documents(sort: &[SortKey], a: &Value, b: &Value) -> Ordering {
    for key in sort {
        let ordering = compare_values(lookup(a, &key.field), lookup(b, &key.field));
        let ordering = if key.descending {
            ordering.reverse()
        } else {
            ordering
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn parse_filter_key(key: &str) -> Result<(&str, Option<ComparisonOperator>), QueryError> {
    let invalid = || QueryError::InvalidKey {
        key: key.to_string(),
    };

    let (field, operator) = match key.split_once('[') {
        Some((field, rest)) => {
            let keyword = rest
                .strip_suffix(']')
                .filter(|k| !k.contains(['[', ']']))
                .ok_or_else(invalid)?;
            let operator = ComparisonOperator::parse(keyword).ok_or_else(|| {
                QueryError::UnsupportedOperator {
                    field: field.to_string(),
                    operator: keyword.to_string(),
                }
            })?;
            (field, Some(operator))
        }
        None => (key, None),
    };

    if field.is_empty() || field.starts_with('$') || field.contains(']') {
        return Err(invalid());
    }

    Ok((field, operator))
}

fn checked_field(name: &str, original: &str) -> Result<String, QueryError> {
    if name.is_empty() || name.starts_with('$') {
        return Err(QueryError::InvalidKey {
            key: original.to_string(),
        });
    }
    Ok(name.to_string())
}

fn parse_positive(key: &str, value: &str) -> Result<usize, QueryError> {
    value
        .trim()
        .parse::<usize>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| QueryError::InvalidNumber {
            key: key.to_string(),
            value: value.to_string(),
        })
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
}

fn render_scalar(raw: &str) -> Value {
    if let Ok(integer) = raw.parse::<i64>() {
        return Value::from(integer);
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(raw.to_string()))
}

fn lookup<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(document, |value, segment| value.get(segment))
}

fn value_matches(
    field: &str,
    value: Option<&Value>,
    raw: &str,
    accept: impl Fn(Ordering) -> bool,
) -> Result<bool, QueryError> {
    match value {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Array(items)) => {
            let mut any = false;
            for item in items {
                any |= compare_raw(field, item, raw)?.is_some_and(&accept);
            }
            Ok(any)
        }
        Some(value) => Ok(compare_raw(field, value, raw)?.is_some_and(&accept)),
    }
}

/// Cast `raw` to the type of the stored value and compare.
fn compare_raw(field: &str, value: &Value, raw: &str) -> Result<Option<Ordering>, QueryError> {
    let cast_error = |expected| QueryError::Cast {
        field: field.to_string(),
        value: raw.to_string(),
        expected,
    };

    match value {
        Value::Number(number) => {
            let wanted = raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|wanted| wanted.is_finite())
                .ok_or_else(|| cast_error("Number"))?;
            Ok(number.as_f64().and_then(|stored| stored.partial_cmp(&wanted)))
        }
        Value::String(text) => Ok(Some(text.as_str().cmp(raw))),
        Value::Bool(flag) => {
            let wanted = raw
                .parse::<bool>()
                .map_err(|_| cast_error("Boolean"))?;
            Ok(Some(flag.cmp(&wanted)))
        }
        _ => Ok(None),
    }
}

fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Number(_)) => 1,
        Some(Value::String(_)) => 2,
        Some(Value::Object(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Bool(_)) => 5,
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        },
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}
