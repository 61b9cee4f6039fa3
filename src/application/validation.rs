//! Declarative payload validation.
//!
//! A [`Schema`] lists fields in declaration order. Every structural rule is
//! evaluated for every field, then the violation with the lowest
//! `(rule, position)` is reported, so the same bad payload always yields the
//! same message. Existence and uniqueness checks need the repositories and
//! run afterwards in the engine.

use crate::error::{Result, WorkflowError};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};
use std::str::FromStr;

#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    Text,
    Integer,
    Number,
    Date,
    Enum(&'static [&'static str]),
    Object,
    /// Array of objects, each checked against the nested fields.
    List(&'static [Field]),
    /// A single object or an array of objects.
    Records(&'static [Field]),
    StringList,
    Any,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Unbounded,
    NonNegative,
    Positive,
}

#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub non_empty: bool,
    pub bound: Bound,
}

impl Field {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
            non_empty: false,
            bound: Bound::Unbounded,
        }
    }

    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            required: false,
            ..Self::required(name, kind)
        }
    }

    pub const fn non_empty(self) -> Self {
        Self {
            non_empty: true,
            ..self
        }
    }

    pub const fn non_negative(self) -> Self {
        Self {
            bound: Bound::NonNegative,
            ..self
        }
    }

    pub const fn positive(self) -> Self {
        Self {
            bound: Bound::Positive,
            ..self
        }
    }
}

/// `end` must be strictly after `start` when both are well-formed dates.
#[derive(Debug, Clone, Copy)]
pub struct DateOrder {
    pub start: &'static str,
    pub end: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub fields: &'static [Field],
    pub date_orders: &'static [DateOrder],
}

/// Structural rules in the order they take precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rule {
    Presence,
    NonEmpty,
    Type,
    Range,
    Membership,
    DateFormat,
    DateOrder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub rule: Rule,
    pub position: usize,
    pub message: String,
}

/// A payload that passed structural validation. Numeric strings have been
/// normalized to JSON numbers.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPayload {
    fields: Map<String, Value>,
}

impl ValidatedPayload {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).filter(|v| !v.is_null())
    }

    /// Deserializes into a typed command.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(Value::Object(self.fields.clone()))
            .map_err(|e| WorkflowError::validation(format!("Invalid payload: {e}")))
    }
}

struct Collector {
    position: usize,
    violations: Vec<Violation>,
}

impl Collector {
    fn next_position(&mut self) -> usize {
        self.position += 1;
        self.position
    }

    fn push(&mut self, rule: Rule, position: usize, message: String) {
        self.violations.push(Violation {
            rule,
            position,
            message,
        });
    }
}

fn lookup<'a>(obj: &'a mut Map<String, Value>, path: &str) -> Option<&'a mut Value> {
    let mut parts = path.split('.');
    let first = parts.next()?;
    let mut current = obj.get_mut(first)?;
    for part in parts {
        current = current.as_object_mut()?.get_mut(part)?;
    }
    if current.is_null() { None } else { Some(current) }
}

fn is_blank(value: &Value) -> bool {
    value.as_str().is_some_and(|s| s.trim().is_empty())
}

fn to_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .ok(),
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

fn parse_date(value: &Value) -> Option<NaiveDate> {
    let s = value.as_str()?.trim();
    if s.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn check_bound(field: &Field, label: &str, number: Decimal, pos: usize, out: &mut Collector) {
    match field.bound {
        Bound::NonNegative if number < Decimal::ZERO => {
            out.push(Rule::Range, pos, format!("{label} cannot be negative"));
        }
        Bound::Positive if number <= Decimal::ZERO => {
            out.push(Rule::Range, pos, format!("{label} must be greater than 0"));
        }
        _ => {}
    }
}

fn check_value(field: &Field, label: &str, value: &mut Value, pos: usize, out: &mut Collector) {
    match field.kind {
        FieldKind::Text => match value {
            Value::String(s) if field.non_empty && s.trim().is_empty() => {
                out.push(Rule::NonEmpty, pos, format!("{label} cannot be empty"));
            }
            Value::String(_) => {}
            _ => out.push(Rule::Type, pos, format!("{label} must be a string")),
        },
        FieldKind::Number | FieldKind::Integer => {
            if is_blank(value) {
                out.push(Rule::NonEmpty, pos, format!("{label} cannot be empty"));
                return;
            }
            let Some(number) = to_decimal(value) else {
                out.push(Rule::Type, pos, format!("{label} must be numeric"));
                return;
            };
            if matches!(field.kind, FieldKind::Integer) {
                if !number.fract().is_zero() {
                    out.push(Rule::Type, pos, format!("{label} must be an integer"));
                    return;
                }
                if let Ok(n) = i64::try_from(number.trunc()) {
                    *value = Value::Number(Number::from(n));
                }
            } else if let Value::String(s) = value {
                if let Ok(n) = Number::from_str(s.trim()) {
                    *value = Value::Number(n);
                }
            }
            check_bound(field, label, number, pos, out);
        }
        FieldKind::Enum(allowed) => match value.as_str() {
            Some(s) if s.trim().is_empty() => {
                out.push(Rule::NonEmpty, pos, format!("{label} cannot be empty"));
            }
            Some(s) if allowed.contains(&s) => {}
            Some(_) => out.push(
                Rule::Membership,
                pos,
                format!("Invalid {label}. Must be one of: {}", allowed.join(", ")),
            ),
            None => out.push(Rule::Type, pos, format!("{label} must be a string")),
        },
        FieldKind::Date => {
            if is_blank(value) {
                out.push(Rule::NonEmpty, pos, format!("{label} cannot be empty"));
            } else if !value.is_string() {
                out.push(Rule::Type, pos, format!("{label} must be a string"));
            } else if parse_date(value).is_none() {
                out.push(
                    Rule::DateFormat,
                    pos,
                    format!("{label} must be a valid date in YYYY-MM-DD format"),
                );
            }
        }
        FieldKind::Object => {
            if !value.is_object() {
                out.push(Rule::Type, pos, format!("{label} must be an object"));
            }
        }
        FieldKind::List(nested) => check_list(field, label, value, nested, pos, out),
        FieldKind::Records(nested) => {
            if let Value::Object(obj) = value {
                check_fields(obj, nested, &format!("{label}."), out);
            } else {
                check_list(field, label, value, nested, pos, out);
            }
        }
        FieldKind::StringList => match value {
            Value::Array(items) if field.non_empty && items.is_empty() => {
                out.push(Rule::NonEmpty, pos, format!("{label} cannot be empty"));
            }
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    match item.as_str() {
                        Some(s) if s.trim().is_empty() => {
                            out.push(Rule::NonEmpty, pos, format!("{label}[{i}] cannot be empty"))
                        }
                        Some(_) => {}
                        None => out.push(
                            Rule::Type,
                            pos,
                            format!("{label} must be a list of strings"),
                        ),
                    }
                }
            }
            _ => out.push(Rule::Type, pos, format!("{label} must be a list")),
        },
        FieldKind::Any => {}
    }
}

fn check_list(
    field: &Field,
    label: &str,
    value: &mut Value,
    nested: &'static [Field],
    pos: usize,
    out: &mut Collector,
) {
    let Value::Array(items) = value else {
        out.push(Rule::Type, pos, format!("{label} must be a list"));
        return;
    };
    if field.non_empty && items.is_empty() {
        out.push(Rule::NonEmpty, pos, format!("{label} cannot be empty"));
        return;
    }
    for (i, item) in items.iter_mut().enumerate() {
        match item {
            Value::Object(obj) => check_fields(obj, nested, &format!("{label}[{i}]."), out),
            _ => {
                let pos = out.next_position();
                out.push(Rule::Type, pos, format!("{label}[{i}] must be an object"));
            }
        }
    }
}

fn check_fields(obj: &mut Map<String, Value>, fields: &[Field], prefix: &str, out: &mut Collector) {
    for field in fields {
        let pos = out.next_position();
        let label = format!("{prefix}{}", field.name);
        match lookup(obj, field.name) {
            None if field.required => {
                out.push(Rule::Presence, pos, format!("{label} is required"));
            }
            None => {}
            Some(value) => check_value(field, &label, value, pos, out),
        }
    }
}

fn check_date_orders(obj: &mut Map<String, Value>, orders: &[DateOrder], out: &mut Collector) {
    for order in orders {
        let pos = out.next_position();
        let start = lookup(obj, order.start).and_then(|v| parse_date(v));
        let end = lookup(obj, order.end).and_then(|v| parse_date(v));
        if let (Some(start), Some(end)) = (start, end) {
            if end <= start {
                out.push(
                    Rule::DateOrder,
                    pos,
                    format!("{} must be after {}", order.end, order.start),
                );
            }
        }
    }
}

/// Runs every structural rule and returns all violations, most significant
/// first.
pub fn validate_all(payload: &Value, schema: &Schema) -> (Map<String, Value>, Vec<Violation>) {
    let mut out = Collector {
        position: 0,
        violations: Vec::new(),
    };
    let mut obj = match payload {
        Value::Object(map) => map.clone(),
        Value::Null => Map::new(),
        _ => {
            out.push(Rule::Type, 0, "Payload must be a JSON object".to_string());
            return (Map::new(), out.violations);
        }
    };
    check_fields(&mut obj, schema.fields, "", &mut out);
    check_date_orders(&mut obj, schema.date_orders, &mut out);
    out.violations.sort_by_key(|v| (v.rule, v.position));
    (obj, out.violations)
}

/// Validates a payload and reports only the first violation.
pub fn validate(payload: &Value, schema: &Schema) -> Result<ValidatedPayload> {
    let (fields, violations) = validate_all(payload, schema);
    match violations.into_iter().next() {
        Some(v) => Err(WorkflowError::Validation(v.message)),
        None => Ok(ValidatedPayload { fields }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ITEM: &[Field] = &[
        Field::required("hotel_id", FieldKind::Text).non_empty(),
        Field::required("room_ids", FieldKind::StringList).non_empty(),
    ];

    const SCHEMA: Schema = Schema {
        fields: &[
            Field::required("name", FieldKind::Text).non_empty(),
            Field::required("count", FieldKind::Integer).positive(),
            Field::optional("price", FieldKind::Number).non_negative(),
            Field::optional("mode", FieldKind::Enum(&["a", "b"])),
            Field::optional("hotel", FieldKind::Object),
            Field::optional("hotel.id", FieldKind::Text).non_empty(),
            Field::optional("from", FieldKind::Date),
            Field::optional("to", FieldKind::Date),
            Field::optional("items", FieldKind::List(ITEM)).non_empty(),
        ],
        date_orders: &[DateOrder {
            start: "from",
            end: "to",
        }],
    };

    fn message(payload: Value) -> String {
        validate(&payload, &SCHEMA).unwrap_err().to_string()
    }

    #[test]
    fn test_presence_beats_later_rules() {
        assert_eq!(
            message(json!({"count": -1, "mode": "z"})),
            "name is required"
        );
    }

    #[test]
    fn test_empty_string_reported_before_type_errors() {
        assert_eq!(
            message(json!({"name": "  ", "count": "abc"})),
            "name cannot be empty"
        );
        assert_eq!(message(json!({"name": "x", "count": "abc"})), "count must be numeric");
    }

    #[test]
    fn test_range_and_membership() {
        assert_eq!(
            message(json!({"name": "x", "count": 0})),
            "count must be greater than 0"
        );
        assert_eq!(
            message(json!({"name": "x", "count": 1, "price": -5})),
            "price cannot be negative"
        );
        assert_eq!(
            message(json!({"name": "x", "count": 1, "mode": "z"})),
            "Invalid mode. Must be one of: a, b"
        );
    }

    #[test]
    fn test_integer_rejects_fraction() {
        assert_eq!(
            message(json!({"name": "x", "count": 1.5})),
            "count must be an integer"
        );
    }

    #[test]
    fn test_dates_format_then_order() {
        assert_eq!(
            message(json!({"name": "x", "count": 1, "from": "2025/03/01", "to": "2025-02-01"})),
            "from must be a valid date in YYYY-MM-DD format"
        );
        assert_eq!(
            message(json!({"name": "x", "count": 1, "from": "2025-03-01", "to": "2025-03-01"})),
            "to must be after from"
        );
        assert!(
            validate(
                &json!({"name": "x", "count": 1, "from": "2025-03-01", "to": "2025-03-02"}),
                &SCHEMA
            )
            .is_ok()
        );
    }

    #[test]
    fn test_nested_paths() {
        assert_eq!(
            message(json!({"name": "x", "count": 1, "hotel": {"id": ""}})),
            "hotel.id cannot be empty"
        );
        assert_eq!(
            message(json!({"name": "x", "count": 1, "items": []})),
            "items cannot be empty"
        );
        assert_eq!(
            message(json!({"name": "x", "count": 1, "items": [{"hotel_id": "H1"}]})),
            "items[0].room_ids is required"
        );
    }

    #[test]
    fn test_numeric_strings_are_normalized() {
        let validated =
            validate(&json!({"name": "x", "count": "2", "price": "10.5"}), &SCHEMA).unwrap();
        assert_eq!(validated.get("count"), Some(&json!(2)));
        assert_eq!(validated.get("price").and_then(Value::as_f64), Some(10.5));
    }

    #[test]
    fn test_validate_all_orders_by_rule() {
        let (_, violations) = validate_all(&json!({"count": "x", "mode": "z"}), &SCHEMA);
        let rules: Vec<Rule> = violations.iter().map(|v| v.rule).collect();
        assert_eq!(rules, vec![Rule::Presence, Rule::Type, Rule::Membership]);
    }

    #[test]
    fn test_non_object_payload() {
        assert_eq!(message(json!([1, 2])), "Payload must be a JSON object");
    }
}
