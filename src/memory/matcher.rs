//! Criteria evaluation against JSON documents
//!
//! Each criteria entry is either a literal (equality; an array field
//! matches if it contains the literal) or an object of `$` operators,
//! all of which must hold. Dotted keys address nested fields.
//!
//! Criteria are compiled once per realization: every operator, operand
//! shape and regex is validated before any document is looked at.

use std::cmp::Ordering;

use regex::Regex;
use serde_json::{Number, Value};

use super::errors::{MemoryError, MemoryResult};
use crate::query::{Constraint, Criteria};

/// Criteria validated and ready to evaluate
#[derive(Debug)]
pub struct CompiledCriteria {
    entries: Vec<(String, Condition)>,
}

#[derive(Debug)]
enum Condition {
    Literal(Value),
    Operators(Vec<Operator>),
}

#[derive(Debug)]
enum Operator {
    Compare(Constraint, Value),
    Ne(Value),
    In(Vec<Value>),
    NotIn(Vec<Value>),
    Exists(bool),
    Regex(Regex),
}

impl CompiledCriteria {
    /// Validate and compile every criteria entry
    pub fn compile(criteria: &Criteria) -> MemoryResult<Self> {
        let entries = criteria
            .iter()
            .map(|(field, condition)| Ok((field.clone(), compile_condition(condition)?)))
            .collect::<MemoryResult<Vec<_>>>()?;
        Ok(Self { entries })
    }

    /// Check if a document satisfies every entry
    pub fn matches(&self, doc: &Value) -> bool {
        self.entries
            .iter()
            .all(|(field, condition)| condition.holds(lookup(doc, field)))
    }
}

/// Compile `criteria` and check a single document
pub fn matches(doc: &Value, criteria: &Criteria) -> MemoryResult<bool> {
    Ok(CompiledCriteria::compile(criteria)?.matches(doc))
}

fn lookup<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(doc, |current, segment| current.get(segment))
}

fn compile_condition(condition: &Value) -> MemoryResult<Condition> {
    let Some(ops) = operator_map(condition) else {
        return Ok(Condition::Literal(condition.clone()));
    };

    let mut compiled = Vec::with_capacity(ops.len());
    for (op, operand) in ops {
        let constraint = Constraint::parse(op).ok_or_else(|| {
            MemoryError::InvalidConstraint(format!("unknown operator {}", op))
        })?;
        compiled.push(compile_operator(constraint, operand)?);
    }
    Ok(Condition::Operators(compiled))
}

/// An object whose keys all start with `$` is an operator map
fn operator_map(condition: &Value) -> Option<&serde_json::Map<String, Value>> {
    match condition {
        Value::Object(map) if !map.is_empty() && map.keys().all(|k| k.starts_with('$')) => {
            Some(map)
        }
        _ => None,
    }
}

fn compile_operator(constraint: Constraint, operand: &Value) -> MemoryResult<Operator> {
    match constraint {
        Constraint::Lt | Constraint::Lte | Constraint::Gt | Constraint::Gte => {
            Ok(Operator::Compare(constraint, operand.clone()))
        }
        Constraint::Ne => Ok(Operator::Ne(operand.clone())),
        Constraint::In => Ok(Operator::In(as_list(constraint, operand)?)),
        Constraint::NotIn => Ok(Operator::NotIn(as_list(constraint, operand)?)),
        Constraint::Exists => operand.as_bool().map(Operator::Exists).ok_or_else(|| {
            MemoryError::InvalidConstraint("$exists expects a boolean".to_string())
        }),
        Constraint::Regex => {
            let pattern = operand.as_str().ok_or_else(|| {
                MemoryError::InvalidConstraint("$regex expects a string".to_string())
            })?;
            let re = Regex::new(pattern)
                .map_err(|e| MemoryError::InvalidConstraint(format!("bad $regex: {}", e)))?;
            Ok(Operator::Regex(re))
        }
    }
}

fn as_list(constraint: Constraint, operand: &Value) -> MemoryResult<Vec<Value>> {
    operand.as_array().cloned().ok_or_else(|| {
        MemoryError::InvalidConstraint(format!("{} expects an array", constraint.as_str()))
    })
}

impl Condition {
    fn holds(&self, field_value: Option<&Value>) -> bool {
        match self {
            Condition::Literal(expected) => match field_value {
                Some(Value::Array(items)) if !expected.is_array() => items.contains(expected),
                Some(v) => v == expected,
                None => false,
            },
            Condition::Operators(ops) => ops.iter().all(|op| op.holds(field_value)),
        }
    }
}

impl Operator {
    fn holds(&self, field_value: Option<&Value>) -> bool {
        match self {
            Operator::Compare(constraint, operand) => {
                let ordering = compare(field_value, operand);
                match constraint {
                    Constraint::Lt => ordering == Some(Ordering::Less),
                    Constraint::Lte => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
                    Constraint::Gt => ordering == Some(Ordering::Greater),
                    Constraint::Gte => {
                        matches!(ordering, Some(Ordering::Greater | Ordering::Equal))
                    }
                    _ => false,
                }
            }
            Operator::Ne(operand) => field_value != Some(operand),
            Operator::In(list) => field_value.map(|v| list.contains(v)).unwrap_or(false),
            Operator::NotIn(list) => field_value.map(|v| !list.contains(v)).unwrap_or(true),
            Operator::Exists(wanted) => {
                let present = matches!(field_value, Some(v) if !v.is_null());
                present == *wanted
            }
            Operator::Regex(re) => field_value
                .and_then(Value::as_str)
                .map(|s| re.is_match(s))
                .unwrap_or(false),
        }
    }
}

/// Order numbers with numbers and strings with strings; anything else is incomparable
fn compare(field_value: Option<&Value>, operand: &Value) -> Option<Ordering> {
    match (field_value?, operand) {
        (Value::Number(a), Value::Number(b)) => compare_numbers(a, b),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Integers compare exactly; floats only when either side is one
fn compare_numbers(a: &Number, b: &Number) -> Option<Ordering> {
    if a.is_f64() || b.is_f64() {
        return a.as_f64()?.partial_cmp(&b.as_f64()?);
    }
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return Some(x.cmp(&y));
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return Some(x.cmp(&y));
    }
    // One side is negative, the other above i64::MAX
    match (a.as_i64(), b.as_i64()) {
        (Some(_), None) => Some(Ordering::Less),
        (None, Some(_)) => Some(Ordering::Greater),
        _ => None,
    }
}
