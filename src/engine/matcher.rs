//! Predicate evaluation for the in-memory engine
//!
//! Numbers compare as f64 and strings lexicographically. Values of different
//! types never satisfy a comparison. Missing or null fields never satisfy a
//! positive operator; `$ne` and `$nin` match them.

use std::cmp::Ordering;

use regex::Regex;
use serde_json::Value;

use super::document::{get_path, Document};
use super::errors::{EngineError, EngineResult};
use crate::compiler::{Expression, FieldOp, Predicate};

/// A predicate with its patterns compiled, ready to test documents
#[derive(Debug, Clone)]
pub struct Matcher {
    root: Node,
}

#[derive(Debug, Clone)]
enum Node {
    All,
    Field { field: String, ops: Vec<FieldOp> },
    Where(Expr),
    And(Vec<Node>),
    Or(Vec<Node>),
}

#[derive(Debug, Clone)]
enum Expr {
    Matches { field: String, regex: Regex },
    Outside { field: String, lower: Value, upper: Value },
    Not(Box<Expr>),
    And(Vec<Expr>),
    Or(Vec<Expr>),
}

impl Matcher {
    /// Compiles a predicate. Fails only if a pattern is not a valid regex.
    pub fn new(predicate: &Predicate) -> EngineResult<Self> {
        Ok(Self {
            root: build_node(predicate)?,
        })
    }

    pub fn matches(&self, document: &Document) -> bool {
        eval_node(&self.root, document)
    }
}

fn build_node(predicate: &Predicate) -> EngineResult<Node> {
    Ok(match predicate {
        Predicate::All => Node::All,
        Predicate::Field { field, ops } => Node::Field {
            field: field.clone(),
            ops: ops.clone(),
        },
        Predicate::Where(expr) => Node::Where(build_expr(expr)?),
        Predicate::And(nodes) => Node::And(nodes.iter().map(build_node).collect::<EngineResult<_>>()?),
        Predicate::Or(nodes) => Node::Or(nodes.iter().map(build_node).collect::<EngineResult<_>>()?),
    })
}

fn build_expr(expr: &Expression) -> EngineResult<Expr> {
    Ok(match expr {
        Expression::Matches { field, pattern } => Expr::Matches {
            field: field.clone(),
            regex: Regex::new(&pattern.regex())
                .map_err(|e| EngineError::Backend(format!("invalid pattern: {}", e)))?,
        },
        Expression::Outside {
            field,
            lower,
            upper,
        } => Expr::Outside {
            field: field.clone(),
            lower: lower.clone(),
            upper: upper.clone(),
        },
        Expression::Not(inner) => Expr::Not(Box::new(build_expr(inner)?)),
        Expression::And(exprs) => Expr::And(exprs.iter().map(build_expr).collect::<EngineResult<_>>()?),
        Expression::Or(exprs) => Expr::Or(exprs.iter().map(build_expr).collect::<EngineResult<_>>()?),
    })
}

fn eval_node(node: &Node, doc: &Document) -> bool {
    match node {
        Node::All => true,
        Node::Field { field, ops } => {
            let actual = get_path(doc, field);
            ops.iter().all(|op| eval_op(op, actual))
        }
        Node::Where(expr) => eval_expr(expr, doc),
        Node::And(nodes) => nodes.iter().all(|n| eval_node(n, doc)),
        Node::Or(nodes) => nodes.iter().any(|n| eval_node(n, doc)),
    }
}

fn eval_op(op: &FieldOp, actual: Option<&Value>) -> bool {
    match op {
        FieldOp::Eq(expected) => equals(actual, expected),
        FieldOp::Ne(expected) => !equals(actual, expected),
        FieldOp::Gt(bound) => compare(actual, bound) == Some(Ordering::Greater),
        FieldOp::Gte(bound) => matches!(
            compare(actual, bound),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        FieldOp::Lt(bound) => compare(actual, bound) == Some(Ordering::Less),
        FieldOp::Lte(bound) => matches!(
            compare(actual, bound),
            Some(Ordering::Less | Ordering::Equal)
        ),
        FieldOp::In(values) => values.iter().any(|v| equals(actual, v)),
        FieldOp::Nin(values) => !values.iter().any(|v| equals(actual, v)),
        FieldOp::Exists(expected) => actual.is_some() == *expected,
        FieldOp::Size(n) => size_of(actual) == Some(*n),
        FieldOp::NotSize(n) => size_of(actual) != Some(*n),
    }
}

fn eval_expr(expr: &Expr, doc: &Document) -> bool {
    match expr {
        Expr::Matches { field, regex } => {
            text_of(get_path(doc, field)).map_or(false, |text| regex.is_match(&text))
        }
        Expr::Outside {
            field,
            lower,
            upper,
        } => {
            let actual = get_path(doc, field);
            compare(actual, lower) == Some(Ordering::Less)
                || compare(actual, upper) == Some(Ordering::Greater)
        }
        Expr::Not(inner) => !eval_expr(inner, doc),
        Expr::And(exprs) => exprs.iter().all(|e| eval_expr(e, doc)),
        Expr::Or(exprs) => exprs.iter().any(|e| eval_expr(e, doc)),
    }
}

/// Equality with numeric normalization. An array field equals a scalar it contains.
fn equals(actual: Option<&Value>, expected: &Value) -> bool {
    match actual {
        None => false,
        Some(Value::Array(items)) if !expected.is_array() => {
            items.iter().any(|item| scalar_equals(item, expected))
        }
        Some(value) => scalar_equals(value, expected),
    }
}

fn scalar_equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Ordering of a field value against a bound; `None` when incomparable
fn compare(actual: Option<&Value>, bound: &Value) -> Option<Ordering> {
    match (actual?, bound) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Element count of arrays, objects and strings
fn size_of(actual: Option<&Value>) -> Option<usize> {
    match actual? {
        Value::Array(items) => Some(items.len()),
        Value::Object(map) => Some(map.len()),
        Value::String(s) => Some(s.chars().count()),
        _ => None,
    }
}

fn text_of(actual: Option<&Value>) -> Option<String> {
    match actual? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
