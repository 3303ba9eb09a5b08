//! Filter compiler
//!
//! Turns a `Filter` over logical fields into a native `Predicate` over
//! storage fields.
//!
//! Groups compile in the order must, must-not, should. Within a group,
//! field operators become `Field` nodes and string or range expressions are
//! joined into one trailing `Where` node. Must and must-not groups are
//! conjunctions; should is a disjunction. Groups are conjoined at the top.
//!
//! Must-not inverts every predicate it holds:
//!
//! | kind        | must               | must-not           |
//! |-------------|--------------------|--------------------|
//! | GT / GTE    | `$gt` / `$gte`     | `$lte` / `$lt`     |
//! | LT / LTE    | `$lt` / `$lte`     | `$gte` / `$gt`     |
//! | RANGES      | `$gte` + `$lte`    | outside expression |
//! | NOT_RANGES  | outside expression | `$gte` + `$lte`    |
//! | GROUP       | `$in`              | `$nin`             |
//! | NOT_GROUP   | `$nin`             | `$in`              |
//! | EMPTY       | exists, size 0     | exists, size ≠ 0   |
//! | NOT_EMPTY   | exists, size ≠ 0   | exists, size 0     |
//! | patterns    | match              | negated match      |

use serde_json::Value;

use super::errors::{CompileError, CompileResult};
use super::expression::{Expression, Pattern, PatternKind};
use super::predicate::{FieldOp, Predicate};
use crate::mapping::ResolvedMapping;
use crate::model::{Clause, ClauseGroup, Filter, Operand, PredicateKind};

enum Compiled {
    Node(Predicate),
    Expr(Expression),
}

/// Compiles a filter against a mapping.
///
/// An empty filter compiles to `Predicate::All`.
pub fn compile_filter(filter: &Filter, mapping: &ResolvedMapping) -> CompileResult<Predicate> {
    let mut groups = Vec::new();
    for clause in Clause::ALL {
        if let Some(node) = compile_group(clause, filter.group(clause), mapping)? {
            groups.push(node);
        }
    }
    Ok(Predicate::all(groups))
}

fn compile_group(
    clause: Clause,
    group: &ClauseGroup,
    mapping: &ResolvedMapping,
) -> CompileResult<Option<Predicate>> {
    let negated = clause.is_negated();
    let mut nodes = Vec::new();
    let mut expressions = Vec::new();

    for (kind, fields) in group.iter() {
        for (field, operands) in fields {
            if operands.is_empty() {
                continue;
            }
            let storage = mapping
                .storage_name(field)
                .ok_or_else(|| CompileError::field_unmapped(field.as_str()))?;

            for operand in operands {
                match compile_operand(kind, field, storage, operand, negated, mapping)? {
                    Compiled::Node(node) => nodes.push(node),
                    Compiled::Expr(expr) => expressions.push(expr),
                }
            }
        }
    }

    let disjunctive = matches!(clause, Clause::Should);
    if !expressions.is_empty() {
        let combined = if disjunctive {
            Expression::any(expressions)
        } else {
            Expression::all(expressions)
        };
        nodes.push(Predicate::Where(combined));
    }

    if nodes.is_empty() {
        return Ok(None);
    }
    Ok(Some(if disjunctive {
        Predicate::any(nodes)
    } else {
        Predicate::all(nodes)
    }))
}

fn compile_operand(
    kind: PredicateKind,
    field: &str,
    storage: &str,
    operand: &Operand,
    negated: bool,
    mapping: &ResolvedMapping,
) -> CompileResult<Compiled> {
    use PredicateKind::*;

    let node = |ops: Vec<FieldOp>| Compiled::Node(Predicate::field(storage, ops));

    let compiled = match kind {
        GreaterThan | GreaterThanOrEqual | LessThan | LessThanOrEqual => {
            let value = scalar(kind, field, operand)?.clone();
            node(vec![comparison(kind, negated, value)])
        }
        Ranges | NotRanges => {
            let (lower, upper) = range(kind, field, operand)?;
            // NOT_RANGES under must-not is a double negation
            if (kind == Ranges) != negated {
                node(vec![FieldOp::Gte(lower.clone()), FieldOp::Lte(upper.clone())])
            } else {
                Compiled::Expr(Expression::outside(storage, lower.clone(), upper.clone()))
            }
        }
        Group | NotGroup => {
            let values = group(kind, field, operand)?.to_vec();
            if (kind == Group) != negated {
                node(vec![FieldOp::In(values)])
            } else {
                node(vec![FieldOp::Nin(values)])
            }
        }
        Empty | NotEmpty => {
            if !matches!(operand, Operand::None) {
                return Err(CompileError::invalid_operand(kind, field, "no operand"));
            }
            let size = if (kind == Empty) != negated {
                FieldOp::Size(0)
            } else {
                FieldOp::NotSize(0)
            };
            node(vec![FieldOp::Exists(true), size])
        }
        Equals | NotEqual if mapping.is_identity_storage(storage) => {
            let value = scalar(kind, field, operand)?.clone();
            if (kind == Equals) != negated {
                node(vec![FieldOp::Eq(value)])
            } else {
                node(vec![FieldOp::Ne(value)])
            }
        }
        Equals | NotEqual | Contains | NotContains | StartsWith | NotStarts | EndsWith
        | NotEnds => {
            let needle = needle(kind, field, operand)?;
            let (pattern_kind, inverted) = match kind {
                Equals => (PatternKind::Exact, false),
                NotEqual => (PatternKind::Exact, true),
                Contains => (PatternKind::Contains, false),
                NotContains => (PatternKind::Contains, true),
                StartsWith => (PatternKind::StartsWith, false),
                NotStarts => (PatternKind::StartsWith, true),
                EndsWith => (PatternKind::EndsWith, false),
                _ => (PatternKind::EndsWith, true),
            };
            let mut expr = Expression::matches(storage, Pattern::new(pattern_kind, needle));
            if inverted {
                expr = expr.negate();
            }
            if negated {
                expr = expr.negate();
            }
            Compiled::Expr(expr)
        }
    };
    Ok(compiled)
}

fn comparison(kind: PredicateKind, negated: bool, value: Value) -> FieldOp {
    match (kind, negated) {
        (PredicateKind::GreaterThan, false) => FieldOp::Gt(value),
        (PredicateKind::GreaterThan, true) => FieldOp::Lte(value),
        (PredicateKind::GreaterThanOrEqual, false) => FieldOp::Gte(value),
        (PredicateKind::GreaterThanOrEqual, true) => FieldOp::Lt(value),
        (PredicateKind::LessThan, false) => FieldOp::Lt(value),
        (PredicateKind::LessThan, true) => FieldOp::Gte(value),
        (PredicateKind::LessThanOrEqual, false) => FieldOp::Lte(value),
        (_, true) => FieldOp::Gt(value),
        (_, false) => FieldOp::Lte(value),
    }
}

fn scalar<'a>(kind: PredicateKind, field: &str, operand: &'a Operand) -> CompileResult<&'a Value> {
    match operand {
        Operand::Value(value) => Ok(value),
        _ => Err(CompileError::invalid_operand(kind, field, "a single value")),
    }
}

fn range<'a>(
    kind: PredicateKind,
    field: &str,
    operand: &'a Operand,
) -> CompileResult<(&'a Value, &'a Value)> {
    match operand {
        Operand::Range(lower, upper) => Ok((lower, upper)),
        _ => Err(CompileError::invalid_operand(kind, field, "a lower and upper bound")),
    }
}

fn group<'a>(kind: PredicateKind, field: &str, operand: &'a Operand) -> CompileResult<&'a [Value]> {
    match operand {
        Operand::Group(values) => Ok(values),
        _ => Err(CompileError::invalid_operand(kind, field, "a group of values")),
    }
}

fn needle(kind: PredicateKind, field: &str, operand: &Operand) -> CompileResult<String> {
    match scalar(kind, field, operand)? {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(CompileError::invalid_operand(kind, field, "a string, number or boolean")),
    }
}
