//! Native predicate tree
//!
//! The compiled form of a filter, expressed over storage field names. This
//! is what storage engines evaluate.

use serde_json::{json, Map, Value};

use super::expression::Expression;
use crate::engine::document::Document;

/// Operator applied to one storage field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOp {
    Eq(Value),
    Ne(Value),
    Gt(Value),
    Gte(Value),
    Lt(Value),
    Lte(Value),
    In(Vec<Value>),
    Nin(Vec<Value>),
    Exists(bool),
    /// Array holds exactly this many elements
    Size(usize),
    /// Array holds any other number of elements
    NotSize(usize),
}

impl FieldOp {
    /// Operator name in Mongo-style rendering
    pub fn op_name(&self) -> &'static str {
        match self {
            FieldOp::Eq(_) => "$eq",
            FieldOp::Ne(_) => "$ne",
            FieldOp::Gt(_) => "$gt",
            FieldOp::Gte(_) => "$gte",
            FieldOp::Lt(_) => "$lt",
            FieldOp::Lte(_) => "$lte",
            FieldOp::In(_) => "$in",
            FieldOp::Nin(_) => "$nin",
            FieldOp::Exists(_) => "$exists",
            FieldOp::Size(_) => "$size",
            FieldOp::NotSize(_) => "$not",
        }
    }

    fn operand(&self) -> Value {
        match self {
            FieldOp::Eq(v)
            | FieldOp::Ne(v)
            | FieldOp::Gt(v)
            | FieldOp::Gte(v)
            | FieldOp::Lt(v)
            | FieldOp::Lte(v) => v.clone(),
            FieldOp::In(vs) | FieldOp::Nin(vs) => Value::Array(vs.clone()),
            FieldOp::Exists(b) => Value::Bool(*b),
            FieldOp::Size(n) => json!(n),
            FieldOp::NotSize(n) => json!({ "$size": n }),
        }
    }
}

/// Compiled predicate over storage fields
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Matches every document
    All,
    /// Every operator holds for the field
    Field { field: String, ops: Vec<FieldOp> },
    /// Server-side expression holds
    Where(Expression),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    pub fn field(field: impl Into<String>, ops: Vec<FieldOp>) -> Self {
        Predicate::Field {
            field: field.into(),
            ops,
        }
    }

    /// `field == value`
    pub fn eq(field: impl Into<String>, value: Value) -> Self {
        Self::field(field, vec![FieldOp::Eq(value)])
    }

    /// Conjunction; no nodes is `All`, a single node is returned unwrapped
    pub fn all(mut nodes: Vec<Predicate>) -> Self {
        match nodes.len() {
            0 => Predicate::All,
            1 => nodes.remove(0),
            _ => Predicate::And(nodes),
        }
    }

    /// Disjunction; a single node is returned unwrapped
    pub fn any(mut nodes: Vec<Predicate>) -> Self {
        if nodes.len() == 1 {
            nodes.remove(0)
        } else {
            Predicate::Or(nodes)
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Predicate::All)
    }

    /// Field equalities that hold for every match.
    ///
    /// Used to seed a document inserted by an upsert.
    pub fn equality_fields(&self) -> Document {
        let mut doc = Document::new();
        self.collect_equalities(&mut doc);
        doc
    }

    fn collect_equalities(&self, doc: &mut Document) {
        match self {
            Predicate::Field { field, ops } => {
                for op in ops {
                    if let FieldOp::Eq(value) = op {
                        doc.insert(field.clone(), value.clone());
                    }
                }
            }
            Predicate::And(nodes) => nodes.iter().for_each(|n| n.collect_equalities(doc)),
            _ => {}
        }
    }

    /// Mongo-style rendering
    pub fn to_value(&self) -> Value {
        match self {
            Predicate::All => Value::Object(Map::new()),
            Predicate::Field { field, ops } => {
                let mut operators = Map::new();
                for op in ops {
                    operators.insert(op.op_name().to_string(), op.operand());
                }
                let mut node = Map::new();
                node.insert(field.clone(), Value::Object(operators));
                Value::Object(node)
            }
            Predicate::Where(expr) => json!({ "$where": expr.to_string() }),
            Predicate::And(nodes) => {
                json!({ "$and": nodes.iter().map(Predicate::to_value).collect::<Vec<_>>() })
            }
            Predicate::Or(nodes) => {
                json!({ "$or": nodes.iter().map(Predicate::to_value).collect::<Vec<_>>() })
            }
        }
    }
}
