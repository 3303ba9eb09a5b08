//! Filter expression model
//!
//! A filter is three clause groups (must, must-not, should). Each group maps a
//! predicate kind to the logical fields it constrains and the operands given
//! for each field. Entry order is preserved so compilation is deterministic.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Predicate kinds a clause group can hold.
///
/// Declaration order is the order in which kinds are compiled within a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PredicateKind {
    Equals,
    NotEqual,
    Contains,
    NotContains,
    StartsWith,
    NotStarts,
    EndsWith,
    NotEnds,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Ranges,
    NotRanges,
    Group,
    NotGroup,
    #[serde(rename = "EMPTY_FILTER")]
    Empty,
    NotEmpty,
}

impl PredicateKind {
    /// Returns the kind name used in error messages and explain output
    pub fn as_str(&self) -> &'static str {
        match self {
            PredicateKind::Equals => "EQUALS",
            PredicateKind::NotEqual => "NOT_EQUAL",
            PredicateKind::Contains => "CONTAINS",
            PredicateKind::NotContains => "NOT_CONTAINS",
            PredicateKind::StartsWith => "STARTS_WITH",
            PredicateKind::NotStarts => "NOT_STARTS",
            PredicateKind::EndsWith => "ENDS_WITH",
            PredicateKind::NotEnds => "NOT_ENDS",
            PredicateKind::GreaterThan => "GREATER_THAN",
            PredicateKind::GreaterThanOrEqual => "GREATER_THAN_OR_EQUAL",
            PredicateKind::LessThan => "LESS_THAN",
            PredicateKind::LessThanOrEqual => "LESS_THAN_OR_EQUAL",
            PredicateKind::Ranges => "RANGES",
            PredicateKind::NotRanges => "NOT_RANGES",
            PredicateKind::Group => "GROUP",
            PredicateKind::NotGroup => "NOT_GROUP",
            PredicateKind::Empty => "EMPTY_FILTER",
            PredicateKind::NotEmpty => "NOT_EMPTY",
        }
    }

    /// Returns true for kinds evaluated as string patterns
    pub fn is_pattern(&self) -> bool {
        matches!(
            self,
            PredicateKind::Equals
                | PredicateKind::NotEqual
                | PredicateKind::Contains
                | PredicateKind::NotContains
                | PredicateKind::StartsWith
                | PredicateKind::NotStarts
                | PredicateKind::EndsWith
                | PredicateKind::NotEnds
        )
    }
}

impl fmt::Display for PredicateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Operand attached to a predicate on one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    /// Single comparison value
    Value(Value),
    /// Inclusive lower and upper bound
    Range(Value, Value),
    /// Set of candidate values
    Group(Vec<Value>),
    /// No operand (emptiness checks)
    None,
}

/// Logical field → operands, in insertion order
pub type FieldOperands = Vec<(String, Vec<Operand>)>;

/// Which clause group a predicate belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Clause {
    Must,
    MustNot,
    Should,
}

impl Clause {
    /// Compilation order of clause groups
    pub const ALL: [Clause; 3] = [Clause::Must, Clause::MustNot, Clause::Should];

    pub fn as_str(&self) -> &'static str {
        match self {
            Clause::Must => "must",
            Clause::MustNot => "must_not",
            Clause::Should => "should",
        }
    }

    /// Returns true when predicates in this group are inverted
    pub fn is_negated(&self) -> bool {
        matches!(self, Clause::MustNot)
    }
}

/// One clause group: predicate kind → field → operands
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClauseGroup {
    predicates: BTreeMap<PredicateKind, FieldOperands>,
}

impl ClauseGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends operands for a field under the given kind.
    ///
    /// Operands for a field already present are appended to its list. An
    /// empty operand list is kept as-is and dropped at compile time.
    pub fn insert(
        &mut self,
        kind: PredicateKind,
        field: impl Into<String>,
        operands: Vec<Operand>,
    ) -> &mut Self {
        let field = field.into();
        let entries = self.predicates.entry(kind).or_default();
        match entries.iter_mut().find(|(name, _)| *name == field) {
            Some((_, existing)) => existing.extend(operands),
            None => entries.push((field, operands)),
        }
        self
    }

    fn push(&mut self, kind: PredicateKind, field: impl Into<String>, operand: Operand) -> &mut Self {
        self.insert(kind, field, vec![operand])
    }

    /// Field must match the value exactly
    pub fn equal(&mut self, field: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.push(PredicateKind::Equals, field, Operand::Value(value.into()))
    }

    pub fn not_equal(&mut self, field: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.push(PredicateKind::NotEqual, field, Operand::Value(value.into()))
    }

    /// Field must contain the value as a substring (case-insensitive)
    pub fn contain(&mut self, field: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.push(PredicateKind::Contains, field, Operand::Value(value.into()))
    }

    pub fn not_contain(&mut self, field: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.push(PredicateKind::NotContains, field, Operand::Value(value.into()))
    }

    pub fn starts_with(&mut self, field: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.push(PredicateKind::StartsWith, field, Operand::Value(value.into()))
    }

    pub fn not_starts_with(
        &mut self,
        field: impl Into<String>,
        value: impl Into<Value>,
    ) -> &mut Self {
        self.push(PredicateKind::NotStarts, field, Operand::Value(value.into()))
    }

    pub fn ends_with(&mut self, field: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.push(PredicateKind::EndsWith, field, Operand::Value(value.into()))
    }

    pub fn not_ends_with(&mut self, field: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.push(PredicateKind::NotEnds, field, Operand::Value(value.into()))
    }

    pub fn be_greater_than(
        &mut self,
        field: impl Into<String>,
        value: impl Into<Value>,
    ) -> &mut Self {
        self.push(PredicateKind::GreaterThan, field, Operand::Value(value.into()))
    }

    pub fn be_greater_than_or_equal(
        &mut self,
        field: impl Into<String>,
        value: impl Into<Value>,
    ) -> &mut Self {
        self.push(
            PredicateKind::GreaterThanOrEqual,
            field,
            Operand::Value(value.into()),
        )
    }

    pub fn be_less_than(&mut self, field: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.push(PredicateKind::LessThan, field, Operand::Value(value.into()))
    }

    pub fn be_less_than_or_equal(
        &mut self,
        field: impl Into<String>,
        value: impl Into<Value>,
    ) -> &mut Self {
        self.push(
            PredicateKind::LessThanOrEqual,
            field,
            Operand::Value(value.into()),
        )
    }

    /// Field must lie within `[lower, upper]`
    pub fn range(
        &mut self,
        field: impl Into<String>,
        lower: impl Into<Value>,
        upper: impl Into<Value>,
    ) -> &mut Self {
        self.push(
            PredicateKind::Ranges,
            field,
            Operand::Range(lower.into(), upper.into()),
        )
    }

    /// Field must lie outside `[lower, upper]`
    pub fn not_range(
        &mut self,
        field: impl Into<String>,
        lower: impl Into<Value>,
        upper: impl Into<Value>,
    ) -> &mut Self {
        self.push(
            PredicateKind::NotRanges,
            field,
            Operand::Range(lower.into(), upper.into()),
        )
    }

    /// Field must equal one of the values
    pub fn include_group<V: Into<Value>>(
        &mut self,
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> &mut Self {
        let values = values.into_iter().map(Into::into).collect();
        self.push(PredicateKind::Group, field, Operand::Group(values))
    }

    pub fn not_include_group<V: Into<Value>>(
        &mut self,
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> &mut Self {
        let values = values.into_iter().map(Into::into).collect();
        self.push(PredicateKind::NotGroup, field, Operand::Group(values))
    }

    /// Field must exist and hold an empty collection
    pub fn empty(&mut self, field: impl Into<String>) -> &mut Self {
        self.push(PredicateKind::Empty, field, Operand::None)
    }

    pub fn not_empty(&mut self, field: impl Into<String>) -> &mut Self {
        self.push(PredicateKind::NotEmpty, field, Operand::None)
    }

    /// Iterates kinds and their field operands in compile order
    pub fn iter(&self) -> impl Iterator<Item = (PredicateKind, &FieldOperands)> {
        self.predicates.iter().map(|(kind, fields)| (*kind, fields))
    }

    /// Returns true when no field carries any operand
    pub fn is_empty(&self) -> bool {
        self.predicates
            .values()
            .all(|fields| fields.iter().all(|(_, operands)| operands.is_empty()))
    }

    /// Removes every predicate from the group
    pub fn clear(&mut self) {
        self.predicates.clear();
    }
}

/// A boolean-composable filter over logical fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    #[serde(default)]
    must: ClauseGroup,
    #[serde(default)]
    must_not: ClauseGroup,
    #[serde(default)]
    should: ClauseGroup,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Predicates every matching document satisfies
    pub fn must(&mut self) -> &mut ClauseGroup {
        &mut self.must
    }

    /// Predicates no matching document satisfies
    pub fn must_not(&mut self) -> &mut ClauseGroup {
        &mut self.must_not
    }

    /// Predicates of which a matching document satisfies at least one
    pub fn should(&mut self) -> &mut ClauseGroup {
        &mut self.should
    }

    /// Returns the group for a clause
    pub fn group(&self, clause: Clause) -> &ClauseGroup {
        match clause {
            Clause::Must => &self.must,
            Clause::MustNot => &self.must_not,
            Clause::Should => &self.should,
        }
    }

    /// Returns true when every group is empty
    pub fn is_empty(&self) -> bool {
        Clause::ALL.iter().all(|c| self.group(*c).is_empty())
    }

    /// Removes every predicate from every group
    pub fn clear(&mut self) {
        self.must.clear();
        self.must_not.clear();
        self.should.clear();
    }
}
