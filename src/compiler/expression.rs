//! Server-side expressions
//!
//! String-matching and "outside range" predicates compile to expressions
//! evaluated per document rather than to field operators. They render as
//! JavaScript-like source for explain output.

use std::fmt;

use serde_json::Value;

/// Where a pattern must match inside the field value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    /// Whole value
    Exact,
    /// Anywhere
    Contains,
    /// Prefix
    StartsWith,
    /// Suffix
    EndsWith,
}

/// Case-insensitive literal pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    kind: PatternKind,
    needle: String,
}

impl Pattern {
    pub fn new(kind: PatternKind, needle: impl Into<String>) -> Self {
        Self {
            kind,
            needle: needle.into(),
        }
    }

    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    pub fn needle(&self) -> &str {
        &self.needle
    }

    fn anchored(&self) -> String {
        let escaped = regex::escape(&self.needle);
        match self.kind {
            PatternKind::Exact => format!("^{}$", escaped),
            PatternKind::Contains => escaped,
            PatternKind::StartsWith => format!("^{}", escaped),
            PatternKind::EndsWith => format!("{}$", escaped),
        }
    }

    /// Regex source. The needle is escaped, so it always matches literally.
    pub fn regex(&self) -> String {
        format!("(?i){}", self.anchored())
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/i", self.anchored().replace('/', "\\/"))
    }
}

/// Expression tree evaluated against a single document
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Field value matches the pattern
    Matches { field: String, pattern: Pattern },
    /// Field value lies strictly below `lower` or strictly above `upper`
    Outside {
        field: String,
        lower: Value,
        upper: Value,
    },
    Not(Box<Expression>),
    And(Vec<Expression>),
    Or(Vec<Expression>),
}

impl Expression {
    pub fn matches(field: impl Into<String>, pattern: Pattern) -> Self {
        Expression::Matches {
            field: field.into(),
            pattern,
        }
    }

    pub fn outside(field: impl Into<String>, lower: Value, upper: Value) -> Self {
        Expression::Outside {
            field: field.into(),
            lower,
            upper,
        }
    }

    /// Logical negation. Negating a negation unwraps it.
    pub fn negate(self) -> Self {
        match self {
            Expression::Not(inner) => *inner,
            other => Expression::Not(Box::new(other)),
        }
    }

    /// Conjunction; a single expression is returned unwrapped
    pub fn all(mut exprs: Vec<Expression>) -> Self {
        if exprs.len() == 1 {
            exprs.remove(0)
        } else {
            Expression::And(exprs)
        }
    }

    /// Disjunction; a single expression is returned unwrapped
    pub fn any(mut exprs: Vec<Expression>) -> Self {
        if exprs.len() == 1 {
            exprs.remove(0)
        } else {
            Expression::Or(exprs)
        }
    }
}

fn join(f: &mut fmt::Formatter<'_>, exprs: &[Expression], op: &str) -> fmt::Result {
    write!(f, "(")?;
    for (i, expr) in exprs.iter().enumerate() {
        if i > 0 {
            write!(f, " {} ", op)?;
        }
        write!(f, "{}", expr)?;
    }
    write!(f, ")")
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Matches { field, pattern } => {
                write!(f, "{}.test(this.{})", pattern, field)
            }
            Expression::Outside {
                field,
                lower,
                upper,
            } => write!(
                f,
                "(this.{} < {} || this.{} > {})",
                field, lower, field, upper
            ),
            Expression::Not(inner) => write!(f, "!{}", inner),
            Expression::And(exprs) => join(f, exprs, "&&"),
            Expression::Or(exprs) => join(f, exprs, "||"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pattern_regex_is_escaped() {
        let pattern = Pattern::new(PatternKind::Contains, "a.b*");
        assert_eq!(pattern.regex(), "(?i)a\\.b\\*");
        assert_eq!(
            Pattern::new(PatternKind::Exact, "Ken").regex(),
            "(?i)^Ken$"
        );
        assert_eq!(Pattern::new(PatternKind::StartsWith, "Ken").regex(), "(?i)^Ken");
        assert_eq!(Pattern::new(PatternKind::EndsWith, "Ken").regex(), "(?i)Ken$");
    }

    #[test]
    fn test_double_negation_collapses() {
        let expr = Expression::matches("name", Pattern::new(PatternKind::Contains, "Ken"));
        assert_eq!(expr.clone().negate().negate(), expr);
    }

    #[test]
    fn test_single_expression_not_wrapped() {
        let expr = Expression::outside("total", json!(2), json!(4));
        assert_eq!(Expression::all(vec![expr.clone()]), expr);
        assert_eq!(Expression::any(vec![expr.clone()]), expr);
    }

    #[test]
    fn test_display() {
        let expr = Expression::all(vec![
            Expression::matches("customer_name", Pattern::new(PatternKind::StartsWith, "Ken"))
                .negate(),
            Expression::outside("total_orders", json!(2), json!(4)),
        ]);
        assert_eq!(
            expr.to_string(),
            "(!/^Ken/i.test(this.customer_name) && (this.total_orders < 2 || this.total_orders > 4))"
        );
    }
}
