//! Sort specification over logical fields

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Order {
    #[serde(alias = "ASC")]
    Ascending,
    #[serde(alias = "DESC")]
    Descending,
}

impl Order {
    pub fn is_ascending(&self) -> bool {
        matches!(self, Order::Ascending)
    }

    pub fn is_descending(&self) -> bool {
        matches!(self, Order::Descending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Order::Ascending => "ASC",
            Order::Descending => "DESC",
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ordered list of (logical field, direction) pairs.
///
/// Declaration order is the sort precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sort {
    orders: Vec<(String, Order)>,
}

impl Sort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sorts every listed field in the same direction
    pub fn by<I, S>(fields: I, order: Order) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut sort = Self::new();
        for field in fields {
            sort.set_order(field, order);
        }
        sort
    }

    /// Sets the direction for a field.
    ///
    /// A field already present keeps its position and takes the new direction.
    pub fn set_order(&mut self, field: impl Into<String>, order: Order) -> &mut Self {
        let field = field.into();
        match self.orders.iter_mut().find(|(name, _)| *name == field) {
            Some((_, existing)) => *existing = order,
            None => self.orders.push((field, order)),
        }
        self
    }

    pub fn asc(mut self, field: impl Into<String>) -> Self {
        self.set_order(field, Order::Ascending);
        self
    }

    pub fn desc(mut self, field: impl Into<String>) -> Self {
        self.set_order(field, Order::Descending);
        self
    }

    /// Returns the direction for a field if it is sorted on
    pub fn order_for(&self, field: &str) -> Option<Order> {
        self.orders
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, order)| *order)
    }

    pub fn orders(&self) -> &[(String, Order)] {
        &self.orders
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declaration_order_kept() {
        let sort = Sort::new().asc("name").desc("total").asc("date");
        let fields: Vec<_> = sort.orders().iter().map(|(f, _)| f.as_str()).collect();
        assert_eq!(fields, vec!["name", "total", "date"]);
    }

    #[test]
    fn test_set_order_replaces_in_place() {
        let mut sort = Sort::new().asc("name").asc("total");
        sort.set_order("name", Order::Descending);

        assert_eq!(sort.orders()[0], ("name".to_string(), Order::Descending));
        assert_eq!(sort.orders().len(), 2);
    }

    #[test]
    fn test_sort_by_many() {
        let sort = Sort::by(["a", "b"], Order::Descending);
        assert_eq!(sort.order_for("b"), Some(Order::Descending));
        assert_eq!(sort.order_for("c"), None);
    }

    #[test]
    fn test_order_aliases() {
        let order: Order = serde_json::from_str("\"DESC\"").unwrap();
        assert!(order.is_descending());
        let order: Order = serde_json::from_str("\"ASCENDING\"").unwrap();
        assert!(order.is_ascending());
    }
}
