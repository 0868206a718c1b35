//! Specification pattern for composable SQL filters
//!
//! A specification renders itself as a [`SqlPredicate`]: a boolean SQL
//! expression with `?` placeholders and the values bound to them, in order.
//! Specifications combine with `and` / `or`, and [`TrueSpec`] is the identity
//! for `and`.

use std::sync::Arc;

/// SQL text of the always-true predicate
pub const TRUE_SQL: &str = "1 = 1";

/// A value bound to a `?` placeholder
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Text(String),
    Integer(i64),
}

/// A rendered boolean SQL expression plus its positional bind values
#[derive(Debug, Clone, PartialEq)]
pub struct SqlPredicate {
    sql: String,
    binds: Vec<BindValue>,
}

impl SqlPredicate {
    /// Create a predicate from SQL text and the values for its placeholders
    pub fn new(sql: impl Into<String>, binds: Vec<BindValue>) -> Self {
        Self {
            sql: sql.into(),
            binds,
        }
    }

    /// The predicate every row satisfies
    pub fn always_true() -> Self {
        Self::new(TRUE_SQL, Vec::new())
    }

    /// Whether this predicate filters nothing
    pub fn is_always_true(&self) -> bool {
        self.sql == TRUE_SQL && self.binds.is_empty()
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn binds(&self) -> &[BindValue] {
        &self.binds
    }

    /// Conjunction; always-true operands are dropped
    pub fn and(self, other: SqlPredicate) -> SqlPredicate {
        if self.is_always_true() {
            return other;
        }
        if other.is_always_true() {
            return self;
        }

        let mut binds = self.binds;
        binds.extend(other.binds);
        SqlPredicate::new(format!("{} AND {}", self.sql, other.sql), binds)
    }

    /// Disjunction; an always-true operand makes the whole predicate always-true
    pub fn or(self, other: SqlPredicate) -> SqlPredicate {
        if self.is_always_true() || other.is_always_true() {
            return SqlPredicate::always_true();
        }

        let mut binds = self.binds;
        binds.extend(other.binds);
        SqlPredicate::new(format!("({} OR {})", self.sql, other.sql), binds)
    }
}

impl Default for SqlPredicate {
    fn default() -> Self {
        Self::always_true()
    }
}

/// Core specification trait for SQL filters
pub trait SqlSpecification: Send + Sync {
    /// Render this specification as a predicate
    fn to_predicate(&self) -> SqlPredicate;

    /// Combine with another specification using AND
    fn and<S: SqlSpecification + 'static>(self, other: S) -> AndSpecification
    where
        Self: Sized + 'static,
    {
        AndSpecification {
            left: Arc::new(self),
            right: Arc::new(other),
        }
    }

    /// Combine with another specification using OR
    fn or<S: SqlSpecification + 'static>(self, other: S) -> OrSpecification
    where
        Self: Sized + 'static,
    {
        OrSpecification {
            left: Arc::new(self),
            right: Arc::new(other),
        }
    }
}

/// AND composite specification
pub struct AndSpecification {
    left: Arc<dyn SqlSpecification>,
    right: Arc<dyn SqlSpecification>,
}

impl SqlSpecification for AndSpecification {
    fn to_predicate(&self) -> SqlPredicate {
        self.left.to_predicate().and(self.right.to_predicate())
    }
}

/// OR composite specification
pub struct OrSpecification {
    left: Arc<dyn SqlSpecification>,
    right: Arc<dyn SqlSpecification>,
}

impl SqlSpecification for OrSpecification {
    fn to_predicate(&self) -> SqlPredicate {
        self.left.to_predicate().or(self.right.to_predicate())
    }
}

/// Always true specification (identity for AND)
#[derive(Debug, Clone, Copy, Default)]
pub struct TrueSpec;

impl SqlSpecification for TrueSpec {
    fn to_predicate(&self) -> SqlPredicate {
        SqlPredicate::always_true()
    }
}

/// Fold specifications with AND, skipping always-true ones
pub fn all_of(specs: &[Box<dyn SqlSpecification>]) -> SqlPredicate {
    specs
        .iter()
        .map(|spec| spec.to_predicate())
        .fold(SqlPredicate::always_true(), SqlPredicate::and)
}
