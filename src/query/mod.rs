//! Structured subject queries.
//!
//! A `Query` is an immutable filter expression over subject attributes. It is
//! produced by an upstream parser (or the builders below), carried to the
//! service as a wire `grpc::Query`, and evaluated there. The same evaluation
//! is available locally through [`Query::matches`], so a query behaves
//! identically whichever side runs it.
//!
//! ## Fields
//!
//! | Path                       | Type   |
//! |----------------------------|--------|
//! | `id`                       | string |
//! | `information.name`         | string |
//! | `information.package`      | string |
//! | `information.activity`     | string |
//! | `information.version_code` | int    |
//! | `hints.trace_time`         | int (whole seconds) |
//!
//! Fields that are absent on a subject evaluate to null.
//!
//! ## Example
//!
//! ```
//! use subject_catalog::query::{Expression, Query};
//!
//! let query = Query::new(
//!     Expression::field("id")
//!         .prefix("app")
//!         .and(Expression::field("hints.trace_time").at_least(10)),
//! );
//! assert!(query.validate().is_ok());
//! ```

mod eval;
mod wire;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Field paths understood by the catalog.
pub const FIELDS: &[&str] = &[
    "id",
    "information.name",
    "information.package",
    "information.activity",
    "information.version_code",
    "hints.trace_time",
];

/// Deepest expression nesting a query may carry, counted in wire messages:
/// a `Not` is one level, a binary node two (the node and its operands).
/// Stays below prost's decode recursion limit of 100 with room for the
/// request envelope.
pub const MAX_DEPTH: usize = 64;

/// Operator of a two-sided expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    And,
    Or,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    /// String `lhs` contains `rhs`.
    Contains,
    /// String `lhs` starts with `rhs`.
    Prefix,
    /// String `lhs` ends with `rhs`.
    Suffix,
    /// String `lhs` matches the glob pattern `rhs`.
    Glob,
}

/// A node in a filter expression tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expression {
    Bool(bool),
    Int(i64),
    String(String),
    /// Dotted path into a subject, see [`FIELDS`].
    Field(String),
    Not(Box<Expression>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },
}

impl Expression {
    pub fn field(path: impl Into<String>) -> Self {
        Expression::Field(path.into())
    }

    pub fn string(value: impl Into<String>) -> Self {
        Expression::String(value.into())
    }

    pub fn int(value: i64) -> Self {
        Expression::Int(value)
    }

    pub fn bool(value: bool) -> Self {
        Expression::Bool(value)
    }

    /// Combine `self` and `rhs` with `op`.
    pub fn binary(self, op: BinaryOp, rhs: impl Into<Expression>) -> Self {
        Expression::Binary {
            op,
            lhs: Box::new(self),
            rhs: Box::new(rhs.into()),
        }
    }

    pub fn and(self, rhs: impl Into<Expression>) -> Self {
        self.binary(BinaryOp::And, rhs)
    }

    pub fn or(self, rhs: impl Into<Expression>) -> Self {
        self.binary(BinaryOp::Or, rhs)
    }

    pub fn equals(self, rhs: impl Into<Expression>) -> Self {
        self.binary(BinaryOp::Equal, rhs)
    }

    pub fn not_equals(self, rhs: impl Into<Expression>) -> Self {
        self.binary(BinaryOp::NotEqual, rhs)
    }

    pub fn less_than(self, rhs: impl Into<Expression>) -> Self {
        self.binary(BinaryOp::Less, rhs)
    }

    pub fn at_most(self, rhs: impl Into<Expression>) -> Self {
        self.binary(BinaryOp::LessEqual, rhs)
    }

    pub fn greater_than(self, rhs: impl Into<Expression>) -> Self {
        self.binary(BinaryOp::Greater, rhs)
    }

    pub fn at_least(self, rhs: impl Into<Expression>) -> Self {
        self.binary(BinaryOp::GreaterEqual, rhs)
    }

    pub fn contains(self, rhs: impl Into<Expression>) -> Self {
        self.binary(BinaryOp::Contains, rhs)
    }

    pub fn prefix(self, rhs: impl Into<Expression>) -> Self {
        self.binary(BinaryOp::Prefix, rhs)
    }

    pub fn suffix(self, rhs: impl Into<Expression>) -> Self {
        self.binary(BinaryOp::Suffix, rhs)
    }

    pub fn glob(self, pattern: impl Into<Expression>) -> Self {
        self.binary(BinaryOp::Glob, pattern)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        self.validate_at(1)
    }

    fn validate_at(&self, depth: usize) -> Result<(), CatalogError> {
        if depth > MAX_DEPTH {
            return Err(CatalogError::InvalidQuery(format!(
                "expression nested deeper than {} levels",
                MAX_DEPTH
            )));
        }
        match self {
            Expression::Bool(_) | Expression::Int(_) | Expression::String(_) => Ok(()),
            Expression::Field(path) => {
                if FIELDS.contains(&path.as_str()) {
                    Ok(())
                } else {
                    Err(CatalogError::InvalidQuery(format!("unknown field `{}`", path)))
                }
            }
            Expression::Not(inner) => inner.validate_at(depth + 1),
            Expression::Binary { op, lhs, rhs } => {
                lhs.validate_at(depth + 2)?;
                rhs.validate_at(depth + 2)?;
                if *op == BinaryOp::Glob {
                    match rhs.as_ref() {
                        Expression::String(pattern) => {
                            globset::Glob::new(pattern).map_err(|e| {
                                CatalogError::InvalidQuery(format!(
                                    "bad glob pattern `{}`: {}",
                                    pattern, e
                                ))
                            })?;
                        }
                        Expression::Field(_) => {}
                        _ => {
                            return Err(CatalogError::InvalidQuery(
                                "glob pattern must be a string".into(),
                            ))
                        }
                    }
                }
                Ok(())
            }
        }
    }
}

impl std::ops::Not for Expression {
    type Output = Expression;

    fn not(self) -> Expression {
        Expression::Not(Box::new(self))
    }
}

impl From<&str> for Expression {
    fn from(value: &str) -> Self {
        Expression::String(value.to_string())
    }
}

impl From<String> for Expression {
    fn from(value: String) -> Self {
        Expression::String(value)
    }
}

impl From<i64> for Expression {
    fn from(value: i64) -> Self {
        Expression::Int(value)
    }
}

impl From<i32> for Expression {
    fn from(value: i32) -> Self {
        Expression::Int(i64::from(value))
    }
}

impl From<bool> for Expression {
    fn from(value: bool) -> Self {
        Expression::Bool(value)
    }
}

/// An immutable filter over subjects. An empty query matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expression: Option<Expression>,
}

impl Query {
    /// The query that matches every subject.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new(expression: Expression) -> Self {
        Self {
            expression: Some(expression),
        }
    }

    pub fn expression(&self) -> Option<&Expression> {
        self.expression.as_ref()
    }

    pub fn is_all(&self) -> bool {
        self.expression.is_none()
    }

    /// Reject unknown field paths and literal glob patterns that do not
    /// compile.
    pub fn validate(&self) -> Result<(), CatalogError> {
        match &self.expression {
            Some(expression) => expression.validate(),
            None => Ok(()),
        }
    }
}

impl From<Expression> for Query {
    fn from(expression: Expression) -> Self {
        Query::new(expression)
    }
}
