//! Conversion between `Query` and its wire form.
//!
//! Every expression node maps to exactly one `grpc::expression::Kind`, so
//! `Query::from_wire(query.to_wire())` always yields the original query.

use super::{BinaryOp, Expression, Query};
use crate::error::CatalogError;
use crate::grpc::{self, expression::Kind};

impl Query {
    /// Serialize this query into the message sent to the catalog service.
    pub fn to_wire(&self) -> grpc::Query {
        grpc::Query {
            expression: self.expression.as_ref().map(Expression::to_wire),
        }
    }

    /// Rebuild a query from its wire form.
    ///
    /// Fails with `InvalidQuery` when an expression node has no kind or a
    /// binary node is missing an operand.
    pub fn from_wire(query: grpc::Query) -> Result<Self, CatalogError> {
        Ok(Self {
            expression: query.expression.map(Expression::from_wire).transpose()?,
        })
    }
}

impl From<&Query> for grpc::Query {
    fn from(query: &Query) -> Self {
        query.to_wire()
    }
}

impl TryFrom<grpc::Query> for Query {
    type Error = CatalogError;

    fn try_from(query: grpc::Query) -> Result<Self, Self::Error> {
        Query::from_wire(query)
    }
}

impl Expression {
    fn to_wire(&self) -> grpc::Expression {
        let kind = match self {
            Expression::Bool(b) => Kind::Boolean(*b),
            Expression::Int(i) => Kind::Int(*i),
            Expression::String(s) => Kind::String(s.clone()),
            Expression::Field(path) => Kind::Field(path.clone()),
            Expression::Not(inner) => Kind::Not(Box::new(inner.to_wire())),
            Expression::Binary { op, lhs, rhs } => {
                let operands = grpc::Binary {
                    lhs: Some(Box::new(lhs.to_wire())),
                    rhs: Some(Box::new(rhs.to_wire())),
                };
                match op {
                    BinaryOp::And => Kind::And(operands),
                    BinaryOp::Or => Kind::Or(operands),
                    BinaryOp::Equal => Kind::Equal(operands),
                    BinaryOp::NotEqual => Kind::NotEqual(operands),
                    BinaryOp::Less => Kind::Less(operands),
                    BinaryOp::LessEqual => Kind::LessEqual(operands),
                    BinaryOp::Greater => Kind::Greater(operands),
                    BinaryOp::GreaterEqual => Kind::GreaterEqual(operands),
                    BinaryOp::Contains => Kind::Contains(operands),
                    BinaryOp::Prefix => Kind::Prefix(operands),
                    BinaryOp::Suffix => Kind::Suffix(operands),
                    BinaryOp::Glob => Kind::Glob(operands),
                }
            }
        };
        grpc::Expression { kind: Some(kind) }
    }

    fn from_wire(expression: grpc::Expression) -> Result<Self, CatalogError> {
        let kind = expression
            .kind
            .ok_or_else(|| CatalogError::InvalidQuery("expression has no kind".into()))?;

        let (op, operands) = match kind {
            Kind::Boolean(b) => return Ok(Expression::Bool(b)),
            Kind::Int(i) => return Ok(Expression::Int(i)),
            Kind::String(s) => return Ok(Expression::String(s)),
            Kind::Field(path) => return Ok(Expression::Field(path)),
            Kind::Not(inner) => return Ok(Expression::Not(Box::new(Self::from_wire(*inner)?))),
            Kind::And(b) => (BinaryOp::And, b),
            Kind::Or(b) => (BinaryOp::Or, b),
            Kind::Equal(b) => (BinaryOp::Equal, b),
            Kind::NotEqual(b) => (BinaryOp::NotEqual, b),
            Kind::Less(b) => (BinaryOp::Less, b),
            Kind::LessEqual(b) => (BinaryOp::LessEqual, b),
            Kind::Greater(b) => (BinaryOp::Greater, b),
            Kind::GreaterEqual(b) => (BinaryOp::GreaterEqual, b),
            Kind::Contains(b) => (BinaryOp::Contains, b),
            Kind::Prefix(b) => (BinaryOp::Prefix, b),
            Kind::Suffix(b) => (BinaryOp::Suffix, b),
            Kind::Glob(b) => (BinaryOp::Glob, b),
        };

        let operand = |side: Option<Box<grpc::Expression>>, name: &str| {
            side.ok_or_else(|| {
                CatalogError::InvalidQuery(format!("{:?} is missing its {} operand", op, name))
            })
            .and_then(|e| Self::from_wire(*e))
        };

        Ok(Expression::Binary {
            op,
            lhs: Box::new(operand(operands.lhs, "left")?),
            rhs: Box::new(operand(operands.rhs, "right")?),
        })
    }
}
