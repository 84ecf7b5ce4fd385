//! Local evaluation of queries against subjects.

use std::cmp::Ordering;

use super::{BinaryOp, Expression, Query};
use crate::subject::Subject;

#[derive(Debug, Clone, PartialEq)]
enum Value<'a> {
    Null,
    Bool(bool),
    Int(i64),
    Str(&'a str),
}

impl Value<'_> {
    fn truthy(&self) -> bool {
        matches!(self, Value::Bool(true))
    }
}

impl Query {
    /// Evaluate this query against a subject.
    pub fn matches(&self, subject: &Subject) -> bool {
        match &self.expression {
            Some(expression) => eval(expression, subject).truthy(),
            None => true,
        }
    }
}

fn resolve<'a>(path: &str, subject: &'a Subject) -> Value<'a> {
    let info = subject.information.as_ref();
    match path {
        "id" => Value::Str(&subject.id),
        "information.name" => info.map_or(Value::Null, |i| Value::Str(&i.name)),
        "information.package" => info.map_or(Value::Null, |i| Value::Str(&i.package)),
        "information.activity" => info.map_or(Value::Null, |i| Value::Str(&i.activity)),
        "information.version_code" => {
            info.map_or(Value::Null, |i| Value::Int(i64::from(i.version_code)))
        }
        "hints.trace_time" => subject
            .hints
            .as_ref()
            .and_then(|h| h.trace_time)
            .map_or(Value::Null, |d| {
                Value::Int(i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
            }),
        _ => Value::Null,
    }
}

fn eval<'a>(expression: &'a Expression, subject: &'a Subject) -> Value<'a> {
    match expression {
        Expression::Bool(b) => Value::Bool(*b),
        Expression::Int(i) => Value::Int(*i),
        Expression::String(s) => Value::Str(s),
        Expression::Field(path) => resolve(path, subject),
        Expression::Not(inner) => Value::Bool(!eval(inner, subject).truthy()),
        Expression::Binary { op, lhs, rhs } => {
            // Short-circuit before touching the right-hand side.
            match op {
                BinaryOp::And => {
                    return Value::Bool(
                        eval(lhs, subject).truthy() && eval(rhs, subject).truthy(),
                    )
                }
                BinaryOp::Or => {
                    return Value::Bool(
                        eval(lhs, subject).truthy() || eval(rhs, subject).truthy(),
                    )
                }
                _ => {}
            }

            let l = eval(lhs, subject);
            let r = eval(rhs, subject);
            Value::Bool(compare(*op, &l, &r))
        }
    }
}

fn compare(op: BinaryOp, l: &Value<'_>, r: &Value<'_>) -> bool {
    match op {
        BinaryOp::Equal => l == r,
        BinaryOp::NotEqual => l != r,
        BinaryOp::Less => order(l, r) == Some(Ordering::Less),
        BinaryOp::LessEqual => matches!(order(l, r), Some(Ordering::Less | Ordering::Equal)),
        BinaryOp::Greater => order(l, r) == Some(Ordering::Greater),
        BinaryOp::GreaterEqual => {
            matches!(order(l, r), Some(Ordering::Greater | Ordering::Equal))
        }
        BinaryOp::Contains => strings(l, r).is_some_and(|(s, p)| s.contains(p)),
        BinaryOp::Prefix => strings(l, r).is_some_and(|(s, p)| s.starts_with(p)),
        BinaryOp::Suffix => strings(l, r).is_some_and(|(s, p)| s.ends_with(p)),
        BinaryOp::Glob => strings(l, r).is_some_and(|(s, p)| {
            globset::Glob::new(p)
                .map(|g| g.compile_matcher().is_match(s))
                .unwrap_or(false)
        }),
        BinaryOp::And => l.truthy() && r.truthy(),
        BinaryOp::Or => l.truthy() || r.truthy(),
    }
}

fn order(l: &Value<'_>, r: &Value<'_>) -> Option<Ordering> {
    match (l, r) {
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn strings<'a>(l: &Value<'a>, r: &Value<'a>) -> Option<(&'a str, &'a str)> {
    match (l, r) {
        (Value::Str(a), Value::Str(b)) => Some((*a, *b)),
        _ => None,
    }
}
