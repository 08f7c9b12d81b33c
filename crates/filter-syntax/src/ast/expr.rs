use crate::ast::value_ref::ValueReference;
use model::core::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operand of a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    ValueReference(ValueReference),
    Literal(Value),
    Function(Function),
    Arithmetic {
        op: ArithmeticOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub args: Vec<Expression>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl ArithmeticOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            ArithmeticOp::Add => "+",
            ArithmeticOp::Sub => "-",
            ArithmeticOp::Mul => "*",
            ArithmeticOp::Div => "/",
        }
    }
}

impl Expression {
    pub fn as_value_reference(&self) -> Option<&ValueReference> {
        match self {
            Expression::ValueReference(p) => Some(p),
            _ => None,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Expression::Literal(_))
    }
}

impl From<ValueReference> for Expression {
    fn from(p: ValueReference) -> Self {
        Expression::ValueReference(p)
    }
}

impl From<Value> for Expression {
    fn from(v: Value) -> Self {
        Expression::Literal(v)
    }
}

impl From<Function> for Expression {
    fn from(f: Function) -> Self {
        Expression::Function(f)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::ValueReference(p) => write!(f, "{p}"),
            Expression::Literal(v) => write!(f, "{v}"),
            Expression::Function(func) => write!(f, "{func}"),
            Expression::Arithmetic { op, left, right } => {
                write!(f, "({left} {} {right})", op.symbol())
            }
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args = self
            .args
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{}({args})", self.name)
    }
}
