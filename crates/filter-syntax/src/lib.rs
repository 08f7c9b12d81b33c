//! Backend independent filter expressions: the boolean operator tree,
//! value references, literals and sort criteria consumed by the SQL compiler.

pub mod ast;
pub mod builder;

pub use ast::{
    expr::{ArithmeticOp, Expression, Function},
    operator::{
        BinaryComparison, ComparisonOperator, Distance, Operator, SpatialOperator,
        SpatialRelation, TemporalOperator, TemporalRelation,
    },
    sort::SortProperty,
    value_ref::ValueReference,
};
