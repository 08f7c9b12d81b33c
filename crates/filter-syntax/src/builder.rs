//! Shorthand constructors for filter trees.
//!
//! ```
//! use filter_syntax::builder::{and, literal, property};
//!
//! let filter = and([
//!     property("app:name").equal_to(literal("Bonn")),
//!     property("app:population").greater_than(literal(100_000)),
//! ]);
//! assert_eq!(filter.to_string(), "(app:name = 'Bonn' AND app:population > 100000)");
//! ```

use crate::ast::{
    expr::{ArithmeticOp, Expression, Function},
    operator::{
        BinaryComparison, ComparisonOperator, Distance, Operator, SpatialOperator,
        SpatialRelation, TemporalOperator, TemporalRelation,
    },
    value_ref::ValueReference,
};
use model::core::{geometry::Geometry, temporal::Period, value::Value};

pub fn property(path: &str) -> Expression {
    Expression::ValueReference(ValueReference::from(path))
}

pub fn literal(value: impl Into<Value>) -> Expression {
    Expression::Literal(value.into())
}

pub fn function(name: &str, args: Vec<Expression>) -> Expression {
    Expression::Function(Function {
        name: name.to_string(),
        args,
    })
}

/// Boolean function used directly as a filter operator.
pub fn predicate(name: &str, args: Vec<Expression>) -> Operator {
    Operator::Function(Function {
        name: name.to_string(),
        args,
    })
}

pub fn and(operands: impl IntoIterator<Item = Operator>) -> Operator {
    Operator::And(operands.into_iter().collect())
}

pub fn or(operands: impl IntoIterator<Item = Operator>) -> Operator {
    Operator::Or(operands.into_iter().collect())
}

pub fn not(operand: Operator) -> Operator {
    Operator::Not(Box::new(operand))
}

impl Expression {
    fn compare(self, op: BinaryComparison, other: Expression, match_case: bool) -> Operator {
        Operator::Comparison(ComparisonOperator::Binary {
            op,
            left: self,
            right: other,
            match_case,
        })
    }

    pub fn equal_to(self, other: Expression) -> Operator {
        self.compare(BinaryComparison::Equals, other, true)
    }

    pub fn equal_to_ignore_case(self, other: Expression) -> Operator {
        self.compare(BinaryComparison::Equals, other, false)
    }

    pub fn not_equal_to(self, other: Expression) -> Operator {
        self.compare(BinaryComparison::NotEquals, other, true)
    }

    pub fn less_than(self, other: Expression) -> Operator {
        self.compare(BinaryComparison::Less, other, true)
    }

    pub fn greater_than(self, other: Expression) -> Operator {
        self.compare(BinaryComparison::Greater, other, true)
    }

    pub fn less_or_equal(self, other: Expression) -> Operator {
        self.compare(BinaryComparison::LessOrEqual, other, true)
    }

    pub fn greater_or_equal(self, other: Expression) -> Operator {
        self.compare(BinaryComparison::GreaterOrEqual, other, true)
    }

    /// `LIKE` with the Filter Encoding defaults: `*` wildcard, `.` single
    /// character, `!` escape.
    pub fn like(self, pattern: &str) -> Operator {
        self.like_with(pattern, '*', '.', '!', true)
    }

    pub fn like_with(
        self,
        pattern: &str,
        wildcard: char,
        single_char: char,
        escape_char: char,
        match_case: bool,
    ) -> Operator {
        Operator::Comparison(ComparisonOperator::Like {
            expr: self,
            pattern: pattern.to_string(),
            wildcard,
            single_char,
            escape_char,
            match_case,
        })
    }

    pub fn between(self, lower: Expression, upper: Expression) -> Operator {
        Operator::Comparison(ComparisonOperator::Between {
            expr: self,
            lower,
            upper,
        })
    }

    pub fn is_null(self) -> Operator {
        Operator::Comparison(ComparisonOperator::IsNull { expr: self })
    }

    pub fn arithmetic(self, op: ArithmeticOp, other: Expression) -> Expression {
        Expression::Arithmetic {
            op,
            left: Box::new(self),
            right: Box::new(other),
        }
    }
}

pub fn spatial(relation: SpatialRelation, path: &str, geometry: Geometry) -> Operator {
    Operator::Spatial(SpatialOperator {
        relation,
        property: ValueReference::from(path),
        geometry,
    })
}

pub fn bbox(path: &str, envelope: Geometry) -> Operator {
    spatial(SpatialRelation::BBox, path, envelope)
}

pub fn intersects(path: &str, geometry: Geometry) -> Operator {
    spatial(SpatialRelation::Intersects, path, geometry)
}

pub fn within(path: &str, geometry: Geometry) -> Operator {
    spatial(SpatialRelation::Within, path, geometry)
}

pub fn dwithin(path: &str, geometry: Geometry, distance: Distance) -> Operator {
    spatial(SpatialRelation::DWithin(distance), path, geometry)
}

pub fn beyond(path: &str, geometry: Geometry, distance: Distance) -> Operator {
    spatial(SpatialRelation::Beyond(distance), path, geometry)
}

pub fn temporal(relation: TemporalRelation, path: &str) -> Operator {
    Operator::Temporal(TemporalOperator {
        relation,
        property: ValueReference::from(path),
    })
}

pub fn after(path: &str, instant: impl Into<Value>) -> Operator {
    temporal(TemporalRelation::After(instant.into()), path)
}

pub fn before(path: &str, instant: impl Into<Value>) -> Operator {
    temporal(TemporalRelation::Before(instant.into()), path)
}

pub fn during(path: &str, period: Period) -> Operator {
    temporal(TemporalRelation::During(period), path)
}
