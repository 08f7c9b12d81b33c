use crate::ast::{
    expr::{Expression, Function},
    value_ref::ValueReference,
};
use model::core::{geometry::Geometry, temporal::Period, value::Value};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Boolean filter tree.
///
/// Nodes are plain owned values; consumers read the tree and never mutate
/// it, so a filter can be compiled any number of times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operator {
    And(Vec<Operator>),
    Or(Vec<Operator>),
    Not(Box<Operator>),
    Comparison(ComparisonOperator),
    Spatial(SpatialOperator),
    Temporal(TemporalOperator),
    /// Boolean valued function, e.g. a vendor specific predicate.
    Function(Function),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ComparisonOperator {
    Binary {
        op: BinaryComparison,
        left: Expression,
        right: Expression,
        match_case: bool,
    },
    Like {
        expr: Expression,
        pattern: String,
        wildcard: char,
        single_char: char,
        escape_char: char,
        match_case: bool,
    },
    Between {
        expr: Expression,
        lower: Expression,
        upper: Expression,
    },
    IsNull {
        expr: Expression,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryComparison {
    Equals,
    NotEquals,
    Less,
    Greater,
    LessOrEqual,
    GreaterOrEqual,
}

impl BinaryComparison {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryComparison::Equals => "=",
            BinaryComparison::NotEquals => "<>",
            BinaryComparison::Less => "<",
            BinaryComparison::Greater => ">",
            BinaryComparison::LessOrEqual => "<=",
            BinaryComparison::GreaterOrEqual => ">=",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialOperator {
    pub relation: SpatialRelation,
    pub property: ValueReference,
    pub geometry: Geometry,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SpatialRelation {
    BBox,
    Equals,
    Disjoint,
    Touches,
    Within,
    Overlaps,
    Crosses,
    Intersects,
    Contains,
    DWithin(Distance),
    Beyond(Distance),
}

impl SpatialRelation {
    pub fn name(&self) -> &'static str {
        match self {
            SpatialRelation::BBox => "BBOX",
            SpatialRelation::Equals => "Equals",
            SpatialRelation::Disjoint => "Disjoint",
            SpatialRelation::Touches => "Touches",
            SpatialRelation::Within => "Within",
            SpatialRelation::Overlaps => "Overlaps",
            SpatialRelation::Crosses => "Crosses",
            SpatialRelation::Intersects => "Intersects",
            SpatialRelation::Contains => "Contains",
            SpatialRelation::DWithin(_) => "DWithin",
            SpatialRelation::Beyond(_) => "Beyond",
        }
    }

    pub fn distance(&self) -> Option<&Distance> {
        match self {
            SpatialRelation::DWithin(d) | SpatialRelation::Beyond(d) => Some(d),
            _ => None,
        }
    }
}

/// Distance argument of `DWithin` / `Beyond`. Without a unit of measure the
/// value is in the units of the geometry's coordinate reference system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distance {
    pub value: f64,
    pub uom: Option<String>,
}

impl Distance {
    pub fn new(value: f64) -> Self {
        Distance { value, uom: None }
    }

    pub fn with_uom(value: f64, uom: impl Into<String>) -> Self {
        Distance {
            value,
            uom: Some(uom.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalOperator {
    pub relation: TemporalRelation,
    pub property: ValueReference,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TemporalRelation {
    After(Value),
    Before(Value),
    TEquals(Value),
    During(Period),
}

impl TemporalRelation {
    pub fn name(&self) -> &'static str {
        match self {
            TemporalRelation::After(_) => "After",
            TemporalRelation::Before(_) => "Before",
            TemporalRelation::TEquals(_) => "TEquals",
            TemporalRelation::During(_) => "During",
        }
    }
}

impl Operator {
    pub fn is_logical(&self) -> bool {
        matches!(self, Operator::And(_) | Operator::Or(_) | Operator::Not(_))
    }

    /// Conjunction of `operands` without a redundant wrapper: `None` when
    /// empty, the operand itself when there is exactly one.
    pub fn conjunction(mut operands: Vec<Operator>) -> Option<Operator> {
        match operands.len() {
            0 => None,
            1 => operands.pop(),
            _ => Some(Operator::And(operands)),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::And(ops) => write_joined(f, ops, " AND "),
            Operator::Or(ops) => write_joined(f, ops, " OR "),
            Operator::Not(op) => write!(f, "NOT {op}"),
            Operator::Comparison(c) => write!(f, "{c}"),
            Operator::Spatial(s) => write!(f, "{s}"),
            Operator::Temporal(t) => write!(f, "{t}"),
            Operator::Function(func) => write!(f, "{func}"),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, ops: &[Operator], sep: &str) -> fmt::Result {
    let parts = ops.iter().map(ToString::to_string).collect::<Vec<_>>();
    write!(f, "({})", parts.join(sep))
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparisonOperator::Binary {
                op,
                left,
                right,
                match_case,
            } => {
                write!(f, "{left} {} {right}", op.symbol())?;
                if !match_case {
                    write!(f, " [ignore case]")?;
                }
                Ok(())
            }
            ComparisonOperator::Like { expr, pattern, .. } => {
                write!(f, "{expr} LIKE {}", Value::String(pattern.clone()))
            }
            ComparisonOperator::Between { expr, lower, upper } => {
                write!(f, "{expr} BETWEEN {lower} AND {upper}")
            }
            ComparisonOperator::IsNull { expr } => write!(f, "{expr} IS NULL"),
        }
    }
}

impl fmt::Display for SpatialOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}, {}", self.relation.name(), self.property, self.geometry)?;
        if let Some(d) = self.relation.distance() {
            write!(f, ", {}", d.value)?;
            if let Some(uom) = &d.uom {
                write!(f, " {uom}")?;
            }
        }
        write!(f, ")")
    }
}

impl fmt::Display for TemporalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.relation.name();
        match &self.relation {
            TemporalRelation::After(v) | TemporalRelation::Before(v) | TemporalRelation::TEquals(v) => {
                write!(f, "{name}({}, {v})", self.property)
            }
            TemporalRelation::During(period) => write!(f, "{name}({}, {period})", self.property),
        }
    }
}
