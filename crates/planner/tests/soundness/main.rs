//! Randomized round trip of the pushed / residual split.
//!
//! Filters are generated over a handful of integer properties, some of which
//! the mapper refuses. For every filter `F` the compiler returns `pushed` and
//! `residual`; a row must satisfy `F` exactly when it satisfies both, and the
//! where clause must be what `pushed` compiles to on its own. The emitted
//! SQL itself is run through a small interpreter, so a row the database would
//! drop can be told apart from one the filter rejects.

mod sql;

use filter_syntax::{
    ArithmeticOp, BinaryComparison, ComparisonOperator, Expression, Operator, ValueReference,
    builder::{literal, predicate, property},
};
use model::core::{data_type::DataType, value::Value};
use planner::{
    MySql, Postgres, PropertyNameMapper, PropertyNameMapping, SqlDialect, WhereBuilder,
    query::alias::TableAliasManager,
};
use proptest::prelude::*;
use std::collections::BTreeMap;

const PROPERTIES: [&str; 5] = ["A", "B", "C", "UNMAPPABLE_X", "UNMAPPABLE_Y"];

/// Maps every property to a BIGINT column of the same name, except the
/// `UNMAPPABLE_*` ones.
struct PrefixMapper;

impl PropertyNameMapper for PrefixMapper {
    fn mapping(
        &self,
        property: &ValueReference,
        aliases: &mut TableAliasManager,
    ) -> Option<PropertyNameMapping> {
        if property.as_str().starts_with("UNMAPPABLE_") {
            return None;
        }
        let column = property.as_str().to_lowercase();
        let mapping = PropertyNameMapping::new(Some(aliases.root_alias()), &column);
        Some(mapping.with_type(DataType::Long))
    }
}

type Row = BTreeMap<&'static str, i64>;

fn value(expr: &Expression, row: &Row) -> f64 {
    match expr {
        Expression::ValueReference(p) => row[p.as_str()] as f64,
        Expression::Literal(Value::Int(v)) => *v as f64,
        Expression::Arithmetic { op, left, right } => {
            let (l, r) = (value(left, row), value(right, row));
            match op {
                ArithmeticOp::Add => l + r,
                ArithmeticOp::Sub => l - r,
                ArithmeticOp::Mul => l * r,
                ArithmeticOp::Div => l / r,
            }
        }
        other => panic!("unexpected expression {other}"),
    }
}

/// In-memory semantics of the generated filters.
fn eval(op: &Operator, row: &Row) -> bool {
    match op {
        Operator::And(ops) => ops.iter().all(|o| eval(o, row)),
        Operator::Or(ops) => ops.iter().any(|o| eval(o, row)),
        Operator::Not(o) => !eval(o, row),
        Operator::Comparison(ComparisonOperator::Binary { op, left, right, .. }) => {
            let ord = value(left, row).total_cmp(&value(right, row));
            match op {
                BinaryComparison::Equals => ord.is_eq(),
                BinaryComparison::NotEquals => ord.is_ne(),
                BinaryComparison::Less => ord.is_lt(),
                BinaryComparison::Greater => ord.is_gt(),
                BinaryComparison::LessOrEqual => ord.is_le(),
                BinaryComparison::GreaterOrEqual => ord.is_ge(),
            }
        }
        Operator::Comparison(ComparisonOperator::Between { expr, lower, upper }) => {
            let v = value(expr, row);
            value(lower, row) <= v && v <= value(upper, row)
        }
        Operator::Comparison(ComparisonOperator::Like {
            expr: Expression::ValueReference(p),
            pattern,
            wildcard,
            single_char,
            escape_char,
            ..
        }) => sql::like_match(
            &row[p.as_str()].to_string(),
            pattern,
            *wildcard,
            *single_char,
            *escape_char,
        ),
        Operator::Function(f) if f.name == "isEven" => value(&f.args[0], row) % 2.0 == 0.0,
        other => panic!("unexpected operator {other}"),
    }
}

fn mentions_unmappable(op: &Operator) -> bool {
    op.to_string().contains("UNMAPPABLE_") || op.to_string().contains("isEven")
}

fn conjuncts(op: &Operator) -> Vec<&Operator> {
    match op {
        Operator::And(ops) => ops.iter().flat_map(conjuncts).collect(),
        other => vec![other],
    }
}

fn arb_property() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just(PROPERTIES[0]),
        Just(PROPERTIES[1]),
        Just(PROPERTIES[2]),
        Just(PROPERTIES[3]),
        Just(PROPERTIES[4]),
    ]
}

fn arb_comparison() -> impl Strategy<Value = BinaryComparison> {
    prop_oneof![
        Just(BinaryComparison::Equals),
        Just(BinaryComparison::NotEquals),
        Just(BinaryComparison::Less),
        Just(BinaryComparison::Greater),
        Just(BinaryComparison::LessOrEqual),
        Just(BinaryComparison::GreaterOrEqual),
    ]
}

fn arb_arithmetic() -> impl Strategy<Value = ArithmeticOp> {
    prop_oneof![
        Just(ArithmeticOp::Add),
        Just(ArithmeticOp::Sub),
        Just(ArithmeticOp::Mul),
        Just(ArithmeticOp::Div),
    ]
}

/// Patterns over the decimal text of small integers, in the default
/// `*` / `.` / `!` syntax.
fn arb_like_pattern() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("1*"),
        Just("-*"),
        Just("*2"),
        Just("."),
        Just("-."),
        Just("*"),
        Just("1!*"),
    ]
}

fn arb_filter() -> impl Strategy<Value = Operator> {
    let leaf = prop_oneof![
        (arb_property(), arb_comparison(), -3i64..3).prop_map(|(p, op, v)| {
            Operator::Comparison(ComparisonOperator::Binary {
                op,
                left: property(p),
                right: literal(v),
                match_case: true,
            })
        }),
        (arb_property(), -3i64..1, 0i64..3)
            .prop_map(|(p, lo, hi)| property(p).between(literal(lo), literal(hi))),
        arb_property().prop_map(|p| predicate("isEven", vec![property(p)])),
        (arb_property(), arb_arithmetic(), 1i64..4, arb_comparison(), -3i64..3).prop_map(
            |(p, arith, k, op, v)| {
                Operator::Comparison(ComparisonOperator::Binary {
                    op,
                    left: property(p).arithmetic(arith, literal(k)),
                    right: literal(v),
                    match_case: true,
                })
            }
        ),
        (arb_property(), arb_like_pattern()).prop_map(|(p, pattern)| property(p).like(pattern)),
    ];

    leaf.prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 1..4).prop_map(Operator::And),
            prop::collection::vec(inner.clone(), 1..4).prop_map(Operator::Or),
            inner.prop_map(|o| Operator::Not(Box::new(o))),
        ]
    })
}

fn arb_row() -> impl Strategy<Value = Row> {
    prop::collection::vec(-3i64..3, PROPERTIES.len())
        .prop_map(|values| PROPERTIES.iter().copied().zip(values).collect())
}

fn placeholder_count(sql: &str) -> usize {
    sql.matches('?').count()
}

proptest! {
    #[test]
    fn split_preserves_semantics(filter in arb_filter(), rows in prop::collection::vec(arb_row(), 1..8)) {
        let builder = WhereBuilder::new(&Postgres, &PrefixMapper);
        let compiled = builder.build(Some(&filter), &[], true).unwrap();

        for row in &rows {
            let pushed = compiled.pushed.as_ref().is_none_or(|p| eval(p, row));
            let residual = compiled.residual.as_ref().is_none_or(|r| eval(r, row));
            prop_assert_eq!(eval(&filter, row), pushed && residual);
        }
    }

    #[test]
    fn where_clause_selects_what_pushed_selects(
        filter in arb_filter(),
        rows in prop::collection::vec(arb_row(), 1..8),
    ) {
        let builder = WhereBuilder::new(&Postgres, &PrefixMapper);
        let compiled = builder.build(Some(&filter), &[], true).unwrap();
        let parameters = compiled.where_clause.parameters();
        let where_clause = (!compiled.where_clause.is_empty())
            .then(|| sql::parse(&compiled.where_clause.text()));

        for row in &rows {
            let selected = where_clause
                .as_ref()
                .is_none_or(|w| sql::eval(w, &parameters, row));
            let pushed = compiled.pushed.as_ref().is_none_or(|p| eval(p, row));
            let residual = compiled.residual.as_ref().is_none_or(|r| eval(r, row));
            prop_assert_eq!(selected, pushed, "where clause {}", compiled.where_clause.text());
            prop_assert_eq!(eval(&filter, row), selected && residual);
        }
    }

    #[test]
    fn pushed_part_is_fully_mappable(filter in arb_filter()) {
        let builder = WhereBuilder::new(&Postgres, &PrefixMapper);
        let compiled = builder.build(Some(&filter), &[], true).unwrap();

        prop_assert_eq!(compiled.pushed.is_none(), compiled.where_clause.is_empty());
        if let Some(pushed) = &compiled.pushed {
            prop_assert!(!mentions_unmappable(pushed));
            let strict = builder.build(Some(pushed), &[], false).unwrap();
            prop_assert_eq!(strict.where_clause.text(), compiled.where_clause.text());
            prop_assert_eq!(strict.where_clause.parameters(), compiled.where_clause.parameters());
        }
        if let Some(residual) = &compiled.residual {
            for operand in conjuncts(residual) {
                prop_assert!(mentions_unmappable(operand), "mappable residual operand {}", operand);
            }
        }
    }

    #[test]
    fn placeholders_match_parameters(filter in arb_filter()) {
        let dialects: [&dyn SqlDialect; 2] = [&Postgres, &MySql];
        for dialect in dialects {
            let builder = WhereBuilder::new(dialect, &PrefixMapper);
            let compiled = builder.build(Some(&filter), &[], true).unwrap();

            let params = compiled.where_clause.parameters();
            prop_assert_eq!(placeholder_count(&compiled.where_clause.text()), params.len());

            let (sql, bound) = compiled.where_clause.to_sql(dialect);
            prop_assert_eq!(&bound, &params);
            if dialect.placeholder(0) == "$1" {
                for i in 1..=params.len() {
                    let placeholder = format!("${i}");
                    prop_assert!(sql.contains(&placeholder));
                }
                let next_placeholder = format!("${}", params.len() + 1);
                prop_assert!(!sql.contains(&next_placeholder));
            }
        }
    }

    #[test]
    fn strict_mode_fails_exactly_when_something_is_unmappable(filter in arb_filter()) {
        let builder = WhereBuilder::new(&Postgres, &PrefixMapper);
        let partial = builder.build(Some(&filter), &[], true).unwrap();
        let strict = builder.build(Some(&filter), &[], false);

        prop_assert_eq!(strict.is_ok(), partial.residual.is_none());
    }
}
