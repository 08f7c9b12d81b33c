use chrono::{TimeZone, Utc};
use filter_syntax::{
    ArithmeticOp, SortProperty,
    builder::{during, function, literal, predicate, property},
};
use model::core::temporal::Period;

#[test]
fn test_comparison_display() {
    assert_eq!(
        property("app:name").equal_to_ignore_case(literal("O'Neil")).to_string(),
        "app:name = 'O''Neil' [ignore case]"
    );
    assert_eq!(
        property("A").between(literal(1), literal(9)).to_string(),
        "A BETWEEN 1 AND 9"
    );
}

#[test]
fn test_expression_display() {
    let sum = property("A").arithmetic(ArithmeticOp::Mul, literal(2));
    assert_eq!(sum.greater_than(literal(10)).to_string(), "(A * 2) > 10");

    let upper = function("strToUpperCase", vec![property("app:name")]);
    assert_eq!(upper.equal_to(literal("BOB")).to_string(), "strToUpperCase(app:name) = 'BOB'");

    assert_eq!(predicate("isHistoric", vec![]).to_string(), "isHistoric()");
}

#[test]
fn test_temporal_display() {
    let begin = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();

    assert_eq!(
        during("app:updated", Period::new(begin, end)).to_string(),
        "During(app:updated, 2024-01-01T00:00:00+00:00/2024-02-01T00:00:00+00:00)"
    );
}

#[test]
fn test_sort_display() {
    assert_eq!(SortProperty::desc("app:age").to_string(), "app:age DESC");
}
