use crate::error::{FilterEvaluationError, UnmappableError};
use std::fmt::Display;

/// Outcome of compiling one fragment of a filter.
///
/// `Unmappable` is an expected result, not an error: the caller decides
/// whether the fragment becomes part of the residual filter or fails the
/// compile. Genuine input errors travel in the outer `Result`.
#[derive(Debug, Clone, PartialEq)]
pub enum Mapped<T> {
    Sql(T),
    Unmappable(UnmappableError),
}

pub type CompileResult<T> = Result<Mapped<T>, FilterEvaluationError>;

impl<T> Mapped<T> {
    pub fn is_mapped(&self) -> bool {
        matches!(self, Mapped::Sql(_))
    }

    /// Attributes an unmappable outcome to `operator`, so the error names the
    /// whole leaf rather than the sub-expression that failed.
    pub fn for_operator(self, operator: &impl Display) -> Self {
        match self {
            Mapped::Unmappable(mut e) => {
                e.operator = operator.to_string();
                Mapped::Unmappable(e)
            }
            sql => sql,
        }
    }

    /// Pairs two outcomes; the first unmappable one wins.
    pub fn zip<U>(self, other: Mapped<U>) -> Mapped<(T, U)> {
        match (self, other) {
            (Mapped::Sql(a), Mapped::Sql(b)) => Mapped::Sql((a, b)),
            (Mapped::Unmappable(e), _) | (_, Mapped::Unmappable(e)) => Mapped::Unmappable(e),
        }
    }
}

/// Collects every item, keeping the first unmappable outcome if any.
impl<T> FromIterator<Mapped<T>> for Mapped<Vec<T>> {
    fn from_iter<I: IntoIterator<Item = Mapped<T>>>(iter: I) -> Self {
        let mut values = Vec::new();
        let mut unmappable = None;
        for item in iter {
            match item {
                Mapped::Sql(v) => values.push(v),
                Mapped::Unmappable(e) => {
                    unmappable.get_or_insert(e);
                }
            }
        }
        match unmappable {
            Some(e) => Mapped::Unmappable(e),
            None => Mapped::Sql(values),
        }
    }
}
