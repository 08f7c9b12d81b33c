use filter_syntax::ValueReference;
use model::core::data_type::DataType;
use thiserror::Error;

/// Errors surfaced by [`WhereBuilder::build`](crate::query::builder::WhereBuilder::build).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CompileError {
    #[error(transparent)]
    Unmappable(#[from] UnmappableError),

    #[error(transparent)]
    FilterEvaluation(#[from] FilterEvaluationError),
}

/// A filter fragment that cannot be expressed in SQL.
///
/// Inside the compiler this travels as the payload of
/// [`Mapped::Unmappable`](crate::query::mapped::Mapped); it only becomes an
/// error in strict mode or when a sort list cannot be mapped.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("cannot map `{operator}` to SQL: {reason}")]
pub struct UnmappableError {
    /// The leaf operator (or sort criterion) that failed.
    pub operator: String,
    pub reason: UnmappableReason,
}

impl UnmappableError {
    pub fn new(operator: impl ToString, reason: UnmappableReason) -> Self {
        UnmappableError {
            operator: operator.to_string(),
            reason,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum UnmappableReason {
    #[error("property `{0}` is not mapped to a column")]
    PropertyNotMapped(ValueReference),

    #[error("property `{0}` has no geometry column")]
    NotSpatial(ValueReference),

    #[error("{dialect} does not support {operator}: {detail}")]
    UnsupportedSpatialOperator {
        dialect: String,
        operator: String,
        detail: String,
    },

    #[error("function `{0}` has no SQL equivalent")]
    UnsupportedFunction(String),
}

/// Malformed filter input. Never turned into a residual filter.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FilterEvaluationError {
    #[error("literal {value} does not match type {expected} of `{property}`")]
    TypeMismatch {
        property: String,
        expected: DataType,
        value: String,
    },

    #[error("{operator} expects a temporal literal, got {value}")]
    NotTemporal { operator: String, value: String },

    #[error("`{0}` has no operands")]
    MissingOperand(String),

    #[error("function `{function}` expects {expected} argument(s), got {actual}")]
    ArgumentCount {
        function: String,
        expected: usize,
        actual: usize,
    },

    #[error("invalid LIKE pattern `{pattern}`: {message}")]
    InvalidLikePattern { pattern: String, message: String },

    #[error("invalid distance {0}")]
    InvalidDistance(f64),

    #[error("invalid period {0}: begin is after end")]
    InvalidPeriod(String),
}

/// Invalid compiler settings or schema mapping document.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("alias prefix `{0}` is not a valid SQL identifier start")]
    InvalidAliasPrefix(String),

    #[error("property `{property}` has an unknown data type: {message}")]
    InvalidDataType { property: String, message: String },

    #[error("property `{0}` is mapped more than once")]
    DuplicateProperty(String),

    #[error("property `{0}` has no column")]
    MissingColumn(String),

    #[error("invalid settings document: {0}")]
    Json(#[from] serde_json::Error),
}
