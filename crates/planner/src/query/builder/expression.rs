use super::{Compilation, WhereBuilder};
use crate::{
    error::{FilterEvaluationError, UnmappableError, UnmappableReason},
    mapped,
    query::{
        ast::expr::{SqlArgument, SqlExpr, SqlOperation},
        mapped::{CompileResult, Mapped},
    },
};
use filter_syntax::{ArithmeticOp, Expression, Function};
use model::core::{data_type::DataType, value::Value};
use tracing::debug;

/// Type a literal should be bound as, taken from the other operand.
#[derive(Debug, Clone)]
pub(super) struct Hint {
    /// Printed in type mismatch errors.
    pub subject: String,
    pub data_type: DataType,
}

impl WhereBuilder<'_> {
    pub(super) fn compile_expression(
        &self,
        cx: &mut Compilation,
        expr: &Expression,
        hint: Option<&Hint>,
    ) -> CompileResult<SqlExpr> {
        match expr {
            Expression::ValueReference(property) => {
                let column = mapped!(self.column(cx, property));
                Ok(Mapped::Sql(column.into()))
            }
            Expression::Literal(value) => Ok(Mapped::Sql(self.bind_literal(value, hint)?.into())),
            Expression::Function(function) => self.compile_function(cx, function),
            Expression::Arithmetic { op, left, right } => {
                let (left, right) = mapped!(self.compile_pair(cx, left, right)?);
                let data_type = arithmetic_type(*op, left.data_type(), right.data_type());
                // SQL divides integers as integers; the filter divides exactly.
                let integers = [&left, &right]
                    .iter()
                    .all(|e| e.data_type().is_some_and(|t| t.is_integer()));
                let left = if *op == ArithmeticOp::Div && integers {
                    SqlExpr::from(self.dialect.cast_expression(left, &DataType::Double))
                } else {
                    left
                };
                let op = SqlOperation::builder()
                    .sql("(")
                    .expr(left)
                    .sql(&format!(" {} ", op.symbol()))
                    .expr(right)
                    .sql(")")
                    .data_type(data_type)
                    .build();
                Ok(Mapped::Sql(op.into()))
            }
        }
    }

    /// Compiles both operands of a binary node, typing a literal on one side
    /// after the expression on the other. Operand order is preserved.
    pub(super) fn compile_pair(
        &self,
        cx: &mut Compilation,
        left: &Expression,
        right: &Expression,
    ) -> CompileResult<(SqlExpr, SqlExpr)> {
        if left.is_literal() && !right.is_literal() {
            let right_sql = mapped!(self.compile_expression(cx, right, None)?);
            let hint = self.hint(right, &right_sql);
            let left_sql = mapped!(self.compile_expression(cx, left, hint.as_ref())?);
            return Ok(Mapped::Sql((left_sql, right_sql)));
        }

        // The right side is compiled even when the left is unmappable, so
        // that its input errors are not hidden.
        let left_sql = self.compile_expression(cx, left, None)?;
        let hint = match &left_sql {
            Mapped::Sql(sql) => self.hint(left, sql),
            Mapped::Unmappable(_) => None,
        };
        let right_sql = self.compile_expression(cx, right, hint.as_ref())?;
        let (left_sql, right_sql) = mapped!(left_sql.zip(right_sql));

        // Two non-literal operands of unrelated types: compare as the left type.
        let right_sql = match (left_sql.data_type(), right_sql.data_type()) {
            (Some(l), Some(r)) if !right.is_literal() && !l.is_compatible(&r) => {
                SqlExpr::from(self.dialect.cast_expression(right_sql, &l))
            }
            _ => right_sql,
        };
        Ok(Mapped::Sql((left_sql, right_sql)))
    }

    pub(super) fn hint(&self, expr: &Expression, compiled: &SqlExpr) -> Option<Hint> {
        compiled.data_type().map(|data_type| Hint {
            subject: expr.to_string(),
            data_type,
        })
    }

    /// Binds a literal, converted to the hinted type when there is one.
    ///
    /// A literal that cannot be converted is an error for dialects that need
    /// statically typed parameters and is bound as given otherwise.
    pub(super) fn bind_literal(
        &self,
        value: &Value,
        hint: Option<&Hint>,
    ) -> Result<SqlArgument, FilterEvaluationError> {
        let Some(hint) = hint.filter(|_| !value.is_null()) else {
            return Ok(SqlArgument::untyped(value.clone()));
        };

        if let Value::Geometry(geometry) = value {
            return Ok(SqlArgument::geometry(geometry.clone(), geometry.srid));
        }

        match value.coerce_to(&hint.data_type) {
            Ok(coerced) => Ok(SqlArgument::typed(coerced, hint.data_type.clone())),
            Err(e) if self.dialect.requires_static_typing() => {
                Err(FilterEvaluationError::TypeMismatch {
                    property: hint.subject.clone(),
                    expected: hint.data_type.clone(),
                    value: e.value,
                })
            }
            Err(e) => {
                debug!("Binding {} untyped: {}", value, e);
                Ok(SqlArgument::untyped(value.clone()))
            }
        }
    }

    fn compile_function(&self, cx: &mut Compilation, function: &Function) -> CompileResult<SqlExpr> {
        let Some(known) = ScalarFunction::from_name(&function.name) else {
            return Ok(Mapped::Unmappable(UnmappableError::new(
                function,
                UnmappableReason::UnsupportedFunction(function.name.clone()),
            )));
        };
        let arity_error = || FilterEvaluationError::ArgumentCount {
            function: function.name.clone(),
            expected: known.arity(),
            actual: function.args.len(),
        };
        if function.args.len() != known.arity() {
            return Err(arity_error());
        }

        let text = Hint {
            subject: function.to_string(),
            data_type: DataType::String,
        };
        let args = function
            .args
            .iter()
            .map(|arg| self.compile_expression(cx, arg, Some(&text)))
            .collect::<Result<Vec<_>, _>>()?;
        let args = mapped!(args.into_iter().collect::<Mapped<Vec<_>>>())
            .into_iter()
            .map(|arg| match arg.data_type() {
                Some(t) if !t.is_textual() => {
                    SqlExpr::from(self.dialect.cast_expression(arg, &DataType::String))
                }
                _ => arg,
            })
            .collect::<Vec<_>>();

        let op = match known {
            ScalarFunction::Lower => call("LOWER", args, DataType::String),
            ScalarFunction::Upper => call("UPPER", args, DataType::String),
            ScalarFunction::Length => call("CHAR_LENGTH", args, DataType::Int),
            ScalarFunction::Concat => self.dialect.concat_expression(args),
            // Zero based like the filter function; -1 when absent.
            ScalarFunction::IndexOf => {
                let mut args = args.into_iter();
                let (Some(haystack), Some(needle)) = (args.next(), args.next()) else {
                    return Err(arity_error());
                };
                SqlOperation::builder()
                    .sql("(")
                    .expr(self.dialect.substring_index_expression(needle, haystack))
                    .sql(" - 1)")
                    .data_type(DataType::Int)
                    .build()
            }
        };
        Ok(Mapped::Sql(op.into()))
    }
}

/// Filter functions with a portable SQL translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScalarFunction {
    Lower,
    Upper,
    Length,
    Concat,
    IndexOf,
}

impl ScalarFunction {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "strToLowerCase" => Some(ScalarFunction::Lower),
            "strToUpperCase" => Some(ScalarFunction::Upper),
            "strLength" => Some(ScalarFunction::Length),
            "strConcat" => Some(ScalarFunction::Concat),
            "strIndexOf" => Some(ScalarFunction::IndexOf),
            _ => None,
        }
    }

    fn arity(&self) -> usize {
        match self {
            ScalarFunction::Lower | ScalarFunction::Upper | ScalarFunction::Length => 1,
            ScalarFunction::Concat | ScalarFunction::IndexOf => 2,
        }
    }
}

fn call(name: &str, args: Vec<SqlExpr>, data_type: DataType) -> SqlOperation {
    let mut builder = SqlOperation::builder().sql(name).sql("(");
    for (i, arg) in args.into_iter().enumerate() {
        if i > 0 {
            builder = builder.sql(", ");
        }
        builder = builder.expr(arg);
    }
    builder.sql(")").data_type(data_type).build()
}

fn arithmetic_type(op: ArithmeticOp, left: Option<DataType>, right: Option<DataType>) -> DataType {
    match (left, right) {
        (Some(l), Some(r)) if l.is_integer() && r.is_integer() && op != ArithmeticOp::Div => DataType::Long,
        (Some(DataType::Decimal), _) | (_, Some(DataType::Decimal)) => DataType::Decimal,
        _ => DataType::Double,
    }
}
