use super::{Compilation, WhereBuilder, expression::Hint, like::translate_like_pattern};
use crate::{
    error::{FilterEvaluationError, UnmappableError, UnmappableReason},
    mapped,
    query::{
        ast::expr::{SqlArgument, SqlColumn, SqlExpr, SqlOperation},
        mapped::{CompileResult, Mapped},
    },
};
use filter_syntax::{
    ComparisonOperator, Operator, SpatialOperator, TemporalOperator, TemporalRelation,
    ValueReference,
};
use model::core::{data_type::DataType, value::Value};
use tracing::debug;

impl WhereBuilder<'_> {
    pub(super) fn compile_operator(
        &self,
        cx: &mut Compilation,
        op: &Operator,
    ) -> CompileResult<SqlOperation> {
        match op {
            Operator::And(operands) => {
                let parts = mapped!(self.compile_operands(cx, "And", operands)?);
                Ok(Mapped::Sql(SqlOperation::conjunction(parts)))
            }
            Operator::Or(operands) => {
                let parts = mapped!(self.compile_operands(cx, "Or", operands)?);
                Ok(Mapped::Sql(SqlOperation::disjunction(parts)))
            }
            Operator::Not(operand) => {
                let inner = mapped!(self.compile_operator(cx, operand)?);
                Ok(Mapped::Sql(SqlOperation::negate(inner)))
            }
            Operator::Comparison(c) => Ok(self.compile_comparison(cx, c)?.for_operator(op)),
            Operator::Spatial(s) => Ok(self.compile_spatial(cx, s)?.for_operator(op)),
            Operator::Temporal(t) => Ok(self.compile_temporal(cx, t)?.for_operator(op)),
            Operator::Function(f) => {
                debug!("Boolean function {} has no SQL mapping", f.name);
                Ok(Mapped::Unmappable(UnmappableError::new(
                    op,
                    UnmappableReason::UnsupportedFunction(f.name.clone()),
                )))
            }
        }
    }

    fn compile_operands(
        &self,
        cx: &mut Compilation,
        name: &str,
        operands: &[Operator],
    ) -> CompileResult<Vec<SqlOperation>> {
        if operands.is_empty() {
            return Err(FilterEvaluationError::MissingOperand(name.to_string()));
        }
        // Every operand is compiled even after an unmappable one, so that
        // input errors further along are still reported.
        let parts = operands
            .iter()
            .map(|operand| self.compile_operator(cx, operand))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(parts.into_iter().collect())
    }

    /// Resolves a property to a column and records the joins it needs.
    pub(super) fn column(
        &self,
        cx: &mut Compilation,
        property: &ValueReference,
    ) -> Mapped<SqlColumn> {
        match self.mapper.mapping(property, &mut cx.aliases) {
            Some(mapping) => {
                cx.record_joins(&mapping.joins);
                Mapped::Sql(mapping.to_column())
            }
            None => Mapped::Unmappable(UnmappableError::new(
                property,
                UnmappableReason::PropertyNotMapped(property.clone()),
            )),
        }
    }

    fn compile_comparison(
        &self,
        cx: &mut Compilation,
        comparison: &ComparisonOperator,
    ) -> CompileResult<SqlOperation> {
        let op = match comparison {
            ComparisonOperator::Binary {
                op,
                left,
                right,
                match_case,
            } => {
                let (left, right) = mapped!(self.compile_pair(cx, left, right)?);
                let textual = [&left, &right]
                    .iter()
                    .any(|e| e.data_type().is_some_and(|t| t.is_textual()));
                let (left, right) = if !match_case && textual {
                    (lower(left), lower(right))
                } else {
                    (left, right)
                };
                SqlOperation::builder()
                    .expr(left)
                    .sql(&format!(" {} ", op.symbol()))
                    .expr(right)
                    .data_type(DataType::Boolean)
                    .build()
            }
            ComparisonOperator::Like {
                expr,
                pattern,
                wildcard,
                single_char,
                escape_char,
                match_case,
            } => {
                let sql_pattern = translate_like_pattern(
                    pattern,
                    *wildcard,
                    *single_char,
                    *escape_char,
                    self.dialect.like_escape_char(),
                )?;
                let target = mapped!(self.compile_expression(cx, expr, None)?);
                let target = match target.data_type() {
                    Some(t) if !t.is_textual() => {
                        SqlExpr::from(self.dialect.cast_expression(target, &DataType::String))
                    }
                    _ => target,
                };
                self.dialect.like_expression(
                    target,
                    SqlArgument::typed(Value::String(sql_pattern), DataType::String),
                    *match_case,
                )
            }
            ComparisonOperator::Between { expr, lower, upper } => {
                let target = self.compile_expression(cx, expr, None)?;
                let hint = match &target {
                    Mapped::Sql(sql) => self.hint(expr, sql),
                    Mapped::Unmappable(_) => None,
                };
                let lower = self.compile_expression(cx, lower, hint.as_ref())?;
                let upper = self.compile_expression(cx, upper, hint.as_ref())?;
                let ((target, lower), upper) = mapped!(target.zip(lower).zip(upper));
                SqlOperation::builder()
                    .expr(target)
                    .sql(" BETWEEN ")
                    .expr(lower)
                    .sql(" AND ")
                    .expr(upper)
                    .data_type(DataType::Boolean)
                    .build()
            }
            ComparisonOperator::IsNull { expr } => {
                let target = mapped!(self.compile_expression(cx, expr, None)?);
                SqlOperation::builder()
                    .expr(target)
                    .sql(" IS NULL")
                    .data_type(DataType::Boolean)
                    .build()
            }
        };
        Ok(Mapped::Sql(op))
    }

    fn compile_spatial(
        &self,
        cx: &mut Compilation,
        spatial: &SpatialOperator,
    ) -> CompileResult<SqlOperation> {
        if let Some(distance) = spatial.relation.distance()
            && !(distance.value >= 0.0)
        {
            return Err(FilterEvaluationError::InvalidDistance(distance.value));
        }

        let Some(mapping) = self.mapper.spatial_mapping(&spatial.property, &mut cx.aliases) else {
            return Ok(Mapped::Unmappable(UnmappableError::new(
                &spatial.property,
                UnmappableReason::NotSpatial(spatial.property.clone()),
            )));
        };
        let op = mapped!(self.dialect.spatial_predicate_sql(
            &spatial.relation,
            &mapping.to_column(),
            &spatial.geometry,
        ));
        cx.record_joins(&mapping.joins);
        Ok(Mapped::Sql(op))
    }

    fn compile_temporal(
        &self,
        cx: &mut Compilation,
        temporal: &TemporalOperator,
    ) -> CompileResult<SqlOperation> {
        let name = temporal.relation.name();
        let (symbol, instant) = match &temporal.relation {
            TemporalRelation::After(v) => (" > ", v),
            TemporalRelation::Before(v) => (" < ", v),
            TemporalRelation::TEquals(v) => (" = ", v),
            TemporalRelation::During(period) => {
                if !period.is_valid() {
                    return Err(FilterEvaluationError::InvalidPeriod(period.to_string()));
                }
                let column = mapped!(self.column(cx, &temporal.property));
                let property = &temporal.property;
                let begin = self.bind_temporal(property, &column, Value::Timestamp(period.begin))?;
                let end = self.bind_temporal(property, &column, Value::Timestamp(period.end))?;
                let op = SqlOperation::builder()
                    .sql("(")
                    .expr(column.clone())
                    .sql(" > ")
                    .expr(begin)
                    .sql(" AND ")
                    .expr(column)
                    .sql(" < ")
                    .expr(end)
                    .sql(")")
                    .data_type(DataType::Boolean)
                    .build();
                return Ok(Mapped::Sql(op));
            }
        };

        if !instant.is_temporal() {
            return Err(FilterEvaluationError::NotTemporal {
                operator: name.to_string(),
                value: instant.to_string(),
            });
        }
        let column = mapped!(self.column(cx, &temporal.property));
        let arg = self.bind_temporal(&temporal.property, &column, instant.clone())?;
        let op = SqlOperation::builder()
            .expr(column)
            .sql(symbol)
            .expr(arg)
            .data_type(DataType::Boolean)
            .build();
        Ok(Mapped::Sql(op))
    }

    fn bind_temporal(
        &self,
        property: &ValueReference,
        column: &SqlColumn,
        value: Value,
    ) -> Result<SqlArgument, FilterEvaluationError> {
        match &column.data_type {
            Some(t) if t.is_temporal() => {
                let hint = Hint {
                    subject: property.to_string(),
                    data_type: t.clone(),
                };
                self.bind_literal(&value, Some(&hint))
            }
            _ => Ok(SqlArgument::untyped(value)),
        }
    }
}

fn lower(expr: SqlExpr) -> SqlExpr {
    SqlOperation::builder()
        .sql("LOWER(")
        .expr(expr)
        .sql(")")
        .data_type(DataType::String)
        .build()
        .into()
}
