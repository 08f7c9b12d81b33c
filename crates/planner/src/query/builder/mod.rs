//! Compiles filter trees and sort lists into SQL fragments.
//!
//! Only conjunctions are split: every operand of a (possibly nested) `And` is
//! compiled on its own, the mappable ones are pushed into the where clause
//! and the rest are returned as the residual filter the caller evaluates in
//! memory. Every other node is atomic. Because the residual is conjoined with
//! the pushed part, the where clause never drops a row the full filter would
//! keep.

use crate::{
    error::{CompileError, FilterEvaluationError, UnmappableError, UnmappableReason},
    query::{
        alias::TableAliasManager,
        ast::{expr::SqlOperation, join::Join},
        dialect::SqlDialect,
        mapped::Mapped,
        mapping::PropertyNameMapper,
        settings::{CompilerSettings, SortPolicy},
    },
};
use filter_syntax::{Operator, SortProperty, ValueReference};
use model::core::value::Value;
use tracing::{debug, warn};

mod expression;
mod like;
mod order_by;
mod where_clause;

pub use like::translate_like_pattern;

/// Output of [`WhereBuilder::build`].
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    /// Empty when nothing could be pushed down.
    pub where_clause: SqlOperation,
    pub order_by: Option<SqlOperation>,
    /// Operands the caller must still apply to the returned rows.
    pub residual: Option<Operator>,
    /// The part of the filter `where_clause` was compiled from.
    pub pushed: Option<Operator>,
    /// Sort criteria the caller must apply itself (see [`SortPolicy::InMemory`]).
    pub residual_sort: Vec<SortProperty>,
    /// Joins needed by the where clause and the ORDER BY, in first-use order.
    pub joins: Vec<Join>,
}

impl CompiledQuery {
    pub fn is_fully_mapped(&self) -> bool {
        self.residual.is_none() && self.residual_sort.is_empty()
    }

    pub fn where_sql(&self, dialect: &dyn SqlDialect) -> Option<(String, Vec<Value>)> {
        if self.where_clause.is_empty() {
            None
        } else {
            Some(self.where_clause.to_sql(dialect))
        }
    }
}

/// Mutable state of one compile call.
#[derive(Debug)]
pub(crate) struct Compilation {
    pub(crate) aliases: TableAliasManager,
    joins: Vec<Join>,
}

impl Compilation {
    fn new(alias_prefix: &str) -> Self {
        Compilation {
            aliases: TableAliasManager::with_prefix(alias_prefix),
            joins: Vec::new(),
        }
    }

    pub(crate) fn record_joins(&mut self, joins: &[Join]) {
        for join in joins {
            if !self.joins.iter().any(|j| j.alias == join.alias) {
                self.joins.push(join.clone());
            }
        }
    }

    fn mark(&self) -> usize {
        self.joins.len()
    }

    /// Forgets joins recorded since `mark`; used when an operand turns out
    /// to be unmappable after some of its properties were already resolved.
    fn rollback(&mut self, mark: usize) {
        self.joins.truncate(mark);
    }
}

/// Turns filters into where / order-by fragments for one dialect and schema.
///
/// The builder holds no per-compile state and can be shared; each call to
/// [`build`](Self::build) allocates its own aliases.
pub struct WhereBuilder<'a> {
    dialect: &'a dyn SqlDialect,
    mapper: &'a dyn PropertyNameMapper,
    sort_policy: SortPolicy,
    alias_prefix: String,
    allow_partial: bool,
}

impl<'a> WhereBuilder<'a> {
    pub fn new(dialect: &'a dyn SqlDialect, mapper: &'a dyn PropertyNameMapper) -> Self {
        Self {
            dialect,
            mapper,
            sort_policy: SortPolicy::default(),
            alias_prefix: "t".to_string(),
            allow_partial: true,
        }
    }

    pub fn configured(
        dialect: &'a dyn SqlDialect,
        mapper: &'a dyn PropertyNameMapper,
        settings: &CompilerSettings,
    ) -> Self {
        Self {
            dialect,
            mapper,
            sort_policy: settings.sort_policy,
            alias_prefix: settings.alias_prefix.clone(),
            allow_partial: settings.allow_partial_mappings,
        }
    }

    pub fn sort_policy(mut self, policy: SortPolicy) -> Self {
        self.sort_policy = policy;
        self
    }

    pub fn alias_prefix(mut self, prefix: &str) -> Self {
        self.alias_prefix = prefix.to_string();
        self
    }

    pub fn allow_partial(mut self, allow: bool) -> Self {
        self.allow_partial = allow;
        self
    }

    pub fn dialect(&self) -> &dyn SqlDialect {
        self.dialect
    }

    /// [`build`](Self::build) with the builder's own partial-mapping setting.
    pub fn compile(
        &self,
        filter: Option<&Operator>,
        sort: &[SortProperty],
    ) -> Result<CompiledQuery, CompileError> {
        self.build(filter, sort, self.allow_partial)
    }

    pub fn build(
        &self,
        filter: Option<&Operator>,
        sort: &[SortProperty],
        allow_partial: bool,
    ) -> Result<CompiledQuery, CompileError> {
        let mut cx = Compilation::new(&self.alias_prefix);

        let (where_clause, pushed, residual) = match filter {
            Some(filter) => self.split(&mut cx, filter, allow_partial)?,
            None => (SqlOperation::empty(), None, None),
        };
        let (order_by, residual_sort) = self.compile_sort(&mut cx, sort)?;

        debug!(
            "Compiled filter for {}: pushed={}, residual={}, joins={}",
            self.dialect.name(),
            pushed.is_some(),
            residual.is_some(),
            cx.joins.len()
        );

        Ok(CompiledQuery {
            where_clause,
            order_by,
            residual,
            pushed,
            residual_sort,
            joins: cx.joins,
        })
    }

    /// SQL computing the bounding box of a geometry property, together with
    /// the joins it needs.
    pub fn envelope_query(
        &self,
        property: &ValueReference,
    ) -> Result<(SqlOperation, Vec<Join>), CompileError> {
        let mut cx = Compilation::new(&self.alias_prefix);
        let mapping = self
            .mapper
            .spatial_mapping(property, &mut cx.aliases)
            .ok_or_else(|| {
                UnmappableError::new(property, UnmappableReason::NotSpatial(property.clone()))
            })?;
        cx.record_joins(&mapping.joins);

        Ok((self.dialect.bbox_aggregate_sql(&mapping.to_column()), cx.joins))
    }

    fn split(
        &self,
        cx: &mut Compilation,
        filter: &Operator,
        allow_partial: bool,
    ) -> Result<(SqlOperation, Option<Operator>, Option<Operator>), CompileError> {
        let mut operands = Vec::new();
        flatten_conjunction(filter, &mut operands)?;

        let mut pushed_sql = Vec::with_capacity(operands.len());
        let mut pushed = Vec::with_capacity(operands.len());
        let mut residual = Vec::new();

        for operand in operands {
            let mark = cx.mark();
            match self.compile_operator(cx, operand)? {
                Mapped::Sql(sql) => {
                    pushed_sql.push(sql);
                    pushed.push(operand.clone());
                }
                Mapped::Unmappable(e) if allow_partial => {
                    debug!("Leaving {} for in-memory evaluation: {}", operand, e);
                    cx.rollback(mark);
                    residual.push(operand.clone());
                }
                Mapped::Unmappable(e) => {
                    warn!("Strict compile failed: {}", e);
                    return Err(e.into());
                }
            }
        }

        Ok((
            SqlOperation::conjunction(pushed_sql),
            Operator::conjunction(pushed),
            Operator::conjunction(residual),
        ))
    }
}

/// Collects the operands of nested `And`s; every other node is one operand.
fn flatten_conjunction<'f>(
    op: &'f Operator,
    out: &mut Vec<&'f Operator>,
) -> Result<(), FilterEvaluationError> {
    match op {
        Operator::And(operands) if operands.is_empty() => {
            Err(FilterEvaluationError::MissingOperand("And".to_string()))
        }
        Operator::And(operands) => {
            for operand in operands {
                flatten_conjunction(operand, out)?;
            }
            Ok(())
        }
        other => {
            out.push(other);
            Ok(())
        }
    }
}
