use super::{Compilation, WhereBuilder};
use crate::{
    error::CompileError,
    query::{
        ast::{common::OrderDir, expr::SqlOperation},
        mapped::Mapped,
        settings::SortPolicy,
    },
};
use filter_syntax::SortProperty;
use tracing::{debug, warn};

impl WhereBuilder<'_> {
    /// Compiles the sort list all or nothing: one unmappable criterion fails
    /// the compile, or under [`SortPolicy::InMemory`] drops the whole ORDER BY
    /// and returns the list as residual sort.
    pub(super) fn compile_sort(
        &self,
        cx: &mut Compilation,
        sort: &[SortProperty],
    ) -> Result<(Option<SqlOperation>, Vec<SortProperty>), CompileError> {
        if sort.is_empty() {
            return Ok((None, Vec::new()));
        }

        let mark = cx.mark();
        let mut builder = SqlOperation::builder();
        for (i, criterion) in sort.iter().enumerate() {
            let column = match self.column(cx, &criterion.property).for_operator(criterion) {
                Mapped::Sql(column) => column,
                Mapped::Unmappable(e) => match self.sort_policy {
                    SortPolicy::Strict => {
                        warn!("Cannot sort in SQL: {}", e);
                        return Err(e.into());
                    }
                    SortPolicy::InMemory => {
                        debug!("Sorting in memory: {}", e);
                        cx.rollback(mark);
                        return Ok((None, sort.to_vec()));
                    }
                },
            };

            if i > 0 {
                builder = builder.sql(", ");
            }
            builder = builder
                .expr(column)
                .sql(" ")
                .sql(OrderDir::from(criterion.ascending).keyword());
        }

        Ok((Some(builder.build()), Vec::new()))
    }
}
