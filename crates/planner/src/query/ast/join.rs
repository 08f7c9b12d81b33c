use crate::query::ast::common::JoinKind;
use std::fmt;

/// A join required by a mapped property, e.g.
/// `LEFT OUTER JOIN person t1 ON t0.owner_id = t1.id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub kind: JoinKind,
    pub table: String,
    pub alias: String,
    pub from_alias: String,
    pub from_column: String,
    pub to_column: String,
}

impl fmt::Display for Join {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} ON {}.{} = {}.{}",
            self.kind.keyword(),
            self.table,
            self.alias,
            self.from_alias,
            self.from_column,
            self.alias,
            self.to_column
        )
    }
}
