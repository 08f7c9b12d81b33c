//! Defines the core rendering trait and context for turning compiled
//! fragments into SQL text.

use crate::query::{ast::expr::SqlArgument, dialect::SqlDialect};
use model::core::value::Value;

pub mod expr;

/// A trait for any fragment that can be rendered into a SQL string.
pub trait Render {
    fn render(&self, renderer: &mut Renderer);
}

/// Accumulates the SQL string and the parameters.
///
/// Without a dialect every argument is written as a bare `?`, which is what
/// the dialect neutral [`text`](crate::query::ast::expr::SqlOperation::text)
/// of a fragment shows.
pub struct Renderer<'a> {
    pub sql: String,
    pub params: Vec<Value>,
    pub dialect: Option<&'a dyn SqlDialect>,
}

impl<'a> Renderer<'a> {
    pub fn new(dialect: &'a dyn SqlDialect) -> Self {
        Self {
            sql: String::new(),
            params: Vec::new(),
            dialect: Some(dialect),
        }
    }

    pub fn generic() -> Self {
        Self {
            sql: String::new(),
            params: Vec::new(),
            dialect: None,
        }
    }

    /// Consumes the renderer and returns the final SQL string and parameters.
    pub fn finish(self) -> (String, Vec<Value>) {
        (self.sql, self.params)
    }

    pub fn add_param(&mut self, arg: &SqlArgument) {
        self.params.push(arg.value.clone());
        match self.dialect {
            Some(dialect) => {
                let placeholder = dialect.placeholder(self.params.len() - 1);
                let snippet = dialect.bind_snippet(&placeholder, &arg.bind);
                self.sql.push_str(&snippet);
            }
            None => self.sql.push('?'),
        }
    }
}
