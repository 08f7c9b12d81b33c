//! Compiles backend independent filters into SQL where / order-by fragments
//! with positional parameters, leaving whatever cannot be expressed in SQL as
//! a residual filter for in-memory evaluation.

pub mod error;
pub mod query;

pub use query::{
    builder::{CompiledQuery, WhereBuilder},
    dialect::{MySql, Postgres, SqlDialect, dialect_from_kind},
    mapping::{PropertyNameMapper, PropertyNameMapping, schema::SchemaPropertyMapper},
    settings::{CompilerSettings, SortPolicy},
};
