//! Literal and type model shared by the filter AST and the SQL compiler.

pub mod core;
