//! SQL fragments produced by the compiler.

pub mod common;
pub mod expr;
pub mod join;
