pub mod expr;
pub mod operator;
pub mod sort;
pub mod value_ref;
