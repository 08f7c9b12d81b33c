pub mod data_type;
pub mod geometry;
pub mod temporal;
pub mod value;
