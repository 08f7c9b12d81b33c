pub mod alias;
pub mod ast;
pub mod builder;
pub mod dialect;
pub mod macros;
pub mod mapped;
pub mod mapping;
pub mod renderer;
pub mod settings;
