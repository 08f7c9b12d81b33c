//! End-to-end compiler tests against a schema mapping document.

mod fixtures;
