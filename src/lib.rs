//! fieldcheck - declarative record validation
//!
//! Records are validated against schemas whose fields carry an external
//! alias, a declared type, a coercion policy and ordered validator rules.

pub mod cli;
pub mod observability;
pub mod schema;
