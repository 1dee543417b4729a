//! JSON Schema validation module.

mod json_schema_validator;
mod schema_validator;

pub use json_schema_validator::*;
pub use schema_validator::*;
