mod client;
mod component_repository;
mod component_type_repository;
mod config;
mod entity_repository;
pub mod query_builder;

pub use client::*;
pub use component_repository::*;
pub use component_type_repository::*;
pub use config::*;
pub use entity_repository::*;
