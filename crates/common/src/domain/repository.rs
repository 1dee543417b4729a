use crate::domain::{Column, Component, ComponentType, DomainResult, QueryParams, ResultCode};
use async_trait::async_trait;

/// Repository trait for component storage operations.
///
/// Reads return the JSON text serialized by the database (an array of rows), or
/// `None` when no row matched. Writes return `Success` only when the stored
/// procedure reported at least one affected row.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ComponentRepository: Send + Sync {
    /// Insert a new component
    async fn create(&self, component: Component) -> DomainResult<ResultCode>;

    /// All components
    async fn get_all(&self) -> DomainResult<Option<String>>;

    /// Components matching every parameter
    async fn get(&self, params: QueryParams) -> DomainResult<Option<String>>;

    /// A single column of the components matching every parameter
    async fn get_column(&self, params: QueryParams, column: Column)
    -> DomainResult<Option<String>>;

    /// Update names and description
    async fn update(&self, params: QueryParams) -> DomainResult<ResultCode>;

    /// Replace the configuration blob
    async fn update_config(&self, params: QueryParams) -> DomainResult<ResultCode>;

    /// Replace the reported-data blob
    async fn update_report(&self, params: QueryParams) -> DomainResult<ResultCode>;

    /// Delete the components listed in the `IDs` parameter
    async fn delete(&self, params: QueryParams) -> DomainResult<ResultCode>;
}

/// Read-only access to the component type schema registry
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ComponentTypeRepository: Send + Sync {
    /// All component types as database-serialized JSON text
    async fn get_all(&self) -> DomainResult<Option<String>>;

    /// The first component type matching every parameter
    async fn get(&self, params: QueryParams) -> DomainResult<Option<ComponentType>>;
}
