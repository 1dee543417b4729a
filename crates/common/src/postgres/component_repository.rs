use crate::domain::{
    Column, Component, ComponentRepository, DomainError, DomainResult, ParamValue, QueryParam,
    QueryParams, ResultCode,
};
use crate::postgres::{PostgresClient, PostgresEntityRepository};
use async_trait::async_trait;
use tracing::{debug, instrument};

const INSERT_COMPONENT: &str = "P_InsertComponent";
const UPDATE_COMPONENT: &str = "P_UpdateComponent";
const UPDATE_COMPONENT_CONFIGURATION: &str = "P_UpdateComponentConfiguration";
const UPDATE_COMPONENT_REPORTED_DATA: &str = "P_UpdateComponentReportedData";
const DELETE_COMPONENT: &str = "P_DeleteComponent";

/// PostgreSQL implementation of ComponentRepository trait
#[derive(Clone)]
pub struct PostgresComponentRepository {
    entities: PostgresEntityRepository<Component>,
}

impl PostgresComponentRepository {
    pub fn new(client: PostgresClient) -> Self {
        Self {
            entities: PostgresEntityRepository::new(client),
        }
    }
}

fn optional_text(column: Column, value: &str) -> QueryParam {
    QueryParam {
        column,
        value: ParamValue::Text((!value.is_empty()).then(|| value.to_string())),
    }
}

fn optional_id(column: Column, value: i64) -> QueryParam {
    QueryParam {
        column,
        value: ParamValue::BigInt((value >= 0).then_some(value)),
    }
}

/// Insert arguments; unset optional fields bind NULL
fn insert_parameters(component: &Component) -> QueryParams {
    vec![
        QueryParam::bigint(Column::OrgId, component.org_id),
        QueryParam::text(Column::TypeName, component.type_name.as_str()),
        QueryParam::text(Column::NameL1, component.name_l1.as_str()),
        QueryParam::text(Column::NameL2, component.name_l2.as_str()),
        optional_text(Column::NameL3, &component.name_l3),
        optional_text(Column::NameL4, &component.name_l4),
        QueryParam::bigint(Column::QueueBranchId, component.queue_branch_id),
        optional_text(Column::RelatedClassName, &component.related_class_name),
        optional_id(Column::RelatedObjectId, component.related_object_id),
        QueryParam::text(Column::Identity, component.identity.as_str()),
        QueryParam::text(Column::Address, component.address.as_str()),
        optional_text(Column::Description, &component.description),
    ]
}

#[async_trait]
impl ComponentRepository for PostgresComponentRepository {
    #[instrument(skip(self, component), fields(type_name = %component.type_name, identity = %component.identity))]
    async fn create(&self, component: Component) -> DomainResult<ResultCode> {
        let result = self
            .entities
            .execute_procedure(INSERT_COMPONENT, &insert_parameters(&component))
            .await?;

        debug!(result = ?result, "inserted component");
        Ok(result)
    }

    #[instrument(skip(self))]
    async fn get_all(&self) -> DomainResult<Option<String>> {
        self.entities.get_all().await
    }

    #[instrument(skip(self, params), fields(param_count = params.len()))]
    async fn get(&self, params: QueryParams) -> DomainResult<Option<String>> {
        self.entities.get(&params).await
    }

    #[instrument(skip(self, params), fields(param_count = params.len(), column = column.field()))]
    async fn get_column(
        &self,
        params: QueryParams,
        column: Column,
    ) -> DomainResult<Option<String>> {
        self.entities.get_column(&params, column).await
    }

    #[instrument(skip(self, params), fields(param_count = params.len()))]
    async fn update(&self, params: QueryParams) -> DomainResult<ResultCode> {
        self.entities.execute_procedure(UPDATE_COMPONENT, &params).await
    }

    #[instrument(skip(self, params), fields(param_count = params.len()))]
    async fn update_config(&self, params: QueryParams) -> DomainResult<ResultCode> {
        self.entities
            .execute_procedure(UPDATE_COMPONENT_CONFIGURATION, &params)
            .await
    }

    #[instrument(skip(self, params), fields(param_count = params.len()))]
    async fn update_report(&self, params: QueryParams) -> DomainResult<ResultCode> {
        self.entities
            .execute_procedure(UPDATE_COMPONENT_REPORTED_DATA, &params)
            .await
    }

    #[instrument(skip(self, params))]
    async fn delete(&self, params: QueryParams) -> DomainResult<ResultCode> {
        // Only the id list is forwarded to the procedure
        let ids = params
            .into_iter()
            .find(|param| param.column == Column::Ids)
            .ok_or_else(|| DomainError::MissingField(Column::Ids.key().to_string()))?;

        self.entities
            .execute_procedure(DELETE_COMPONENT, std::slice::from_ref(&ids))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_parameters_bind_null_for_unset_fields() {
        let component = Component {
            org_id: 1,
            type_name: "CounterLCD".to_string(),
            name_l1: "x".to_string(),
            name_l2: "x".to_string(),
            queue_branch_id: 115,
            identity: "id1".to_string(),
            address: "addr1".to_string(),
            ..Default::default()
        };

        let params = insert_parameters(&component);
        let value_of = |column: Column| {
            params
                .iter()
                .find(|param| param.column == column)
                .map(|param| param.value.clone())
        };

        assert_eq!(value_of(Column::OrgId), Some(ParamValue::BigInt(Some(1))));
        assert_eq!(value_of(Column::NameL3), Some(ParamValue::Text(None)));
        assert_eq!(value_of(Column::RelatedObjectId), Some(ParamValue::BigInt(None)));
        assert_eq!(
            value_of(Column::QueueBranchId),
            Some(ParamValue::BigInt(Some(115)))
        );
        assert!(value_of(Column::Configuration).is_none());
    }
}
