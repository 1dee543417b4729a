use crate::domain::{
    ComponentType, ComponentTypeRepository, DomainError, DomainResult, QueryParams,
};
use crate::postgres::{PostgresClient, PostgresEntityRepository};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// PostgreSQL implementation of ComponentTypeRepository trait
#[derive(Clone)]
pub struct PostgresComponentTypeRepository {
    entities: PostgresEntityRepository<ComponentType>,
}

impl PostgresComponentTypeRepository {
    pub fn new(client: PostgresClient) -> Self {
        Self {
            entities: PostgresEntityRepository::new(client),
        }
    }
}

/// Take the first row of a server-serialized JSON array
fn first_row(json: &str) -> DomainResult<Option<ComponentType>> {
    let mut rows: Vec<ComponentType> = serde_json::from_str(json)
        .map_err(|e| DomainError::InvalidJson("componentType".to_string(), e.to_string()))?;

    if rows.is_empty() {
        return Ok(None);
    }
    Ok(Some(rows.swap_remove(0)))
}

#[async_trait]
impl ComponentTypeRepository for PostgresComponentTypeRepository {
    #[instrument(skip(self))]
    async fn get_all(&self) -> DomainResult<Option<String>> {
        self.entities.get_all().await
    }

    #[instrument(skip(self, params), fields(param_count = params.len()))]
    async fn get(&self, params: QueryParams) -> DomainResult<Option<ComponentType>> {
        let component_type = match self.entities.get(&params).await? {
            Some(json) => first_row(&json)?,
            None => None,
        };

        debug!(found = component_type.is_some(), "looked up component type");
        Ok(component_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_row_takes_leading_element() {
        let json = r#"[
            {"id": 1, "typeName": "CounterLCD", "captionKey": "a", "configurationSchema": "{}", "reportedDataSchema": "{}", "CreationTime": null, "LastUpdateTime": null},
            {"id": 2, "typeName": "CounterLCD", "captionKey": "b", "configurationSchema": "{}", "reportedDataSchema": "{}", "CreationTime": null, "LastUpdateTime": null}
        ]"#;

        let component_type = first_row(json).unwrap().unwrap();
        assert_eq!(component_type.id, 1);
        assert_eq!(component_type.caption_key, "a");
    }

    #[test]
    fn test_first_row_of_empty_array_is_none() {
        assert!(first_row("[]").unwrap().is_none());
    }

    #[test]
    fn test_first_row_rejects_malformed_json() {
        assert!(matches!(
            first_row("{not json"),
            Err(DomainError::InvalidJson(_, _))
        ));
    }
}
