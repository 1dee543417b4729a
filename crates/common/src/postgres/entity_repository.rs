use crate::domain::{Column, DomainError, DomainResult, Entity, QueryParam, ResultCode};
use crate::postgres::PostgresClient;
use crate::postgres::query_builder::{
    get_entity_attributes, get_parameters, prepare_condition, prepare_procedure_call,
    select_column_json, select_json,
};
use std::marker::PhantomData;
use tracing::debug;

/// Schema-driven data access shared by every entity table.
///
/// Each call checks a connection out of the pool for its own duration and is
/// bounded by the client's query timeout.
pub struct PostgresEntityRepository<E: Entity> {
    client: PostgresClient,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Clone for PostgresEntityRepository<E> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> PostgresEntityRepository<E> {
    pub fn new(client: PostgresClient) -> Self {
        Self {
            client,
            _entity: PhantomData,
        }
    }

    /// Every row as a JSON array, `None` when the table is empty
    pub async fn get_all(&self) -> DomainResult<Option<String>> {
        let sql = select_json::<E>(&get_entity_attributes::<E>(), None);
        self.query_json("get_all", &sql, &[]).await
    }

    /// Rows matching every parameter; an empty parameter list is rejected
    pub async fn get(&self, params: &[QueryParam]) -> DomainResult<Option<String>> {
        let condition = prepare_condition(params).ok_or(DomainError::MissingCondition)?;
        let sql = select_json::<E>(&get_entity_attributes::<E>(), Some(&condition));
        self.query_json("get", &sql, params).await
    }

    /// One column of the rows matching every parameter
    pub async fn get_column(
        &self,
        params: &[QueryParam],
        column: Column,
    ) -> DomainResult<Option<String>> {
        let condition = prepare_condition(params).ok_or(DomainError::MissingCondition)?;
        let sql = select_column_json::<E>(column, Some(&condition));
        self.query_json("get_column", &sql, params).await
    }

    /// Invoke a stored function that reports its affected-row count
    pub async fn execute_procedure(
        &self,
        procedure: &str,
        params: &[QueryParam],
    ) -> DomainResult<ResultCode> {
        let sql = prepare_procedure_call(procedure, params);

        let affected = self
            .client
            .bounded(procedure, async {
                let conn = self
                    .client
                    .get_connection()
                    .await
                    .map_err(DomainError::RepositoryError)?;

                let row = conn
                    .query_one(sql.as_str(), &get_parameters(params))
                    .await
                    .map_err(|e| DomainError::RepositoryError(e.into()))?;

                let affected: Option<i64> = row
                    .try_get(0)
                    .map_err(|e| DomainError::RepositoryError(e.into()))?;
                Ok(affected.unwrap_or(0))
            })
            .await?;

        debug!(procedure, affected, table = E::TYPE_NAME, "executed procedure");
        Ok(ResultCode::from_affected_rows(affected))
    }

    async fn query_json(
        &self,
        operation: &str,
        sql: &str,
        params: &[QueryParam],
    ) -> DomainResult<Option<String>> {
        let data = self
            .client
            .bounded(operation, async {
                let conn = self
                    .client
                    .get_connection()
                    .await
                    .map_err(DomainError::RepositoryError)?;

                let row = conn
                    .query_one(sql, &get_parameters(params))
                    .await
                    .map_err(|e| DomainError::RepositoryError(e.into()))?;

                row.try_get::<_, Option<String>>(0)
                    .map_err(|e| DomainError::RepositoryError(e.into()))
            })
            .await?;

        debug!(
            operation,
            table = E::TYPE_NAME,
            found = data.is_some(),
            "queried entity table"
        );
        Ok(data)
    }
}
