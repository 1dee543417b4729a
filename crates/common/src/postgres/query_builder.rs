//! SQL text construction for entity tables and stored procedures.
//!
//! Everything here is pure string building over the static entity descriptors
//! and typed query parameters; nothing touches a connection.

use crate::domain::{Column, Entity, ParamValue, QueryParam};
use tokio_postgres::types::ToSql;

/// Prefix shared by every entity table
pub const TABLE_PREFIX: &str = "cst_";

/// Double-quote an identifier so its casing survives
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quoted table name for an entity, e.g. `"cst_Component"`
pub fn get_table_name<E: Entity>() -> String {
    quote_identifier(&format!("{}{}", TABLE_PREFIX, E::TYPE_NAME))
}

/// Comma separated, quoted list of the entity's declared columns
pub fn get_entity_attributes<E: Entity>() -> String {
    E::COLUMNS
        .iter()
        .map(|column| quote_identifier(column.field()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Build a `WHERE` clause with one positional, cast placeholder per parameter.
///
/// Returns `None` for an empty parameter list.
pub fn prepare_condition(params: &[QueryParam]) -> Option<String> {
    if params.is_empty() {
        return None;
    }

    let predicates = params
        .iter()
        .enumerate()
        .map(|(index, param)| {
            format!(
                "{} = ${}::{}",
                quote_identifier(param.column.field()),
                index + 1,
                param.column.sql_type().cast()
            )
        })
        .collect::<Vec<_>>();

    Some(format!("WHERE {}", predicates.join(" AND ")))
}

/// Bind values in the same order as the placeholders produced above
pub fn get_parameters(params: &[QueryParam]) -> Vec<&(dyn ToSql + Sync)> {
    params.iter().map(|param| bind(&param.value)).collect()
}

fn bind(value: &ParamValue) -> &(dyn ToSql + Sync) {
    match value {
        ParamValue::BigInt(value) => value,
        ParamValue::Text(value) => value,
    }
}

/// Select the given columns, letting the server serialize matched rows as a JSON array.
///
/// `json_agg` over zero rows yields NULL.
pub fn select_json<E: Entity>(columns: &str, condition: Option<&str>) -> String {
    let mut inner = format!("SELECT {} FROM {}", columns, get_table_name::<E>());
    if let Some(condition) = condition {
        inner.push(' ');
        inner.push_str(condition);
    }
    format!("SELECT json_agg(t)::text FROM ({}) t", inner)
}

/// Call a stored function with named arguments, e.g. `SELECT "P_X"("ID" => $1::bigint)`
pub fn prepare_procedure_call(procedure: &str, params: &[QueryParam]) -> String {
    let arguments = params
        .iter()
        .enumerate()
        .map(|(index, param)| {
            format!(
                "{} => ${}::{}",
                quote_identifier(param.column.key()),
                index + 1,
                param.column.sql_type().cast()
            )
        })
        .collect::<Vec<_>>();

    format!(
        "SELECT {}({})",
        quote_identifier(procedure),
        arguments.join(", ")
    )
}

/// Select a single column of an entity
pub fn select_column_json<E: Entity>(column: Column, condition: Option<&str>) -> String {
    select_json::<E>(&quote_identifier(column.field()), condition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Component, ComponentType};

    #[test]
    fn test_table_name_uses_prefix_and_type_name() {
        assert_eq!(get_table_name::<Component>(), "\"cst_Component\"");
        assert_eq!(get_table_name::<ComponentType>(), "\"cst_ComponentType\"");
    }

    #[test]
    fn test_entity_attributes_list_declared_columns() {
        assert_eq!(
            get_entity_attributes::<ComponentType>(),
            "\"id\", \"typeName\", \"captionKey\", \"configurationSchema\", \"reportedDataSchema\", \"CreationTime\", \"LastUpdateTime\""
        );
        assert!(get_entity_attributes::<Component>().starts_with("\"id\", \"orgID\", \"typeName\""));
    }

    #[test]
    fn test_prepare_condition_joins_with_and() {
        let params = vec![
            QueryParam::bigint(Column::Id, 1),
            QueryParam::text(Column::TypeName, "CounterLCD"),
        ];

        let condition = prepare_condition(&params).unwrap();
        assert_eq!(
            condition,
            "WHERE \"id\" = $1::bigint AND \"typeName\" = $2::text"
        );
        assert!(!condition.trim_end().ends_with("AND"));
    }

    #[test]
    fn test_prepare_condition_empty_yields_nothing() {
        assert!(prepare_condition(&[]).is_none());
    }

    #[test]
    fn test_get_parameters_preserves_order() {
        let params = vec![
            QueryParam::text(Column::TypeName, "CounterLCD"),
            QueryParam::bigint(Column::QueueBranchId, 115),
        ];
        assert_eq!(get_parameters(&params).len(), 2);
    }

    #[test]
    fn test_select_json_wraps_in_json_agg() {
        let sql = select_json::<ComponentType>("\"id\"", Some("WHERE \"id\" = $1::bigint"));
        assert_eq!(
            sql,
            "SELECT json_agg(t)::text FROM (SELECT \"id\" FROM \"cst_ComponentType\" WHERE \"id\" = $1::bigint) t"
        );

        let sql = select_column_json::<Component>(Column::Configuration, None);
        assert_eq!(
            sql,
            "SELECT json_agg(t)::text FROM (SELECT \"configuration\" FROM \"cst_Component\") t"
        );
    }

    #[test]
    fn test_procedure_call_uses_named_arguments() {
        let params = vec![
            QueryParam::bigint(Column::Id, 3),
            QueryParam::text(Column::Configuration, "{}"),
        ];

        assert_eq!(
            prepare_procedure_call("P_UpdateComponentConfiguration", &params),
            "SELECT \"P_UpdateComponentConfiguration\"(\"ID\" => $1::bigint, \"Configuration\" => $2::text)"
        );
    }
}
