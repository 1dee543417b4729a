use crate::domain::{DomainError, DomainResult};
use serde::{Deserialize, Deserializer, de::Error as _};
use serde_json::{Number, Value};

// 2^63; every f64 strictly below it fits in an i64
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// Integer value of a JSON number, accepting floats with no fractional part.
///
/// JSON Schema treats `1.0` as an integer, so everything that passes an
/// `"integer"` check must convert here too.
pub fn integral_number(number: &Number) -> Option<i64> {
    number.as_i64().or_else(|| {
        number
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= -I64_BOUND && *f < I64_BOUND)
            .map(|f| f as i64)
    })
}

/// `deserialize_with` helper for integer fields that may arrive as `1.0`
pub fn deserialize_integral<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let number = Number::deserialize(deserializer)?;
    integral_number(&number)
        .ok_or_else(|| D::Error::custom(format!("expected an integer, found {}", number)))
}

/// Optional variant of [`deserialize_integral`]; pair it with `#[serde(default)]`
pub fn deserialize_optional_integral<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Number>::deserialize(deserializer)? {
        Some(number) => integral_number(&number)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("expected an integer, found {}", number))),
        None => Ok(None),
    }
}

/// Database type bound to a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    BigInt,
    Text,
    Timestamp,
}

impl SqlType {
    /// PostgreSQL cast applied to a placeholder of this type
    pub fn cast(self) -> &'static str {
        match self {
            SqlType::BigInt => "bigint",
            SqlType::Text => "text",
            SqlType::Timestamp => "timestamptz",
        }
    }
}

/// Closed set of column identifiers known to the data-access layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Id,
    Ids,
    OrgId,
    TypeName,
    NameL1,
    NameL2,
    NameL3,
    NameL4,
    QueueBranchId,
    ReportedData,
    Configuration,
    RelatedClassName,
    RelatedObjectId,
    Identity,
    Address,
    Description,
    CaptionKey,
    ConfigurationSchema,
    ReportedDataSchema,
    CreationTime,
    LastUpdateTime,
}

impl Column {
    /// Parameter name used for stored procedure arguments
    pub fn key(self) -> &'static str {
        match self {
            Column::Id => "ID",
            Column::Ids => "IDs",
            Column::OrgId => "OrgID",
            Column::TypeName => "TypeName",
            Column::NameL1 => "Name_L1",
            Column::NameL2 => "Name_L2",
            Column::NameL3 => "Name_L3",
            Column::NameL4 => "Name_L4",
            Column::QueueBranchId => "QueueBranch_ID",
            Column::ReportedData => "ReportedData",
            Column::Configuration => "Configuration",
            Column::RelatedClassName => "RelatedClassName",
            Column::RelatedObjectId => "RelatedObject_ID",
            Column::Identity => "Identity",
            Column::Address => "Address",
            Column::Description => "Description",
            Column::CaptionKey => "CaptionKey",
            Column::ConfigurationSchema => "ConfigurationSchema",
            Column::ReportedDataSchema => "ReportedDataSchema",
            Column::CreationTime => "CreationTime",
            Column::LastUpdateTime => "LastUpdateTime",
        }
    }

    /// Column name in the entity tables; also the field name in serialized rows
    pub fn field(self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::Ids => "ids",
            Column::OrgId => "orgID",
            Column::TypeName => "typeName",
            Column::NameL1 => "name_L1",
            Column::NameL2 => "name_L2",
            Column::NameL3 => "name_L3",
            Column::NameL4 => "name_L4",
            Column::QueueBranchId => "queueBranch_ID",
            Column::ReportedData => "reportedData",
            Column::Configuration => "configuration",
            Column::RelatedClassName => "relatedClassName",
            Column::RelatedObjectId => "relatedObject_ID",
            Column::Identity => "identity",
            Column::Address => "address",
            Column::Description => "description",
            Column::CaptionKey => "captionKey",
            Column::ConfigurationSchema => "configurationSchema",
            Column::ReportedDataSchema => "reportedDataSchema",
            Column::CreationTime => "CreationTime",
            Column::LastUpdateTime => "LastUpdateTime",
        }
    }

    /// Fixed column-to-type table
    pub fn sql_type(self) -> SqlType {
        match self {
            Column::Id | Column::OrgId | Column::QueueBranchId | Column::RelatedObjectId => {
                SqlType::BigInt
            }
            Column::CreationTime | Column::LastUpdateTime => SqlType::Timestamp,
            Column::Ids
            | Column::TypeName
            | Column::NameL1
            | Column::NameL2
            | Column::NameL3
            | Column::NameL4
            | Column::ReportedData
            | Column::Configuration
            | Column::RelatedClassName
            | Column::Identity
            | Column::Address
            | Column::Description
            | Column::CaptionKey
            | Column::ConfigurationSchema
            | Column::ReportedDataSchema => SqlType::Text,
        }
    }
}

/// Typed value bound to a query parameter; `None` binds SQL NULL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    BigInt(Option<i64>),
    Text(Option<String>),
}

/// A single named, typed query parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParam {
    pub column: Column,
    pub value: ParamValue,
}

pub type QueryParams = Vec<QueryParam>;

impl QueryParam {
    pub fn bigint(column: Column, value: i64) -> Self {
        Self {
            column,
            value: ParamValue::BigInt(Some(value)),
        }
    }

    pub fn text(column: Column, value: impl Into<String>) -> Self {
        Self {
            column,
            value: ParamValue::Text(Some(value.into())),
        }
    }

    /// Coerce a JSON value into the type the column requires.
    ///
    /// Integer columns accept JSON integers (including integral floats such as `5.0`)
    /// and numeric strings. Text columns take
    /// strings verbatim and any other non-null JSON as its serialized text.
    pub fn from_json(column: Column, value: &Value) -> DomainResult<Self> {
        let invalid = |reason: &str| {
            DomainError::InvalidParameter(column.key().to_string(), reason.to_string())
        };

        let value = match column.sql_type() {
            SqlType::BigInt => ParamValue::BigInt(match value {
                Value::Null => None,
                Value::Number(n) => Some(integral_number(n).ok_or_else(|| invalid("not an integer"))?),
                Value::String(s) => Some(
                    s.trim()
                        .parse::<i64>()
                        .map_err(|_| invalid("not an integer"))?,
                ),
                _ => return Err(invalid("not an integer")),
            }),
            SqlType::Text => ParamValue::Text(match value {
                Value::Null => None,
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(match integral_number(n) {
                    Some(i) => i.to_string(),
                    None => n.to_string(),
                }),
                other => Some(other.to_string()),
            }),
            SqlType::Timestamp => return Err(invalid("timestamp columns are not bindable")),
        };

        Ok(Self { column, value })
    }
}
