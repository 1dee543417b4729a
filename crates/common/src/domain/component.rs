use crate::domain::Column;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Static schema descriptor for a persisted entity.
///
/// The column list is declared per entity instead of being discovered from the
/// value at runtime, so the set of selected columns is fixed at compile time.
pub trait Entity {
    /// Type name; the table is named after it
    const TYPE_NAME: &'static str;

    /// Declared columns in select order
    const COLUMNS: &'static [Column];
}

/// Which of the two stored JSON schemas governs a validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Configuration,
    ReportedData,
}

/// Domain representation of a registered component.
///
/// `id = -1` and empty strings mark values that were not set before persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub id: i64,
    #[serde(rename = "orgID")]
    pub org_id: i64,
    #[serde(rename = "typeName")]
    pub type_name: String,
    #[serde(rename = "name_L1")]
    pub name_l1: String,
    #[serde(rename = "name_L2")]
    pub name_l2: String,
    #[serde(rename = "name_L3")]
    pub name_l3: String,
    #[serde(rename = "name_L4")]
    pub name_l4: String,
    #[serde(rename = "queueBranch_ID")]
    pub queue_branch_id: i64,
    #[serde(rename = "reportedData")]
    pub reported_data: String,
    pub configuration: String,
    /// Weak back-reference into another entity family; not a foreign key
    #[serde(rename = "relatedClassName")]
    pub related_class_name: String,
    #[serde(rename = "relatedObject_ID")]
    pub related_object_id: i64,
    pub identity: String,
    pub address: String,
    pub description: String,
    #[serde(rename = "CreationTime")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "LastUpdateTime")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for Component {
    fn default() -> Self {
        Self {
            id: -1,
            org_id: -1,
            type_name: String::new(),
            name_l1: String::new(),
            name_l2: String::new(),
            name_l3: String::new(),
            name_l4: String::new(),
            queue_branch_id: -1,
            reported_data: String::new(),
            configuration: String::new(),
            related_class_name: String::new(),
            related_object_id: -1,
            identity: String::new(),
            address: String::new(),
            description: String::new(),
            created_at: None,
            updated_at: None,
        }
    }
}

impl Entity for Component {
    const TYPE_NAME: &'static str = "Component";

    const COLUMNS: &'static [Column] = &[
        Column::Id,
        Column::OrgId,
        Column::TypeName,
        Column::NameL1,
        Column::NameL2,
        Column::NameL3,
        Column::NameL4,
        Column::QueueBranchId,
        Column::ReportedData,
        Column::Configuration,
        Column::RelatedClassName,
        Column::RelatedObjectId,
        Column::Identity,
        Column::Address,
        Column::Description,
        Column::CreationTime,
        Column::LastUpdateTime,
    ];
}

/// Schema registry entry for a component type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentType {
    pub id: i64,
    #[serde(rename = "typeName")]
    pub type_name: String,
    #[serde(rename = "captionKey", default)]
    pub caption_key: String,
    #[serde(rename = "configurationSchema", default)]
    pub configuration_schema: String,
    #[serde(rename = "reportedDataSchema", default)]
    pub reported_data_schema: String,
    #[serde(rename = "CreationTime", default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "LastUpdateTime", default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ComponentType {
    /// The stored schema document for the given property kind
    pub fn schema_for(&self, kind: PropertyKind) -> &str {
        match kind {
            PropertyKind::Configuration => &self.configuration_schema,
            PropertyKind::ReportedData => &self.reported_data_schema,
        }
    }
}

impl Entity for ComponentType {
    const TYPE_NAME: &'static str = "ComponentType";

    const COLUMNS: &'static [Column] = &[
        Column::Id,
        Column::TypeName,
        Column::CaptionKey,
        Column::ConfigurationSchema,
        Column::ReportedDataSchema,
        Column::CreationTime,
        Column::LastUpdateTime,
    ];
}
