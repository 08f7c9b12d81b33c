//! Resolution of property references to columns.

use crate::query::{
    alias::TableAliasManager,
    ast::{expr::SqlColumn, join::Join},
};
use filter_syntax::ValueReference;
use model::core::data_type::DataType;

pub mod schema;

/// Where a property lives in the database for one compile call.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyNameMapping {
    pub table_alias: Option<String>,
    pub column: String,
    pub data_type: Option<DataType>,
    pub spatial: bool,
    pub srid: Option<i32>,
    /// Joins leading from the root table to `table_alias`, outermost first.
    pub joins: Vec<Join>,
}

impl PropertyNameMapping {
    pub fn new(table_alias: Option<&str>, column: &str) -> Self {
        PropertyNameMapping {
            table_alias: table_alias.map(str::to_string),
            column: column.to_string(),
            data_type: None,
            spatial: false,
            srid: None,
            joins: Vec::new(),
        }
    }

    pub fn with_type(mut self, data_type: DataType) -> Self {
        self.spatial = data_type.is_spatial();
        self.data_type = Some(data_type);
        self
    }

    pub fn with_srid(mut self, srid: i32) -> Self {
        self.srid = Some(srid);
        self
    }

    pub fn to_column(&self) -> SqlColumn {
        SqlColumn {
            qualifier: self.table_alias.clone(),
            name: self.column.clone(),
            data_type: self.data_type.clone(),
            spatial: self.spatial,
            srid: self.srid,
        }
    }
}

/// Maps property references onto columns of a particular schema.
///
/// Implementations must be pure with respect to the schema; the only side
/// effect allowed is allocating aliases for the joins a property needs.
/// Returning `None` marks the property as not expressible in SQL.
pub trait PropertyNameMapper: Send + Sync {
    fn mapping(
        &self,
        property: &ValueReference,
        aliases: &mut TableAliasManager,
    ) -> Option<PropertyNameMapping>;

    /// Mapping of a property used as the geometry operand of a spatial
    /// operator.
    fn spatial_mapping(
        &self,
        property: &ValueReference,
        aliases: &mut TableAliasManager,
    ) -> Option<PropertyNameMapping> {
        self.mapping(property, aliases).filter(|m| m.spatial)
    }
}
