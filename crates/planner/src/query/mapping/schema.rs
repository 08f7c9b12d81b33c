//! A [`PropertyNameMapper`] driven by a declarative mapping document.
//!
//! ```json
//! {
//!   "table": "building",
//!   "properties": [
//!     { "path": "app:name", "column": "name", "data_type": "varchar(120)" },
//!     { "path": "app:geom", "column": "geom", "data_type": "geometry", "srid": 4326 },
//!     {
//!       "path": "app:owner/app:Person/app:name",
//!       "column": "name",
//!       "data_type": "text",
//!       "joins": [{ "table": "person", "from_column": "owner_id", "to_column": "id" }]
//!     }
//!   ]
//! }
//! ```

use crate::{
    error::SettingsError,
    query::{
        alias::{JoinPath, JoinStep, TableAliasManager},
        ast::join::Join,
        mapping::{PropertyNameMapper, PropertyNameMapping},
    },
};
use filter_syntax::ValueReference;
use model::core::data_type::DataType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureTypeMapping {
    pub table: String,
    #[serde(default)]
    pub properties: Vec<PropertyMapping>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyMapping {
    pub path: String,
    pub column: String,
    #[serde(default)]
    pub data_type: Option<String>,
    #[serde(default)]
    pub spatial: bool,
    #[serde(default)]
    pub srid: Option<i32>,
    #[serde(default)]
    pub joins: Vec<JoinStep>,
}

impl FeatureTypeMapping {
    pub fn from_json(source: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(source)?)
    }
}

#[derive(Debug, Clone)]
struct ResolvedProperty {
    column: String,
    data_type: Option<DataType>,
    spatial: bool,
    srid: Option<i32>,
    path: JoinPath,
}

#[derive(Debug, Clone)]
pub struct SchemaPropertyMapper {
    table: String,
    properties: HashMap<String, ResolvedProperty>,
    /// Local path to mapped path; `None` when several paths share it.
    local_paths: HashMap<String, Option<String>>,
}

impl SchemaPropertyMapper {
    pub fn new(mapping: FeatureTypeMapping) -> Result<Self, SettingsError> {
        let mut properties = HashMap::with_capacity(mapping.properties.len());
        let mut local_paths: HashMap<String, Option<String>> = HashMap::new();

        for prop in mapping.properties {
            if prop.column.trim().is_empty() {
                return Err(SettingsError::MissingColumn(prop.path));
            }

            let data_type = match &prop.data_type {
                Some(name) => Some(DataType::try_from(name.as_str()).map_err(|message| {
                    SettingsError::InvalidDataType {
                        property: prop.path.clone(),
                        message,
                    }
                })?),
                None => None,
            };
            let spatial = prop.spatial || data_type.as_ref().is_some_and(DataType::is_spatial);

            let resolved = ResolvedProperty {
                column: prop.column,
                data_type,
                spatial,
                srid: prop.srid,
                path: JoinPath::new(prop.joins),
            };
            if properties.insert(prop.path.clone(), resolved).is_some() {
                return Err(SettingsError::DuplicateProperty(prop.path));
            }
            local_paths
                .entry(ValueReference::new(prop.path.as_str()).local_path())
                .and_modify(|path| *path = None)
                .or_insert(Some(prop.path));
        }

        debug!(
            "Loaded mapping for table {} with {} properties",
            mapping.table,
            properties.len()
        );

        Ok(SchemaPropertyMapper {
            table: mapping.table,
            properties,
            local_paths,
        })
    }

    pub fn from_json(source: &str) -> Result<Self, SettingsError> {
        Self::new(FeatureTypeMapping::from_json(source)?)
    }

    /// The root table, aliased by [`TableAliasManager::root_alias`].
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Exact path first. A reference without any namespace prefix may also
    /// name a mapped path by its local form (`owner/name` for
    /// `app:owner/app:name`) as long as that is unambiguous. A prefixed
    /// reference never matches a path in another namespace.
    fn lookup(&self, property: &ValueReference) -> Option<&ResolvedProperty> {
        if let Some(resolved) = self.properties.get(property.as_str()) {
            return Some(resolved);
        }
        if property.as_str().contains(':') {
            return None;
        }
        let path = self.local_paths.get(&property.local_path())?.as_ref()?;
        self.properties.get(path)
    }
}

impl PropertyNameMapper for SchemaPropertyMapper {
    fn mapping(
        &self,
        property: &ValueReference,
        aliases: &mut TableAliasManager,
    ) -> Option<PropertyNameMapping> {
        let resolved = self.lookup(property)?;

        let mut joins = Vec::with_capacity(resolved.path.steps().len());
        let mut from_alias = aliases.root_alias().to_string();
        for prefix in resolved.path.prefixes() {
            let alias = aliases.alias_for(&prefix);
            if let Some(step) = prefix.steps().last() {
                joins.push(Join {
                    kind: step.kind,
                    table: step.table.clone(),
                    alias: alias.clone(),
                    from_alias,
                    from_column: step.from_column.clone(),
                    to_column: step.to_column.clone(),
                });
            }
            from_alias = alias;
        }

        Some(PropertyNameMapping {
            table_alias: Some(from_alias),
            column: resolved.column.clone(),
            data_type: resolved.data_type.clone(),
            spatial: resolved.spatial,
            srid: resolved.srid,
            joins,
        })
    }
}
