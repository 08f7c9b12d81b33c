use crate::{
    error::SettingsError,
    query::dialect::{SqlDialect, dialect_from_kind},
};
use model::core::data_type::DialectKind;
use serde::{Deserialize, Serialize};

/// What to do with a sort list that cannot be fully mapped to columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortPolicy {
    /// Fail the compile.
    #[default]
    Strict,
    /// Emit no ORDER BY and hand the whole sort list back to the caller.
    InMemory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerSettings {
    pub dialect: DialectKind,
    pub allow_partial_mappings: bool,
    pub sort_policy: SortPolicy,
    pub alias_prefix: String,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        CompilerSettings {
            dialect: DialectKind::Postgres,
            allow_partial_mappings: true,
            sort_policy: SortPolicy::Strict,
            alias_prefix: "t".to_string(),
        }
    }
}

impl CompilerSettings {
    pub fn from_json(source: &str) -> Result<Self, SettingsError> {
        let settings: CompilerSettings = serde_json::from_str(source)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        let mut chars = self.alias_prefix.chars();
        let valid = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

        if valid {
            Ok(())
        } else {
            Err(SettingsError::InvalidAliasPrefix(self.alias_prefix.clone()))
        }
    }

    pub fn dialect(&self) -> Box<dyn SqlDialect> {
        dialect_from_kind(self.dialect)
    }
}
