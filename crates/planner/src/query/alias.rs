use crate::query::ast::common::JoinKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One hop from a table to a related one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JoinStep {
    pub table: String,
    pub from_column: String,
    pub to_column: String,
    #[serde(default)]
    pub kind: JoinKind,
}

impl JoinStep {
    pub fn new(table: &str, from_column: &str, to_column: &str) -> Self {
        JoinStep {
            table: table.to_string(),
            from_column: from_column.to_string(),
            to_column: to_column.to_string(),
            kind: JoinKind::Left,
        }
    }
}

/// Sequence of joins leading from the root table. The empty path is the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct JoinPath(Vec<JoinStep>);

impl JoinPath {
    pub fn root() -> Self {
        JoinPath(Vec::new())
    }

    pub fn new(steps: Vec<JoinStep>) -> Self {
        JoinPath(steps)
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn steps(&self) -> &[JoinStep] {
        &self.0
    }

    /// Every non-empty prefix of the path, shortest first.
    pub fn prefixes(&self) -> impl Iterator<Item = JoinPath> + '_ {
        (1..=self.0.len()).map(|n| JoinPath(self.0[..n].to_vec()))
    }
}

/// Hands out table aliases for one compile call.
///
/// The root table is always `<prefix>0`. Every other join path gets the next
/// free number on first use and keeps it for the lifetime of the manager.
#[derive(Debug, Clone)]
pub struct TableAliasManager {
    prefix: String,
    root: String,
    aliases: HashMap<JoinPath, String>,
    next: usize,
}

impl TableAliasManager {
    pub fn new() -> Self {
        Self::with_prefix("t")
    }

    pub fn with_prefix(prefix: &str) -> Self {
        TableAliasManager {
            prefix: prefix.to_string(),
            root: format!("{prefix}0"),
            aliases: HashMap::new(),
            next: 1,
        }
    }

    pub fn root_alias(&self) -> &str {
        &self.root
    }

    pub fn alias_for(&mut self, path: &JoinPath) -> String {
        if path.is_root() {
            return self.root.clone();
        }
        if let Some(alias) = self.aliases.get(path) {
            return alias.clone();
        }

        let alias = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        self.aliases.insert(path.clone(), alias.clone());
        alias
    }

    /// Number of join aliases handed out so far.
    pub fn allocated(&self) -> usize {
        self.aliases.len()
    }
}

impl Default for TableAliasManager {
    fn default() -> Self {
        Self::new()
    }
}
