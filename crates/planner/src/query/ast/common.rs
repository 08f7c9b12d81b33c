//! Small AST nodes shared by the where / order-by / join fragments.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinKind {
    Inner,
    #[default]
    Left,
}

impl JoinKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT OUTER JOIN",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderDir {
    Asc,
    Desc,
}

impl OrderDir {
    pub fn keyword(&self) -> &'static str {
        match self {
            OrderDir::Asc => "ASC",
            OrderDir::Desc => "DESC",
        }
    }
}

impl From<bool> for OrderDir {
    fn from(ascending: bool) -> Self {
        if ascending { OrderDir::Asc } else { OrderDir::Desc }
    }
}
