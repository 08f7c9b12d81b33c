use crate::ast::value_ref::ValueReference;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortProperty {
    pub property: ValueReference,
    pub ascending: bool,
}

impl SortProperty {
    pub fn asc(property: impl Into<ValueReference>) -> Self {
        SortProperty {
            property: property.into(),
            ascending: true,
        }
    }

    pub fn desc(property: impl Into<ValueReference>) -> Self {
        SortProperty {
            property: property.into(),
            ascending: false,
        }
    }
}

impl fmt::Display for SortProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dir = if self.ascending { "ASC" } else { "DESC" };
        write!(f, "{} {dir}", self.property)
    }
}
