use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};

/// Path to a queryable property, e.g. `app:name` or `app:owner/app:Person/app:age`.
///
/// Opaque to the compiler apart from equality; mappers decide how a path
/// resolves to a column.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueReference(Arc<str>);

impl ValueReference {
    pub fn new(path: impl Into<String>) -> Self {
        Self(Arc::from(path.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Non-empty `/` separated steps.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').map(str::trim).filter(|s| !s.is_empty())
    }

    /// The path with namespace prefixes removed from every step.
    pub fn local_path(&self) -> String {
        self.segments()
            .map(|s| s.rsplit_once(':').map_or(s, |(_, local)| local))
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl From<String> for ValueReference {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for ValueReference {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for ValueReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
