use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Time span used by `During`; both bounds are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub begin: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Period {
    pub fn new(begin: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Period { begin, end }
    }

    pub fn is_valid(&self) -> bool {
        self.begin <= self.end
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.begin.to_rfc3339(), self.end.to_rfc3339())
    }
}
