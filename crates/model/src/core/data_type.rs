use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::{borrow::Cow, collections::HashMap, fmt};

/// Column types a mapped property can carry.
///
/// The set is intentionally coarse: the compiler only needs to know enough
/// about a column to coerce literals, pick a cast target and decide whether a
/// `LIKE` needs a text conversion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DataType {
    Short,
    Int,
    Long,
    Float,
    Double,
    Decimal,
    Boolean,
    Char,
    VarChar,
    String,
    Date,
    Time,
    Timestamp,
    Geometry,
    Bytea,
    Json,
    Null,
    Custom(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectKind {
    #[serde(alias = "postgis", alias = "postgresql")]
    Postgres,
    MySql,
}

lazy_static! {
    static ref MYSQL_TYPE_MAP: HashMap<&'static str, DataType> = build_mysql_type_map();
    static ref POSTGRES_TYPE_MAP: HashMap<&'static str, DataType> = build_postgres_type_map();
}

impl DataType {
    pub fn postgres_name(&self) -> Cow<'_, str> {
        match self {
            DataType::Short => Cow::Borrowed("SMALLINT"),
            DataType::Int => Cow::Borrowed("INTEGER"),
            DataType::Long => Cow::Borrowed("BIGINT"),
            DataType::Float => Cow::Borrowed("REAL"),
            DataType::Double => Cow::Borrowed("DOUBLE PRECISION"),
            DataType::Decimal => Cow::Borrowed("NUMERIC"),
            DataType::Boolean => Cow::Borrowed("BOOLEAN"),
            DataType::Char => Cow::Borrowed("CHAR"),
            DataType::VarChar => Cow::Borrowed("VARCHAR"),
            DataType::String => Cow::Borrowed("TEXT"),
            DataType::Date => Cow::Borrowed("DATE"),
            DataType::Time => Cow::Borrowed("TIME"),
            DataType::Timestamp => Cow::Borrowed("TIMESTAMP"),
            DataType::Geometry => Cow::Borrowed("GEOMETRY"),
            DataType::Bytea => Cow::Borrowed("BYTEA"),
            DataType::Json => Cow::Borrowed("JSONB"),
            DataType::Null => Cow::Borrowed("NULL"),
            DataType::Custom(name) => Cow::Borrowed(name),
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, DataType::Short | DataType::Int | DataType::Long)
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer() || matches!(self, DataType::Float | DataType::Double | DataType::Decimal)
    }

    pub fn is_textual(&self) -> bool {
        matches!(self, DataType::Char | DataType::VarChar | DataType::String)
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, DataType::Date | DataType::Time | DataType::Timestamp)
    }

    pub fn is_spatial(&self) -> bool {
        matches!(self, DataType::Geometry)
    }

    /// Whether values of the two types can be compared without an explicit cast.
    pub fn is_compatible(&self, other: &DataType) -> bool {
        match (self, other) {
            (a, b) if a.is_numeric() && b.is_numeric() => true,
            (a, b) if a.is_textual() && b.is_textual() => true,
            (DataType::Date, DataType::Timestamp) | (DataType::Timestamp, DataType::Date) => true,
            (DataType::Null, _) | (_, DataType::Null) => true,
            _ => self == other,
        }
    }

    fn from_known_type(type_name: &str) -> Option<Self> {
        let normalized = Self::normalize_type_name(type_name);
        POSTGRES_TYPE_MAP
            .get(normalized.as_str())
            .or_else(|| MYSQL_TYPE_MAP.get(normalized.as_str()))
            .cloned()
    }

    /// Uppercases and drops a length / precision suffix, so that
    /// `varchar(255)` and `numeric(10, 2)` resolve like their bare names.
    fn normalize_type_name(type_name: &str) -> String {
        let trimmed = type_name.trim();
        let base = match trimmed.find('(') {
            Some(idx) => &trimmed[..idx],
            None => trimmed,
        };
        base.trim().to_uppercase()
    }
}

impl TryFrom<&str> for DataType {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        DataType::from_known_type(s).ok_or_else(|| format!("Unknown column type: {s}"))
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.postgres_name())
    }
}

fn build_mysql_type_map() -> HashMap<&'static str, DataType> {
    use DataType::*;

    let entries = [
        ("BOOLEAN", Boolean),
        ("BOOL", Boolean),
        ("TINYINT", Short),
        ("SMALLINT", Short),
        ("MEDIUMINT", Int),
        ("INT", Int),
        ("INTEGER", Int),
        ("BIGINT", Long),
        ("FLOAT", Float),
        ("DOUBLE", Double),
        ("DECIMAL", Decimal),
        ("NUMERIC", Decimal),
        ("DATETIME", Timestamp),
        ("TIMESTAMP", Timestamp),
        ("DATE", Date),
        ("TIME", Time),
        ("JSON", Json),
        ("CHAR", Char),
        ("VARCHAR", VarChar),
        ("TEXT", String),
        ("MEDIUMTEXT", String),
        ("LONGTEXT", String),
        ("BLOB", Bytea),
        ("LONGBLOB", Bytea),
        ("GEOMETRY", Geometry),
        ("POINT", Geometry),
        ("LINESTRING", Geometry),
        ("POLYGON", Geometry),
        ("MULTIPOLYGON", Geometry),
    ];

    entries.into_iter().collect()
}

fn build_postgres_type_map() -> HashMap<&'static str, DataType> {
    use DataType::*;

    let entries = [
        ("BOOLEAN", Boolean),
        ("BOOL", Boolean),
        ("SMALLINT", Short),
        ("INT2", Short),
        ("INTEGER", Int),
        ("INT", Int),
        ("INT4", Int),
        ("INT8", Long),
        ("BIGINT", Long),
        ("FLOAT4", Float),
        ("REAL", Float),
        ("FLOAT8", Double),
        ("DOUBLE PRECISION", Double),
        ("NUMERIC", Decimal),
        ("DECIMAL", Decimal),
        ("JSONB", Json),
        ("JSON", Json),
        ("TEXT", String),
        ("NAME", String),
        ("CHARACTER VARYING", VarChar),
        ("VARCHAR", VarChar),
        ("CHARACTER", Char),
        ("CHAR", Char),
        ("BPCHAR", Char),
        ("BYTEA", Bytea),
        ("DATE", Date),
        ("TIME", Time),
        ("TIMESTAMP", Timestamp),
        ("TIMESTAMPTZ", Timestamp),
        ("TIMESTAMP WITH TIME ZONE", Timestamp),
        ("TIMESTAMP WITHOUT TIME ZONE", Timestamp),
        ("GEOMETRY", Geometry),
        ("GEOGRAPHY", Geometry),
    ];

    entries.into_iter().collect()
}
