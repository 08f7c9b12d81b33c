use crate::core::{data_type::DataType, geometry::Geometry};
use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt, str::FromStr};
use thiserror::Error;

/// A typed literal: the leaf values of filter expressions and the bound
/// parameters of compiled SQL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Value {
    Int(i64),
    Uint(u64),
    Float(f64),
    Decimal(BigDecimal),
    String(String),
    Boolean(bool),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
    Geometry(Geometry),
    Null,
}

#[derive(Debug, Clone, Error, PartialEq)]
#[error("cannot convert {value} to {target}")]
pub struct CoercionError {
    pub value: String,
    pub target: DataType,
}

impl Value {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Uint(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            Value::Decimal(v) => v.to_f64(),
            Value::String(v) => v.parse::<f64>().ok(),
            Value::Boolean(_)
            | Value::Date(_)
            | Value::Timestamp(_)
            | Value::Geometry(_)
            | Value::Null => None,
        }
    }

    pub fn as_string(&self) -> Option<String> {
        match self {
            Value::Int(v) => Some(v.to_string()),
            Value::Uint(v) => Some(v.to_string()),
            Value::Float(v) => Some(v.to_string()),
            Value::Decimal(v) => Some(v.to_string()),
            Value::String(v) => Some(v.clone()),
            Value::Boolean(v) => Some(v.to_string()),
            Value::Date(v) => Some(v.to_string()),
            Value::Timestamp(v) => Some(v.to_rfc3339()),
            Value::Geometry(v) => Some(v.to_wkt()),
            Value::Null => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Int(v) => Some(*v != 0),
            Value::Uint(v) => Some(*v != 0),
            Value::String(v) => match v.to_lowercase().as_str() {
                "true" | "1" => Some(true),
                "false" | "0" => Some(false),
                _ => None,
            },
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Value::Int(_) | Value::Uint(_) | Value::Float(_) | Value::Decimal(_)
        )
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, Value::Date(_) | Value::Timestamp(_))
    }

    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        use Value::*;
        match (self, other) {
            (Int(a), Int(b)) => Some(a.cmp(b)),
            (Uint(a), Uint(b)) => Some(a.cmp(b)),
            (Decimal(a), Decimal(b)) => Some(a.cmp(b)),
            (String(a), String(b)) => Some(a.cmp(b)),
            (Boolean(a), Boolean(b)) => Some(a.cmp(b)),
            (Date(a), Date(b)) => Some(a.cmp(b)),
            (Timestamp(a), Timestamp(b)) => Some(a.cmp(b)),
            (Date(a), Timestamp(b)) => Some(midnight(a).cmp(b)),
            (Timestamp(a), Date(b)) => Some(a.cmp(&midnight(b))),
            (a, b) if a.is_numeric() && b.is_numeric() => a.as_f64()?.partial_cmp(&b.as_f64()?),
            _ => None,
        }
    }

    pub fn equal(&self, other: &Value) -> bool {
        self.compare(other) == Some(Ordering::Equal)
    }

    /// The column type this literal binds as when nothing else is known.
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Int(_) | Value::Uint(_) => DataType::Long,
            Value::Float(_) => DataType::Double,
            Value::Decimal(_) => DataType::Decimal,
            Value::String(_) => DataType::String,
            Value::Boolean(_) => DataType::Boolean,
            Value::Date(_) => DataType::Date,
            Value::Timestamp(_) => DataType::Timestamp,
            Value::Geometry(_) => DataType::Geometry,
            Value::Null => DataType::Null,
        }
    }

    /// Converts the literal so it can be bound against a column of `target`.
    ///
    /// Conversions never lose information: numeric literals stay as they are
    /// against numeric columns (`age < 1.5` must not become `age < 1`), and
    /// types the model has no rule for are passed through unchanged.
    pub fn coerce_to(&self, target: &DataType) -> Result<Value, CoercionError> {
        if self.is_null() {
            return Ok(Value::Null);
        }

        let fail = || CoercionError {
            value: self.to_string(),
            target: target.clone(),
        };

        match target {
            t if t.is_numeric() => match self {
                v if v.is_numeric() => Ok(v.clone()),
                Value::String(s) => parse_numeric(s.trim(), t).ok_or_else(fail),
                Value::Boolean(b) if t.is_integer() => Ok(Value::Int(i64::from(*b))),
                _ => Err(fail()),
            },
            t if t.is_textual() => match self {
                Value::Geometry(_) => Err(fail()),
                v => v.as_string().map(Value::String).ok_or_else(fail),
            },
            DataType::Boolean => self.as_bool().map(Value::Boolean).ok_or_else(fail),
            DataType::Date => match self {
                Value::Date(_) => Ok(self.clone()),
                Value::String(s) => NaiveDate::from_str(s.trim())
                    .map(Value::Date)
                    .map_err(|_| fail()),
                _ => Err(fail()),
            },
            DataType::Timestamp => match self {
                Value::Timestamp(_) => Ok(self.clone()),
                Value::Date(d) => Ok(Value::Timestamp(midnight(d))),
                Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
                    .map(|ts| Value::Timestamp(ts.with_timezone(&Utc)))
                    .or_else(|_| NaiveDate::from_str(s.trim()).map(|d| Value::Timestamp(midnight(&d))))
                    .map_err(|_| fail()),
                _ => Err(fail()),
            },
            DataType::Geometry => match self {
                Value::Geometry(_) => Ok(self.clone()),
                _ => Err(fail()),
            },
            _ => Ok(self.clone()),
        }
    }
}

fn midnight(date: &NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn parse_numeric(s: &str, target: &DataType) -> Option<Value> {
    if target.is_integer() {
        s.parse::<i64>().ok().map(Value::Int)
    } else if matches!(target, DataType::Decimal) {
        BigDecimal::from_str(s).ok().map(Value::Decimal)
    } else {
        s.parse::<f64>().ok().map(Value::Float)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl From<Geometry> for Value {
    fn from(v: Geometry) -> Self {
        Value::Geometry(v)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Uint(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Decimal(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "'{}'", v.replace('\'', "''")),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Date(v) => write!(f, "'{v}'"),
            Value::Timestamp(v) => write!(f, "'{}'", v.to_rfc3339()),
            Value::Geometry(v) => write!(f, "{v}"),
            Value::Null => write!(f, "NULL"),
        }
    }
}
