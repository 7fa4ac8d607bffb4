//! Typed cell values carried by a [`Record`](crate::types::record::Record).

use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};

/// One named value in a decoded record.
///
/// The integer variants are wider than the representation that produced them
/// so unsigned patterns stay exact: `Int` holds Integer32 outputs (up to an
/// unsigned 32-bit raw), `Long` holds Integer64 outputs and the raw value of
/// floating signals (up to an unsigned 64-bit raw).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Int(i64),
    Long(i128),
    Decimal(BigDecimal),
    Double(f64),
    Instant(DateTime<Utc>),
    Text(String),
    Binary(Vec<u8>),
}

impl Value {
    /// `true` for `Null`, empty text and empty binary: the values an encoder skips.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s.is_empty(),
            Value::Binary(b) => b.is_empty(),
            _ => false,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Exact integer view; fractional numbers and non-numeric values give `None`.
    pub fn to_i128(&self) -> Option<i128> {
        match self {
            Value::Boolean(b) => Some(*b as i128),
            Value::Int(v) => Some(*v as i128),
            Value::Long(v) => Some(*v),
            Value::Decimal(d) if d.is_integer() => d.to_i128(),
            Value::Double(f) if f.is_finite() && f.fract() == 0.0 => f.to_i128(),
            Value::Text(s) => s.trim().parse::<i128>().ok(),
            _ => None,
        }
    }

    pub fn to_i64(&self) -> Option<i64> {
        self.to_i128().and_then(|v| i64::try_from(v).ok())
    }

    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Value::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Int(v) => Some(*v as f64),
            Value::Long(v) => Some(*v as f64),
            Value::Decimal(d) => d.to_f64(),
            Value::Double(f) => Some(*f),
            Value::Text(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Exact decimal view. Doubles go through their shortest round-trip
    /// rendering, so `0.1` becomes `0.1` and not its binary expansion.
    pub fn to_decimal(&self) -> Option<BigDecimal> {
        match self {
            Value::Boolean(b) => Some(BigDecimal::from(*b as i64)),
            Value::Int(v) => Some(BigDecimal::from(*v)),
            Value::Long(v) => Some(BigDecimal::new(BigInt::from(*v), 0)),
            Value::Decimal(d) => Some(d.clone()),
            Value::Double(f) if f.is_finite() => BigDecimal::from_str(&f.to_string()).ok(),
            Value::Text(s) => BigDecimal::from_str(s.trim()).ok(),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Long(v) => write!(f, "{v}"),
            Value::Decimal(d) => write!(f, "{d}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::Instant(t) => write!(f, "{}", t.to_rfc3339()),
            Value::Text(s) => write!(f, "{s}"),
            Value::Binary(b) => {
                let hex: Vec<String> = b.iter().map(|byte| format!("{byte:02X}")).collect();
                write!(f, "{}", hex.join(" "))
            }
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i128> for Value {
    fn from(v: i128) -> Self {
        Value::Long(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<BigDecimal> for Value {
    fn from(v: BigDecimal) -> Self {
        Value::Decimal(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}
