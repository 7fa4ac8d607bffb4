//! Column layout of decoded records.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::representation::RepresentationKind;
use crate::types::message::Message;
use crate::types::record::{self, Record};
use crate::types::value::Value;

/// Type of one output column. `whole` marks values with no fractional part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnKind {
    Instant,
    Boolean,
    Int,
    Long,
    Double { whole: bool },
    Decimal { whole: bool },
    Text,
    Binary,
}

impl ColumnKind {
    /// Column kind produced by decoding a signal of the given representation.
    pub fn of(kind: RepresentationKind) -> Self {
        match kind {
            RepresentationKind::Integer32 => ColumnKind::Int,
            RepresentationKind::Integer64 => ColumnKind::Long,
            RepresentationKind::Decimal => ColumnKind::Decimal { whole: true },
            RepresentationKind::Double => ColumnKind::Double { whole: false },
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: &str = match self {
            ColumnKind::Instant => "instant",
            ColumnKind::Boolean => "boolean",
            ColumnKind::Int => "int",
            ColumnKind::Long => "long",
            ColumnKind::Double { whole: true } => "double(0)",
            ColumnKind::Double { whole: false } => "double",
            ColumnKind::Decimal { whole: true } => "decimal(0)",
            ColumnKind::Decimal { whole: false } => "decimal",
            ColumnKind::Text => "string",
            ColumnKind::Binary => "binary",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

impl Column {
    pub fn new(name: &str, kind: ColumnKind) -> Self {
        Column {
            name: name.to_string(),
            kind,
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.kind)
    }
}

/// `TIME`, optional `OFFSET`, then every signal of `messages` in order.
/// A name declared by several messages keeps its first column.
pub(crate) fn signal_columns<'a, I>(output_offset: bool, messages: I) -> Vec<Column>
where
    I: IntoIterator<Item = &'a Message>,
{
    let mut columns: IndexMap<String, ColumnKind> = IndexMap::new();
    columns.insert(record::TIME.to_string(), ColumnKind::Instant);
    if output_offset {
        columns.insert(record::OFFSET.to_string(), ColumnKind::Long);
    }
    for message in messages {
        for signal in message.signals() {
            columns
                .entry(signal.name().to_string())
                .or_insert_with(|| ColumnKind::of(signal.kind()));
        }
    }
    columns
        .into_iter()
        .map(|(name, kind)| Column { name, kind })
        .collect()
}

/// `"TIME instant,OFFSET long,Speed int,..."`
pub(crate) fn render(columns: &[Column]) -> String {
    columns
        .iter()
        .map(Column::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

pub(crate) fn null_record(columns: &[Column]) -> Record {
    columns
        .iter()
        .map(|c| (c.name.as_str(), Value::Null))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::signal::{Signal, SignalDef};
    use bigdecimal::BigDecimal;
    use std::str::FromStr;

    fn message(id: u32, signals: &[(&str, u16, &str)]) -> Message {
        let mut m = Message::new(1, id, "M", 8);
        for (name, len, factor) in signals {
            m.add_signal(Signal::new(SignalDef {
                name: name.to_string(),
                bit_length: *len,
                factor: BigDecimal::from_str(factor).unwrap(),
                ..Default::default()
            }));
        }
        m
    }

    #[test]
    fn columns_follow_representation() {
        let a = message(1, &[("Small", 8, "1"), ("Big", 40, "1"), ("Scaled", 8, "0.5")]);
        let b = message(2, &[("Huge", 100, "1"), ("Small", 16, "0.1")]);
        let cols = signal_columns(true, [&a, &b]);
        assert_eq!(
            render(&cols),
            "TIME instant,OFFSET long,Small int,Big long,Scaled double,Huge decimal(0)"
        );
        let blank = null_record(&cols);
        assert_eq!(blank.len(), 6);
        assert!(blank.iter().all(|(_, v)| v.is_null()));
    }
}
