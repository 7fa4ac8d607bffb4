//! Ordered, named value container produced by decoders and consumed by encoders.

use serde::{Deserialize, Serialize};

use crate::core::strings::name_hash;
use crate::types::value::Value;

/// Name of the leading timestamp column.
pub const TIME: &str = "TIME";
/// Name of the optional nanosecond-offset column.
pub const OFFSET: &str = "OFFSET";
pub const CHANNEL: &str = "CHANNEL";
pub const ERROR: &str = "ERROR";
pub const DIRECTION: &str = "DIRECTION";
pub const ID: &str = "ID";
pub const CONTENT: &str = "CONTENT";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "FieldRepr")]
struct Field {
    name: String,
    #[serde(skip)]
    hash: u64,
    value: Value,
}

/// Serialized shape of a [`Field`]; the hash is recomputed on the way in.
#[derive(Deserialize)]
struct FieldRepr {
    name: String,
    value: Value,
}

impl From<FieldRepr> for Field {
    fn from(repr: FieldRepr) -> Self {
        Field {
            hash: name_hash(&repr.name),
            name: repr.name,
            value: repr.value,
        }
    }
}

/// A decoded frame: columns in declaration order.
///
/// Cloning is the "copy" operation; [`Record::null_copy`] keeps the column
/// layout and resets every value, which is how message templates are stamped.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    fields: Vec<Field>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Record {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Sets `name` to `value`, appending the column if it does not exist yet.
    pub fn add(&mut self, name: &str, value: Value) -> &mut Self {
        self.add_hashed(name, name_hash(name), value)
    }

    /// Same as [`Record::add`] with a precomputed [`name_hash`].
    pub fn add_hashed(&mut self, name: &str, hash: u64, value: Value) -> &mut Self {
        match self.position_hashed(name, hash) {
            Some(idx) => self.fields[idx].value = value,
            None => self.fields.push(Field {
                name: name.to_string(),
                hash,
                value,
            }),
        }
        self
    }

    /// Overwrites the value at `index`; returns `false` if out of range.
    pub fn set_at(&mut self, index: usize, value: Value) -> bool {
        match self.fields.get_mut(index) {
            Some(field) => {
                field.value = value;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.get_hashed(name, name_hash(name))
    }

    pub fn get_hashed(&self, name: &str, hash: u64) -> Option<&Value> {
        self.position_hashed(name, hash)
            .map(|idx| &self.fields[idx].value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn name_at(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(|f| f.name.as_str())
    }

    pub fn value_at(&self, index: usize) -> Option<&Value> {
        self.fields.get(index).map(|f| &f.value)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.fields.iter().map(|f| (f.name.as_str(), &f.value))
    }

    /// Same columns, every value reset to [`Value::Null`].
    pub fn null_copy(&self) -> Record {
        Record {
            fields: self
                .fields
                .iter()
                .map(|f| Field {
                    name: f.name.clone(),
                    hash: f.hash,
                    value: Value::Null,
                })
                .collect(),
        }
    }

    /// Column index of `name`.
    pub(crate) fn position_hashed(&self, name: &str, hash: u64) -> Option<usize> {
        self.fields
            .iter()
            .position(|f| f.hash == hash && f.name == name)
    }
}

impl<'a> FromIterator<(&'a str, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (&'a str, Value)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (name, value) in iter {
            record.add(name, value);
        }
        record
    }
}
