use bigdecimal::BigDecimal;
use num_bigint::{BigInt, BigUint};
use num_traits::{ToPrimitive, Zero};
use serde::{Deserialize, Serialize};

use crate::core::bits::{self, Step};
use crate::core::representation::{
    RawInt, Representation, RepresentationKind, is_whole_literal,
};
use crate::core::strings::name_hash;
use crate::types::value::Value;

/// Bit numbering convention of a signal (`@0` / `@1` in DBC).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ByteOrder {
    /// `@0`: big-endian, start bit is the MSB.
    #[default]
    Motorola,
    /// `@1`: little-endian, start bit is the LSB.
    Intel,
}

impl ByteOrder {
    pub fn from_dbc(c: char) -> Option<Self> {
        match c {
            '0' => Some(ByteOrder::Motorola),
            '1' => Some(ByteOrder::Intel),
            _ => None,
        }
    }
}

/// Declared attributes of a signal, as read from an `SG_` line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalDef {
    pub name: String,
    pub start_bit: u16,
    pub bit_length: u16,
    pub byte_order: ByteOrder,
    pub signed: bool,
    pub factor: BigDecimal,
    pub offset: BigDecimal,
    pub min: BigDecimal,
    pub max: BigDecimal,
    pub unit: Option<String>,
}

impl Default for SignalDef {
    fn default() -> Self {
        SignalDef {
            name: String::new(),
            start_bit: 0,
            bit_length: 1,
            byte_order: ByteOrder::Motorola,
            signed: false,
            factor: BigDecimal::from(1),
            offset: BigDecimal::zero(),
            min: BigDecimal::zero(),
            max: BigDecimal::zero(),
            unit: None,
        }
    }
}

impl SignalDef {
    /// `true` when factor, offset, min and max carry no fractional digits.
    pub fn is_whole(&self) -> bool {
        [&self.factor, &self.offset, &self.min, &self.max]
            .into_iter()
            .all(is_whole_literal)
    }
}

/// Raw bit pattern of a signal.
///
/// Patterns up to 64 bits are sign-extended (when signed) to the native
/// width of the representation; wider patterns are returned as read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawBits {
    U32(u32),
    U64(u64),
    Wide(BigUint),
}

/// A compiled signal: placement, scaling and representation, ready to move
/// values in and out of a payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    def: SignalDef,
    name_hash: u64,
    aligned_bit_length: u16,
    representation: Representation,
    steps: Vec<Step>,
    zero_value: Value,
    one_value: Value,
}

impl Signal {
    pub fn new(def: SignalDef) -> Self {
        let kind: RepresentationKind =
            RepresentationKind::select(def.bit_length, def.signed, def.is_whole());
        let representation: Representation = Representation::new(kind, &def.factor, &def.offset);
        let steps: Vec<Step> = bits::compile(def.start_bit, def.bit_length, def.byte_order);
        let zero_value: Value = representation.decode(&RawInt::Small(0));
        let one_value: Value = representation.decode(&RawInt::Small(1));
        let len: u16 = def.bit_length;
        Signal {
            name_hash: name_hash(&def.name),
            aligned_bit_length: if len > 8 && len % 8 != 0 { (len / 8 + 1) * 8 } else { len },
            representation,
            steps,
            zero_value,
            one_value,
            def,
        }
    }

    pub fn name(&self) -> &str {
        &self.def.name
    }

    pub fn name_hash(&self) -> u64 {
        self.name_hash
    }

    /// Renames the signal, e.g. to qualify it with its message name.
    pub fn set_name(&mut self, name: &str) {
        self.def.name = name.to_string();
        self.name_hash = name_hash(name);
    }

    pub fn unit(&self) -> Option<&str> {
        self.def.unit.as_deref()
    }

    pub fn start_bit(&self) -> u16 {
        self.def.start_bit
    }

    pub fn bit_length(&self) -> u16 {
        self.def.bit_length
    }

    /// Bit length padded to whole bytes when longer than one byte and unaligned.
    pub fn aligned_bit_length(&self) -> u16 {
        self.aligned_bit_length
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.def.byte_order
    }

    pub fn is_signed(&self) -> bool {
        self.def.signed
    }

    pub fn factor(&self) -> &BigDecimal {
        &self.def.factor
    }

    pub fn offset(&self) -> &BigDecimal {
        &self.def.offset
    }

    pub fn min(&self) -> &BigDecimal {
        &self.def.min
    }

    pub fn max(&self) -> &BigDecimal {
        &self.def.max
    }

    pub fn definition(&self) -> &SignalDef {
        &self.def
    }

    pub fn kind(&self) -> RepresentationKind {
        self.representation.kind()
    }

    /// `true` unless the representation is `Double`.
    pub fn is_whole(&self) -> bool {
        self.kind().is_whole()
    }

    /// Index of the last payload byte the signal needs.
    pub fn last_byte(&self) -> Option<usize> {
        bits::last_byte(&self.steps)
    }

    /// Reads the bit pattern; `None` if `bytes` is too short.
    pub fn extract(&self, bytes: &[u8]) -> Option<RawBits> {
        let len: u16 = self.def.bit_length;
        if len > 64 {
            return bits::extract_wide(&self.steps, bytes).map(RawBits::Wide);
        }
        let raw: u64 = bits::extract_u64(&self.steps, bytes)?;
        let pattern: u64 = if self.def.signed {
            bits::sign_extend_u64(raw, len) as u64
        } else {
            raw
        };
        Some(match self.kind().native_bits() {
            32 => RawBits::U32(pattern as u32),
            _ => RawBits::U64(pattern),
        })
    }

    fn read_raw(&self, bytes: &[u8]) -> Option<RawInt> {
        let len: u16 = self.def.bit_length;
        if len > 64 {
            let raw: BigUint = bits::extract_wide(&self.steps, bytes)?;
            return Some(RawInt::Wide(if self.def.signed {
                bits::sign_extend_wide(raw, len)
            } else {
                BigInt::from(raw)
            }));
        }
        let raw: u64 = bits::extract_u64(&self.steps, bytes)?;
        Some(RawInt::Small(if self.def.signed {
            bits::sign_extend_u64(raw, len) as i128
        } else {
            raw as i128
        }))
    }

    /// Raw integer value, no scaling. `Null` if `bytes` is too short.
    pub fn interpret(&self, bytes: &[u8]) -> Value {
        match self.read_raw(bytes) {
            Some(raw) => self.representation.interpret(raw),
            None => Value::Null,
        }
    }

    /// Scaled value `raw * factor + offset`. `Null` if `bytes` is too short.
    ///
    /// A 1-bit signal returns `offset` or `factor + offset` for a clear or set
    /// bit, whatever its signedness.
    pub fn decode(&self, bytes: &[u8]) -> Value {
        if self.def.bit_length == 1 {
            return match bits::extract_u64(&self.steps, bytes) {
                Some(0) => self.zero_value.clone(),
                Some(_) => self.one_value.clone(),
                None => Value::Null,
            };
        }
        match self.read_raw(bytes) {
            Some(raw) => self.representation.decode(&raw),
            None => Value::Null,
        }
    }

    /// ORs the encoding of `value` into `bytes`. Empty or unconvertible values
    /// leave the buffer untouched.
    pub fn encode(&self, value: &Value, bytes: &mut [u8]) {
        if value.is_empty() {
            return;
        }
        if let Some(raw) = self.representation.unscale(value) {
            self.write_raw(&raw, bytes);
        }
    }

    /// ORs a raw, unscaled integer into `bytes`, truncated to the bit length.
    pub fn encode_raw(&self, raw: i128, bytes: &mut [u8]) {
        self.write_raw(&RawInt::Small(raw), bytes);
    }

    /// Wide counterpart of [`Signal::encode_raw`].
    pub fn encode_raw_wide(&self, raw: &BigInt, bytes: &mut [u8]) {
        self.write_raw(&RawInt::Wide(raw.clone()), bytes);
    }

    fn write_raw(&self, raw: &RawInt, bytes: &mut [u8]) {
        let len: u16 = self.def.bit_length;
        if len == 1 {
            if !raw.is_zero() {
                bits::insert_u64(&self.steps, 1, bytes);
            }
            return;
        }
        if len <= 64 {
            let pattern: u64 = match raw {
                RawInt::Small(v) => *v as u64,
                RawInt::Wide(v) => bits::wrap_to_width(v, 64).to_u64().unwrap_or_default(),
            };
            bits::insert_u64(&self.steps, pattern, bytes);
        } else {
            bits::insert_wide(&self.steps, &bits::wrap_to_width(&raw.to_bigint(), len), bytes);
        }
    }
}
