//! Numeric domains a signal is decoded into.
//!
//! The representation is chosen once from the declared bit length, the
//! signedness and whether the scaling constants are whole numbers. Integer
//! representations scale in floating point and round; `Decimal` keeps exact
//! base-10 arithmetic; `Double` computes exactly and converts at the end.

use bigdecimal::{BigDecimal, RoundingMode};
use num_bigint::BigInt;
use num_traits::{One, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};

use crate::types::value::Value;

/// Tag of the four numeric domains.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RepresentationKind {
    Integer32,
    Integer64,
    Decimal,
    Double,
}

impl RepresentationKind {
    /// Picks the representation for a signal.
    ///
    /// One bit of the native width is reserved for the sign, so a signed
    /// 32-bit field no longer fits `Integer32`.
    pub fn select(bit_length: u16, signed: bool, whole: bool) -> Self {
        if !whole {
            return RepresentationKind::Double;
        }
        let (max_int, max_long): (u16, u16) = if signed { (31, 63) } else { (32, 64) };
        if bit_length <= max_int {
            RepresentationKind::Integer32
        } else if bit_length <= max_long {
            RepresentationKind::Integer64
        } else {
            RepresentationKind::Decimal
        }
    }

    /// Width of the bit pattern returned by `Signal::extract`.
    pub fn native_bits(self) -> u16 {
        match self {
            RepresentationKind::Integer32 => 32,
            _ => 64,
        }
    }

    pub fn is_whole(self) -> bool {
        !matches!(self, RepresentationKind::Double)
    }
}

/// `true` when the decimal has no fractional digits in its declared form
/// (`1` and `10` are whole, `1.0` is not).
pub(crate) fn is_whole_literal(d: &BigDecimal) -> bool {
    d.as_bigint_and_exponent().1 <= 0
}

/// A raw (unscaled) integer read from or written to the payload.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum RawInt {
    Small(i128),
    Wide(BigInt),
}

impl RawInt {
    pub(crate) fn to_bigint(&self) -> BigInt {
        match self {
            RawInt::Small(v) => BigInt::from(*v),
            RawInt::Wide(v) => v.clone(),
        }
    }

    fn to_decimal(&self) -> BigDecimal {
        BigDecimal::new(self.to_bigint(), 0)
    }

    pub(crate) fn is_zero(&self) -> bool {
        match self {
            RawInt::Small(v) => *v == 0,
            RawInt::Wide(v) => v.is_zero(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct IntegralScale {
    factor: i64,
    offset: i64,
    identity: bool,
}

impl IntegralScale {
    fn apply(&self, raw: i128) -> f64 {
        (raw as f64 * self.factor as f64).round() + self.offset as f64
    }

    fn apply_i64(&self, raw: i128) -> i64 {
        if self.identity {
            return raw as i64;
        }
        self.apply(raw) as i64
    }

    fn apply_i128(&self, raw: i128) -> i128 {
        if self.identity {
            return raw;
        }
        self.apply(raw) as i128
    }

    /// `(value - offset) / factor`, half-up. Exact when the division is exact.
    fn unscale(&self, value: &Value) -> Option<RawInt> {
        if self.factor == 0 {
            return None;
        }
        if let Some(v) = value.to_i128() {
            let shifted: i128 = v.checked_sub(self.offset as i128)?;
            let factor: i128 = self.factor as i128;
            // MIN / -1 has no i128 quotient
            if shifted.checked_rem(factor)? == 0 {
                return shifted.checked_div(factor).map(RawInt::Small);
            }
        }
        let v: f64 = value.to_f64()?;
        let scaled: f64 = ((v - self.offset as f64) / self.factor as f64 + 0.5).floor();
        scaled.is_finite().then(|| RawInt::Small(scaled as i128))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct DecimalScale {
    factor: BigDecimal,
    offset: BigDecimal,
    unit_factor: bool,
    zero_offset: bool,
}

impl DecimalScale {
    fn new(factor: &BigDecimal, offset: &BigDecimal) -> Self {
        DecimalScale {
            unit_factor: factor.is_one(),
            zero_offset: offset.is_zero(),
            factor: factor.clone(),
            offset: offset.clone(),
        }
    }

    fn apply(&self, raw: &RawInt) -> BigDecimal {
        let mut v: BigDecimal = raw.to_decimal();
        if !self.unit_factor {
            v *= &self.factor;
        }
        if !self.zero_offset {
            v += &self.offset;
        }
        v
    }

    fn unscale(&self, value: &Value) -> Option<RawInt> {
        if self.factor.is_zero() {
            return None;
        }
        let mut v: BigDecimal = value.to_decimal()?;
        if !self.zero_offset {
            v -= &self.offset;
        }
        if !self.unit_factor {
            v = v / &self.factor;
        }
        Some(RawInt::Wide(round_half_up(&v)))
    }
}

/// Rounds to the nearest integer, ties away from zero.
fn round_half_up(v: &BigDecimal) -> BigInt {
    let (digits, exp) = v.with_scale_round(0, RoundingMode::HalfUp).into_bigint_and_exponent();
    if exp >= 0 {
        digits
    } else {
        digits * BigInt::from(10u8).pow((-exp) as u32)
    }
}

/// Scaling behaviour of a signal, one variant per [`RepresentationKind`].
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Representation {
    Integer32(IntegralScale),
    Integer64(IntegralScale),
    Decimal(DecimalScale),
    Double(DecimalScale),
}

impl Representation {
    /// Builds the representation for `kind`. Whole constants that overflow an
    /// `i64` move an integer kind to `Decimal`.
    pub(crate) fn new(kind: RepresentationKind, factor: &BigDecimal, offset: &BigDecimal) -> Self {
        let integral = || -> Option<IntegralScale> {
            let f: i64 = factor.to_i64()?;
            let o: i64 = offset.to_i64()?;
            Some(IntegralScale {
                factor: f,
                offset: o,
                identity: f == 1 && o == 0,
            })
        };
        match kind {
            RepresentationKind::Integer32 => match integral() {
                Some(scale) => Representation::Integer32(scale),
                None => Representation::Decimal(DecimalScale::new(factor, offset)),
            },
            RepresentationKind::Integer64 => match integral() {
                Some(scale) => Representation::Integer64(scale),
                None => Representation::Decimal(DecimalScale::new(factor, offset)),
            },
            RepresentationKind::Decimal => Representation::Decimal(DecimalScale::new(factor, offset)),
            RepresentationKind::Double => Representation::Double(DecimalScale::new(factor, offset)),
        }
    }

    pub(crate) fn kind(&self) -> RepresentationKind {
        match self {
            Representation::Integer32(_) => RepresentationKind::Integer32,
            Representation::Integer64(_) => RepresentationKind::Integer64,
            Representation::Decimal(_) => RepresentationKind::Decimal,
            Representation::Double(_) => RepresentationKind::Double,
        }
    }

    /// `raw * factor + offset` in the representation's domain.
    pub(crate) fn decode(&self, raw: &RawInt) -> Value {
        match (self, raw) {
            (Representation::Integer32(s), RawInt::Small(r)) => Value::Int(s.apply_i64(*r)),
            (Representation::Integer64(s), RawInt::Small(r)) => Value::Long(s.apply_i128(*r)),
            // integer kinds never read more than 64 bits
            (Representation::Integer32(s), RawInt::Wide(r))
            | (Representation::Integer64(s), RawInt::Wide(r)) => {
                Value::Long(s.apply_i128(r.to_i128().unwrap_or_default()))
            }
            (Representation::Decimal(s), _) => Value::Decimal(s.apply(raw)),
            (Representation::Double(s), _) => Value::Double(s.apply(raw).to_f64().unwrap_or(f64::NAN)),
        }
    }

    /// The raw integer, unscaled.
    pub(crate) fn interpret(&self, raw: RawInt) -> Value {
        match (self, raw) {
            (Representation::Integer32(_), RawInt::Small(r)) => Value::Int(r as i64),
            (Representation::Integer64(_), RawInt::Small(r))
            | (Representation::Double(_), RawInt::Small(r)) => Value::Long(r),
            (Representation::Decimal(_), raw) => Value::Decimal(raw.to_decimal()),
            (_, RawInt::Wide(r)) => match r.to_i128() {
                Some(v) => Value::Long(v),
                None => Value::Decimal(BigDecimal::new(r, 0)),
            },
        }
    }

    /// Inverse of [`Representation::decode`]; `None` means the value cannot
    /// be encoded and the signal is skipped.
    pub(crate) fn unscale(&self, value: &Value) -> Option<RawInt> {
        match self {
            Representation::Integer32(s) | Representation::Integer64(s) => s.unscale(value),
            Representation::Decimal(s) | Representation::Double(s) => s.unscale(value),
        }
    }
}
