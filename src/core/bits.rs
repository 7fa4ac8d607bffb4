//! Bit placement of a signal inside a frame payload.
//!
//! A signal's layout is compiled once into a short list of [`Step`]s, each
//! covering the run of bits the signal occupies inside one payload byte.
//! Extraction and packing then walk the steps instead of single bits.
//!
//! Bit numbering follows the DBC convention: bit `n` lives in byte `n / 8` at
//! position `n % 8` (0 = least significant bit of the byte).
//!
//! - **Intel** (`@1`): `start_bit` is the least significant bit of the value;
//!   further bits walk forward (`n + 1`), wrapping into the next byte at bit 0.
//! - **Motorola** (`@0`): `start_bit` is the most significant bit of the value;
//!   further bits walk backward inside the byte and continue at bit 7 of the
//!   next byte.

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{One, Zero};

use crate::types::signal::ByteOrder;

/// Elementary step for moving a bit run between a payload byte and a value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Step {
    /// Source byte index.
    pub(crate) byte_index: usize,
    /// LSB within the source byte (0..7).
    pub(crate) src_lsb: u8,
    /// Number of bits to take (1..8).
    pub(crate) width: u8,
    /// Destination LSB in the value (LSB-first).
    pub(crate) dst_lsb: u16,
}

impl Step {
    #[inline]
    fn mask(&self) -> u8 {
        if self.width == 8 {
            0xFF
        } else {
            ((1u16 << self.width) - 1) as u8
        }
    }
}

/// Compiles the byte steps for a signal placement.
pub(crate) fn compile(start_bit: u16, bit_length: u16, order: ByteOrder) -> Vec<Step> {
    // ceil((bit_len + (bit_start % 8)) / 8)
    let n_steps: usize = (bit_length as usize + (start_bit as usize & 7))
        .div_ceil(8)
        .max(1);
    let mut steps: Vec<Step> = Vec::with_capacity(n_steps);
    match order {
        ByteOrder::Intel => compile_intel(start_bit, bit_length, &mut steps),
        ByteOrder::Motorola => compile_motorola(start_bit, bit_length, &mut steps),
    }
    steps
}

fn compile_intel(start_bit: u16, bit_length: u16, steps: &mut Vec<Step>) {
    let mut remaining: u16 = bit_length;
    let mut bit: usize = start_bit as usize;
    let mut dst: u16 = 0;

    while remaining > 0 {
        let bit_off: u8 = (bit % 8) as u8;
        let take: u8 = remaining.min((8 - bit_off) as u16) as u8;

        steps.push(Step {
            byte_index: bit / 8,
            src_lsb: bit_off,
            width: take,
            dst_lsb: dst,
        });

        bit += take as usize;
        dst += take as u16;
        remaining -= take as u16;
    }
}

fn compile_motorola(start_bit: u16, bit_length: u16, steps: &mut Vec<Step>) {
    // The start bit carries the value's MSB; each byte is consumed from its
    // current MSB position down to bit 0, the next byte from bit 7.
    let mut remaining: u16 = bit_length;
    let mut byte: usize = (start_bit / 8) as usize;
    let mut bit_msb: u8 = (start_bit % 8) as u8;

    while remaining > 0 {
        let take: u16 = (bit_msb as u16 + 1).min(remaining);
        let src_lsb: u8 = bit_msb + 1 - take as u8;

        steps.push(Step {
            byte_index: byte,
            src_lsb,
            width: take as u8,
            dst_lsb: remaining - take,
        });

        remaining -= take;
        byte += 1;
        bit_msb = 7;
    }
}

/// Index of the last payload byte touched by the steps (`None` for no steps).
pub(crate) fn last_byte(steps: &[Step]) -> Option<usize> {
    steps.iter().map(|st| st.byte_index).max()
}

/// Reads up to 64 bits, LSB-first accumulation. `None` if a byte is missing.
#[inline]
pub(crate) fn extract_u64(steps: &[Step], bytes: &[u8]) -> Option<u64> {
    let mut out: u64 = 0;
    for st in steps {
        let b: u8 = *bytes.get(st.byte_index)?;
        let chunk: u64 = ((b >> st.src_lsb) & st.mask()) as u64;
        out |= chunk << st.dst_lsb;
    }
    Some(out)
}

/// Reads any number of bits into an arbitrary-width unsigned integer.
pub(crate) fn extract_wide(steps: &[Step], bytes: &[u8]) -> Option<BigUint> {
    let mut out: BigUint = BigUint::zero();
    for st in steps {
        let b: u8 = *bytes.get(st.byte_index)?;
        let chunk: u8 = (b >> st.src_lsb) & st.mask();
        if chunk != 0 {
            out |= BigUint::from(chunk) << st.dst_lsb as usize;
        }
    }
    Some(out)
}

/// ORs the low bits of `raw` into the payload. Never clears bits; bytes
/// beyond the buffer are skipped.
#[inline]
pub(crate) fn insert_u64(steps: &[Step], raw: u64, bytes: &mut [u8]) {
    for st in steps {
        if let Some(b) = bytes.get_mut(st.byte_index) {
            let chunk: u8 = ((raw >> st.dst_lsb) as u8) & st.mask();
            *b |= chunk << st.src_lsb;
        }
    }
}

/// Wide counterpart of [`insert_u64`].
pub(crate) fn insert_wide(steps: &[Step], raw: &BigUint, bytes: &mut [u8]) {
    let mask: BigUint = BigUint::from(0xFFu8);
    for st in steps {
        if let Some(b) = bytes.get_mut(st.byte_index) {
            let shifted: BigUint = (raw >> st.dst_lsb as usize) & &mask;
            let low: u8 = shifted.to_bytes_le().first().copied().unwrap_or(0);
            *b |= (low & st.mask()) << st.src_lsb;
        }
    }
}

/// Sign-extends the low `bits` of `raw` to a full `i64`.
#[inline]
pub(crate) fn sign_extend_u64(raw: u64, bits: u16) -> i64 {
    if bits == 0 || bits >= 64 {
        return raw as i64;
    }
    let shift: u32 = 64 - bits as u32;
    ((raw << shift) as i64) >> shift
}

/// Two's-complement interpretation of a `bits`-wide pattern.
pub(crate) fn sign_extend_wide(raw: BigUint, bits: u16) -> BigInt {
    if bits > 0 && raw.bit(bits as u64 - 1) {
        BigInt::from_biguint(Sign::Plus, raw) - (BigInt::one() << bits as usize)
    } else {
        BigInt::from_biguint(Sign::Plus, raw)
    }
}

/// Reduces a signed integer to its `bits`-wide two's-complement pattern.
pub(crate) fn wrap_to_width(value: &BigInt, bits: u16) -> BigUint {
    let modulus: BigInt = BigInt::one() << bits as usize;
    let reduced: BigInt = ((value % &modulus) + &modulus) % &modulus;
    reduced.to_biguint().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn motorola_reference_layout() {
        let steps = compile(7, 16, ByteOrder::Motorola);
        assert_eq!(steps.len(), 2);
        assert_eq!(extract_u64(&steps, &[0x12, 0x34]), Some(0x1234));
    }

    #[test]
    fn intel_reference_layout() {
        let steps = compile(0, 16, ByteOrder::Intel);
        assert_eq!(extract_u64(&steps, &[0x12, 0x34]), Some(0x3412));
    }

    #[test]
    fn motorola_unaligned_crosses_bytes() {
        // MSB at byte 0 bit 3, 12 bits: 4 bits of byte 0 then all of byte 1.
        let steps = compile(3, 12, ByteOrder::Motorola);
        assert_eq!(
            steps,
            vec![
                Step { byte_index: 0, src_lsb: 0, width: 4, dst_lsb: 8 },
                Step { byte_index: 1, src_lsb: 0, width: 8, dst_lsb: 0 },
            ]
        );
        assert_eq!(extract_u64(&steps, &[0xFA, 0xBC]), Some(0xABC));
    }

    #[test]
    fn intel_unaligned_crosses_bytes() {
        // LSB at bit 4, 12 bits: high nibble of byte 0 then byte 1.
        let steps = compile(4, 12, ByteOrder::Intel);
        assert_eq!(extract_u64(&steps, &[0xC0, 0xAB]), Some(0xABC));
    }

    #[test]
    fn insert_is_inverse_of_extract() {
        for (start, len, order) in [
            (7u16, 16u16, ByteOrder::Motorola),
            (13, 11, ByteOrder::Motorola),
            (0, 64, ByteOrder::Intel),
            (5, 19, ByteOrder::Intel),
        ] {
            let steps = compile(start, len, order);
            let raw: u64 = 0x5A5A_A5A5_5A5A_A5A5 & (u64::MAX >> (64 - len));
            let mut buf = [0u8; 8];
            insert_u64(&steps, raw, &mut buf);
            assert_eq!(extract_u64(&steps, &buf), Some(raw), "{start}|{len}@{order:?}");
        }
    }

    #[test]
    fn missing_bytes_yield_none_and_are_skipped_on_insert() {
        let steps = compile(7, 16, ByteOrder::Motorola);
        assert_eq!(extract_u64(&steps, &[0x12]), None);
        let mut buf = [0u8; 1];
        insert_u64(&steps, 0xFFFF, &mut buf);
        assert_eq!(buf, [0xFF]);
    }

    #[test]
    fn wide_extract_and_insert() {
        let steps = compile(0, 72, ByteOrder::Intel);
        let bytes = [0x01, 0, 0, 0, 0, 0, 0, 0, 0x80];
        let raw = extract_wide(&steps, &bytes).unwrap();
        assert!(raw.bit(0));
        assert!(raw.bit(71));
        let mut out = [0u8; 9];
        insert_wide(&steps, &raw, &mut out);
        assert_eq!(out, bytes);
    }

    #[test]
    fn sign_extension() {
        assert_eq!(sign_extend_u64(0xFFF, 12), -1);
        assert_eq!(sign_extend_u64(0x7FF, 12), 2047);
        assert_eq!(sign_extend_u64(0x800, 12), -2048);
        assert_eq!(sign_extend_wide(BigUint::from(0xFFu8), 8), BigInt::from(-1));
        assert_eq!(wrap_to_width(&BigInt::from(-1), 4), BigUint::from(0xFu8));
        assert_eq!(wrap_to_width(&BigInt::from(18), 4), BigUint::from(2u8));
    }
}
