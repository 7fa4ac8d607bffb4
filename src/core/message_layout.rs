use crate::types::errors::MessageLayoutError;
use crate::types::signal::ByteOrder;

/// Verify that (start_bit, bit_length) fits within a frame of `byte_length` bytes.
/// Returns Ok(()) if the signal fits; Err(...) with the reason otherwise.
///
/// - Intel: the field occupies bits [start, start + len - 1] on a linear 0..(8*bytes-1) plane.
/// - Motorola: the start bit is the MSB; the field runs down to bit 0 of its
///   byte, then through bits 7..0 of each following byte. The last byte touched
///   is `start / 8 + ceil((len - (start % 8 + 1)) / 8)`.
pub fn check_signal_fits(
    byte_length: u16,
    start_bit: u16,
    bit_length: u16,
    order: ByteOrder,
) -> Result<(), MessageLayoutError> {
    if bit_length == 0 {
        return Err(MessageLayoutError::ZeroBitLength);
    }
    let total_bits: usize = (byte_length as usize) * 8;

    match order {
        ByteOrder::Intel => {
            let end: usize = start_bit as usize + (bit_length as usize) - 1;
            if end < total_bits {
                Ok(())
            } else {
                Err(MessageLayoutError::IntelOutOfBounds {
                    end,
                    total_bits,
                    byte_length,
                })
            }
        }
        ByteOrder::Motorola => {
            let start: usize = start_bit as usize;
            if start >= total_bits {
                return Err(MessageLayoutError::MotorolaStartOutOfBounds {
                    start,
                    total_bits,
                    byte_length,
                });
            }
            let first_byte_bits: usize = start % 8 + 1;
            let spill: usize = (bit_length as usize).saturating_sub(first_byte_bits);
            let end_byte: usize = start / 8 + spill.div_ceil(8);
            if end_byte < byte_length as usize {
                Ok(())
            } else {
                Err(MessageLayoutError::MotorolaEndOutOfBounds {
                    end_byte,
                    byte_length,
                })
            }
        }
    }
}
