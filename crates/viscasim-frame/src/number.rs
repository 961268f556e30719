//! Packed integer fields carried in VISCA payloads.
//!
//! Every payload byte must stay below `0x80`, so the protocol spreads numbers
//! over several bytes:
//!
//! ```text
//! s4   [SM]           S: direction bits 0x20 (+) / 0x30 (-), M: speed-1
//! s9   [MM ** 0D]     MM: magnitude, D: 1 (+), 2 (-), 3 (stop)
//! s16  [0Y 0Y 0Y 0Y]  one nibble per byte, most significant first
//! s8   [0Y 0Y]        same, two nibbles
//! flag [0F]           0x02 on, 0x03 off
//! ```

use crate::error::{FrameError, Result};

/// Borrow `len` bytes of `payload` starting at `offset`.
pub fn field(payload: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    payload
        .get(offset..offset + len)
        .ok_or(FrameError::Truncated {
            offset,
            needed: len,
            available: payload.len().saturating_sub(offset),
        })
}

/// Read the single byte at `offset`.
pub fn byte(payload: &[u8], offset: usize) -> Result<u8> {
    Ok(field(payload, offset, 1)?[0])
}

/// Decode a 4-bit signed speed.
///
/// `0x00` is stop. Otherwise the magnitude is the low three bits plus one
/// so that the slowest speed is distinguishable from stop. A byte without
/// direction bits in `0x30` is the short form (`0x02`, `0x03`): the direction
/// sits in the low two bits and the speed is the fastest, 8.
pub fn decode_s4(val: u8) -> Result<i32> {
    if val == 0 {
        return Ok(0);
    }
    let mut magnitude = i32::from(val & 0x07) + 1;
    let mut sign = val & 0x30;
    if sign == 0 {
        sign = (val & 0x03) << 4;
        magnitude = 8;
    }
    match sign {
        0x20 => Ok(magnitude),
        0x30 => Ok(-magnitude),
        _ => Err(FrameError::InvalidS4Sign(val)),
    }
}

/// Decode a 9-bit signed speed from a 3-byte field.
///
/// The first byte is the magnitude and the third the direction nibble;
/// the middle byte belongs to a neighbouring field.
pub fn decode_s9(field: &[u8]) -> Result<i32> {
    if field.len() != 3 {
        return Err(FrameError::FieldLength {
            expected: 3,
            actual: field.len(),
        });
    }
    let sign = field[2];
    if !(1..=3).contains(&sign) {
        return Err(FrameError::InvalidS9Sign(sign));
    }
    let direction = i32::from(sign & 0x01) - i32::from((sign >> 1) & 0x01);
    Ok(i32::from(field[0]) * direction)
}

/// Decode four nibble-packed bytes into a 16-bit value.
///
/// The result is the raw bit pattern; callers that carry signed positions
/// reinterpret it with `as i16`.
pub fn decode_s16(field: &[u8]) -> Result<u16> {
    if field.len() != 4 {
        return Err(FrameError::FieldLength {
            expected: 4,
            actual: field.len(),
        });
    }
    field.iter().try_fold(0u16, |acc, &b| {
        if b & 0xF0 != 0 {
            return Err(FrameError::InvalidNibble(b));
        }
        Ok((acc << 4) | u16::from(b))
    })
}

/// Decode an on/off flag byte.
pub fn decode_flag(val: u8) -> Result<bool> {
    match val {
        0x02 => Ok(true),
        0x03 => Ok(false),
        other => Err(FrameError::InvalidFlag(other)),
    }
}

/// Encode an on/off flag byte (`0x02` on, `0x03` off).
pub fn encode_bool(value: bool) -> u8 {
    if value {
        0x02
    } else {
        0x03
    }
}

/// Split the low byte of `value` into two nibble bytes.
pub fn encode_s8(value: i64) -> [u8; 2] {
    [((value >> 4) & 0x0F) as u8, (value & 0x0F) as u8]
}

/// Split the low 16 bits of `value` into four nibble bytes, most
/// significant first. Negative values produce their two's-complement nibbles.
pub fn encode_s16(value: i64) -> [u8; 4] {
    [
        ((value >> 12) & 0x0F) as u8,
        ((value >> 8) & 0x0F) as u8,
        ((value >> 4) & 0x0F) as u8,
        (value & 0x0F) as u8,
    ]
}
