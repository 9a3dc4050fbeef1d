//! Hex codec for floating-point telemetry
//!
//! Floating-point values cross the radio link as text. Each 32-bit IEEE-754
//! value is sent as its big-endian bit pattern, rendered as exactly eight
//! lowercase hex digits:
//!
//! ```text
//! 1.0     -> "3f800000"
//! -2.0    -> "c0000000"
//! 118.625 -> "42ed4000"
//! ```
//!
//! Decoding rebuilds the value from the sign, exponent, and mantissa fields
//! by summing powers of two rather than reinterpreting the bits natively.
//! Deployed vehicle firmware performs the same digit-by-digit summation, so
//! this implementation keeps the arithmetic identical, including its
//! behavior for the exponent-255 and subnormal bit patterns. Do not swap in
//! `f32::from_bits` without verifying equivalence against the firmware.

use thiserror::Error;

/// Number of hex digits in an encoded value (four big-endian bytes)
pub const ENCODED_LEN: usize = 8;

/// Errors that can occur while decoding a hex float
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CodecError {
    #[error("Expected {ENCODED_LEN} hex digits, got {0}")]
    InvalidLength(usize),

    #[error("Not a hex string: {0:?}")]
    InvalidDigit(String),
}

/// Encode a 32-bit float as eight lowercase hex digits, most significant
/// byte first
pub fn encode(value: f32) -> String {
    format!("{:08x}", value.to_bits())
}

/// Decode eight hex digits back into a 32-bit float
///
/// An all-zero bit pattern decodes to exactly `0.0`. Every other pattern is
/// rebuilt as the signed sum of powers of two over the 24-bit significand
/// (implicit leading one included), accumulated in `f64` and narrowed once
/// at the end.
pub fn decode(hex: &str) -> Result<f32, CodecError> {
    if hex.len() != ENCODED_LEN {
        return Err(CodecError::InvalidLength(hex.len()));
    }

    // from_str_radix would accept a leading sign, which is not valid here
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(CodecError::InvalidDigit(hex.to_string()));
    }

    let bits =
        u32::from_str_radix(hex, 16).map_err(|_| CodecError::InvalidDigit(hex.to_string()))?;

    if bits == 0 {
        return Ok(0.0);
    }

    let sign = if bits >> 31 == 1 { -1.0 } else { 1.0 };
    let mut exp = ((bits >> 23) & 0xff) as i32 - 127;

    // 24-bit significand with the implicit leading one always present.
    // Exponent-255 and subnormal patterns run through the same arithmetic.
    let significand = (bits & 0x007f_ffff) | 0x0080_0000;

    let mut magnitude = 0.0f64;
    for bit in (0..24).rev() {
        if significand & (1 << bit) != 0 {
            magnitude += 2.0f64.powi(exp);
        }
        exp -= 1;
    }

    Ok((sign * magnitude) as f32)
}
