//! NexStar fixed-point angle codec and response framing.
//!
//! The NexStar hand-controller protocol carries angles as a fraction of a
//! full revolution, written as uppercase hexadecimal:
//!
//! ```text
//! value = round(degrees / 360 * 2^N)      N = 16 ("Z"/"B"/...) or 32 ("z"/"b"/...)
//! ```
//!
//! 16-bit values are 4 hex digits, 32-bit values are 8. Two values are
//! joined with a comma in goto/sync requests and in position responses.
//!
//! # Response format
//!
//! Every response is a fixed-length block. ASCII responses and
//! acknowledgements end with the terminator `#` (0x23); the single-byte
//! acknowledgement is the terminator on its own. Binary responses (version,
//! model, tracking mode, flags, echo) are read from their leading bytes
//! without a terminator check.

use mountlib_core::{Error, Result};

/// Response terminator and acknowledgement byte (`#`).
pub const TERMINATOR: u8 = b'#';

/// Separator between the two values of a position pair.
pub const SEPARATOR: u8 = b',';

/// Fixed-point width of a position value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrecisionWidth {
    /// 16-bit values, 4 hex digits (older hand controllers).
    Bits16,
    /// 32-bit values, 8 hex digits ("precise" commands).
    Bits32,
}

impl PrecisionWidth {
    /// Number of bits in one value.
    pub fn bits(&self) -> u32 {
        match self {
            PrecisionWidth::Bits16 => 16,
            PrecisionWidth::Bits32 => 32,
        }
    }

    /// Number of hex digits in one serialized value.
    pub fn hex_digits(&self) -> usize {
        self.bits() as usize / 4
    }

    /// Length of a position response: two values, a comma, and `#`.
    pub fn position_response_len(&self) -> usize {
        self.hex_digits() * 2 + 2
    }

    /// Size of one least-significant bit, in degrees.
    pub fn resolution(&self) -> f64 {
        360.0 / self.full_scale()
    }

    /// `2^bits` as a float.
    fn full_scale(&self) -> f64 {
        (1u64 << self.bits()) as f64
    }
}

/// Encode an angle in degrees as a zero-padded uppercase hex fraction of a
/// revolution.
///
/// Fails with [`Error::EncodingRange`] if the rounded value does not fit in
/// the width. That includes negative angles and anything that rounds up to
/// a full revolution; callers wrap angles into `[0, 360)` first.
///
/// # Example
///
/// ```
/// use mountlib_nexstar::protocol::{encode_precise, PrecisionWidth};
///
/// assert_eq!(encode_precise(180.0, PrecisionWidth::Bits32).unwrap(), "80000000");
/// assert_eq!(encode_precise(90.0, PrecisionWidth::Bits16).unwrap(), "4000");
/// ```
pub fn encode_precise(degrees: f64, width: PrecisionWidth) -> Result<String> {
    let scaled = (degrees / 360.0 * width.full_scale()).round();
    let max = ((1u64 << width.bits()) - 1) as f64;
    if !scaled.is_finite() || scaled < 0.0 || scaled > max {
        return Err(Error::EncodingRange {
            angle: degrees,
            bits: width.bits(),
        });
    }
    let value = scaled as u64;
    Ok(format!("{value:0digits$X}", digits = width.hex_digits()))
}

/// Decode a hex fraction of a revolution back to degrees.
///
/// The string must be exactly [`PrecisionWidth::hex_digits`] hex digits
/// (either case), otherwise [`Error::Decoding`].
///
/// # Example
///
/// ```
/// use mountlib_nexstar::protocol::{decode_precise, PrecisionWidth};
///
/// assert_eq!(decode_precise("40000000", PrecisionWidth::Bits32).unwrap(), 90.0);
/// ```
pub fn decode_precise(hex: &str, width: PrecisionWidth) -> Result<f64> {
    if hex.len() != width.hex_digits() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::Decoding(format!(
            "expected {} hex digits, got {hex:?}",
            width.hex_digits()
        )));
    }
    let value = u64::from_str_radix(hex, 16)
        .map_err(|e| Error::Decoding(format!("invalid hex {hex:?}: {e}")))?;
    Ok(value as f64 / width.full_scale() * 360.0)
}

/// Check that a response is exactly `expected` bytes long.
pub fn check_length(response: &[u8], expected: usize) -> Result<()> {
    if response.len() != expected {
        return Err(Error::Framing(format!(
            "expected {expected} bytes, got {} ({response:02X?})",
            response.len()
        )));
    }
    Ok(())
}

/// Check that a response is exactly `expected` bytes and ends with `#`.
pub fn check_terminated(response: &[u8], expected: usize) -> Result<()> {
    check_length(response, expected)?;
    match response.last() {
        Some(&TERMINATOR) => Ok(()),
        _ => Err(Error::Framing(format!(
            "missing '#' terminator in {response:02X?}"
        ))),
    }
}

/// Validate a single-byte acknowledgement.
///
/// Returns `Ok(())` for `#`, [`Error::UnexpectedResponse`] for any other
/// byte, and [`Error::Framing`] if the response is not exactly one byte.
pub fn parse_ack(response: &[u8]) -> Result<()> {
    check_length(response, 1)?;
    match response[0] {
        TERMINATOR => Ok(()),
        other => Err(Error::UnexpectedResponse(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const W32: PrecisionWidth = PrecisionWidth::Bits32;
    const W16: PrecisionWidth = PrecisionWidth::Bits16;

    // ---------------------------------------------------------------
    // Width properties
    // ---------------------------------------------------------------

    #[test]
    fn width_sizes() {
        assert_eq!(W32.hex_digits(), 8);
        assert_eq!(W16.hex_digits(), 4);
        assert_eq!(W32.position_response_len(), 18);
        assert_eq!(W16.position_response_len(), 10);
    }

    #[test]
    fn width_resolution() {
        assert!((W32.resolution() - 8.381_903_171_539_307e-8).abs() < 1e-20);
        assert!((W16.resolution() - 0.005_493_164_062_5).abs() < 1e-15);
    }

    // ---------------------------------------------------------------
    // Encoding
    // ---------------------------------------------------------------

    #[test]
    fn encode_zero() {
        assert_eq!(encode_precise(0.0, W32).unwrap(), "00000000");
        assert_eq!(encode_precise(0.0, W16).unwrap(), "0000");
    }

    #[test]
    fn encode_half_revolution() {
        assert_eq!(encode_precise(180.0, W32).unwrap(), "80000000");
    }

    #[test]
    fn encode_rounds_up_to_all_ones() {
        assert_eq!(encode_precise(359.999999916, W32).unwrap(), "FFFFFFFF");
    }

    #[test]
    fn encode_quarter_turns() {
        assert_eq!(encode_precise(90.0, W32).unwrap(), "40000000");
        assert_eq!(encode_precise(45.0, W32).unwrap(), "20000000");
        assert_eq!(encode_precise(270.0, W16).unwrap(), "C000");
    }

    #[test]
    fn encode_is_uppercase_and_padded() {
        let hex = encode_precise(1.0, W32).unwrap();
        assert_eq!(hex, "00B60B61");
    }

    #[test]
    fn encode_full_revolution_does_not_fit() {
        let err = encode_precise(360.0, W32).unwrap_err();
        assert!(matches!(err, Error::EncodingRange { bits: 32, .. }));
        assert!(encode_precise(360.0, W16).is_err());
    }

    #[test]
    fn encode_negative_does_not_fit() {
        assert!(matches!(
            encode_precise(-0.5, W32),
            Err(Error::EncodingRange { .. })
        ));
    }

    #[test]
    fn encode_tiny_negative_rounds_to_zero() {
        assert_eq!(encode_precise(-1e-12, W32).unwrap(), "00000000");
    }

    #[test]
    fn encode_non_finite() {
        assert!(encode_precise(f64::NAN, W32).is_err());
        assert!(encode_precise(f64::INFINITY, W32).is_err());
    }

    // ---------------------------------------------------------------
    // Decoding
    // ---------------------------------------------------------------

    #[test]
    fn decode_known_values() {
        assert_eq!(decode_precise("00000000", W32).unwrap(), 0.0);
        assert_eq!(decode_precise("80000000", W32).unwrap(), 180.0);
        assert_eq!(decode_precise("2000", W16).unwrap(), 45.0);
    }

    #[test]
    fn decode_accepts_lowercase() {
        assert_eq!(decode_precise("c0000000", W32).unwrap(), 270.0);
    }

    #[test]
    fn decode_rejects_wrong_width() {
        assert!(matches!(decode_precise("8000", W32), Err(Error::Decoding(_))));
        assert!(matches!(decode_precise("80000000", W16), Err(Error::Decoding(_))));
    }

    #[test]
    fn decode_rejects_non_hex() {
        assert!(matches!(decode_precise("8000000G", W32), Err(Error::Decoding(_))));
        assert!(matches!(decode_precise("+8000000", W32), Err(Error::Decoding(_))));
    }

    #[test]
    fn round_trip_within_one_lsb() {
        let bound = W32.resolution();
        let mut d = 0.0;
        while d < 360.0 {
            let hex = encode_precise(d, W32).unwrap();
            let back = decode_precise(&hex, W32).unwrap();
            assert!((back - d).abs() <= bound, "{d} -> {hex} -> {back}");
            d += 7.123_456_789;
        }
    }

    #[test]
    fn round_trip_16_bit_within_one_lsb() {
        let bound = W16.resolution();
        for d in [0.0, 0.001, 12.345, 179.99, 300.5, 359.99] {
            let back = decode_precise(&encode_precise(d, W16).unwrap(), W16).unwrap();
            assert!((back - d).abs() <= bound, "{d} -> {back}");
        }
    }

    // ---------------------------------------------------------------
    // Framing
    // ---------------------------------------------------------------

    #[test]
    fn ack_accepts_terminator() {
        assert!(parse_ack(&[0x23]).is_ok());
    }

    #[test]
    fn ack_rejects_other_bytes() {
        for byte in [0x00, b'?', b'0', 0xFF] {
            assert!(matches!(
                parse_ack(&[byte]),
                Err(Error::UnexpectedResponse(b)) if b == byte
            ));
        }
    }

    #[test]
    fn ack_rejects_wrong_length() {
        assert!(matches!(parse_ack(&[]), Err(Error::Framing(_))));
        assert!(matches!(parse_ack(b"##"), Err(Error::Framing(_))));
    }

    #[test]
    fn terminated_checks_length_and_terminator() {
        assert!(check_terminated(b"12#", 3).is_ok());
        assert!(matches!(check_terminated(b"12#", 4), Err(Error::Framing(_))));
        assert!(matches!(check_terminated(b"123", 3), Err(Error::Framing(_))));
    }
}
