//! NexStar command builders and response parsers.
//!
//! This module provides functions to construct the request bytes for every
//! hand-controller operation and to decode the corresponding fixed-length
//! responses.
//!
//! All functions are pure -- they produce or consume byte vectors without
//! performing any I/O. The caller is responsible for sending the bytes over
//! a transport and reading exactly the expected response length (see the
//! `*_RESPONSE_LEN` constants).
//!
//! # Command reference
//!
//! Based on the Celestron NexStar communication protocol for hand
//! controller firmware 1.2 and later. Position commands come in a 16-bit
//! (uppercase opcode) and a 32-bit "precise" (lowercase opcode) form.

use bytes::{BufMut, BytesMut};

use mountlib_core::{
    Direction, DmsAngle, Error, FirmwareVersion, Location, MountModel, Result, TimeFields,
    TrackingMode,
};

use crate::protocol::{
    PrecisionWidth, SEPARATOR, check_length, check_terminated, decode_precise, encode_precise,
};

// ---------------------------------------------------------------
// Opcodes
// ---------------------------------------------------------------

/// Query alt/az position, 16-bit.
pub const OP_GET_AZEL: u8 = b'Z';
/// Query alt/az position, 32-bit.
pub const OP_GET_AZEL_PRECISE: u8 = b'z';
/// Query RA/Dec position, 16-bit.
pub const OP_GET_RADEC: u8 = b'E';
/// Query RA/Dec position, 32-bit.
pub const OP_GET_RADEC_PRECISE: u8 = b'e';
/// Goto alt/az, 16-bit.
pub const OP_GOTO_AZEL: u8 = b'B';
/// Goto alt/az, 32-bit.
pub const OP_GOTO_AZEL_PRECISE: u8 = b'b';
/// Goto RA/Dec, 16-bit.
pub const OP_GOTO_RADEC: u8 = b'R';
/// Goto RA/Dec, 32-bit.
pub const OP_GOTO_RADEC_PRECISE: u8 = b'r';
/// Sync RA/Dec, 16-bit.
pub const OP_SYNC: u8 = b'S';
/// Sync RA/Dec, 32-bit.
pub const OP_SYNC_PRECISE: u8 = b's';
pub const OP_GET_TRACKING_MODE: u8 = b't';
pub const OP_SET_TRACKING_MODE: u8 = b'T';
/// Pass-through command to a motor controller (used for slewing).
pub const OP_PASS_THROUGH: u8 = b'P';
pub const OP_GET_LOCATION: u8 = b'w';
pub const OP_SET_LOCATION: u8 = b'W';
pub const OP_GET_TIME: u8 = b'h';
pub const OP_SET_TIME: u8 = b'H';
pub const OP_GET_VERSION: u8 = b'V';
pub const OP_GET_MODEL: u8 = b'm';
pub const OP_ECHO: u8 = b'K';
pub const OP_ALIGNMENT_COMPLETE: u8 = b'J';
pub const OP_GOTO_IN_PROGRESS: u8 = b'L';
pub const OP_CANCEL_GOTO: u8 = b'M';

// ---------------------------------------------------------------
// Response lengths
// ---------------------------------------------------------------

/// Single `#` acknowledgement.
pub const ACK_RESPONSE_LEN: usize = 1;
/// One data byte followed by `#`.
pub const BYTE_RESPONSE_LEN: usize = 2;
/// Major, minor, `#`.
pub const VERSION_RESPONSE_LEN: usize = 3;
/// Two 4-byte DMS tuples and `#`.
pub const LOCATION_RESPONSE_LEN: usize = 9;
/// Eight time fields and `#`.
pub const TIME_RESPONSE_LEN: usize = 9;

// ---------------------------------------------------------------
// Slew constants
// ---------------------------------------------------------------

/// Pass-through message length for fixed-rate slews.
const SLEW_FIXED_LEN: u8 = 2;
/// Pass-through message length for variable-rate slews.
const SLEW_VARIABLE_LEN: u8 = 3;
/// Motor controller address of the azimuth / RA axis.
const DEVICE_AZIMUTH: u8 = 16;
/// Motor controller address of the elevation / Dec axis.
const DEVICE_ELEVATION: u8 = 17;
/// Fixed-rate slew in the positive direction.
const FIXED_POSITIVE: u8 = 36;
/// Fixed-rate slew in the negative direction.
const FIXED_NEGATIVE: u8 = 37;
/// Variable-rate slew in the positive direction.
const VARIABLE_POSITIVE: u8 = 6;
/// Variable-rate slew in the negative direction.
const VARIABLE_NEGATIVE: u8 = 7;
/// Largest fixed slew rate magnitude.
pub const MAX_FIXED_RATE: i32 = 9;

fn direction_byte(direction: Direction) -> u8 {
    match direction {
        Direction::Azimuth => DEVICE_AZIMUTH,
        Direction::Elevation => DEVICE_ELEVATION,
    }
}

// ---------------------------------------------------------------
// Command builders
// ---------------------------------------------------------------

/// Opcodes for one precision width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOpcodes {
    pub get_azel: u8,
    pub get_radec: u8,
    pub goto_azel: u8,
    pub goto_radec: u8,
    pub sync: u8,
}

impl PositionOpcodes {
    /// The opcode set matching `width`.
    pub fn for_width(width: PrecisionWidth) -> Self {
        match width {
            PrecisionWidth::Bits16 => PositionOpcodes {
                get_azel: OP_GET_AZEL,
                get_radec: OP_GET_RADEC,
                goto_azel: OP_GOTO_AZEL,
                goto_radec: OP_GOTO_RADEC,
                sync: OP_SYNC,
            },
            PrecisionWidth::Bits32 => PositionOpcodes {
                get_azel: OP_GET_AZEL_PRECISE,
                get_radec: OP_GET_RADEC_PRECISE,
                goto_azel: OP_GOTO_AZEL_PRECISE,
                goto_radec: OP_GOTO_RADEC_PRECISE,
                sync: OP_SYNC_PRECISE,
            },
        }
    }
}

/// Build a command that consists of the opcode alone (`z`, `J`, `M`, ...).
pub fn cmd_query(opcode: u8) -> Vec<u8> {
    vec![opcode]
}

/// Build a goto or sync frame: opcode, first value, `,`, second value.
///
/// No terminator is appended on the request side.
///
/// # Example
///
/// ```
/// use mountlib_nexstar::commands::build_goto_frame;
/// use mountlib_nexstar::protocol::PrecisionWidth;
///
/// let frame = build_goto_frame(b'b', 90.0, 45.0, PrecisionWidth::Bits32).unwrap();
/// assert_eq!(frame, b"b40000000,20000000");
/// ```
pub fn build_goto_frame(
    opcode: u8,
    first: f64,
    second: f64,
    width: PrecisionWidth,
) -> Result<Vec<u8>> {
    let first = encode_precise(first, width)?;
    let second = encode_precise(second, width)?;
    let mut buf = BytesMut::with_capacity(2 + width.hex_digits() * 2);
    buf.put_u8(opcode);
    buf.put_slice(first.as_bytes());
    buf.put_u8(SEPARATOR);
    buf.put_slice(second.as_bytes());
    Ok(buf.to_vec())
}

/// Build a fixed-rate slew command for one axis.
///
/// `'P', 2, axis, sign, |rate|, 0, 0, 0`. A rate of zero stops the axis.
/// Fails with [`Error::RateOutOfRange`] if `|rate| > 9`.
pub fn cmd_fixed_slew(direction: Direction, rate: i32) -> Result<Vec<u8>> {
    if !(-MAX_FIXED_RATE..=MAX_FIXED_RATE).contains(&rate) {
        return Err(Error::RateOutOfRange(format!(
            "{direction} fixed rate {rate} outside -{MAX_FIXED_RATE}..={MAX_FIXED_RATE}"
        )));
    }
    let sign = if rate < 0 { FIXED_NEGATIVE } else { FIXED_POSITIVE };
    Ok(vec![
        OP_PASS_THROUGH,
        SLEW_FIXED_LEN,
        direction_byte(direction),
        sign,
        rate.unsigned_abs() as u8,
        0,
        0,
        0,
    ])
}

/// Build a variable-rate slew command for one axis.
///
/// `'P', 3, axis, sign, high, low, 0, 0`, where `high`/`low` are the
/// big-endian bytes of `trunc(|rate|) * 4`. The rate is in arcseconds per
/// second. Fails with [`Error::RateOutOfRange`] if the rate is not finite or
/// the scaled value does not fit in two bytes.
pub fn cmd_variable_slew(direction: Direction, rate: f64) -> Result<Vec<u8>> {
    if !rate.is_finite() {
        return Err(Error::RateOutOfRange(format!(
            "{direction} variable rate {rate} is not finite"
        )));
    }
    let scaled = rate.abs().trunc() * 4.0;
    if scaled > f64::from(u16::MAX) {
        return Err(Error::RateOutOfRange(format!(
            "{direction} variable rate {rate} exceeds {} arcsec/s",
            u16::MAX / 4
        )));
    }
    let [high, low] = (scaled as u16).to_be_bytes();
    let sign = if rate < 0.0 {
        VARIABLE_NEGATIVE
    } else {
        VARIABLE_POSITIVE
    };
    Ok(vec![
        OP_PASS_THROUGH,
        SLEW_VARIABLE_LEN,
        direction_byte(direction),
        sign,
        high,
        low,
        0,
        0,
    ])
}

/// Build a "set tracking mode" command (`T` + mode byte).
pub fn cmd_set_tracking_mode(mode: TrackingMode) -> Vec<u8> {
    vec![OP_SET_TRACKING_MODE, mode.code()]
}

/// Build a "set location" command (`W` + 8 bytes).
pub fn cmd_set_location(location: &Location) -> Vec<u8> {
    let mut buf = BytesMut::with_capacity(9);
    buf.put_u8(OP_SET_LOCATION);
    buf.put_slice(&location.latitude.to_bytes());
    buf.put_slice(&location.longitude.to_bytes());
    buf.to_vec()
}

/// Build a "set time" command (`H` + 8 bytes).
pub fn cmd_set_time(time: &TimeFields) -> Vec<u8> {
    let mut buf = BytesMut::with_capacity(9);
    buf.put_u8(OP_SET_TIME);
    buf.put_slice(&time.to_bytes());
    buf.to_vec()
}

/// Build an echo command (`K` + byte).
pub fn cmd_echo(byte: u8) -> Vec<u8> {
    vec![OP_ECHO, byte]
}

// ---------------------------------------------------------------
// Response parsers
// ---------------------------------------------------------------

/// Parse a position response: `XXXXXXXX,YYYYYYYY#` (32-bit) or
/// `XXXX,YYYY#` (16-bit).
///
/// Returns the two raw angles in `[0, 360)` degrees, first value first.
pub fn parse_position(response: &[u8], width: PrecisionWidth) -> Result<(f64, f64)> {
    check_terminated(response, width.position_response_len())?;
    let digits = width.hex_digits();
    if response[digits] != SEPARATOR {
        return Err(Error::Framing(format!(
            "expected ',' at offset {digits} in {response:02X?}"
        )));
    }
    let first = ascii_field(&response[..digits])?;
    let second = ascii_field(&response[digits + 1..digits * 2 + 1])?;
    Ok((decode_precise(first, width)?, decode_precise(second, width)?))
}

fn ascii_field(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes)
        .map_err(|_| Error::Decoding(format!("non-ASCII position field {bytes:02X?}")))
}

/// Parse a location response: `[lat deg, min, sec, flag, lon deg, min, sec,
/// flag, '#']`.
pub fn parse_location(response: &[u8]) -> Result<Location> {
    check_terminated(response, LOCATION_RESPONSE_LEN)?;
    let lat = [response[0], response[1], response[2], response[3]];
    let lon = [response[4], response[5], response[6], response[7]];
    Ok(Location::new(
        DmsAngle::from_bytes(lat),
        DmsAngle::from_bytes(lon),
    ))
}

/// Parse a time response: eight raw fields followed by `#`.
///
/// The terminator is not checked; only the length is.
pub fn parse_time(response: &[u8]) -> Result<TimeFields> {
    check_length(response, TIME_RESPONSE_LEN)?;
    let mut fields = [0u8; 8];
    fields.copy_from_slice(&response[..8]);
    Ok(TimeFields::from_bytes(fields))
}

/// Parse a version response: major, minor, `#`.
pub fn parse_version(response: &[u8]) -> Result<FirmwareVersion> {
    check_length(response, VERSION_RESPONSE_LEN)?;
    Ok(FirmwareVersion::new(response[0], response[1]))
}

/// Parse a one-byte binary response (model, tracking mode, echo).
pub fn parse_byte(response: &[u8]) -> Result<u8> {
    check_length(response, BYTE_RESPONSE_LEN)?;
    Ok(response[0])
}

/// Parse a two-byte flag response where byte 0 is `1` for true.
///
/// The ASCII digit `'1'` is also accepted, since some firmware answers
/// `L` with `"1#"` rather than a binary byte.
pub fn parse_flag(response: &[u8]) -> Result<bool> {
    let value = parse_byte(response)?;
    Ok(value == 1 || value == b'1')
}

pub fn parse_tracking_mode(response: &[u8]) -> Result<TrackingMode> {
    parse_byte(response).map(TrackingMode::from)
}

pub fn parse_model(response: &[u8]) -> Result<MountModel> {
    parse_byte(response).map(MountModel)
}
