//! Location and time conversion helpers.
//!
//! Every conversion between the hand controller's byte-oriented location
//! and time fields and ordinary signed degrees / `chrono` timestamps lives
//! here, so the protocol engine, the CLI, and the coordinate-transform
//! boundary all share one sign convention.
//!
//! # Sign convention
//!
//! The hemisphere flag of a [`DmsAngle`] is zero for north/east (positive
//! degrees) and nonzero for south/west (negative degrees). The same rule is
//! applied when reading a location from the mount and when writing one.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Timelike};

use crate::error::{Error, Result};
use crate::types::{DmsAngle, Location, TimeFields};

/// Convert a degree/minute/second angle to signed decimal degrees.
///
/// # Example
///
/// ```
/// use mountlib_core::{DmsAngle, dms_to_degrees};
///
/// let lon = DmsAngle::new(79, 30, 0, true);
/// assert_eq!(dms_to_degrees(&lon), -79.5);
/// ```
pub fn dms_to_degrees(dms: &DmsAngle) -> f64 {
    let magnitude = f64::from(dms.degrees)
        + f64::from(dms.minutes) / 60.0
        + f64::from(dms.seconds) / 3600.0;
    if dms.negative { -magnitude } else { magnitude }
}

/// Convert signed decimal degrees to a degree/minute/second angle, rounded
/// to the nearest arcsecond.
///
/// Fails with [`Error::InvalidParameter`] if the angle is not finite or its
/// magnitude exceeds `limit` degrees.
pub fn degrees_to_dms(degrees: f64, limit: f64) -> Result<DmsAngle> {
    if !degrees.is_finite() || degrees.abs() > limit {
        return Err(Error::InvalidParameter(format!(
            "angle {degrees} outside +/-{limit} degrees"
        )));
    }
    let total_seconds = (degrees.abs() * 3600.0).round() as u32;
    Ok(DmsAngle {
        degrees: (total_seconds / 3600) as u8,
        minutes: ((total_seconds / 60) % 60) as u8,
        seconds: (total_seconds % 60) as u8,
        negative: degrees < 0.0,
    })
}

/// Build a [`Location`] from signed latitude and longitude in degrees.
///
/// Latitude must lie in `[-90, 90]`, longitude in `[-180, 180]`.
///
/// # Example
///
/// ```
/// use mountlib_core::location_from_degrees;
///
/// let loc = location_from_degrees(-33.5, 151.25).unwrap();
/// assert_eq!(loc.latitude.to_bytes(), [33, 30, 0, 1]);
/// assert_eq!(loc.longitude.to_bytes(), [151, 15, 0, 0]);
/// ```
pub fn location_from_degrees(latitude: f64, longitude: f64) -> Result<Location> {
    Ok(Location {
        latitude: degrees_to_dms(latitude, 90.0)?,
        longitude: degrees_to_dms(longitude, 180.0)?,
    })
}

/// Signed `(latitude, longitude)` in degrees for a stored [`Location`].
pub fn location_to_degrees(location: &Location) -> (f64, f64) {
    (
        dms_to_degrees(&location.latitude),
        dms_to_degrees(&location.longitude),
    )
}

/// Convert a local timestamp to hand-controller time fields.
///
/// The controller stores local wall-clock time, the standard-time UTC
/// offset, and a DST flag; when `dst` is set the standard offset is one
/// hour less than the timestamp's offset.
///
/// Fails with [`Error::InvalidParameter`] for years outside `2000..=2255`
/// or offsets that are not whole hours.
pub fn time_fields_from_datetime(time: &DateTime<FixedOffset>, dst: bool) -> Result<TimeFields> {
    let year = time.year() - 2000;
    if !(0..=255).contains(&year) {
        return Err(Error::InvalidParameter(format!(
            "year {} cannot be stored as a two-digit year",
            time.year()
        )));
    }

    let offset_secs = time.offset().local_minus_utc();
    if offset_secs % 3600 != 0 {
        return Err(Error::InvalidParameter(format!(
            "UTC offset of {offset_secs} seconds is not a whole number of hours"
        )));
    }
    let standard_offset = offset_secs / 3600 - i32::from(dst);
    let utc_offset = i8::try_from(standard_offset).map_err(|_| {
        Error::InvalidParameter(format!("UTC offset {standard_offset} out of range"))
    })?;

    Ok(TimeFields {
        hour: time.hour() as u8,
        minute: time.minute() as u8,
        second: time.second() as u8,
        month: time.month() as u8,
        day: time.day() as u8,
        year: year as u8,
        utc_offset,
        dst,
    })
}

/// Convert hand-controller time fields to a local timestamp.
///
/// Fails with [`Error::Decoding`] if the fields do not form a valid date
/// and time.
pub fn time_fields_to_datetime(fields: &TimeFields) -> Result<DateTime<FixedOffset>> {
    let offset_hours = i32::from(fields.utc_offset) + i32::from(fields.dst);
    let offset = FixedOffset::east_opt(offset_hours * 3600)
        .ok_or_else(|| Error::Decoding(format!("invalid UTC offset {offset_hours}")))?;

    NaiveDate::from_ymd_opt(
        2000 + i32::from(fields.year),
        u32::from(fields.month),
        u32::from(fields.day),
    )
    .and_then(|date| {
        date.and_hms_opt(
            u32::from(fields.hour),
            u32::from(fields.minute),
            u32::from(fields.second),
        )
    })
    .and_then(|naive| naive.and_local_timezone(offset).single())
    .ok_or_else(|| Error::Decoding(format!("invalid date/time fields: {fields:?}")))
}
