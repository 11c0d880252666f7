//! Boundary to an external sky-coordinate library.
//!
//! mountlib does not compute sidereal time, precession, or refraction. A
//! consumer that needs RA/Dec ⇄ alt/az conversions plugs in an
//! implementation of [`SkyTransform`] backed by the astronomy library of
//! its choice. The mount supplies the [`Observer`] (site and clock) read
//! from the hand controller.

use chrono::{DateTime, FixedOffset};

use crate::types::{AzEl, RaDec};

/// Observing site and time, as stored in the hand controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observer {
    /// Signed latitude in degrees, north positive.
    pub latitude: f64,
    /// Signed longitude in degrees, east positive.
    pub longitude: f64,
    /// Local time with the effective UTC offset (DST included).
    pub time: DateTime<FixedOffset>,
}

/// Conversion between the horizon and equatorial frames.
pub trait SkyTransform: Send + Sync {
    /// Horizon position to equatorial coordinates for `observer`.
    fn azel_to_radec(&self, position: AzEl, observer: &Observer) -> RaDec;

    /// Equatorial coordinates to horizon position for `observer`.
    fn radec_to_azel(&self, target: RaDec, observer: &Observer) -> AzEl;
}
