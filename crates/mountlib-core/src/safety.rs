//! Pre-flight checks for motion commands.
//!
//! The [`SafetyGate`] holds the local, side-effect-free part of the motion
//! policy: elevation limits, azimuth wraparound, and a pluggable
//! [`TargetSafety`] predicate for equatorial targets. The alignment
//! precondition needs a round trip to the mount and is applied by the
//! [`Mount`](crate::Mount) implementation, after these local checks pass.

use tracing::debug;

use crate::error::{Error, Result};
use crate::types::{AzEl, RaDec};

/// Highest elevation a gated goto may request, in degrees.
pub const MAX_ELEVATION: f64 = 90.0;

/// Exclusive lower bound on elevation, in degrees.
pub const MIN_ELEVATION: f64 = -90.0;

/// Decides whether an equatorial target is safe to slew to.
///
/// Implementations typically consider the observing site and horizon
/// obstructions. They must be pure: the gate calls them before any byte
/// is sent to the mount.
pub trait TargetSafety: Send + Sync {
    /// Return `true` if the mount may point at `(ra, dec)` degrees.
    fn is_safe_radec(&self, ra: f64, dec: f64) -> bool;
}

/// A [`TargetSafety`] that accepts every target.
///
/// This is the default. It performs no check at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl TargetSafety for AllowAll {
    fn is_safe_radec(&self, _ra: f64, _dec: f64) -> bool {
        true
    }
}

impl<F> TargetSafety for F
where
    F: Fn(f64, f64) -> bool + Send + Sync,
{
    fn is_safe_radec(&self, ra: f64, dec: f64) -> bool {
        self(ra, dec)
    }
}

/// Fold an azimuth of 360 degrees or more back into `[0, 360)`.
///
/// Values below 360 are returned unchanged, so `359.999` stays `359.999`
/// while `360.0` becomes `0.0` and `450.0` becomes `90.0`.
pub fn normalize_azimuth(az: f64) -> f64 {
    if az >= 360.0 { az.rem_euclid(360.0) } else { az }
}

/// Accept elevations in `(MIN_ELEVATION, MAX_ELEVATION]` only.
pub fn check_elevation(el: f64) -> Result<()> {
    if !el.is_finite() || el <= MIN_ELEVATION || el > MAX_ELEVATION {
        return Err(Error::ElevationRange(el));
    }
    Ok(())
}

/// Local motion policy applied before gated gotos.
pub struct SafetyGate {
    predicate: Box<dyn TargetSafety>,
}

impl SafetyGate {
    /// A gate with the given equatorial predicate.
    pub fn new(predicate: Box<dyn TargetSafety>) -> Self {
        SafetyGate { predicate }
    }

    /// Validate and normalize an alt/az target.
    pub fn check_azel(&self, target: AzEl) -> Result<AzEl> {
        check_elevation(target.el)?;
        let az = normalize_azimuth(target.az);
        if az != target.az {
            debug!(requested = target.az, normalized = az, "azimuth wrapped");
        }
        Ok(AzEl::new(az, target.el))
    }

    /// Validate an equatorial target against the predicate.
    pub fn check_radec(&self, target: RaDec) -> Result<RaDec> {
        if !self.predicate.is_safe_radec(target.ra, target.dec) {
            return Err(Error::UnsafeTarget {
                ra: target.ra,
                dec: target.dec,
            });
        }
        Ok(target)
    }
}

impl Default for SafetyGate {
    fn default() -> Self {
        SafetyGate::new(Box::new(AllowAll))
    }
}

impl std::fmt::Debug for SafetyGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SafetyGate").finish_non_exhaustive()
    }
}
