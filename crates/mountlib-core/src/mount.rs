//! The `Mount` trait -- unified interface for telescope mount backends.
//!
//! Planetarium front ends, observatory scripts, and CLIs program against
//! `dyn Mount` without needing to know which hand-controller protocol or
//! firmware variant is behind it. Each backend (currently
//! `mountlib-nexstar`) provides a concrete type implementing this trait.

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::helpers::{location_to_degrees, time_fields_to_datetime};
use crate::safety::SafetyGate;
use crate::sky::{Observer, SkyTransform};
use crate::types::*;

/// Unified asynchronous interface for controlling a telescope mount.
///
/// Every method that talks to the mount performs exactly one
/// request/response exchange per underlying protocol command and never
/// caches what it reads. Exchanges never overlap: a backend serializes them
/// on its transport, so concurrent callers simply queue.
///
/// The unguarded motion methods ([`goto_azel`](Mount::goto_azel),
/// [`goto_radec`](Mount::goto_radec)) send the command as given. Use
/// [`safe_goto_azel`](Mount::safe_goto_azel) and
/// [`safe_goto_radec`](Mount::safe_goto_radec) to route through the
/// safety gate first.
#[async_trait]
pub trait Mount: Send + Sync {
    /// Static information about the configured driver variant.
    fn info(&self) -> &MountInfo;

    /// The local motion policy used by the gated goto methods.
    fn safety(&self) -> &SafetyGate;

    /// Current position in the horizon frame.
    async fn get_azel(&self) -> Result<AzEl>;

    /// Current position in the equatorial frame.
    async fn get_radec(&self) -> Result<RaDec>;

    /// Slew to an alt/az position without any safety checks.
    async fn goto_azel(&self, az: f64, el: f64) -> Result<()>;

    /// Slew to an equatorial position without any safety checks.
    async fn goto_radec(&self, ra: f64, dec: f64) -> Result<()>;

    /// Tell the mount it is currently pointing at `(ra, dec)`.
    async fn sync(&self, ra: f64, dec: f64) -> Result<()>;

    async fn get_tracking_mode(&self) -> Result<TrackingMode>;

    async fn set_tracking_mode(&self, mode: TrackingMode) -> Result<()>;

    /// Slew both axes at fixed rates in `-9..=9` (0 stops the axis).
    ///
    /// Both rates are validated before the first command is sent.
    async fn slew_fixed(&self, az_rate: i32, el_rate: i32) -> Result<()>;

    /// Slew both axes at variable rates in arcseconds per second.
    ///
    /// Both rates are validated before the first command is sent.
    async fn slew_var(&self, az_rate: f64, el_rate: f64) -> Result<()>;

    async fn get_location(&self) -> Result<Location>;

    async fn set_location(&self, location: Location) -> Result<()>;

    async fn get_time(&self) -> Result<TimeFields>;

    async fn set_time(&self, time: TimeFields) -> Result<()>;

    async fn get_version(&self) -> Result<FirmwareVersion>;

    async fn get_model(&self) -> Result<MountModel>;

    /// Send one byte for the hand controller to echo back.
    async fn echo(&self, byte: u8) -> Result<u8>;

    /// Whether the hand controller reports its alignment as complete.
    async fn alignment_complete(&self) -> Result<bool>;

    /// Whether a goto is currently running.
    ///
    /// Poll this only between other commands; it is an ordinary exchange,
    /// not an interrupt.
    async fn goto_in_progress(&self) -> Result<bool>;

    /// Abort a goto already acknowledged by the mount.
    async fn cancel_goto(&self) -> Result<()>;

    /// Gated alt/az goto.
    ///
    /// Local checks run first and send nothing: elevations outside
    /// `(-90, 90]` fail with [`Error::ElevationRange`], and azimuths of 360
    /// or more are wrapped. Then the mount must report alignment complete,
    /// otherwise [`Error::AlignmentNotSet`]. Only then is the goto sent.
    ///
    /// Because the local checks come first, an out-of-range elevation is
    /// reported as [`Error::ElevationRange`] even when the mount is not
    /// aligned, and the alignment query is never sent.
    async fn safe_goto_azel(&self, az: f64, el: f64) -> Result<()> {
        let target = self.safety().check_azel(AzEl::new(az, el))?;
        if !self.alignment_complete().await? {
            return Err(Error::AlignmentNotSet);
        }
        self.goto_azel(target.az, target.el).await
    }

    /// Gated equatorial goto.
    ///
    /// The target must pass the gate's [`TargetSafety`](crate::TargetSafety)
    /// predicate ([`Error::UnsafeTarget`] otherwise) and the mount must
    /// report alignment complete ([`Error::AlignmentNotSet`] otherwise).
    async fn safe_goto_radec(&self, ra: f64, dec: f64) -> Result<()> {
        let target = self.safety().check_radec(RaDec::new(ra, dec))?;
        if !self.alignment_complete().await? {
            return Err(Error::AlignmentNotSet);
        }
        self.goto_radec(target.ra, target.dec).await
    }

    async fn cancel_current_operation(&self) -> Result<()> {
        self.cancel_goto().await
    }

    /// Show a message on the hand controller.
    ///
    /// The protocol has no display command; the closest primitive is
    /// [`echo`](Mount::echo), which carries a single byte. A one-byte ASCII
    /// message is echoed and the returned byte handed back. Anything longer
    /// fails with [`Error::Unsupported`].
    async fn display(&self, msg: &str) -> Result<u8> {
        match msg.as_bytes() {
            [byte] => self.echo(*byte).await,
            _ => Err(Error::Unsupported(format!(
                "display of {} bytes; the hand controller only echoes one",
                msg.len()
            ))),
        }
    }

    /// Read the stored site and clock as an [`Observer`].
    async fn observer(&self) -> Result<Observer> {
        let location = self.get_location().await?;
        let time = self.get_time().await?;
        let (latitude, longitude) = location_to_degrees(&location);
        Ok(Observer {
            latitude,
            longitude,
            time: time_fields_to_datetime(&time)?,
        })
    }

    /// Current pointing in the equatorial frame, computed from the alt/az
    /// position through an external transform.
    async fn radec_via_horizon(&self, transform: &dyn SkyTransform) -> Result<RaDec> {
        let position = self.get_azel().await?;
        let observer = self.observer().await?;
        Ok(transform.azel_to_radec(position, &observer))
    }

    /// Gated goto to an equatorial target, converted to alt/az through an
    /// external transform. Returns the alt/az position that was sent to the
    /// gate.
    async fn goto_radec_via_horizon(
        &self,
        transform: &dyn SkyTransform,
        ra: f64,
        dec: f64,
    ) -> Result<AzEl> {
        let target = self.safety().check_radec(RaDec::new(ra, dec))?;
        let observer = self.observer().await?;
        let position = transform.radec_to_azel(target, &observer);
        self.safe_goto_azel(position.az, position.el).await?;
        Ok(position)
    }
}
