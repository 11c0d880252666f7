//! NexStarBuilder -- fluent builder for constructing [`NexStarMount`]
//! instances.
//!
//! Separates configuration from construction so that callers can set up
//! the serial port, response timeout, and target safety policy before the
//! port is opened.
//!
//! # Example
//!
//! ```no_run
//! use mountlib_nexstar::builder::NexStarBuilder;
//! use mountlib_nexstar::models::nexstar_plus;
//! use std::time::Duration;
//!
//! # async fn example() -> mountlib_core::Result<()> {
//! let mount = NexStarBuilder::new(nexstar_plus())
//!     .serial_port("/dev/ttyUSB0")
//!     .command_timeout(Duration::from_millis(1500))
//!     .safety_predicate(Box::new(|_ra: f64, dec: f64| dec > -30.0))
//!     .build()
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use mountlib_core::error::{Error, Result};
use mountlib_core::safety::{SafetyGate, TargetSafety};
use mountlib_core::transport::Transport;

use crate::models::NexStarModel;
use crate::mount::NexStarMount;

/// Default time to wait for a complete response to one command.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(2);

/// Fluent builder for [`NexStarMount`].
///
/// The baud rate defaults to the [`NexStarModel`]'s, and the safety gate
/// defaults to allowing every equatorial target, so the simplest usage is:
///
/// ```ignore
/// let mount = NexStarBuilder::new(nexstar_plus())
///     .serial_port("/dev/ttyUSB0")
///     .build()
///     .await?;
/// ```
pub struct NexStarBuilder {
    model: NexStarModel,
    serial_port: Option<String>,
    baud_rate: Option<u32>,
    command_timeout: Duration,
    safety: SafetyGate,
}

impl NexStarBuilder {
    /// Create a new builder for the given hand-controller variant.
    pub fn new(model: NexStarModel) -> Self {
        NexStarBuilder {
            model,
            serial_port: None,
            baud_rate: None,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            safety: SafetyGate::default(),
        }
    }

    /// Set the serial port path (e.g. `/dev/ttyUSB0` or `COM3`).
    pub fn serial_port(mut self, port: &str) -> Self {
        self.serial_port = Some(port.to_string());
        self
    }

    /// Override the variant's default baud rate.
    pub fn baud_rate(mut self, baud: u32) -> Self {
        self.baud_rate = Some(baud);
        self
    }

    /// Set how long to wait for the complete response to a single command
    /// (default: 2s).
    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Install the predicate consulted by the gated equatorial goto.
    pub fn safety_predicate(mut self, predicate: Box<dyn TargetSafety>) -> Self {
        self.safety = SafetyGate::new(predicate);
        self
    }

    /// Build a [`NexStarMount`] with a caller-provided transport.
    ///
    /// This is the entry point for testing (pass a `MockTransport` from
    /// `mountlib-test-harness`) and for callers that manage the transport
    /// lifecycle themselves.
    pub async fn build_with_transport(self, transport: Box<dyn Transport>) -> Result<NexStarMount> {
        if self.command_timeout.is_zero() {
            return Err(Error::InvalidParameter(
                "command_timeout must be greater than zero".into(),
            ));
        }
        Ok(NexStarMount::new(
            transport,
            self.model,
            self.command_timeout,
            self.safety,
        ))
    }

    /// Build a [`NexStarMount`] over a serial port.
    ///
    /// Requires that [`serial_port()`](Self::serial_port) has been called.
    pub async fn build(self) -> Result<NexStarMount> {
        let port = self
            .serial_port
            .as_ref()
            .ok_or_else(|| Error::InvalidParameter("serial_port is required for build()".into()))?;
        let baud = self.baud_rate.unwrap_or(self.model.default_baud_rate);

        let transport = mountlib_transport::SerialTransport::open(port, baud).await?;
        self.build_with_transport(Box::new(transport)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{nexstar_legacy, nexstar_plus, synscan};
    use crate::protocol::PrecisionWidth;
    use mountlib_core::{Manufacturer, Mount};
    use mountlib_test_harness::MockTransport;

    #[tokio::test]
    async fn builder_defaults() {
        let mount = NexStarBuilder::new(nexstar_plus())
            .build_with_transport(Box::new(MockTransport::new()))
            .await
            .unwrap();

        assert_eq!(mount.info().manufacturer, Manufacturer::Celestron);
        assert_eq!(mount.info().model_name, "NexStar+");
        assert!(
            mount
                .safety()
                .check_radec(mountlib_core::RaDec::new(0.0, -89.0))
                .is_ok()
        );
    }

    #[tokio::test]
    async fn builder_custom_settings() {
        let mount = NexStarBuilder::new(synscan())
            .serial_port("/dev/ttyUSB1")
            .baud_rate(9600)
            .command_timeout(Duration::from_millis(250))
            .build_with_transport(Box::new(MockTransport::new()))
            .await
            .unwrap();

        assert_eq!(mount.info().manufacturer, Manufacturer::SkyWatcher);
        assert_eq!(mount.info().model_id, "synscan");
    }

    #[tokio::test]
    async fn builder_zero_timeout_rejected() {
        let result = NexStarBuilder::new(nexstar_plus())
            .command_timeout(Duration::ZERO)
            .build_with_transport(Box::new(MockTransport::new()))
            .await;
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
    }

    #[tokio::test]
    async fn builder_serial_port_required_for_build() {
        let result = NexStarBuilder::new(nexstar_plus()).build().await;
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
    }

    #[tokio::test]
    async fn builder_installs_safety_predicate() {
        let mount = NexStarBuilder::new(nexstar_plus())
            .safety_predicate(Box::new(|_ra: f64, dec: f64| dec > -30.0))
            .build_with_transport(Box::new(MockTransport::new()))
            .await
            .unwrap();

        let result = mount.safe_goto_radec(10.0, -45.0).await;
        assert!(matches!(result, Err(Error::UnsafeTarget { .. })));
    }

    #[tokio::test]
    async fn builder_with_legacy_uses_16_bit_commands() {
        let mut mock = MockTransport::new();
        mock.expect(b"Z", b"8000,1000#");

        let mount = NexStarBuilder::new(nexstar_legacy())
            .build_with_transport(Box::new(mock))
            .await
            .unwrap();

        assert_eq!(mount.model().precision, PrecisionWidth::Bits16);
        let pos = mount.get_azel().await.unwrap();
        assert_eq!(pos.az, 180.0);
        assert_eq!(pos.el, 22.5);
    }
}
