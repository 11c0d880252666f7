//! NexStarMount -- the [`Mount`] trait implementation for NexStar hand
//! controllers.
//!
//! This module ties the codec ([`protocol`]) and frame builders
//! ([`commands`]) to a [`Transport`] to produce a working NexStar backend.
//!
//! Every operation is one strictly half-duplex exchange:
//!
//! ```text
//! Idle -> Sent -> AwaitingResponse -> Decoded | Failed -> Idle
//! ```
//!
//! The transport mutex is held for the whole exchange, so nothing else can
//! be written while a response is outstanding, and dropping the guard
//! returns the channel to idle on every exit path. Requests are built and
//! validated before the lock is taken; a value that cannot be encoded never
//! reaches the wire. Nothing is retried.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, trace};

use mountlib_core::error::{Error, Result};
use mountlib_core::mount::Mount;
use mountlib_core::safety::SafetyGate;
use mountlib_core::transport::Transport;
use mountlib_core::types::*;

use crate::commands::{self, PositionOpcodes};
use crate::models::NexStarModel;
use crate::protocol::{PrecisionWidth, parse_ack};

/// Largest response in the command set (a 32-bit position pair).
const MAX_RESPONSE_LEN: usize = 18;

/// Phase of a single request/response exchange, for tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExchangeState {
    Idle,
    Sent,
    AwaitingResponse,
    Decoded,
    Failed,
}

impl fmt::Display for ExchangeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExchangeState::Idle => "idle",
            ExchangeState::Sent => "sent",
            ExchangeState::AwaitingResponse => "awaiting-response",
            ExchangeState::Decoded => "decoded",
            ExchangeState::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// Report a second-axis angle (elevation, declination) as signed degrees.
///
/// The mount reports it as a fraction of a full turn, so `350` means `-10`.
fn signed_second_axis(angle: f64) -> f64 {
    if angle > 180.0 { angle - 360.0 } else { angle }
}

/// Wrap a second-axis angle in `(-90, 0)` into `(270, 360)` for encoding.
///
/// Anything else is returned unchanged, so values at or below `-90` still
/// fail in the codec with the caller's angle. A value so close to zero that
/// the wrapped angle would round to a full turn is sent as `0`.
fn unsigned_second_axis(angle: f64, width: PrecisionWidth) -> f64 {
    if angle >= 0.0 || angle <= -90.0 {
        return angle;
    }
    let wrapped = angle + 360.0;
    let full_turn = 360.0 / width.resolution();
    if (wrapped / width.resolution()).round() >= full_turn {
        0.0
    } else {
        wrapped
    }
}

/// A NexStar hand controller reached over a [`Transport`].
///
/// Constructed via [`NexStarBuilder`](crate::builder::NexStarBuilder).
pub struct NexStarMount {
    transport: Mutex<Box<dyn Transport>>,
    model: NexStarModel,
    opcodes: PositionOpcodes,
    command_timeout: Duration,
    safety: SafetyGate,
    info: MountInfo,
}

impl NexStarMount {
    /// Create a new `NexStarMount` from its constituent parts.
    ///
    /// This is called by [`NexStarBuilder`](crate::builder::NexStarBuilder);
    /// callers should use the builder API instead.
    pub(crate) fn new(
        transport: Box<dyn Transport>,
        model: NexStarModel,
        command_timeout: Duration,
        safety: SafetyGate,
    ) -> Self {
        NexStarMount {
            transport: Mutex::new(transport),
            opcodes: PositionOpcodes::for_width(model.precision),
            info: MountInfo::from(&model),
            model,
            command_timeout,
            safety,
        }
    }

    /// The variant this mount was configured with.
    pub fn model(&self) -> &NexStarModel {
        &self.model
    }

    fn width(&self) -> PrecisionWidth {
        self.model.precision
    }

    /// Close the underlying transport.
    pub async fn close(&self) -> Result<()> {
        self.transport.lock().await.close().await
    }

    /// Run one exchange and decode its response while still holding the
    /// channel.
    async fn execute<T, F>(
        &self,
        op: &'static str,
        cmd: &[u8],
        response_len: usize,
        decode: F,
    ) -> Result<T>
    where
        T: Send,
        F: FnOnce(&[u8]) -> Result<T> + Send,
    {
        let mut transport = self.transport.lock().await;
        trace!(op, state = %ExchangeState::Idle, request = ?cmd, "exchange start");

        let result = match self
            .send_and_receive(&mut **transport, op, cmd, response_len)
            .await
        {
            Ok(response) => decode(&response),
            Err(e) => Err(e),
        };

        match &result {
            Ok(_) => trace!(op, state = %ExchangeState::Decoded, "exchange complete"),
            Err(e) => debug!(op, state = %ExchangeState::Failed, error = %e, "exchange failed"),
        }
        result
    }

    /// Write `cmd`, then read exactly `response_len` bytes before the
    /// command timeout expires.
    ///
    /// Reads never ask for more than the bytes still missing, so a late
    /// byte belonging to a later exchange is never consumed here.
    async fn send_and_receive(
        &self,
        transport: &mut dyn Transport,
        op: &'static str,
        cmd: &[u8],
        response_len: usize,
    ) -> Result<Vec<u8>> {
        transport.send(cmd).await?;
        trace!(op, state = %ExchangeState::Sent, bytes = cmd.len());

        let deadline = Instant::now() + self.command_timeout;
        let mut response = Vec::with_capacity(response_len);
        let mut buf = [0u8; MAX_RESPONSE_LEN];
        trace!(op, state = %ExchangeState::AwaitingResponse, expected = response_len);

        while response.len() < response_len {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(self.timed_out(op, response.len(), response_len));
            }
            let want = (response_len - response.len()).min(buf.len());
            match transport.receive(&mut buf[..want], remaining).await {
                Ok(0) => return Err(Error::ConnectionLost),
                Ok(n) => response.extend_from_slice(&buf[..n]),
                Err(Error::Timeout) => {
                    return Err(self.timed_out(op, response.len(), response_len));
                }
                Err(e) => return Err(e),
            }
        }

        trace!(op, response = ?response, "response received");
        Ok(response)
    }

    fn timed_out(&self, op: &'static str, got: usize, expected: usize) -> Error {
        debug!(
            op,
            got,
            expected,
            timeout_ms = self.command_timeout.as_millis() as u64,
            "short response"
        );
        Error::Timeout
    }

    /// Send a command whose only response is the `#` acknowledgement.
    async fn execute_ack(&self, op: &'static str, cmd: &[u8]) -> Result<()> {
        self.execute(op, cmd, commands::ACK_RESPONSE_LEN, parse_ack)
            .await
    }

    async fn get_position(&self, op: &'static str, opcode: u8) -> Result<(f64, f64)> {
        let width = self.width();
        let (first, second) = self
            .execute(
                op,
                &commands::cmd_query(opcode),
                width.position_response_len(),
                |r| commands::parse_position(r, width),
            )
            .await?;
        Ok((first, signed_second_axis(second)))
    }

    async fn goto_command(&self, op: &'static str, opcode: u8, first: f64, second: f64) -> Result<()> {
        let frame =
            commands::build_goto_frame(
            opcode,
            first,
            unsigned_second_axis(second, self.width()),
            self.width(),
        )?;
        debug!(op, first, second, "position command");
        self.execute_ack(op, &frame).await
    }

    fn require(&self, supported: bool, op: &str) -> Result<()> {
        if supported {
            Ok(())
        } else {
            Err(Error::Unsupported(format!(
                "{op} on {} hand controllers",
                self.model.name
            )))
        }
    }
}

#[async_trait]
impl Mount for NexStarMount {
    fn info(&self) -> &MountInfo {
        &self.info
    }

    fn safety(&self) -> &SafetyGate {
        &self.safety
    }

    async fn get_azel(&self) -> Result<AzEl> {
        let (az, el) = self.get_position("get_azel", self.opcodes.get_azel).await?;
        Ok(AzEl::new(az, el))
    }

    async fn get_radec(&self) -> Result<RaDec> {
        let (ra, dec) = self
            .get_position("get_radec", self.opcodes.get_radec)
            .await?;
        Ok(RaDec::new(ra, dec))
    }

    async fn goto_azel(&self, az: f64, el: f64) -> Result<()> {
        self.goto_command("goto_azel", self.opcodes.goto_azel, az, el)
            .await
    }

    async fn goto_radec(&self, ra: f64, dec: f64) -> Result<()> {
        self.goto_command("goto_radec", self.opcodes.goto_radec, ra, dec)
            .await
    }

    async fn sync(&self, ra: f64, dec: f64) -> Result<()> {
        self.goto_command("sync", self.opcodes.sync, ra, dec).await
    }

    async fn get_tracking_mode(&self) -> Result<TrackingMode> {
        self.execute(
            "get_tracking_mode",
            &commands::cmd_query(commands::OP_GET_TRACKING_MODE),
            commands::BYTE_RESPONSE_LEN,
            commands::parse_tracking_mode,
        )
        .await
    }

    async fn set_tracking_mode(&self, mode: TrackingMode) -> Result<()> {
        debug!(%mode, "set tracking mode");
        self.execute_ack("set_tracking_mode", &commands::cmd_set_tracking_mode(mode))
            .await
    }

    async fn slew_fixed(&self, az_rate: i32, el_rate: i32) -> Result<()> {
        self.require(self.model.has_slew, "slew_fixed")?;
        let az = commands::cmd_fixed_slew(Direction::Azimuth, az_rate)?;
        let el = commands::cmd_fixed_slew(Direction::Elevation, el_rate)?;
        debug!(az_rate, el_rate, "fixed slew");
        self.execute_ack("slew_fixed", &az).await?;
        self.execute_ack("slew_fixed", &el).await
    }

    async fn slew_var(&self, az_rate: f64, el_rate: f64) -> Result<()> {
        self.require(self.model.has_slew, "slew_var")?;
        let az = commands::cmd_variable_slew(Direction::Azimuth, az_rate)?;
        let el = commands::cmd_variable_slew(Direction::Elevation, el_rate)?;
        debug!(az_rate, el_rate, "variable slew");
        self.execute_ack("slew_var", &az).await?;
        self.execute_ack("slew_var", &el).await
    }

    async fn get_location(&self) -> Result<Location> {
        self.require(self.model.has_location_time, "get_location")?;
        self.execute(
            "get_location",
            &commands::cmd_query(commands::OP_GET_LOCATION),
            commands::LOCATION_RESPONSE_LEN,
            commands::parse_location,
        )
        .await
    }

    async fn set_location(&self, location: Location) -> Result<()> {
        self.require(self.model.has_location_time, "set_location")?;
        debug!(%location, "set location");
        self.execute_ack("set_location", &commands::cmd_set_location(&location))
            .await
    }

    async fn get_time(&self) -> Result<TimeFields> {
        self.require(self.model.has_location_time, "get_time")?;
        self.execute(
            "get_time",
            &commands::cmd_query(commands::OP_GET_TIME),
            commands::TIME_RESPONSE_LEN,
            commands::parse_time,
        )
        .await
    }

    async fn set_time(&self, time: TimeFields) -> Result<()> {
        self.require(self.model.has_location_time, "set_time")?;
        debug!(%time, "set time");
        self.execute_ack("set_time", &commands::cmd_set_time(&time))
            .await
    }

    async fn get_version(&self) -> Result<FirmwareVersion> {
        self.execute(
            "get_version",
            &commands::cmd_query(commands::OP_GET_VERSION),
            commands::VERSION_RESPONSE_LEN,
            commands::parse_version,
        )
        .await
    }

    async fn get_model(&self) -> Result<MountModel> {
        self.require(self.model.has_model_query, "get_model")?;
        self.execute(
            "get_model",
            &commands::cmd_query(commands::OP_GET_MODEL),
            commands::BYTE_RESPONSE_LEN,
            commands::parse_model,
        )
        .await
    }

    async fn echo(&self, byte: u8) -> Result<u8> {
        self.execute(
            "echo",
            &commands::cmd_echo(byte),
            commands::BYTE_RESPONSE_LEN,
            commands::parse_byte,
        )
        .await
    }

    async fn alignment_complete(&self) -> Result<bool> {
        self.execute(
            "alignment_complete",
            &commands::cmd_query(commands::OP_ALIGNMENT_COMPLETE),
            commands::BYTE_RESPONSE_LEN,
            commands::parse_flag,
        )
        .await
    }

    async fn goto_in_progress(&self) -> Result<bool> {
        self.execute(
            "goto_in_progress",
            &commands::cmd_query(commands::OP_GOTO_IN_PROGRESS),
            commands::BYTE_RESPONSE_LEN,
            commands::parse_flag,
        )
        .await
    }

    async fn cancel_goto(&self) -> Result<()> {
        debug!("cancel goto");
        self.execute_ack("cancel_goto", &commands::cmd_query(commands::OP_CANCEL_GOTO))
            .await
    }
}
