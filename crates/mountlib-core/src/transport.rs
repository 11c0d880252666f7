//! Transport trait for mount communication.
//!
//! The [`Transport`] trait abstracts over the already-open duplex byte
//! channel to a telescope hand controller. The protocol engine in
//! `mountlib-nexstar` operates on a `Transport` rather than directly on a
//! serial port, enabling both real hardware control and deterministic unit
//! testing with `MockTransport` from the `mountlib-test-harness` crate.
//!
//! Opening and configuring the channel (device path, baud rate) is the job
//! of the concrete implementation, not of the protocol engine.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;

/// Asynchronous byte-level transport to a mount.
///
/// Implementations handle buffering and error recovery at the physical
/// layer. Framing and response validation are handled by the protocol
/// engine that consumes this trait.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send raw bytes to the mount.
    ///
    /// Implementations should not return until all bytes have been handed
    /// to the underlying transport.
    async fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Receive bytes from the mount into the provided buffer.
    ///
    /// Returns the number of bytes actually read, which may be fewer than
    /// `buf.len()`. Waits up to `timeout` for data to arrive; returns
    /// [`Error::Timeout`](crate::error::Error::Timeout) if nothing is
    /// received within the deadline.
    async fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize>;

    /// Close the transport connection.
    ///
    /// After calling `close()`, subsequent `send()` and `receive()` calls
    /// should return [`Error::NotConnected`](crate::error::Error::NotConnected).
    async fn close(&mut self) -> Result<()>;

    /// Check whether the transport is currently connected.
    fn is_connected(&self) -> bool;
}
