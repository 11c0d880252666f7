//! Transport implementations for mountlib.
//!
//! This crate provides the concrete [`Transport`](mountlib_core::Transport)
//! used to reach a hand controller:
//!
//! - [`SerialTransport`]: RS-232 and USB-serial connections
//!
//! Anything else that can move bytes (a network-to-serial bridge, a test
//! double) only needs to implement the trait.

pub mod serial;

pub use serial::{DataBits, FlowControl, Parity, SerialConfig, SerialTransport, StopBits};
