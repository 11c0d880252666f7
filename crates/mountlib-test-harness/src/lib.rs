//! mountlib-test-harness: Test utilities and mock transports for mountlib.
//!
//! This crate provides [`MockTransport`] for deterministic unit testing of
//! protocol engines without a real hand controller, and [`SentLog`] for
//! inspecting what reached the wire after the mock has been moved into a
//! mount.

pub mod mock_serial;

pub use mock_serial::{MockTransport, SentLog};
