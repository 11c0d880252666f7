//! Celestron NexStar hand-controller backend for mountlib.
//!
//! This crate implements the NexStar serial protocol spoken by Celestron
//! NexStar/SLT hand controllers and Sky-Watcher SynScan controllers in
//! compatibility mode. It provides:
//!
//! - **Angle codec** ([`protocol`]) -- encode and decode the hexadecimal
//!   fraction-of-a-revolution values used by goto and position commands,
//!   plus acknowledgement and terminator checks.
//! - **Command builders** ([`commands`]) -- construct request frames for
//!   every operation and parse the fixed-length responses.
//! - **Variant definitions** ([`models`]) -- precision and command-set
//!   differences between hand-controller generations.
//! - **Mount driver** ([`mount`]) -- full [`Mount`](mountlib_core::Mount)
//!   trait implementation over a serialized request/response channel.
//! - **Builder** ([`builder`]) -- fluent builder API for constructing
//!   [`NexStarMount`] instances.
//!
//! # Wire format at a glance
//!
//! - Requests are an opcode byte followed by arguments, with no terminator.
//! - Responses have a fixed length per command and end with `#`.
//! - Lowercase opcodes (`z`, `b`, `e`, `r`, `s`) carry 32-bit values as 8
//!   hex digits; uppercase ones carry 16-bit values as 4 hex digits.
//!
//! # Example
//!
//! ```
//! use mountlib_nexstar::commands::{build_goto_frame, parse_position, OP_GOTO_AZEL_PRECISE};
//! use mountlib_nexstar::protocol::PrecisionWidth;
//!
//! // Build a precise alt/az goto request.
//! let frame = build_goto_frame(OP_GOTO_AZEL_PRECISE, 180.0, 30.0, PrecisionWidth::Bits32).unwrap();
//! assert_eq!(&frame[..10], b"b80000000,");
//!
//! // Decode a position response from the hand controller.
//! let (az, el) = parse_position(b"40000000,20000000#", PrecisionWidth::Bits32).unwrap();
//! assert_eq!((az, el), (90.0, 45.0));
//! ```

pub mod builder;
pub mod commands;
pub mod models;
pub mod mount;
pub mod protocol;

// Re-export the primary types for ergonomic `use mountlib_nexstar::*`.
pub use builder::NexStarBuilder;
pub use models::NexStarModel;
pub use mount::NexStarMount;
pub use protocol::PrecisionWidth;
