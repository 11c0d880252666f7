//! mountlib-core: Core traits, types, and error definitions for mountlib.
//!
//! This crate defines the protocol-agnostic abstractions that mountlib
//! backends implement. Applications depend on these types without pulling
//! in a specific hand-controller driver.
//!
//! # Key types
//!
//! - [`Mount`] -- the unified trait for controlling a telescope mount
//! - [`Transport`] -- byte-level communication channel
//! - [`SafetyGate`] / [`TargetSafety`] -- pre-flight motion policy
//! - [`SkyTransform`] / [`Observer`] -- boundary to an astronomy library
//! - [`Error`] / [`Result`] -- error handling

pub mod error;
pub mod helpers;
pub mod mount;
pub mod safety;
pub mod sky;
pub mod transport;
pub mod types;

// Re-export key types at crate root for ergonomic `use mountlib_core::*`.
pub use error::{Error, Result};
pub use helpers::{
    degrees_to_dms, dms_to_degrees, location_from_degrees, location_to_degrees,
    time_fields_from_datetime, time_fields_to_datetime,
};
pub use mount::Mount;
pub use safety::{AllowAll, MAX_ELEVATION, MIN_ELEVATION, SafetyGate, TargetSafety, check_elevation, normalize_azimuth};
pub use sky::{Observer, SkyTransform};
pub use transport::Transport;
pub use types::*;
