//! # mountlib -- Telescope Mount Control
//!
//! `mountlib` is an asynchronous Rust library for driving computerized
//! telescope mounts through their hand controllers. It is aimed at
//! planetarium front ends, observatory automation, and small command-line
//! tools that point a telescope and read back where it is.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! mountlib = "0.1"
//! tokio = { version = "1", features = ["full"] }
//! ```
//!
//! Connect to a NexStar hand controller and read its position:
//!
//! ```no_run
//! use mountlib::Mount;
//! use mountlib::nexstar::{NexStarBuilder, models::nexstar_plus};
//!
//! #[tokio::main]
//! async fn main() -> mountlib::Result<()> {
//!     let mount = NexStarBuilder::new(nexstar_plus())
//!         .serial_port("/dev/ttyUSB0")
//!         .build()
//!         .await?;
//!
//!     let position = mount.get_azel().await?;
//!     println!("pointing at {position}");
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! | Crate                  | Purpose                                         |
//! |------------------------|-------------------------------------------------|
//! | `mountlib-core`        | [`Mount`] trait, safety gate, types, errors     |
//! | `mountlib-transport`   | Serial transport                                |
//! | `mountlib-nexstar`     | Celestron NexStar / SynScan protocol driver     |
//! | **`mountlib`**         | This facade crate -- re-exports everything      |
//!
//! ## Safety
//!
//! The plain [`goto_azel`](Mount::goto_azel) and
//! [`goto_radec`](Mount::goto_radec) send exactly what they are given. The
//! gated [`safe_goto_azel`](Mount::safe_goto_azel) and
//! [`safe_goto_radec`](Mount::safe_goto_radec) first reject targets above
//! the zenith or refused by the configured [`TargetSafety`] predicate, then
//! require the mount to report its alignment complete.
//!
//! ## Feature Flags
//!
//! | Feature   | Enables                              | Default |
//! |-----------|--------------------------------------|---------|
//! | `nexstar` | [`nexstar`] module (NexStar serial)  | yes     |
//! | `full`    | All protocol backends                | no      |

pub use mountlib_core::*;

/// Transport implementations.
pub mod transport {
    pub use mountlib_core::transport::Transport;
    pub use mountlib_transport::*;
}

/// Celestron NexStar serial protocol backend.
///
/// Provides [`NexStarMount`](nexstar::NexStarMount) and
/// [`NexStarBuilder`](nexstar::NexStarBuilder) for NexStar+, SLT, and
/// SynScan hand controllers, including the 16-bit command set of early
/// firmware.
#[cfg(feature = "nexstar")]
pub mod nexstar {
    pub use mountlib_nexstar::*;
}

/// All hand-controller variants supported by the enabled backends.
///
/// # Example
///
/// ```
/// for mount in mountlib::supported_mounts() {
///     println!("{} {} ({})", mount.manufacturer, mount.model_name, mount.model_id);
/// }
/// ```
pub fn supported_mounts() -> Vec<MountInfo> {
    #[allow(unused_mut)]
    let mut mounts = Vec::new();

    #[cfg(feature = "nexstar")]
    {
        mounts.extend(
            nexstar::models::all_nexstar_models()
                .iter()
                .map(MountInfo::from),
        );
    }

    mounts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "nexstar")]
    #[test]
    fn supported_mounts_lists_nexstar_variants() {
        let mounts = supported_mounts();
        assert_eq!(mounts.len(), 4);
        assert!(mounts.iter().any(|m| m.model_id == "nexstar-plus"));
        assert!(
            mounts
                .iter()
                .any(|m| m.manufacturer == Manufacturer::SkyWatcher)
        );
    }

    #[test]
    fn model_ids_unique() {
        let mounts = supported_mounts();
        for (i, a) in mounts.iter().enumerate() {
            for b in &mounts[i + 1..] {
                assert_ne!(a.model_id, b.model_id);
            }
        }
    }
}
