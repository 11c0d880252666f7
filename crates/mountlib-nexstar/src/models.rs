//! NexStar hand-controller variants.
//!
//! All NexStar-family hand controllers speak the same command framing, but
//! they differ in the precision of position commands and in which commands
//! the firmware implements. Each variant is described by a [`NexStarModel`].
//!
//! | Variant            | Precision | Location/time | Slew | Model query |
//! |--------------------|-----------|---------------|------|-------------|
//! | NexStar+           | 32-bit    | yes           | yes  | yes         |
//! | SLT                | 32-bit    | yes           | yes  | yes         |
//! | SynScan            | 32-bit    | yes           | yes  | yes         |
//! | Legacy (pre-1.6)   | 16-bit    | no            | no   | no          |
//!
//! All variants default to 9600 baud, 8N1.

use mountlib_core::{Manufacturer, MountInfo};

use crate::protocol::PrecisionWidth;

/// Static description of one hand-controller variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NexStarModel {
    /// Human-readable variant name (e.g. "NexStar+").
    pub name: &'static str,
    /// Machine-readable identifier.
    pub model_id: &'static str,
    pub manufacturer: Manufacturer,
    /// Serial baud rate. The protocol fixes this at 9600.
    pub default_baud_rate: u32,
    /// Width of goto/sync/position values.
    pub precision: PrecisionWidth,
    /// Whether the `w`/`W`/`h`/`H` location and time commands exist.
    pub has_location_time: bool,
    /// Whether pass-through slew commands (`P`) exist.
    pub has_slew: bool,
    /// Whether the `m` model query exists.
    pub has_model_query: bool,
}

impl From<&NexStarModel> for MountInfo {
    fn from(model: &NexStarModel) -> Self {
        MountInfo {
            manufacturer: model.manufacturer,
            model_name: model.name.to_string(),
            model_id: model.model_id.to_string(),
        }
    }
}

/// Current Celestron NexStar+ hand controller.
pub fn nexstar_plus() -> NexStarModel {
    NexStarModel {
        name: "NexStar+",
        model_id: "nexstar-plus",
        manufacturer: Manufacturer::Celestron,
        default_baud_rate: 9600,
        precision: PrecisionWidth::Bits32,
        has_location_time: true,
        has_slew: true,
        has_model_query: true,
    }
}

/// Celestron SLT series computerized mounts.
pub fn nexstar_slt() -> NexStarModel {
    NexStarModel {
        name: "NexStar SLT",
        model_id: "nexstar-slt",
        ..nexstar_plus()
    }
}

/// Sky-Watcher SynScan hand controllers in NexStar-compatible mode.
pub fn synscan() -> NexStarModel {
    NexStarModel {
        name: "SynScan",
        model_id: "synscan",
        manufacturer: Manufacturer::SkyWatcher,
        ..nexstar_plus()
    }
}

/// Early hand controllers with 16-bit positions and no location, time,
/// slew, or model commands.
pub fn nexstar_legacy() -> NexStarModel {
    NexStarModel {
        name: "NexStar (legacy)",
        model_id: "nexstar-legacy",
        manufacturer: Manufacturer::Celestron,
        default_baud_rate: 9600,
        precision: PrecisionWidth::Bits16,
        has_location_time: false,
        has_slew: false,
        has_model_query: false,
    }
}

/// All supported variants.
pub fn all_nexstar_models() -> Vec<NexStarModel> {
    vec![nexstar_plus(), nexstar_slt(), synscan(), nexstar_legacy()]
}

/// Look up a variant by its `model_id` or name, case-insensitively.
pub fn find_model(name: &str) -> Option<NexStarModel> {
    all_nexstar_models()
        .into_iter()
        .find(|m| m.model_id.eq_ignore_ascii_case(name) || m.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_models_at_9600_baud() {
        for model in all_nexstar_models() {
            assert_eq!(model.default_baud_rate, 9600, "{}", model.name);
        }
    }

    #[test]
    fn model_ids_unique() {
        let models = all_nexstar_models();
        for (i, a) in models.iter().enumerate() {
            for b in &models[i + 1..] {
                assert_ne!(a.model_id, b.model_id);
            }
        }
    }

    #[test]
    fn precise_variants() {
        assert_eq!(nexstar_plus().precision, PrecisionWidth::Bits32);
        assert_eq!(nexstar_slt().precision, PrecisionWidth::Bits32);
        assert_eq!(synscan().manufacturer, Manufacturer::SkyWatcher);
    }

    #[test]
    fn legacy_command_set() {
        let legacy = nexstar_legacy();
        assert_eq!(legacy.precision, PrecisionWidth::Bits16);
        assert!(!legacy.has_location_time);
        assert!(!legacy.has_slew);
        assert!(!legacy.has_model_query);
    }

    #[test]
    fn mount_info_from_model() {
        let info = MountInfo::from(&synscan());
        assert_eq!(info.manufacturer, Manufacturer::SkyWatcher);
        assert_eq!(info.model_name, "SynScan");
        assert_eq!(info.model_id, "synscan");
    }

    #[test]
    fn find_model_by_id_or_name() {
        assert_eq!(find_model("nexstar-slt").unwrap().name, "NexStar SLT");
        assert_eq!(find_model("SYNSCAN").unwrap().model_id, "synscan");
        assert_eq!(find_model("NexStar+").unwrap().model_id, "nexstar-plus");
        assert!(find_model("lx200").is_none());
    }
}
