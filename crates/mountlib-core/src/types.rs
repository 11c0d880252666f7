//! Core types used throughout mountlib.
//!
//! These are plain value types. None of them caches device state: every
//! value returned by a [`Mount`](crate::Mount) was read from the mount by
//! the call that returned it.

use std::fmt;
use std::str::FromStr;

/// Mount axis selected by a slew command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Azimuth (or right ascension on an equatorial mount).
    Azimuth,
    /// Elevation (or declination on an equatorial mount).
    Elevation,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Azimuth => write!(f, "azimuth"),
            Direction::Elevation => write!(f, "elevation"),
        }
    }
}

/// A pointing position in the local horizon frame, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AzEl {
    /// Azimuth, `[0, 360)`.
    pub az: f64,
    /// Elevation (altitude), `(-90, 90]`.
    pub el: f64,
}

impl AzEl {
    pub fn new(az: f64, el: f64) -> Self {
        AzEl { az, el }
    }
}

impl fmt::Display for AzEl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "az {:.6}, el {:.6}", self.az, self.el)
    }
}

/// A pointing position in the equatorial frame, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaDec {
    /// Right ascension in degrees, `[0, 360)`.
    pub ra: f64,
    /// Declination in degrees, `(-90, 90]`.
    pub dec: f64,
}

impl RaDec {
    pub fn new(ra: f64, dec: f64) -> Self {
        RaDec { ra, dec }
    }
}

impl fmt::Display for RaDec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ra {:.6}, dec {:.6}", self.ra, self.dec)
    }
}

/// Tracking mode reported and accepted by the hand controller.
///
/// Codes outside the documented range are preserved in
/// [`Unknown`](TrackingMode::Unknown) rather than rejected, so a newer
/// firmware never makes `get_tracking_mode` fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackingMode {
    /// Tracking disabled.
    Off,
    /// Alt-azimuth tracking.
    AltAz,
    /// Equatorial tracking, northern hemisphere.
    EqNorth,
    /// Equatorial tracking, southern hemisphere.
    EqSouth,
    /// A code not covered by the variants above.
    Unknown(u8),
}

impl TrackingMode {
    /// The protocol byte for this mode.
    pub fn code(&self) -> u8 {
        match self {
            TrackingMode::Off => 0,
            TrackingMode::AltAz => 1,
            TrackingMode::EqNorth => 2,
            TrackingMode::EqSouth => 3,
            TrackingMode::Unknown(code) => *code,
        }
    }
}

impl From<u8> for TrackingMode {
    fn from(code: u8) -> Self {
        match code {
            0 => TrackingMode::Off,
            1 => TrackingMode::AltAz,
            2 => TrackingMode::EqNorth,
            3 => TrackingMode::EqSouth,
            other => TrackingMode::Unknown(other),
        }
    }
}

impl fmt::Display for TrackingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackingMode::Off => write!(f, "off"),
            TrackingMode::AltAz => write!(f, "alt-az"),
            TrackingMode::EqNorth => write!(f, "eq-north"),
            TrackingMode::EqSouth => write!(f, "eq-south"),
            TrackingMode::Unknown(code) => write!(f, "unknown({code})"),
        }
    }
}

/// Error returned when a string cannot be parsed into a [`TrackingMode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTrackingModeError(String);

impl fmt::Display for ParseTrackingModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown tracking mode: {}", self.0)
    }
}

impl std::error::Error for ParseTrackingModeError {}

impl FromStr for TrackingMode {
    type Err = ParseTrackingModeError;

    /// Accepts the display names (`off`, `alt-az`, `eq-north`, `eq-south`)
    /// or a raw numeric code.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "off" => Ok(TrackingMode::Off),
            "alt-az" | "altaz" => Ok(TrackingMode::AltAz),
            "eq-north" | "eqnorth" => Ok(TrackingMode::EqNorth),
            "eq-south" | "eqsouth" => Ok(TrackingMode::EqSouth),
            other => other
                .parse::<u8>()
                .map(TrackingMode::from)
                .map_err(|_| ParseTrackingModeError(s.to_string())),
        }
    }
}

/// One axis of a stored location in degree/minute/second form.
///
/// `negative` is the hemisphere flag: `false` for north/east, `true` for
/// south/west. On the wire it is byte 3 of the axis tuple, where zero means
/// positive and any nonzero value means negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DmsAngle {
    pub degrees: u8,
    pub minutes: u8,
    pub seconds: u8,
    pub negative: bool,
}

impl DmsAngle {
    pub fn new(degrees: u8, minutes: u8, seconds: u8, negative: bool) -> Self {
        DmsAngle {
            degrees,
            minutes,
            seconds,
            negative,
        }
    }

    /// The four wire bytes `[deg, min, sec, flag]`.
    pub fn to_bytes(&self) -> [u8; 4] {
        [
            self.degrees,
            self.minutes,
            self.seconds,
            u8::from(self.negative),
        ]
    }

    /// Interpret four wire bytes `[deg, min, sec, flag]`.
    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        DmsAngle {
            degrees: bytes[0],
            minutes: bytes[1],
            seconds: bytes[2],
            negative: bytes[3] != 0,
        }
    }
}

/// Observing site stored in the hand controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Location {
    pub latitude: DmsAngle,
    pub longitude: DmsAngle,
}

impl Location {
    pub fn new(latitude: DmsAngle, longitude: DmsAngle) -> Self {
        Location {
            latitude,
            longitude,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lat = &self.latitude;
        let lon = &self.longitude;
        write!(
            f,
            "{} {}'{}\" {}, {} {}'{}\" {}",
            lat.degrees,
            lat.minutes,
            lat.seconds,
            if lat.negative { 'S' } else { 'N' },
            lon.degrees,
            lon.minutes,
            lon.seconds,
            if lon.negative { 'W' } else { 'E' },
        )
    }
}

/// Date and time stored in the hand controller.
///
/// Field order matches the wire order of the `h`/`H` commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TimeFields {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub month: u8,
    pub day: u8,
    /// Two-digit year, counted from 2000.
    pub year: u8,
    /// Offset from UTC in whole hours.
    pub utc_offset: i8,
    /// Daylight saving time in effect.
    pub dst: bool,
}

impl TimeFields {
    /// The eight wire bytes. The UTC offset is sent as a two's-complement
    /// byte (`-5` becomes `251`).
    pub fn to_bytes(&self) -> [u8; 8] {
        [
            self.hour,
            self.minute,
            self.second,
            self.month,
            self.day,
            self.year,
            self.utc_offset as u8,
            u8::from(self.dst),
        ]
    }

    /// Interpret eight wire bytes.
    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        TimeFields {
            hour: bytes[0],
            minute: bytes[1],
            second: bytes[2],
            month: bytes[3],
            day: bytes[4],
            year: bytes[5],
            utc_offset: bytes[6] as i8,
            dst: bytes[7] != 0,
        }
    }
}

impl fmt::Display for TimeFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "20{:02}-{:02}-{:02}T{:02}:{:02}:{:02} UTC{:+}{}",
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
            self.utc_offset,
            if self.dst { " DST" } else { "" },
        )
    }
}

/// Hand-controller firmware version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FirmwareVersion {
    pub major: u8,
    pub minor: u8,
}

impl FirmwareVersion {
    pub fn new(major: u8, minor: u8) -> Self {
        FirmwareVersion { major, minor }
    }

    /// The version as a single number, `major + minor / 10`.
    pub fn as_f64(&self) -> f64 {
        f64::from(self.major) + f64::from(self.minor) / 10.0
    }
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Mount model identifier reported by the `m` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MountModel(pub u8);

impl MountModel {
    /// The raw model byte.
    pub fn id(&self) -> u8 {
        self.0
    }

    /// The product name for known model ids.
    pub fn name(&self) -> Option<&'static str> {
        let name = match self.0 {
            1 => "GPS Series",
            3 => "i-Series",
            4 => "i-Series SE",
            5 => "CGE",
            6 => "Advanced GT",
            7 => "SLT",
            9 => "CPC",
            10 => "GT",
            11 => "NexStar 4/5 SE",
            12 => "NexStar 6/8 SE",
            13 => "CGE Pro",
            14 => "CGEM DX",
            15 => "LCM",
            16 => "Sky Prodigy",
            17 => "CPC Deluxe",
            18 => "GT 16",
            19 => "StarSeeker",
            20 => "Advanced VX",
            21 => "Cosmos",
            22 => "Evolution",
            23 => "CGX",
            24 => "CGXL",
            25 => "Astrofi",
            26 => "SkyWatcher",
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Display for MountModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name} ({})", self.0),
            None => write!(f, "unknown model ({})", self.0),
        }
    }
}

/// Mount manufacturer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Manufacturer {
    Celestron,
    /// Sky-Watcher SynScan hand controllers, which accept the NexStar
    /// command set.
    SkyWatcher,
}

impl fmt::Display for Manufacturer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Manufacturer::Celestron => write!(f, "Celestron"),
            Manufacturer::SkyWatcher => write!(f, "Sky-Watcher"),
        }
    }
}

/// Static information about a configured mount driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountInfo {
    pub manufacturer: Manufacturer,
    /// Human-readable name of the driver variant (e.g. "NexStar+").
    pub model_name: String,
    /// Machine-readable identifier of the driver variant.
    pub model_id: String,
}
