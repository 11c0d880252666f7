// nexstar -- command-line control of a NexStar hand controller.
//
// Each flag maps onto one mount operation; exactly one is given per run.
//
// Usage:
//   nexstar --get_azel
//   nexstar -d /dev/ttyUSB1 --goto_azel 180 30
//   nexstar --set_location 40.446 -79.982
//   nexstar --set_location 40,26,46,0 79,58,56,1
//   nexstar --set_time now
//   nexstar --set_time 21,30,0,10,14,26,-5,1
//   nexstar --model nexstar-legacy --get_version
//   NEXSTAR_DEVICE=/dev/ttyACM0 nexstar -vv --alignment_complete

use std::io::{self, Write};
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use clap::{ArgAction, ArgGroup, Parser};
use tracing_subscriber::EnvFilter;

use mountlib::nexstar::NexStarBuilder;
use mountlib::nexstar::models;
use mountlib::{
    DmsAngle, Location, Mount, TimeFields, TrackingMode, degrees_to_dms, time_fields_from_datetime,
    time_fields_to_datetime,
};

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// Control a Celestron NexStar or Sky-Watcher SynScan mount over serial.
#[derive(Parser, Debug)]
#[command(name = "nexstar", version, about)]
#[command(group(ArgGroup::new("op").required(true).multiple(false)))]
struct Cli {
    /// Serial device the hand controller is connected to.
    #[arg(short = 'd', long, env = "NEXSTAR_DEVICE", default_value = "/dev/ttyUSB0")]
    device: String,

    /// Hand-controller variant (nexstar-plus, nexstar-slt, synscan, nexstar-legacy).
    #[arg(long, default_value = "nexstar-plus")]
    model: String,

    /// Override the variant's baud rate.
    #[arg(long)]
    baud: Option<u32>,

    /// Time to wait for each response, in milliseconds.
    #[arg(long, default_value_t = 2000)]
    timeout_ms: u64,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    // Operations. The horizon-frame helpers (`Mount::radec_via_horizon`,
    // `Mount::goto_radec_via_horizon`) need a `SkyTransform` and are library-only.
    #[arg(long = "get_azel", group = "op")]
    get_azel: bool,

    #[arg(long = "get_radec", group = "op")]
    get_radec: bool,

    /// Gated alt/az goto.
    #[arg(long = "goto_azel", group = "op", num_args = 2, value_names = ["AZ", "EL"],
          allow_negative_numbers = true)]
    goto_azel: Option<Vec<f64>>,

    /// Gated equatorial goto.
    #[arg(long = "goto_radec", group = "op", num_args = 2, value_names = ["RA", "DEC"],
          allow_negative_numbers = true)]
    goto_radec: Option<Vec<f64>>,

    #[arg(long = "sync", group = "op", num_args = 2, value_names = ["RA", "DEC"],
          allow_negative_numbers = true)]
    sync: Option<Vec<f64>>,

    #[arg(long = "get_tracking_mode", group = "op")]
    get_tracking_mode: bool,

    /// off, alt-az, eq-north, eq-south, or a numeric code.
    #[arg(long = "set_tracking_mode", group = "op", value_name = "MODE")]
    set_tracking_mode: Option<TrackingMode>,

    /// Fixed-rate slew, each rate in -9..=9.
    #[arg(long = "slew_fixed", group = "op", num_args = 2,
          value_names = ["AZ_RATE", "EL_RATE"], allow_negative_numbers = true)]
    slew_fixed: Option<Vec<i32>>,

    /// Variable-rate slew in arcseconds per second.
    #[arg(long = "slew_var", group = "op", num_args = 2,
          value_names = ["AZ_RATE", "EL_RATE"], allow_negative_numbers = true)]
    slew_var: Option<Vec<f64>>,

    #[arg(long = "get_location", group = "op")]
    get_location: bool,

    /// Signed decimal degrees, or deg,min,sec,flag with flag 1 for S/W.
    #[arg(long = "set_location", group = "op", num_args = 2,
          value_names = ["LAT", "LON"], allow_hyphen_values = true)]
    set_location: Option<Vec<String>>,

    #[arg(long = "get_time", group = "op")]
    get_time: bool,

    /// `now`, or H,M,S,MONTH,DAY,YEAR,UTC_OFFSET,DST.
    #[arg(long = "set_time", group = "op", value_name = "TIME", allow_hyphen_values = true)]
    set_time: Option<String>,

    #[arg(long = "get_version", group = "op")]
    get_version: bool,

    #[arg(long = "get_model", group = "op")]
    get_model: bool,

    /// Echo a single character through the hand controller.
    #[arg(long = "echo", group = "op", value_name = "CHAR")]
    echo: Option<String>,

    #[arg(long = "alignment_complete", group = "op")]
    alignment_complete: bool,

    #[arg(long = "goto_in_progress", group = "op")]
    goto_in_progress: bool,

    #[arg(long = "cancel_goto", group = "op")]
    cancel_goto: bool,
}

/// The single mount operation requested on the command line.
#[derive(Debug, Clone, PartialEq)]
enum Operation {
    GetAzel,
    GetRadec,
    GotoAzel(f64, f64),
    GotoRadec(f64, f64),
    Sync(f64, f64),
    GetTrackingMode,
    SetTrackingMode(TrackingMode),
    SlewFixed(i32, i32),
    SlewVar(f64, f64),
    GetLocation,
    SetLocation(Location),
    GetTime,
    SetTime(TimeFields),
    GetVersion,
    GetModel,
    Echo(String),
    AlignmentComplete,
    GotoInProgress,
    CancelGoto,
}

fn pair<T: Copy>(values: &[T]) -> (T, T) {
    (values[0], values[1])
}

impl Cli {
    fn operation(&self) -> Result<Operation> {
        let op = if self.get_azel {
            Operation::GetAzel
        } else if self.get_radec {
            Operation::GetRadec
        } else if let Some(v) = &self.goto_azel {
            let (az, el) = pair(v);
            Operation::GotoAzel(az, el)
        } else if let Some(v) = &self.goto_radec {
            let (ra, dec) = pair(v);
            Operation::GotoRadec(ra, dec)
        } else if let Some(v) = &self.sync {
            let (ra, dec) = pair(v);
            Operation::Sync(ra, dec)
        } else if self.get_tracking_mode {
            Operation::GetTrackingMode
        } else if let Some(mode) = self.set_tracking_mode {
            Operation::SetTrackingMode(mode)
        } else if let Some(v) = &self.slew_fixed {
            let (az, el) = pair(v);
            Operation::SlewFixed(az, el)
        } else if let Some(v) = &self.slew_var {
            let (az, el) = pair(v);
            Operation::SlewVar(az, el)
        } else if self.get_location {
            Operation::GetLocation
        } else if let Some(v) = &self.set_location {
            Operation::SetLocation(parse_location(&v[0], &v[1])?)
        } else if self.get_time {
            Operation::GetTime
        } else if let Some(t) = &self.set_time {
            Operation::SetTime(parse_time(t)?)
        } else if self.get_version {
            Operation::GetVersion
        } else if self.get_model {
            Operation::GetModel
        } else if let Some(c) = &self.echo {
            Operation::Echo(c.clone())
        } else if self.alignment_complete {
            Operation::AlignmentComplete
        } else if self.goto_in_progress {
            Operation::GotoInProgress
        } else if self.cancel_goto {
            Operation::CancelGoto
        } else {
            bail!("no operation given");
        };
        Ok(op)
    }
}

// ---------------------------------------------------------------------------
// Argument parsing helpers
// ---------------------------------------------------------------------------

/// One location axis: signed decimal degrees or `deg,min,sec,flag`.
fn parse_axis(value: &str, limit: f64, name: &str) -> Result<DmsAngle> {
    if !value.contains(',') {
        let degrees: f64 = value
            .trim()
            .parse()
            .with_context(|| format!("invalid {name} {value:?}"))?;
        return degrees_to_dms(degrees, limit).with_context(|| format!("invalid {name}"));
    }

    let parts = value
        .split(',')
        .map(|p| p.trim().parse::<u8>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("invalid {name} {value:?}: expected deg,min,sec,flag"))?;
    let [degrees, minutes, seconds, flag] = parts[..] else {
        bail!("invalid {name} {value:?}: expected deg,min,sec,flag");
    };
    if f64::from(degrees) > limit || minutes >= 60 || seconds >= 60 {
        bail!("{name} {value:?} out of range");
    }
    Ok(DmsAngle::new(degrees, minutes, seconds, flag != 0))
}

fn parse_location(latitude: &str, longitude: &str) -> Result<Location> {
    Ok(Location::new(
        parse_axis(latitude, 90.0, "latitude")?,
        parse_axis(longitude, 180.0, "longitude")?,
    ))
}

/// `now`, or eight comma-separated fields in wire order.
///
/// The year may be given as two digits or as a full year from 2000.
fn parse_time(value: &str) -> Result<TimeFields> {
    if value.eq_ignore_ascii_case("now") {
        let now = chrono::Local::now().fixed_offset();
        return time_fields_from_datetime(&now, false).context("cannot store current time");
    }

    let parts = value
        .split(',')
        .map(|p| p.trim().parse::<i32>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("invalid time {value:?}"))?;
    let [hour, minute, second, month, day, year, offset, dst] = parts[..] else {
        bail!("invalid time {value:?}: expected H,M,S,MONTH,DAY,YEAR,UTC_OFFSET,DST");
    };
    let year = if year >= 2000 { year - 2000 } else { year };

    let byte = |v: i32, what: &str| {
        u8::try_from(v).map_err(|_| anyhow!("{what} {v} out of range"))
    };
    let fields = TimeFields {
        hour: byte(hour, "hour")?,
        minute: byte(minute, "minute")?,
        second: byte(second, "second")?,
        month: byte(month, "month")?,
        day: byte(day, "day")?,
        year: byte(year, "year")?,
        utc_offset: i8::try_from(offset).map_err(|_| anyhow!("UTC offset {offset} out of range"))?,
        dst: dst != 0,
    };
    time_fields_to_datetime(&fields).with_context(|| format!("invalid time {value:?}"))?;
    Ok(fields)
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

async fn execute(mount: &dyn Mount, op: &Operation, out: &mut dyn Write) -> Result<()> {
    match op {
        Operation::GetAzel => {
            let pos = mount.get_azel().await?;
            writeln!(out, "{} {}", pos.az, pos.el)?;
        }
        Operation::GetRadec => {
            let pos = mount.get_radec().await?;
            writeln!(out, "{} {}", pos.ra, pos.dec)?;
        }
        Operation::GotoAzel(az, el) => mount.safe_goto_azel(*az, *el).await?,
        Operation::GotoRadec(ra, dec) => mount.safe_goto_radec(*ra, *dec).await?,
        Operation::Sync(ra, dec) => mount.sync(*ra, *dec).await?,
        Operation::GetTrackingMode => {
            writeln!(out, "{}", mount.get_tracking_mode().await?)?;
        }
        Operation::SetTrackingMode(mode) => mount.set_tracking_mode(*mode).await?,
        Operation::SlewFixed(az, el) => mount.slew_fixed(*az, *el).await?,
        Operation::SlewVar(az, el) => mount.slew_var(*az, *el).await?,
        Operation::GetLocation => {
            let location = mount.get_location().await?;
            let (lat, lon) = mountlib::location_to_degrees(&location);
            writeln!(out, "{location} ({lat:.6}, {lon:.6})")?;
        }
        Operation::SetLocation(location) => mount.set_location(*location).await?,
        Operation::GetTime => {
            writeln!(out, "{}", mount.get_time().await?)?;
        }
        Operation::SetTime(time) => mount.set_time(*time).await?,
        Operation::GetVersion => {
            writeln!(out, "{}", mount.get_version().await?)?;
        }
        Operation::GetModel => {
            writeln!(out, "{}", mount.get_model().await?)?;
        }
        Operation::Echo(msg) => {
            let byte = mount.display(msg).await?;
            writeln!(out, "{}", char::from(byte))?;
        }
        Operation::AlignmentComplete => {
            writeln!(out, "{}", yes_no(mount.alignment_complete().await?))?;
        }
        Operation::GotoInProgress => {
            writeln!(out, "{}", yes_no(mount.goto_in_progress().await?))?;
        }
        Operation::CancelGoto => mount.cancel_goto().await?,
    }
    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Argument errors are reported before the port is touched.
    let op = cli.operation()?;
    let model = models::find_model(&cli.model)
        .with_context(|| format!("unknown model {:?}", cli.model))?;

    let mut builder = NexStarBuilder::new(model)
        .serial_port(&cli.device)
        .command_timeout(Duration::from_millis(cli.timeout_ms));
    if let Some(baud) = cli.baud {
        builder = builder.baud_rate(baud);
    }
    let mount = builder
        .build()
        .await
        .with_context(|| format!("cannot open {}", cli.device))?;
    tracing::debug!(device = %cli.device, ?op, "connected");

    let result = execute(&mount, &op, &mut io::stdout().lock()).await;
    mount.close().await.ok();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use mountlib::nexstar::models::nexstar_plus;
    use mountlib_test_harness::MockTransport;

    fn parse(args: &[&str]) -> Operation {
        let mut argv = vec!["nexstar"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap().operation().unwrap()
    }

    async fn run(mock: MockTransport, op: Operation) -> Result<String> {
        let mount = NexStarBuilder::new(nexstar_plus())
            .build_with_transport(Box::new(mock))
            .await?;
        let mut out = Vec::new();
        execute(&mount, &op, &mut out).await?;
        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["nexstar", "--get_azel"]).unwrap();
        assert_eq!(cli.model, "nexstar-plus");
        assert_eq!(cli.timeout_ms, 2000);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn device_flag() {
        let cli = Cli::try_parse_from(["nexstar", "-d", "/dev/ttyUSB3", "--get_time"]).unwrap();
        assert_eq!(cli.device, "/dev/ttyUSB3");
    }

    #[test]
    fn operation_required() {
        assert!(Cli::try_parse_from(["nexstar"]).is_err());
    }

    #[test]
    fn operations_mutually_exclusive() {
        assert!(Cli::try_parse_from(["nexstar", "--get_azel", "--get_radec"]).is_err());
    }

    #[test]
    fn goto_with_negative_elevation() {
        assert_eq!(
            parse(&["--goto_azel", "120", "-5.5"]),
            Operation::GotoAzel(120.0, -5.5)
        );
    }

    #[test]
    fn slew_fixed_pair() {
        assert_eq!(parse(&["--slew_fixed", "9", "-9"]), Operation::SlewFixed(9, -9));
    }

    #[test]
    fn tracking_mode_by_name_or_code() {
        assert_eq!(
            parse(&["--set_tracking_mode", "eq-north"]),
            Operation::SetTrackingMode(TrackingMode::EqNorth)
        );
        assert_eq!(
            parse(&["--set_tracking_mode", "1"]),
            Operation::SetTrackingMode(TrackingMode::AltAz)
        );
    }

    #[test]
    fn location_decimal_degrees() {
        assert_eq!(
            parse(&["--set_location", "-33.5", "151.25"]),
            Operation::SetLocation(Location::new(
                DmsAngle::new(33, 30, 0, true),
                DmsAngle::new(151, 15, 0, false),
            ))
        );
    }

    #[test]
    fn location_dms_keeps_argument_order() {
        let loc = parse_location("40,26,46,0", "79,58,56,1").unwrap();
        assert_eq!(loc.latitude, DmsAngle::new(40, 26, 46, false));
        assert_eq!(loc.longitude, DmsAngle::new(79, 58, 56, true));
    }

    #[test]
    fn location_out_of_range() {
        assert!(parse_location("91,0,0,0", "0").is_err());
        assert!(parse_location("0", "200.0").is_err());
        assert!(parse_location("10,60,0,0", "0").is_err());
        assert!(parse_location("10,0,0", "0").is_err());
    }

    #[test]
    fn time_fields_from_arguments() {
        let t = parse_time("21,30,5,10,14,2026,-5,1").unwrap();
        assert_eq!(t.year, 26);
        assert_eq!(t.utc_offset, -5);
        assert!(t.dst);
        assert_eq!(t.to_bytes(), [21, 30, 5, 10, 14, 26, 251, 1]);
    }

    #[test]
    fn time_rejects_bad_fields() {
        assert!(parse_time("25,0,0,1,1,26,0,0").is_err());
        assert!(parse_time("12,0,0,2,30,26,0,0").is_err());
        assert!(parse_time("12,0,0").is_err());
    }

    #[test]
    fn time_now() {
        let t = parse_time("now").unwrap();
        assert!(!t.dst);
        assert!(t.month >= 1 && t.month <= 12);
    }

    #[tokio::test]
    async fn prints_position() {
        let mut mock = MockTransport::new();
        mock.expect(b"z", b"40000000,20000000#");
        let out = run(mock, Operation::GetAzel).await.unwrap();
        assert_eq!(out, "90 45\n");
    }

    #[tokio::test]
    async fn prints_yes_no() {
        let mut mock = MockTransport::new();
        mock.expect(b"L", &[0, b'#']);
        let out = run(mock, Operation::GotoInProgress).await.unwrap();
        assert_eq!(out, "No\n");
    }

    #[tokio::test]
    async fn goto_uses_gated_path() {
        let mut mock = MockTransport::new();
        mock.expect(b"J", &[0, b'#']);
        let err = run(mock, Operation::GotoAzel(120.0, 30.0))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("alignment not set"));
    }

    #[tokio::test]
    async fn echo_single_character() {
        let mut mock = MockTransport::new();
        mock.expect(b"Kq", b"q#");
        let out = run(mock, Operation::Echo("q".into())).await.unwrap();
        assert_eq!(out, "q\n");
    }
}
