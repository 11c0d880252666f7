//! Error types for mountlib.
//!
//! All fallible operations across the library return [`Result<T>`], which
//! uses [`Error`] as the error type. Transport failures, protocol framing
//! violations, unrepresentable inputs, and safety-policy rejections are all
//! captured here so callers can match on one enum.

/// The error type for all mountlib operations.
///
/// Variants fall into four groups:
///
/// - **transport**: [`Transport`](Error::Transport), [`Timeout`](Error::Timeout),
///   [`NotConnected`](Error::NotConnected), [`ConnectionLost`](Error::ConnectionLost),
///   [`Io`](Error::Io)
/// - **protocol**: [`Framing`](Error::Framing),
///   [`UnexpectedResponse`](Error::UnexpectedResponse), [`Decoding`](Error::Decoding)
/// - **input**: [`EncodingRange`](Error::EncodingRange),
///   [`RateOutOfRange`](Error::RateOutOfRange), [`InvalidParameter`](Error::InvalidParameter),
///   [`Unsupported`](Error::Unsupported)
/// - **safety**: [`AlignmentNotSet`](Error::AlignmentNotSet),
///   [`ElevationRange`](Error::ElevationRange), [`UnsafeTarget`](Error::UnsafeTarget)
///
/// Input and safety errors are always raised before any byte is written to
/// the mount.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A transport-level error (serial port open or configuration failure).
    #[error("transport error: {0}")]
    Transport(String),

    /// Timed out waiting for the full response from the mount.
    ///
    /// Fatal to the current command only. The channel may hold a late
    /// partial response afterwards; the caller decides whether to reconnect.
    #[error("timeout waiting for response")]
    Timeout,

    /// A response had the wrong length or was missing its `#` terminator.
    ///
    /// This usually means the channel is out of step with the mount.
    #[error("framing error: {0}")]
    Framing(String),

    /// A single-byte acknowledgement was something other than `#`.
    #[error("unexpected response byte 0x{0:02X}")]
    UnexpectedResponse(u8),

    /// A response field could not be decoded (e.g. invalid hexadecimal).
    #[error("decoding error: {0}")]
    Decoding(String),

    /// An angle cannot be represented in the requested fixed-point width.
    #[error("angle {angle} cannot be encoded in {bits} bits")]
    EncodingRange {
        /// The offending angle in degrees.
        angle: f64,
        /// The fixed-point width that was requested.
        bits: u32,
    },

    /// A slew rate is outside the range the command can carry.
    #[error("slew rate out of range: {0}")]
    RateOutOfRange(String),

    /// A goto was requested before the mount reported alignment complete.
    #[error("telescope alignment not set")]
    AlignmentNotSet,

    /// An elevation above the zenith (or otherwise invalid) was requested.
    #[error("elevation {0} degrees not allowed")]
    ElevationRange(f64),

    /// The configured safety predicate rejected the target.
    #[error("RA {ra}, Dec {dec} are not safe at current location")]
    UnsafeTarget {
        /// Right ascension in degrees.
        ra: f64,
        /// Declination in degrees.
        dec: f64,
    },

    /// The requested operation is not supported by this mount variant.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// An invalid parameter was passed to a mount command.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// No connection to the mount has been established.
    #[error("not connected")]
    NotConnected,

    /// The connection to the mount was lost unexpectedly.
    #[error("connection lost")]
    ConnectionLost,

    /// An underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error was raised by the safety gate.
    pub fn is_safety_rejection(&self) -> bool {
        matches!(
            self,
            Error::AlignmentNotSet | Error::ElevationRange(_) | Error::UnsafeTarget { .. }
        )
    }
}

/// A convenience `Result` alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_timeout() {
        assert_eq!(Error::Timeout.to_string(), "timeout waiting for response");
    }

    #[test]
    fn error_display_framing() {
        let e = Error::Framing("expected 18 bytes, got 17".into());
        assert_eq!(e.to_string(), "framing error: expected 18 bytes, got 17");
    }

    #[test]
    fn error_display_unexpected_response() {
        let e = Error::UnexpectedResponse(0x3F);
        assert_eq!(e.to_string(), "unexpected response byte 0x3F");
    }

    #[test]
    fn error_display_encoding_range() {
        let e = Error::EncodingRange {
            angle: 360.0,
            bits: 32,
        };
        assert_eq!(e.to_string(), "angle 360 cannot be encoded in 32 bits");
    }

    #[test]
    fn error_display_alignment() {
        assert_eq!(
            Error::AlignmentNotSet.to_string(),
            "telescope alignment not set"
        );
    }

    #[test]
    fn error_display_elevation() {
        let e = Error::ElevationRange(95.0);
        assert_eq!(e.to_string(), "elevation 95 degrees not allowed");
    }

    #[test]
    fn error_display_unsafe_target() {
        let e = Error::UnsafeTarget {
            ra: 10.5,
            dec: -40.0,
        };
        assert_eq!(
            e.to_string(),
            "RA 10.5, Dec -40 are not safe at current location"
        );
    }

    #[test]
    fn safety_rejections_are_classified() {
        assert!(Error::AlignmentNotSet.is_safety_rejection());
        assert!(Error::ElevationRange(91.0).is_safety_rejection());
        assert!(Error::UnsafeTarget { ra: 0.0, dec: 0.0 }.is_safety_rejection());
        assert!(!Error::Timeout.is_safety_rejection());
        assert!(!Error::RateOutOfRange("10".into()).is_safety_rejection());
    }

    #[test]
    fn error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe broken");
        let e: Error = io_err.into();
        assert!(matches!(e, Error::Io(_)));
        assert!(e.to_string().contains("pipe broken"));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}
        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
