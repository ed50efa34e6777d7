//! Error types for heatlink.
//!
//! All fallible operations across the library return [`Result<T>`], which
//! uses [`Error`] as the error type. Frame validation, command encoding and
//! transport-layer failures are all captured here.

use crate::types::Function;

/// The error type for all heatlink operations.
///
/// Decode failures (`TooShort` through `UnknownModelCode`) describe why an
/// inbound frame was rejected. Encode failures (`NoCachedDcb` through
/// `Unsupported`) describe why no outbound packet was produced. The
/// remaining variants are raised by the link layer around a [`Transport`].
///
/// [`Transport`]: crate::transport::Transport
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The frame is shorter than the minimum for its protocol version.
    #[error("frame too short: {len} bytes (minimum {min})")]
    TooShort {
        /// Number of bytes received.
        len: usize,
        /// Minimum frame length for the protocol version.
        min: usize,
    },

    /// The length declared inside the frame does not match its byte count.
    #[error("frame length mismatch: declared {declared}, actual {actual}")]
    LengthMismatch {
        /// Length field carried by the frame.
        declared: usize,
        /// Length actually received.
        actual: usize,
    },

    /// The checksum trailer does not match the recomputed checksum.
    #[error("checksum mismatch: frame carries 0x{expected:04X}, computed 0x{computed:04X}")]
    ChecksumMismatch {
        /// Checksum carried in the frame trailer.
        expected: u16,
        /// Checksum recomputed over the frame body.
        computed: u16,
    },

    /// The thermostat answered with an error function code (V3 NACK).
    #[error("unexpected function code 0x{0:02X} in response")]
    UnexpectedFunctionCode(u8),

    /// The response covers only part of the DCB (V3 non-zero start offset).
    #[error("partial DCB response starting at offset {0} is not supported")]
    PartialDcbUnsupported(u16),

    /// The model code in the DCB is not one this protocol version knows.
    ///
    /// Non-fatal during decode: the frame is accepted and the reported
    /// model is left unset.
    #[error("unknown model code {0}")]
    UnknownModelCode(u8),

    /// A status-block write was requested before any frame was decoded.
    #[error("no cached DCB: poll the thermostat before sending this command")]
    NoCachedDcb,

    /// A command value lies outside the range the thermostat accepts.
    #[error("value {value} out of range for {function}")]
    ValueOutOfRange {
        /// Function being encoded.
        function: Function,
        /// Value supplied by the caller.
        value: f64,
    },

    /// The command value carries the wrong type for the function.
    #[error("{function} expects a {expected} value, got {actual}")]
    TypeMismatch {
        /// Function being encoded.
        function: Function,
        /// Name of the accepted value kind.
        expected: &'static str,
        /// Name of the supplied value kind.
        actual: &'static str,
    },

    /// The operation is not implemented for this protocol version or model.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// A transport-level error (serial port, TCP bridge).
    #[error("transport error: {0}")]
    Transport(String),

    /// Timed out waiting for a response from the thermostat.
    #[error("timeout waiting for response")]
    Timeout,

    /// No connection to the thermostat network has been established.
    #[error("not connected")]
    NotConnected,

    /// An underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;
