//! # Error Taxonomy
//!
//! Every command returns a single signed integer to its caller. This module
//! keeps the typed errors used inside the crate and the mapping from those
//! errors to the integers seen on the wire.
//!
//! ## Design Principles
//!
//! 1. **Typed Inside, Integer Outside**: Handlers return `WlcResult<T>`; only
//!    the dispatcher converts to a status code.
//! 2. **Parse Errors Are Distinct**: `ParseError` carries what went wrong with
//!    a token, but maps to the same `-EINVAL` as a failed validator.
//! 3. **Vendor Codes Are Positive**: HAL-level status codes (TWT and friends)
//!    are returned verbatim and are not negated.
//!
//! ```text
//! ParseError ──┐
//! Invalid ─────┴─> -EINVAL (-22)
//! NotPermitted ──> -EPERM  (-1)
//! Io ────────────> -EIO    (-5)
//! Transport(c) ──> c
//! Vendor(s) ─────> s as i32 (positive)
//! ```

use thiserror::Error;

/// Operation not permitted.
pub const EPERM: i32 = 1;
/// I/O error.
pub const EIO: i32 = 5;
/// Out of memory.
pub const ENOMEM: i32 = 12;
/// No such device.
pub const ENODEV: i32 = 19;
/// Invalid argument.
pub const EINVAL: i32 = 22;
/// Operation not supported on transport endpoint.
pub const EOPNOTSUPP: i32 = 95;

/// Result alias used across the workspace.
pub type WlcResult<T> = Result<T, WlcError>;

/// Token-level parse failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A mandatory token is absent.
    #[error("missing argument")]
    Missing,
    /// A numeric token is not a decimal integer (this includes a bare `-`).
    #[error("not a number")]
    NotANumber,
    /// A MAC address token does not have six two-digit hex octets.
    #[error("malformed MAC address")]
    BadMac,
    /// A hex token or blob contains a non-hex digit or has odd length.
    #[error("malformed hex")]
    BadHex,
    /// A blob or list does not have the length its header announces.
    #[error("length mismatch")]
    BadLength,
    /// The command buffer is not valid UTF-8.
    #[error("command is not valid text")]
    NotUtf8,
}

/// Status codes reported to the HAL for vendor command families.
///
/// These are returned as positive integers.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiStatus {
    Success = 0,
    Unknown = 1,
    Uninitialized = 2,
    NotSupported = 3,
    NotAvailable = 4,
    InvalidArgument = 5,
    InvalidRequestId = 6,
    TimedOut = 7,
    TooManyRequests = 8,
    OutOfMemory = 9,
    Busy = 10,
}

impl WifiStatus {
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Maps a firmware result code to a HAL status.
    pub const fn from_firmware(result: u16) -> Self {
        match result {
            0 => Self::Success,
            2 | 3 => Self::InvalidArgument,
            4 => Self::NotSupported,
            5 => Self::Busy,
            _ => Self::Unknown,
        }
    }
}

/// Errors surfaced by command handlers and the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WlcError {
    /// Malformed token.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    /// A state or range precondition failed.
    #[error("invalid: {0}")]
    Invalid(&'static str),
    /// Not allowed in the current connection phase.
    #[error("operation not permitted")]
    NotPermitted,
    /// Hardware or mode conflict, or the firmware refused the value.
    #[error("i/o error")]
    Io,
    /// The transport rejected the request with its own code.
    #[error("transport rejected request ({0})")]
    Transport(i32),
    /// HAL status code for vendor command families.
    #[error("vendor status {0:?}")]
    Vendor(WifiStatus),
    /// No interface is available to service the request.
    #[error("no such device")]
    NoDevice,
    /// The feature is compiled out or disabled.
    #[error("not supported")]
    NotSupported,
    /// Allocation failed.
    #[error("out of memory")]
    NoMemory,
}

impl WlcError {
    /// Signed status code returned to the caller.
    pub const fn code(&self) -> i32 {
        match self {
            WlcError::Parse(_) | WlcError::Invalid(_) => -EINVAL,
            WlcError::NotPermitted => -EPERM,
            WlcError::Io => -EIO,
            WlcError::Transport(code) => *code,
            WlcError::Vendor(status) => status.code(),
            WlcError::NoDevice => -ENODEV,
            WlcError::NotSupported => -EOPNOTSUPP,
            WlcError::NoMemory => -ENOMEM,
        }
    }

    /// True for the generic invalid-argument family.
    pub const fn is_invalid_argument(&self) -> bool {
        matches!(self, WlcError::Parse(_) | WlcError::Invalid(_))
    }
}

/// Converts a handler result to the integer returned by the command surface.
pub fn status_of(result: WlcResult<usize>) -> i32 {
    match result {
        Ok(len) => i32::try_from(len).unwrap_or(i32::MAX),
        Err(err) => err.code(),
    }
}
