//! # wlc-common
//!
//! Shared vocabulary of the WLAN private command surface: command names,
//! the error taxonomy, value types and the tokenizer. No I/O happens here.

pub mod command;
pub mod error;
pub mod token;
pub mod types;

// Re-export for convenience
pub use command::*;
pub use error::*;
pub use token::*;
pub use types::*;
