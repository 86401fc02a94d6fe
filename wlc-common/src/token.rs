//! # Command Tokenizer
//!
//! Purpose: Split one private command buffer into its name and arguments and
//! convert individual tokens into typed values.
//!
//! ## Design Principles
//!
//! 1. **Re-tokenize Per Call**: Nothing is cached between invocations; a
//!    `CommandArgs` borrows the caller's text for one command only.
//! 2. **Typed Failures**: Every conversion returns `Result<_, ParseError>`, so
//!    "any token fails => whole command fails" is just `?`.
//! 3. **Strict Integers**: Optional leading `-`, then at least one digit. A
//!    bare `-` is not a number.
//! 4. **Lenient Access Is Explicit**: Handlers that default malformed tokens
//!    call `next_int_or`, never the strict form.
//!
//! ## Usage
//!
//! ```rust
//! use wlc_common::token::CommandArgs;
//!
//! let mut args = CommandArgs::new("SETROAMDELTA 11");
//! assert_eq!(args.name(), "SETROAMDELTA");
//! assert_eq!(args.next_int().unwrap(), 11);
//! ```

use crate::error::{ParseError, WlcResult};
use crate::types::MacAddr;

/// Tokens of a single command, with a read cursor over the arguments.
#[derive(Debug, Clone)]
pub struct CommandArgs<'a> {
    name: &'a str,
    rest: &'a str,
    tokens: Vec<&'a str>,
    pos: usize,
}

impl<'a> CommandArgs<'a> {
    /// Tokenizes `text` on spaces; token 0 becomes the command name.
    pub fn new(text: &'a str) -> Self {
        let text = text.trim_end_matches(['\0', '\r', '\n']);
        let (name, rest) = match text.find(' ') {
            Some(idx) => (&text[..idx], &text[idx + 1..]),
            None => (text, ""),
        };
        let tokens = rest.split(' ').filter(|t| !t.is_empty()).collect();
        CommandArgs {
            name,
            rest,
            tokens,
            pos: 0,
        }
    }

    /// Tokenizes a raw buffer, stopping at the first NUL byte.
    pub fn from_bytes(buf: &'a [u8]) -> WlcResult<Self> {
        let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
        let text = std::str::from_utf8(&buf[..end]).map_err(|_| ParseError::NotUtf8)?;
        Ok(Self::new(text))
    }

    /// Command name (token 0).
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Raw text after the command name, untouched by tokenization.
    pub fn rest(&self) -> &'a str {
        self.rest
    }

    /// Total number of argument tokens.
    pub fn arg_count(&self) -> usize {
        self.tokens.len()
    }

    /// Argument tokens not yet consumed.
    pub fn remaining(&self) -> usize {
        self.tokens.len() - self.pos
    }

    /// Next token, or `None` when the arguments are exhausted.
    pub fn next_opt(&mut self) -> Option<&'a str> {
        let token = self.tokens.get(self.pos).copied()?;
        self.pos += 1;
        Some(token)
    }

    /// Next token; missing is a parse error.
    pub fn next_token(&mut self) -> WlcResult<&'a str> {
        Ok(self.next_opt().ok_or(ParseError::Missing)?)
    }

    pub fn next_int(&mut self) -> WlcResult<i64> {
        let token = self.next_token()?;
        Ok(parse_int(token)?)
    }

    /// Next integer, or `default` when the token is missing or malformed.
    pub fn next_int_or(&mut self, default: i64) -> i64 {
        self.next_opt()
            .and_then(|token| parse_int(token).ok())
            .unwrap_or(default)
    }

    pub fn next_hex(&mut self) -> WlcResult<u32> {
        let token = self.next_token()?;
        Ok(parse_hex_u32(token)?)
    }

    pub fn next_mac(&mut self) -> WlcResult<MacAddr> {
        let token = self.next_token()?;
        Ok(token.parse()?)
    }

    /// Reads `count` integers; fewer tokens than announced is a parse error.
    pub fn next_ints(&mut self, count: usize) -> WlcResult<Vec<i64>> {
        (0..count).map(|_| self.next_int()).collect()
    }
}

/// Parses a signed decimal integer with an optional leading `-`.
pub fn parse_int(token: &str) -> Result<i64, ParseError> {
    let (negative, digits) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token),
    };
    if digits.is_empty() {
        return Err(ParseError::NotANumber);
    }

    let mut value: i64 = 0;
    for b in digits.bytes() {
        if !b.is_ascii_digit() {
            return Err(ParseError::NotANumber);
        }
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(i64::from(b - b'0')))
            .ok_or(ParseError::NotANumber)?;
    }
    Ok(if negative { -value } else { value })
}

/// Parses a hex integer with an optional `0x` prefix.
pub fn parse_hex_u32(token: &str) -> Result<u32, ParseError> {
    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);
    if digits.is_empty() {
        return Err(ParseError::BadHex);
    }
    u32::from_str_radix(digits, 16).map_err(|_| ParseError::BadHex)
}

/// Decodes an even-length string of hex digit pairs.
pub fn decode_hex(text: &str) -> Result<Vec<u8>, ParseError> {
    let bytes = text.as_bytes();
    if bytes.len() % 2 != 0 {
        return Err(ParseError::BadHex);
    }
    bytes
        .chunks_exact(2)
        .map(|pair| Ok((hex_nibble(pair[0])? << 4) | hex_nibble(pair[1])?))
        .collect()
}

fn hex_nibble(b: u8) -> Result<u8, ParseError> {
    match b {
        b'0'..=b'9' => Ok(b - b'0'),
        b'a'..=b'f' => Ok(b - b'a' + 10),
        b'A'..=b'F' => Ok(b - b'A' + 10),
        _ => Err(ParseError::BadHex),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WlcError;

    #[test]
    fn splits_name_and_arguments() {
        let mut args = CommandArgs::new("SETWTCMODE 0 1 -80 -70 -70 -70");
        assert_eq!(args.name(), "SETWTCMODE");
        assert_eq!(args.arg_count(), 6);
        assert_eq!(args.next_ints(6).unwrap(), vec![0, 1, -80, -70, -70, -70]);
        assert_eq!(args.remaining(), 0);
    }

    #[test]
    fn bare_dash_is_not_a_number() {
        assert_eq!(parse_int("-"), Err(ParseError::NotANumber));
        assert_eq!(parse_int(""), Err(ParseError::NotANumber));
        assert_eq!(parse_int("+5"), Err(ParseError::NotANumber));
        assert_eq!(parse_int("12a"), Err(ParseError::NotANumber));
        assert_eq!(parse_int("-75"), Ok(-75));
    }

    #[test]
    fn missing_token_is_parse_error() {
        let mut args = CommandArgs::new("P2P_SET_NOA 30");
        assert_eq!(args.next_int().unwrap(), 30);
        assert_eq!(args.next_int(), Err(WlcError::Parse(ParseError::Missing)));
    }

    #[test]
    fn lenient_defaults() {
        let mut args = CommandArgs::new("TWT_SETUP 3 - x");
        assert_eq!(args.next_int_or(0), 3);
        assert_eq!(args.next_int_or(7), 7);
        assert_eq!(args.next_int_or(8), 8);
        assert_eq!(args.next_int_or(9), 9);
    }

    #[test]
    fn from_bytes_stops_at_nul() {
        let buf = b"GETNCHOMODE\0garbage";
        let args = CommandArgs::from_bytes(buf).unwrap();
        assert_eq!(args.name(), "GETNCHOMODE");
        assert_eq!(args.arg_count(), 0);

        let bad = [0xffu8, 0xfe];
        assert!(CommandArgs::from_bytes(&bad).is_err());
    }

    #[test]
    fn rest_keeps_raw_text() {
        let args = CommandArgs::new("SETROAMOFFLAPLIST 1,44:ad:d9:e5:24:70");
        assert_eq!(args.rest(), "1,44:ad:d9:e5:24:70");
    }

    #[test]
    fn hex_helpers() {
        assert_eq!(parse_hex_u32("0x0003"), Ok(3));
        assert_eq!(parse_hex_u32("ff"), Ok(255));
        assert_eq!(parse_hex_u32("0x"), Err(ParseError::BadHex));
        assert_eq!(decode_hex("dd09"), Ok(vec![0xdd, 0x09]));
        assert_eq!(decode_hex("0102000"), Err(ParseError::BadHex));
        assert_eq!(decode_hex("zz"), Err(ParseError::BadHex));
    }

    #[test]
    fn mac_token() {
        let mut args = CommandArgs::new("ROAMING_BLACKLIST_ADD 00:12:fb:00:00:");
        assert_eq!(args.next_mac(), Err(WlcError::Parse(ParseError::BadMac)));
    }
}
