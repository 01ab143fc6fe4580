//! # Hex Canonicalization
//!
//! Every hex value stored in a record or compared against contract state goes
//! through this module. Canonical form is `0x` followed by lowercase digits.
//! Fixed-width values (addresses, LayerZero peers) are left-padded with zeros
//! to their byte width; values wider than the width are rejected.

use thiserror::Error;

/// Errors from hex parsing and canonicalization.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HexError {
    /// A character outside `[0-9a-fA-F]` appeared after the prefix.
    #[error("invalid hex character {found:?} at position {position}")]
    InvalidChar {
        /// Zero-based index into the digits (after the `0x` prefix).
        position: usize,
        /// The offending character.
        found: char,
    },

    /// Variable-width hex must encode whole bytes.
    #[error("hex has odd length {0}")]
    OddLength(usize),

    /// The value does not fit the fixed width.
    #[error("hex value is {actual_bytes} bytes, exceeds {max_bytes}")]
    TooLong {
        /// Permitted width in bytes.
        max_bytes: usize,
        /// Width of the supplied value in bytes (rounded up).
        actual_bytes: usize,
    },

    /// The value must be exactly a given width.
    #[error("expected {expected} bytes, got {actual}")]
    WrongLength {
        /// Required width in bytes.
        expected: usize,
        /// Supplied width in bytes.
        actual: usize,
    },
}

/// Digits of `input` with surrounding whitespace and any `0x`/`0X` prefix removed.
pub fn digits(input: &str) -> &str {
    let trimmed = input.trim();
    trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed)
}

fn check_digits(body: &str) -> Result<(), HexError> {
    match body.char_indices().find(|(_, c)| !c.is_ascii_hexdigit()) {
        Some((position, found)) => Err(HexError::InvalidChar { position, found }),
        None => Ok(()),
    }
}

/// Canonicalize a variable-width hex blob.
///
/// Adds the `0x` prefix when missing and lower-cases the digits. An empty
/// input canonicalizes to `"0x"`; callers that require content check for it.
pub fn normalize_hex(input: &str) -> Result<String, HexError> {
    let body = digits(input);
    check_digits(body)?;
    if body.len() % 2 != 0 {
        return Err(HexError::OddLength(body.len()));
    }
    Ok(format!("0x{}", body.to_ascii_lowercase()))
}

/// Canonicalize a fixed-width hex value, left-padding with zeros to `width` bytes.
///
/// Odd-length input is accepted here since padding completes the leading byte.
pub fn left_pad_hex(input: &str, width: usize) -> Result<String, HexError> {
    let body = digits(input);
    check_digits(body)?;
    if body.len() > width * 2 {
        return Err(HexError::TooLong {
            max_bytes: width,
            actual_bytes: body.len().div_ceil(2),
        });
    }
    Ok(format!(
        "0x{:0>pad$}",
        body.to_ascii_lowercase(),
        pad = width * 2
    ))
}

/// Decode hex (prefix optional) into bytes.
pub fn decode_hex(input: &str) -> Result<Vec<u8>, HexError> {
    let canonical = normalize_hex(input)?;
    let body = &canonical[2..];
    (0..body.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&body[i..i + 2], 16).map_err(|_| HexError::InvalidChar {
                position: i,
                found: body[i..].chars().next().unwrap_or('?'),
            })
        })
        .collect()
}

/// Encode bytes as canonical `0x`-prefixed lowercase hex.
pub fn encode_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(2 + bytes.len() * 2);
    out.push_str("0x");
    for b in bytes {
        out.push_str(&format!("{b:02x}"));
    }
    out
}

/// Whether the value is empty or all zero digits.
pub fn is_zero(input: &str) -> bool {
    digits(input).chars().all(|c| c == '0')
}

/// Case- and prefix-insensitive equality of two hex values.
pub fn hex_eq(a: &str, b: &str) -> bool {
    digits(a).eq_ignore_ascii_case(digits(b))
}
