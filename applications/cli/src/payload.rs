//! Marker payloads: a 5-symbol key followed by a 4-symbol timestamp
//!
//! Both parts use the 32-symbol alphabet `0-9a-v`.

use crate::error::{AppError, Result};

/// Digits of the payload alphabet, in value order
pub const ALPHABET: &[u8; 32] = b"0123456789abcdefghijklmnopqrstuv";

/// Number of symbols in a key
pub const KEY_LENGTH: usize = 5;

/// Number of symbols in the timestamp suffix
pub const TIMESTAMP_WIDTH: usize = 4;

/// Value of one alphabet symbol
pub fn symbol_value(symbol: char) -> Option<u32> {
    let byte = u8::try_from(symbol).ok()?;
    ALPHABET
        .iter()
        .position(|&c| c == byte)
        .map(|index| index as u32)
}

/// Render `value` in base 32, left-padded with `0` to at least `width` symbols
pub fn encode_base32(mut value: u64, width: usize) -> String {
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(ALPHABET[(value % 32) as usize]);
        value /= 32;
    }
    while digits.len() < width.max(1) {
        digits.push(b'0');
    }
    digits.iter().rev().map(|&b| char::from(b)).collect()
}

/// Parse a base-32 string produced by [`encode_base32`]
pub fn decode_base32(text: &str) -> Result<u64> {
    text.chars().try_fold(0_u64, |acc, symbol| {
        let digit = symbol_value(symbol).ok_or_else(|| {
            AppError::InvalidPayload(format!("'{}' is not in the 0-9a-v alphabet", symbol))
        })?;
        acc.checked_mul(32)
            .and_then(|v| v.checked_add(u64::from(digit)))
            .ok_or_else(|| AppError::InvalidPayload(format!("'{}' overflows", text)))
    })
}

/// Check that a key is exactly five symbols from `0-9a-v`
pub fn validate_key(key: &str) -> Result<()> {
    if key.chars().count() != KEY_LENGTH {
        return Err(AppError::InvalidKey(format!(
            "'{}' must be exactly {} characters",
            key, KEY_LENGTH
        )));
    }
    if let Some(bad) = key.chars().find(|&c| symbol_value(c).is_none()) {
        return Err(AppError::InvalidKey(format!(
            "wrong character [{}] in '{}', use digits in 0-9, a-v only",
            bad, key
        )));
    }
    Ok(())
}

/// Payload for the mark at `mark_time_secs`: key + base-32 timestamp of the
/// mark time rounded to whole seconds
pub fn marker_payload(key: &str, mark_time_secs: f64) -> Result<String> {
    validate_key(key)?;
    let seconds = (mark_time_secs.max(0.0) + 0.5).floor() as u64;
    Ok(format!("{}{}", key, encode_base32(seconds, TIMESTAMP_WIDTH)))
}
