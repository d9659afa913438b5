//! Decimal-number input mask.
//!
//! The free functions are the canonical operations: each takes the current
//! buffer and returns the next one, and each routes its result through
//! [`normalize`], so the buffer is always digits with at most one `.`
//! whatever text it was fed. [`NumericInputMask`] is a small owner of one
//! buffer for callers that keep a field per mask.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

const DECIMAL_POINT: char = '.';

/// Keep digits and the first `.`, drop everything else.
///
/// Later points are removed, so their digits collapse into the part before
/// them: `"1.2.3"` becomes `"1.23"`.
pub fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut seen_point = false;
    for ch in raw.chars() {
        match ch {
            '0'..='9' => out.push(ch),
            DECIMAL_POINT if !seen_point => {
                seen_point = true;
                out.push(ch);
            }
            _ => {}
        }
    }
    out
}

/// True when `buffer` is digits with at most one `.` (the empty buffer
/// included).
pub fn is_partial_number(buffer: &str) -> bool {
    let mut points = 0;
    buffer.chars().all(|ch| match ch {
        '0'..='9' => true,
        DECIMAL_POINT => {
            points += 1;
            points == 1
        }
        _ => false,
    })
}

/// Append digit `d` (0-9). Stray input (a value above 9, or a buffer that is
/// not a partial number) leaves the normalized buffer unchanged.
pub fn append_digit(buffer: &str, d: u8) -> String {
    if d > 9 || !is_partial_number(buffer) {
        return normalize(buffer);
    }
    let mut next = String::with_capacity(buffer.len() + 1);
    next.push_str(buffer);
    next.push(char::from(b'0' + d));
    normalize(&next)
}

/// Append `.` unless the buffer already has one.
pub fn append_decimal_point(buffer: &str) -> String {
    if buffer.contains(DECIMAL_POINT) || !is_partial_number(buffer) {
        return normalize(buffer);
    }
    let mut next = buffer.to_string();
    next.push(DECIMAL_POINT);
    normalize(&next)
}

/// Remove the last character. Deleting a lone digit yields `""`, not `"0"`.
pub fn backspace(buffer: &str) -> String {
    let mut next = normalize(buffer);
    next.pop();
    next
}

pub fn clear() -> String {
    String::new()
}

/// Parse the buffer. Empty or unparsable buffers are zero; this never fails.
pub fn to_decimal(buffer: &str) -> Decimal {
    let normalized = normalize(buffer);
    let (int_part, frac_part) = match normalized.split_once(DECIMAL_POINT) {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (normalized.as_str(), ""),
    };
    let int_part = if int_part.is_empty() { "0" } else { int_part };
    let literal = if frac_part.is_empty() {
        int_part.to_string()
    } else {
        format!("{int_part}.{frac_part}")
    };
    Decimal::from_str(&literal).unwrap_or(Decimal::ZERO)
}

/// Whether a mask accepts a decimal point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaskMode {
    Decimal,
    Integer,
}

/// One field's input buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumericInputMask {
    mode: MaskMode,
    buffer: String,
}

impl NumericInputMask {
    pub fn decimal() -> Self {
        Self {
            mode: MaskMode::Decimal,
            buffer: String::new(),
        }
    }

    pub fn integer() -> Self {
        Self {
            mode: MaskMode::Integer,
            buffer: String::new(),
        }
    }

    pub fn mode(&self) -> MaskMode {
        self.mode
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn push_digit(&mut self, d: u8) {
        self.buffer = append_digit(&self.buffer, d);
    }

    /// No-op for integer masks.
    pub fn push_decimal_point(&mut self) {
        if self.mode == MaskMode::Decimal {
            self.buffer = append_decimal_point(&self.buffer);
        }
    }

    pub fn backspace(&mut self) {
        self.buffer = backspace(&self.buffer);
    }

    pub fn clear(&mut self) {
        self.buffer = clear();
    }

    /// Replace the buffer with external text (pre-fill, paste).
    ///
    /// Integer masks keep only the part before the decimal point.
    pub fn set(&mut self, raw: &str) {
        let normalized = normalize(raw);
        self.buffer = match self.mode {
            MaskMode::Decimal => normalized,
            MaskMode::Integer => match normalized.split_once(DECIMAL_POINT) {
                Some((int_part, _)) => int_part.to_string(),
                None => normalized,
            },
        };
    }

    pub fn value(&self) -> Decimal {
        to_decimal(&self.buffer)
    }
}
