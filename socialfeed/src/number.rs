// SPDX-License-Identifier: Apache-2.0

use crate::parse_error::{ErrKind, ParseError};

/// Parsed value of a JSON number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumberResult {
    /// Integer that fits in an `i64`
    Integer(i64),
    /// Integer syntax, but outside the `i64` range
    IntegerOverflow,
    /// Number with a fraction or exponent
    Float(f64),
}

/// A JSON number, keeping the exact source text next to its parsed value.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonNumber<'a> {
    raw: &'a str,
    parsed: NumberResult,
}

impl<'a> JsonNumber<'a> {
    /// Parses number text already validated by the reader.
    pub(crate) fn from_validated(raw: &'a str) -> Self {
        let parsed = if is_integer(raw) {
            match raw.parse::<i64>() {
                Ok(value) => NumberResult::Integer(value),
                Err(_) => NumberResult::IntegerOverflow,
            }
        } else {
            // Grammar-valid float text always parses; huge exponents become inf
            NumberResult::Float(raw.parse::<f64>().unwrap_or(f64::NAN))
        };
        Self { raw, parsed }
    }

    pub fn parsed(&self) -> &NumberResult {
        &self.parsed
    }

    /// The number as an `i64`, if it is an integer that fits.
    pub fn as_int(&self) -> Option<i64> {
        match self.parsed {
            NumberResult::Integer(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self.parsed {
            NumberResult::Integer(value) => Some(value as f64),
            NumberResult::Float(value) => Some(value),
            NumberResult::IntegerOverflow => self.raw.parse().ok(),
        }
    }

    /// Whether the source text has no fraction or exponent.
    pub fn is_integer(&self) -> bool {
        !matches!(self.parsed, NumberResult::Float(_))
    }

    /// The exact number text from the document.
    pub fn as_str(&self) -> &'a str {
        self.raw
    }
}

impl core::fmt::Display for JsonNumber<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.raw)
    }
}

fn is_integer(raw: &str) -> bool {
    !raw.bytes().any(|b| matches!(b, b'.' | b'e' | b'E'))
}

#[derive(Debug, Clone, Copy)]
enum Num {
    Sign,
    LeadingZero,
    BeforeDecimalPoint,
    Decimal,
    AfterDecimalPoint,
    Exponent,
    ExponentSign,
    AfterExponent,
}

/// Scans a number starting at `start`, returning the end offset.
///
/// The scan stops at the first byte that cannot extend the number; whether
/// that byte is a legal delimiter is left to the reader's structural state.
pub(crate) fn scan_number(input: &[u8], start: usize) -> Result<usize, ParseError> {
    let mut state = match input.get(start) {
        Some(b'-') => Num::Sign,
        Some(b'0') => Num::LeadingZero,
        Some(b'1'..=b'9') => Num::BeforeDecimalPoint,
        Some(&other) => return ParseError::at(ErrKind::InvalidNumber, other, start),
        None => return ParseError::at_end(ErrKind::UnfinishedStream, start),
    };
    let mut pos = start + 1;
    loop {
        let byte = input.get(pos).copied();
        state = match (state, byte) {
            (Num::Sign, Some(b'0')) => Num::LeadingZero,
            (Num::Sign, Some(b'1'..=b'9')) => Num::BeforeDecimalPoint,
            (Num::LeadingZero | Num::BeforeDecimalPoint, Some(b'.')) => Num::Decimal,
            (
                Num::LeadingZero | Num::BeforeDecimalPoint | Num::AfterDecimalPoint,
                Some(b'e' | b'E'),
            ) => Num::Exponent,
            (Num::BeforeDecimalPoint, Some(b'0'..=b'9')) => Num::BeforeDecimalPoint,
            (Num::Decimal | Num::AfterDecimalPoint, Some(b'0'..=b'9')) => Num::AfterDecimalPoint,
            (Num::Exponent, Some(b'+' | b'-')) => Num::ExponentSign,
            (Num::Exponent | Num::ExponentSign | Num::AfterExponent, Some(b'0'..=b'9')) => {
                Num::AfterExponent
            }
            (
                Num::LeadingZero
                | Num::BeforeDecimalPoint
                | Num::AfterDecimalPoint
                | Num::AfterExponent,
                _,
            ) => return Ok(pos),
            (_, Some(other)) => return ParseError::at(ErrKind::InvalidNumber, other, pos),
            (_, None) => return ParseError::at_end(ErrKind::UnfinishedStream, pos),
        };
        pos += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn scan(text: &str) -> Result<&str, ErrKind> {
        scan_number(text.as_bytes(), 0)
            .map(|end| &text[..end])
            .map_err(|e| e.kind())
    }

    #[test]
    fn test_scan_stops_at_delimiter() {
        assert_eq!(scan("42,"), Ok("42"));
        assert_eq!(scan("-0]"), Ok("-0"));
        assert_eq!(scan("3.25}"), Ok("3.25"));
        assert_eq!(scan("1e10 "), Ok("1e10"));
        assert_eq!(scan("-2.5E-3"), Ok("-2.5E-3"));
        // Leading zero ends the number; the reader rejects the stray digit
        assert_eq!(scan("01"), Ok("0"));
    }

    #[test]
    fn test_scan_rejects_incomplete_numbers() {
        assert_eq!(scan("-x"), Err(ErrKind::InvalidNumber));
        assert_eq!(scan("1.}"), Err(ErrKind::InvalidNumber));
        assert_eq!(scan("1e+"), Err(ErrKind::UnfinishedStream));
        assert_eq!(scan("-"), Err(ErrKind::UnfinishedStream));
    }

    #[test]
    fn test_number_classification() {
        let n = JsonNumber::from_validated("123");
        assert_eq!(n.as_int(), Some(123));
        assert!(n.is_integer());

        let n = JsonNumber::from_validated("-9223372036854775808");
        assert_eq!(n.as_int(), Some(i64::MIN));

        let n = JsonNumber::from_validated("9223372036854775808");
        assert_eq!(n.parsed(), &NumberResult::IntegerOverflow);
        assert_eq!(n.as_int(), None);
        assert!(n.is_integer());
        assert_eq!(n.as_str(), "9223372036854775808");

        let n = JsonNumber::from_validated("4.5");
        assert_eq!(n.as_int(), None);
        assert_eq!(n.as_f64(), Some(4.5));
        assert!(!n.is_integer());

        let n = JsonNumber::from_validated("1e2");
        assert_eq!(n.parsed(), &NumberResult::Float(100.0));
    }
}
