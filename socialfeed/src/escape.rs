// SPDX-License-Identifier: Apache-2.0

use std::borrow::Cow;

use crate::parse_error::{ErrKind, ParseError};

/// Builds string content that stays borrowed from the input until the first
/// escape sequence forces a copy.
pub(crate) struct CopyOnEscape<'a> {
    input: &'a [u8],
    /// Where the current string content starts in the input
    start: usize,
    /// Input position up to which content has been copied
    last_copied: usize,
    /// Owned content, present once an escape was seen
    copied: Option<Vec<u8>>,
}

impl<'a> CopyOnEscape<'a> {
    pub fn new(input: &'a [u8], start: usize) -> Self {
        Self {
            input,
            start,
            last_copied: start,
            copied: None,
        }
    }

    /// Replaces `input[escape_start..resume]` with `unescaped`.
    fn replace_span(&mut self, escape_start: usize, resume: usize, unescaped: &[u8]) {
        let input = self.input;
        let copied = self.copied.get_or_insert_with(Vec::new);
        copied.extend_from_slice(&input[self.last_copied..escape_start]);
        copied.extend_from_slice(unescaped);
        self.last_copied = resume;
    }

    /// Completes the string whose closing quote sits at `end`.
    pub fn finish(self, end: usize) -> Result<Cow<'a, str>, ParseError> {
        match self.copied {
            None => {
                let raw = &self.input[self.start..end];
                core::str::from_utf8(raw).map(Cow::Borrowed).map_err(|e| {
                    ParseError::new(
                        ErrKind::InvalidUtf8,
                        raw.get(e.valid_up_to()).copied(),
                        self.start + e.valid_up_to(),
                    )
                })
            }
            Some(mut copied) => {
                copied.extend_from_slice(&self.input[self.last_copied..end]);
                // Offsets inside the copy do not map back to the input, so
                // the error points at the start of the string content.
                String::from_utf8(copied)
                    .map(Cow::Owned)
                    .map_err(|_| ParseError::new(ErrKind::InvalidUtf8, None, self.start))
            }
        }
    }
}

/// Byte produced by a single-character escape such as `\n`.
pub(crate) fn simple_escape(escape_char: u8) -> Option<u8> {
    match escape_char {
        b'"' => Some(b'"'),
        b'\\' => Some(b'\\'),
        b'/' => Some(b'/'),
        b'b' => Some(0x08),
        b'f' => Some(0x0C),
        b'n' => Some(b'\n'),
        b'r' => Some(b'\r'),
        b't' => Some(b'\t'),
        _ => None,
    }
}

fn hex_digit(byte: u8) -> Option<u32> {
    match byte {
        b'0'..=b'9' => Some(u32::from(byte - b'0')),
        b'a'..=b'f' => Some(u32::from(byte - b'a') + 10),
        b'A'..=b'F' => Some(u32::from(byte - b'A') + 10),
        _ => None,
    }
}

fn is_high_surrogate(codepoint: u32) -> bool {
    (0xD800..=0xDBFF).contains(&codepoint)
}

fn is_low_surrogate(codepoint: u32) -> bool {
    (0xDC00..=0xDFFF).contains(&codepoint)
}

/// Reads the four hex digits following `\u`, where `pos` is the first digit.
fn read_hex4(input: &[u8], pos: usize) -> Result<u32, ParseError> {
    let mut codepoint = 0u32;
    for offset in pos..pos + 4 {
        let Some(&byte) = input.get(offset) else {
            return ParseError::at_end(ErrKind::UnfinishedStream, offset);
        };
        let Some(digit) = hex_digit(byte) else {
            return ParseError::at(ErrKind::InvalidUnicodeEscape, byte, offset);
        };
        codepoint = (codepoint << 4) | digit;
    }
    Ok(codepoint)
}

/// Decodes the escape sequence whose backslash is at `backslash` into `text`.
///
/// Returns the input position just past the sequence. A high surrogate must be
/// immediately followed by a `\u` low surrogate; the pair is combined into one
/// character.
pub(crate) fn decode_escape(
    input: &[u8],
    backslash: usize,
    text: &mut CopyOnEscape<'_>,
) -> Result<usize, ParseError> {
    let pos = backslash + 1;
    let Some(&escape_char) = input.get(pos) else {
        return ParseError::at_end(ErrKind::UnfinishedStream, pos);
    };
    if let Some(unescaped) = simple_escape(escape_char) {
        text.replace_span(backslash, pos + 1, &[unescaped]);
        return Ok(pos + 1);
    }
    if escape_char != b'u' {
        return ParseError::at(ErrKind::InvalidStringEscape, escape_char, pos);
    }

    let mut codepoint = read_hex4(input, pos + 1)?;
    let mut resume = pos + 5;
    if is_low_surrogate(codepoint) {
        return ParseError::at(ErrKind::InvalidUnicodeEscape, escape_char, pos);
    }
    if is_high_surrogate(codepoint) {
        if input.get(resume..resume + 2) != Some(b"\\u".as_slice()) {
            return ParseError::at(ErrKind::InvalidUnicodeEscape, escape_char, pos);
        }
        let low = read_hex4(input, resume + 2)?;
        if !is_low_surrogate(low) {
            return ParseError::at(ErrKind::InvalidUnicodeEscape, b'u', resume + 1);
        }
        codepoint = 0x10000 + ((codepoint & 0x3FF) << 10) + (low & 0x3FF);
        resume += 6;
    }

    let Some(ch) = char::from_u32(codepoint) else {
        return ParseError::at(ErrKind::InvalidUnicodeEscape, escape_char, pos);
    };
    let mut utf8 = [0u8; 4];
    text.replace_span(backslash, resume, ch.encode_utf8(&mut utf8).as_bytes());
    Ok(resume)
}
