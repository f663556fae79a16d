// SPDX-License-Identifier: Apache-2.0

/// What went wrong while reading JSON text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrKind {
    /// The document contained no value at all.
    EmptyStream,
    /// Input ended inside a value or an open container.
    UnfinishedStream,
    /// A byte that cannot start or continue a value.
    InvalidToken,
    InvalidNumber,
    InvalidStringEscape,
    /// Malformed `\uXXXX` escape, including unpaired surrogates.
    InvalidUnicodeEscape,
    UnescapedControlCharacter,
    TrailingComma,
    ExpectedObjectKey,
    ExpectedColon,
    ExpectedObjectValue,
    ExpectedArrayItem,
    ExpectedCommaOrEnd,
    /// A closing bracket that does not match the open container.
    MismatchedContainer,
    MaxDepthReached,
    /// Non-whitespace input after the root value.
    TrailingContent,
    InvalidUtf8,
    /// A value was required but the cursor sat on a closing token.
    ExpectedValue,
}

/// A syntax error at a byte offset in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    kind: ErrKind,
    character: Option<u8>,
    offset: usize,
}

impl ParseError {
    pub fn new(kind: ErrKind, character: Option<u8>, offset: usize) -> Self {
        Self {
            kind,
            character,
            offset,
        }
    }

    pub(crate) fn at<T>(kind: ErrKind, character: u8, offset: usize) -> Result<T, Self> {
        Err(Self::new(kind, Some(character), offset))
    }

    pub(crate) fn at_end<T>(kind: ErrKind, offset: usize) -> Result<T, Self> {
        Err(Self::new(kind, None, offset))
    }

    pub fn kind(&self) -> ErrKind {
        self.kind
    }

    /// The offending byte, if the error was not caused by end of input.
    pub fn character(&self) -> Option<u8> {
        self.character
    }

    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.character {
            Some(c) if c.is_ascii_graphic() => {
                write!(f, "{:?} ('{}') at byte {}", self.kind, c as char, self.offset)
            }
            Some(c) => write!(f, "{:?} (0x{c:02x}) at byte {}", self.kind, self.offset),
            None => write!(f, "{:?} at byte {}", self.kind, self.offset),
        }
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_display_printable_character() {
        let err = ParseError::new(ErrKind::InvalidToken, Some(b'x'), 7);
        assert_eq!(err.to_string(), "InvalidToken ('x') at byte 7");
    }

    #[test]
    fn test_display_control_character_and_end() {
        let err = ParseError::new(ErrKind::UnescapedControlCharacter, Some(b'\n'), 3);
        assert_eq!(
            err.to_string(),
            "UnescapedControlCharacter (0x0a) at byte 3"
        );

        let err = ParseError::new(ErrKind::UnfinishedStream, None, 12);
        assert_eq!(err.to_string(), "UnfinishedStream at byte 12");
        assert_eq!(err.character(), None);
    }
}
