// SPDX-License-Identifier: Apache-2.0

use std::borrow::Cow;

use log::trace;

use crate::escape::{decode_escape, CopyOnEscape};
use crate::nesting::{Container, NestingStack};
use crate::number::{scan_number, JsonNumber};
use crate::parse_error::{ErrKind, ParseError};

/// Tokens produced by [`TokenReader`].
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'a> {
    /// The start of an object (`{`).
    StartObject,
    /// The end of an object (`}`).
    EndObject,
    /// The start of an array (`[`).
    StartArray,
    /// The end of an array (`]`).
    EndArray,
    /// An object key, including its trailing `:`.
    Key(Cow<'a, str>),
    /// A string value.
    String(Cow<'a, str>),
    /// A number value.
    Number(JsonNumber<'a>),
    /// `true` or `false`.
    Bool(bool),
    /// `null`.
    Null,
    /// End of the document; returned once the root value is complete.
    EndDocument,
}

/// Coarse classification of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    StartArray,
    EndArray,
    StartObject,
    EndObject,
    FieldName,
    ScalarString,
    /// A number without fraction or exponent.
    ScalarInt,
    /// Floats, booleans and null.
    ScalarOther,
    EndDocument,
}

impl Token<'_> {
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::StartObject => TokenKind::StartObject,
            Token::EndObject => TokenKind::EndObject,
            Token::StartArray => TokenKind::StartArray,
            Token::EndArray => TokenKind::EndArray,
            Token::Key(_) => TokenKind::FieldName,
            Token::String(_) => TokenKind::ScalarString,
            Token::Number(n) if n.is_integer() => TokenKind::ScalarInt,
            Token::Number(_) | Token::Bool(_) | Token::Null => TokenKind::ScalarOther,
            Token::EndDocument => TokenKind::EndDocument,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Object {
    /// Just after `{`
    KeyOrEnd,
    /// Just after `,`
    Key,
    /// Just after `:`
    Value,
    CommaOrEnd,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Array {
    /// Just after `[`
    ItemOrEnd,
    /// Just after `,`
    Item,
    CommaOrEnd,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    /// Before the root value
    Idle,
    Object(Object),
    Array(Array),
    /// Root value complete, only whitespace may follow
    Finished,
}

/// A forward-only pull reader over a complete JSON document.
///
/// Each call to [`next_token`](Self::next_token) lexes exactly one token.
/// Strings and keys borrow from the input unless they contain escapes.
/// Errors are sticky: once the reader fails, every later call returns the
/// same error.
pub struct TokenReader<'a> {
    input: &'a [u8],
    pos: usize,
    state: State,
    nesting: NestingStack,
    peeked: Option<Token<'a>>,
    /// Offset where the last lexed token started
    token_start: usize,
    failed: Option<ParseError>,
}

impl<'a> TokenReader<'a> {
    /// Creates a reader positioned before the first token of `input`.
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            state: State::Idle,
            nesting: NestingStack::new(),
            peeked: None,
            token_start: 0,
            failed: None,
        }
    }

    /// Consumes and returns the next token.
    pub fn next_token(&mut self) -> Result<Token<'a>, ParseError> {
        if let Some(token) = self.peeked.take() {
            return Ok(token);
        }
        self.lex_checked()
    }

    /// Returns the next token without consuming it.
    pub fn peek(&mut self) -> Result<&Token<'a>, ParseError> {
        let token = match self.peeked.take() {
            Some(token) => token,
            None => self.lex_checked()?,
        };
        Ok(self.peeked.insert(token))
    }

    /// Consumes the value at the cursor.
    ///
    /// A scalar is one token. For an object or array every nested token is
    /// consumed through the matching closer, at any depth.
    pub fn skip_value(&mut self) -> Result<(), ParseError> {
        let mut depth = 0usize;
        loop {
            match self.next_token()? {
                Token::StartObject | Token::StartArray => depth += 1,
                Token::EndObject | Token::EndArray if depth > 0 => depth -= 1,
                Token::Key(key) if depth > 0 => trace!("skipping nested key {key:?}"),
                Token::EndObject | Token::EndArray | Token::Key(_) | Token::EndDocument => {
                    return ParseError::at_end(ErrKind::ExpectedValue, self.token_start);
                }
                Token::String(_) | Token::Number(_) | Token::Bool(_) | Token::Null => {}
            }
            if depth == 0 {
                return Ok(());
            }
        }
    }

    /// Byte offset where the most recently read or peeked token starts.
    pub fn offset(&self) -> usize {
        self.token_start
    }

    /// Current nesting depth of the lexer.
    pub fn depth(&self) -> u8 {
        self.nesting.depth()
    }

    fn lex_checked(&mut self) -> Result<Token<'a>, ParseError> {
        if let Some(err) = &self.failed {
            return Err(err.clone());
        }
        self.lex().inspect_err(|err| self.failed = Some(err.clone()))
    }

    fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.input.get(self.pos) {
            self.pos += 1;
        }
    }

    /// State after a complete value, depending on the enclosing container.
    fn after_value(&self) -> State {
        if self.nesting.is_empty() {
            return State::Finished;
        }
        match self.nesting.top() {
            Some(Container::Object) => State::Object(Object::CommaOrEnd),
            _ => State::Array(Array::CommaOrEnd),
        }
    }

    fn finish(&self) -> Result<Token<'a>, ParseError> {
        match self.state {
            State::Finished => Ok(Token::EndDocument),
            State::Idle => ParseError::at_end(ErrKind::EmptyStream, self.pos),
            _ => ParseError::at_end(ErrKind::UnfinishedStream, self.pos),
        }
    }

    fn lex(&mut self) -> Result<Token<'a>, ParseError> {
        loop {
            self.skip_whitespace();
            let pos = self.pos;
            self.token_start = pos;
            let Some(&byte) = self.input.get(pos) else {
                return self.finish();
            };

            match (self.state, byte) {
                (State::Finished, _) => {
                    return ParseError::at(ErrKind::TrailingContent, byte, pos);
                }
                (State::Object(Object::CommaOrEnd), b',') => {
                    self.pos += 1;
                    self.state = State::Object(Object::Key);
                }
                (State::Array(Array::CommaOrEnd), b',') => {
                    self.pos += 1;
                    self.state = State::Array(Array::Item);
                }
                (State::Object(Object::KeyOrEnd | Object::CommaOrEnd), b'}') => {
                    return self.close(Container::Object, byte);
                }
                (State::Array(Array::ItemOrEnd | Array::CommaOrEnd), b']') => {
                    return self.close(Container::Array, byte);
                }
                (State::Object(Object::Key), b'}') | (State::Array(Array::Item), b']') => {
                    return ParseError::at(ErrKind::TrailingComma, byte, pos);
                }
                (State::Object(Object::CommaOrEnd), b']')
                | (State::Array(Array::CommaOrEnd), b'}') => {
                    return ParseError::at(ErrKind::MismatchedContainer, byte, pos);
                }
                (State::Object(Object::CommaOrEnd) | State::Array(Array::CommaOrEnd), _) => {
                    return ParseError::at(ErrKind::ExpectedCommaOrEnd, byte, pos);
                }
                (State::Object(Object::KeyOrEnd | Object::Key), b'"') => {
                    return self.lex_key(pos);
                }
                (State::Object(Object::KeyOrEnd | Object::Key), _) => {
                    return ParseError::at(ErrKind::ExpectedObjectKey, byte, pos);
                }
                (
                    State::Idle
                    | State::Object(Object::Value)
                    | State::Array(Array::ItemOrEnd | Array::Item),
                    _,
                ) => return self.lex_value(pos, byte),
            }
        }
    }

    fn close(&mut self, container: Container, byte: u8) -> Result<Token<'a>, ParseError> {
        let pos = self.pos;
        if self.nesting.pop() != Some(container) {
            return ParseError::at(ErrKind::MismatchedContainer, byte, pos);
        }
        self.pos += 1;
        self.state = self.after_value();
        Ok(match container {
            Container::Object => Token::EndObject,
            Container::Array => Token::EndArray,
        })
    }

    fn open(&mut self, container: Container, byte: u8) -> Result<Token<'a>, ParseError> {
        if !self.nesting.push(container) {
            return ParseError::at(ErrKind::MaxDepthReached, byte, self.pos);
        }
        self.pos += 1;
        Ok(match container {
            Container::Object => {
                self.state = State::Object(Object::KeyOrEnd);
                Token::StartObject
            }
            Container::Array => {
                self.state = State::Array(Array::ItemOrEnd);
                Token::StartArray
            }
        })
    }

    fn lex_key(&mut self, quote: usize) -> Result<Token<'a>, ParseError> {
        let key = self.lex_string(quote)?;
        self.skip_whitespace();
        match self.input.get(self.pos) {
            Some(b':') => {
                self.pos += 1;
                self.state = State::Object(Object::Value);
                Ok(Token::Key(key))
            }
            Some(&other) => ParseError::at(ErrKind::ExpectedColon, other, self.pos),
            None => ParseError::at_end(ErrKind::UnfinishedStream, self.pos),
        }
    }

    fn lex_value(&mut self, pos: usize, byte: u8) -> Result<Token<'a>, ParseError> {
        let token = match byte {
            b'{' => return self.open(Container::Object, byte),
            b'[' => return self.open(Container::Array, byte),
            b'"' => Token::String(self.lex_string(pos)?),
            b'-' | b'0'..=b'9' => {
                let end = scan_number(self.input, pos)?;
                // Number bytes are ASCII
                let raw = core::str::from_utf8(&self.input[pos..end])
                    .map_err(|_| ParseError::new(ErrKind::InvalidNumber, Some(byte), pos))?;
                self.pos = end;
                Token::Number(JsonNumber::from_validated(raw))
            }
            b't' => self.lex_literal(b"true", Token::Bool(true))?,
            b'f' => self.lex_literal(b"false", Token::Bool(false))?,
            b'n' => self.lex_literal(b"null", Token::Null)?,
            _ => {
                let kind = match self.state {
                    State::Object(_) => ErrKind::ExpectedObjectValue,
                    State::Array(_) => ErrKind::ExpectedArrayItem,
                    _ => ErrKind::InvalidToken,
                };
                return ParseError::at(kind, byte, pos);
            }
        };
        self.state = self.after_value();
        Ok(token)
    }

    fn lex_literal(
        &mut self,
        literal: &'static [u8],
        token: Token<'a>,
    ) -> Result<Token<'a>, ParseError> {
        let start = self.pos;
        for (i, &expected) in literal.iter().enumerate() {
            match self.input.get(start + i) {
                Some(&actual) if actual == expected => {}
                Some(&actual) => return ParseError::at(ErrKind::InvalidToken, actual, start + i),
                None => return ParseError::at_end(ErrKind::UnfinishedStream, start + i),
            }
        }
        self.pos = start + literal.len();
        Ok(token)
    }

    /// Lexes the string whose opening quote is at `quote`.
    fn lex_string(&mut self, quote: usize) -> Result<Cow<'a, str>, ParseError> {
        let input = self.input;
        let mut text = CopyOnEscape::new(input, quote + 1);
        let mut pos = quote + 1;
        loop {
            match input.get(pos) {
                Some(b'"') => {
                    self.pos = pos + 1;
                    return text.finish(pos);
                }
                Some(b'\\') => pos = decode_escape(input, pos, &mut text)?,
                Some(&byte @ 0x00..=0x1F) => {
                    return ParseError::at(ErrKind::UnescapedControlCharacter, byte, pos);
                }
                Some(_) => pos += 1,
                None => return ParseError::at_end(ErrKind::UnfinishedStream, pos),
            }
        }
    }
}

impl<'a> Iterator for TokenReader<'a> {
    type Item = Result<Token<'a>, ParseError>;

    /// Yields tokens until `EndDocument`, stopping after the first error.
    fn next(&mut self) -> Option<Self::Item> {
        if self.failed.is_some() && self.peeked.is_none() {
            return None;
        }
        match self.next_token() {
            Ok(Token::EndDocument) => None,
            other => Some(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn tokens(json: &str) -> Result<Vec<Token<'_>>, ParseError> {
        TokenReader::new(json.as_bytes()).collect()
    }

    fn error_kind(json: &str) -> ErrKind {
        match tokens(json) {
            Err(e) => e.kind(),
            Ok(t) => panic!("expected an error for {json:?}, got {t:?}"),
        }
    }

    #[test]
    fn test_flat_object() {
        let t = tokens(r#"{"name": "Bob", "id": 5, "ok": true, "none": null}"#).unwrap();
        assert_eq!(t.len(), 10);
        assert_eq!(t[0], Token::StartObject);
        assert_eq!(t[1], Token::Key(Cow::Borrowed("name")));
        assert_eq!(t[2], Token::String(Cow::Borrowed("Bob")));
        assert_eq!(t[3], Token::Key(Cow::Borrowed("id")));
        assert_eq!(t[4].kind(), TokenKind::ScalarInt);
        assert_eq!(t[6], Token::Bool(true));
        assert_eq!(t[8], Token::Null);
        assert_eq!(t[9], Token::EndObject);
    }

    #[test]
    fn test_token_kinds() {
        let kinds: Vec<TokenKind> = tokens(r#"[{"a": "s"}, 1, 1.5, false, null, []]"#)
            .unwrap()
            .iter()
            .map(Token::kind)
            .collect();
        assert_eq!(
            kinds,
            [
                TokenKind::StartArray,
                TokenKind::StartObject,
                TokenKind::FieldName,
                TokenKind::ScalarString,
                TokenKind::EndObject,
                TokenKind::ScalarInt,
                TokenKind::ScalarOther,
                TokenKind::ScalarOther,
                TokenKind::ScalarOther,
                TokenKind::StartArray,
                TokenKind::EndArray,
                TokenKind::EndArray,
            ]
        );
    }

    #[test]
    fn test_numbers_adjacent_to_closers() {
        let t = tokens("[1,[2],{\"k\":3}]").unwrap();
        let ints: Vec<i64> = t
            .iter()
            .filter_map(|token| match token {
                Token::Number(n) => n.as_int(),
                _ => None,
            })
            .collect();
        assert_eq!(ints, [1, 2, 3]);
    }

    #[test]
    fn test_scalar_root() {
        assert_eq!(tokens(" \"just text\" ").unwrap().len(), 1);
        let t = tokens("42").unwrap();
        assert_eq!(t[0].kind(), TokenKind::ScalarInt);
    }

    #[test]
    fn test_document_ends_when_root_closes() {
        let mut reader = TokenReader::new(b"[{}] ");
        assert_eq!(reader.next_token(), Ok(Token::StartArray));
        assert_eq!(reader.next_token(), Ok(Token::StartObject));
        assert_eq!(reader.next_token(), Ok(Token::EndObject));
        assert_eq!(reader.depth(), 1);
        assert_eq!(reader.next_token(), Ok(Token::EndArray));
        assert_eq!(reader.depth(), 0);
        assert_eq!(reader.next_token(), Ok(Token::EndDocument));
        assert_eq!(error_kind("[{}] {}"), ErrKind::TrailingContent);
    }

    #[test]
    fn test_escaped_key_is_owned() {
        let t = tokens(r#"{"a\"b": 1}"#).unwrap();
        match &t[1] {
            Token::Key(Cow::Owned(key)) => assert_eq!(key, "a\"b"),
            other => panic!("expected owned key, got {other:?}"),
        }
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut reader = TokenReader::new(b"[true]");
        assert_eq!(reader.next_token(), Ok(Token::StartArray));
        assert_eq!(reader.peek(), Ok(&Token::Bool(true)));
        assert_eq!(reader.peek(), Ok(&Token::Bool(true)));
        assert_eq!(reader.next_token(), Ok(Token::Bool(true)));
        assert_eq!(reader.next_token(), Ok(Token::EndArray));
        assert_eq!(reader.next_token(), Ok(Token::EndDocument));
        assert_eq!(reader.next_token(), Ok(Token::EndDocument));
    }

    #[test]
    fn test_skip_value_nested() {
        let json = r#"{"skip": {"a": [1, {"b": [[], {}]}], "c": "}"}, "keep": 7}"#;
        let mut reader = TokenReader::new(json.as_bytes());
        assert_eq!(reader.next_token(), Ok(Token::StartObject));
        assert_eq!(reader.next_token(), Ok(Token::Key(Cow::Borrowed("skip"))));
        reader.skip_value().unwrap();
        assert_eq!(reader.depth(), 1);
        assert_eq!(reader.next_token(), Ok(Token::Key(Cow::Borrowed("keep"))));
        match reader.next_token() {
            Ok(Token::Number(n)) => assert_eq!(n.as_int(), Some(7)),
            other => panic!("expected number, got {other:?}"),
        }
        assert_eq!(reader.next_token(), Ok(Token::EndObject));
    }

    #[test]
    fn test_skip_value_scalar_and_after_peek() {
        let mut reader = TokenReader::new(br#"["x", [1, 2], 3]"#);
        assert_eq!(reader.next_token(), Ok(Token::StartArray));
        reader.skip_value().unwrap();
        assert_eq!(reader.peek(), Ok(&Token::StartArray));
        reader.skip_value().unwrap();
        assert_eq!(reader.peek().map(Token::kind), Ok(TokenKind::ScalarInt));
        reader.skip_value().unwrap();
        assert_eq!(reader.next_token(), Ok(Token::EndArray));
    }

    #[test]
    fn test_skip_value_at_closer_is_an_error() {
        let mut reader = TokenReader::new(b"[]");
        assert_eq!(reader.next_token(), Ok(Token::StartArray));
        assert_eq!(
            reader.skip_value().map_err(|e| e.kind()),
            Err(ErrKind::ExpectedValue)
        );
    }

    #[test]
    fn test_errors_are_sticky() {
        let mut reader = TokenReader::new(b"[tru]");
        assert_eq!(reader.next_token(), Ok(Token::StartArray));
        let first = reader.next_token().unwrap_err();
        assert_eq!(first.kind(), ErrKind::InvalidToken);
        assert_eq!(first.offset(), 4);
        assert_eq!(reader.next_token(), Err(first));
    }

    #[test]
    fn test_structural_errors() {
        assert_eq!(error_kind(""), ErrKind::EmptyStream);
        assert_eq!(error_kind("   \n"), ErrKind::EmptyStream);
        assert_eq!(error_kind("[1, 2"), ErrKind::UnfinishedStream);
        assert_eq!(error_kind("[1,]"), ErrKind::TrailingComma);
        assert_eq!(error_kind(r#"{"a":1,}"#), ErrKind::TrailingComma);
        assert_eq!(error_kind("[1}"), ErrKind::MismatchedContainer);
        assert_eq!(error_kind(r#"{"a":1]"#), ErrKind::MismatchedContainer);
        assert_eq!(error_kind("[1 2]"), ErrKind::ExpectedCommaOrEnd);
        assert_eq!(error_kind("{a:1}"), ErrKind::ExpectedObjectKey);
        assert_eq!(error_kind(r#"{"a" 1}"#), ErrKind::ExpectedColon);
        assert_eq!(error_kind(r#"{"a": }"#), ErrKind::ExpectedObjectValue);
        assert_eq!(error_kind("[,1]"), ErrKind::ExpectedArrayItem);
        assert_eq!(error_kind("[] []"), ErrKind::TrailingContent);
        assert_eq!(error_kind("]"), ErrKind::InvalidToken);
        assert_eq!(error_kind("[nul]"), ErrKind::InvalidToken);
        assert_eq!(error_kind("[01]"), ErrKind::ExpectedCommaOrEnd);
        assert_eq!(error_kind("[\"a\nb\"]"), ErrKind::UnescapedControlCharacter);
    }

    #[test]
    fn test_invalid_utf8_offset() {
        let mut input = b"[\"ab".to_vec();
        input.push(0xFF);
        input.extend_from_slice(b"\"]");
        let mut reader = TokenReader::new(&input);
        assert_eq!(reader.next_token(), Ok(Token::StartArray));
        let err = reader.next_token().unwrap_err();
        assert_eq!(err.kind(), ErrKind::InvalidUtf8);
        assert_eq!(err.offset(), 4);
        assert_eq!(err.character(), Some(0xFF));
    }

    #[test]
    fn test_max_depth() {
        let ok = "[".repeat(128) + &"]".repeat(128);
        assert!(tokens(&ok).is_ok());
        let too_deep = "[".repeat(129) + &"]".repeat(129);
        assert_eq!(error_kind(&too_deep), ErrKind::MaxDepthReached);
    }
}
