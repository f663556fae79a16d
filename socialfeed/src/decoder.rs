// SPDX-License-Identifier: Apache-2.0

//! Typed decoding of the user feed on top of [`TokenReader`].
//!
//! Every decoder expects the cursor at the opening token of its construct and
//! returns once the matching closing token is consumed. Field order does not
//! matter, unknown fields are skipped, and a repeated field keeps the value of
//! its last occurrence.

use log::{debug, trace};

use crate::error::FeedError;
use crate::model::{Friend, User, UserList};
use crate::token_reader::{Token, TokenKind, TokenReader};

/// Outcome of decoding one document.
pub type DecodeResult = Result<UserList, FeedError>;

/// Decodes a feed document: a root array of user objects.
///
/// The decoder holds no state, so one value can be shared freely between
/// threads and reused for any number of documents.
#[derive(Debug, Default, Clone, Copy)]
pub struct UserListDecoder;

impl UserListDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Decodes a complete document. Any failure aborts the whole decode.
    pub fn decode(&self, raw: &[u8]) -> DecodeResult {
        let mut reader = TokenReader::new(raw);
        let users = decode_user_list(&mut reader)?;
        debug!("decoded {} users from {} bytes", users.len(), raw.len());
        Ok(users)
    }

    pub fn decode_str(&self, raw: &str) -> DecodeResult {
        self.decode(raw.as_bytes())
    }
}

fn schema_violation(reader: &TokenReader<'_>, expected: &'static str) -> FeedError {
    FeedError::SchemaViolation {
        expected,
        offset: reader.offset(),
    }
}

fn type_mismatch(reader: &TokenReader<'_>, field: &'static str) -> FeedError {
    FeedError::TypeMismatch {
        field,
        offset: reader.offset(),
    }
}

/// Decodes the root array, then requires the end of the document.
pub fn decode_user_list(reader: &mut TokenReader<'_>) -> DecodeResult {
    if reader.next_token()? != Token::StartArray {
        return Err(schema_violation(reader, "array of users"));
    }
    let mut users = UserList::new();
    loop {
        match reader.peek()?.kind() {
            TokenKind::EndArray => {
                reader.next_token()?;
                break;
            }
            TokenKind::StartObject => users.push(decode_user(reader)?),
            _ => return Err(schema_violation(reader, "user object")),
        }
    }
    match reader.next_token()? {
        Token::EndDocument => Ok(users),
        _ => Err(schema_violation(reader, "end of document")),
    }
}

fn expect_start_object(
    reader: &mut TokenReader<'_>,
    expected: &'static str,
) -> Result<(), FeedError> {
    match reader.next_token()? {
        Token::StartObject => Ok(()),
        _ => Err(schema_violation(reader, expected)),
    }
}

/// Decodes one user object.
pub fn decode_user(reader: &mut TokenReader<'_>) -> Result<User, FeedError> {
    expect_start_object(reader, "user object")?;
    let mut user = User::default();
    loop {
        let key = match reader.next_token()? {
            Token::EndObject => return Ok(user),
            Token::Key(key) => key,
            _ => return Err(schema_violation(reader, "user field")),
        };
        match key.as_ref() {
            "_id" => read_string(reader, "_id", &mut user.id)?,
            "picture" => read_string(reader, "picture", &mut user.picture_url)?,
            "email" => read_string(reader, "email", &mut user.email)?,
            "phone" => read_string(reader, "phone", &mut user.phone_number)?,
            "about" => read_string(reader, "about", &mut user.about)?,
            "friends" => user.friends = decode_friends(reader)?,
            other => {
                trace!("skipping user field {other:?}");
                reader.skip_value()?;
            }
        }
    }
}

/// Decodes a friends array. `null` reads as an empty list.
pub fn decode_friends(reader: &mut TokenReader<'_>) -> Result<Vec<Friend>, FeedError> {
    match reader.next_token()? {
        Token::StartArray => {}
        Token::Null => return Ok(Vec::new()),
        _ => return Err(schema_violation(reader, "friends array")),
    }
    let mut friends = Vec::new();
    loop {
        match reader.peek()?.kind() {
            TokenKind::EndArray => {
                reader.next_token()?;
                return Ok(friends);
            }
            TokenKind::StartObject => friends.push(decode_friend(reader)?),
            _ => return Err(schema_violation(reader, "friend object")),
        }
    }
}

/// Decodes one friend object.
pub fn decode_friend(reader: &mut TokenReader<'_>) -> Result<Friend, FeedError> {
    expect_start_object(reader, "friend object")?;
    let mut friend = Friend::default();
    loop {
        let key = match reader.next_token()? {
            Token::EndObject => return Ok(friend),
            Token::Key(key) => key,
            _ => return Err(schema_violation(reader, "friend field")),
        };
        match key.as_ref() {
            "id" => read_int(reader, "id", &mut friend.id)?,
            "name" => read_string(reader, "name", &mut friend.name)?,
            other => {
                trace!("skipping friend field {other:?}");
                reader.skip_value()?;
            }
        }
    }
}

/// Reads a string field. Numbers and booleans keep their literal text and
/// `null` leaves the field untouched.
fn read_string(
    reader: &mut TokenReader<'_>,
    field: &'static str,
    target: &mut String,
) -> Result<(), FeedError> {
    match reader.next_token()? {
        Token::String(text) => *target = text.into_owned(),
        Token::Number(number) => *target = number.as_str().to_owned(),
        Token::Bool(value) => *target = value.to_string(),
        Token::Null => {}
        _ => return Err(type_mismatch(reader, field)),
    }
    Ok(())
}

/// Reads an integer field. Decimal integer strings such as `"42"` are
/// accepted; `null` leaves the field untouched.
fn read_int(
    reader: &mut TokenReader<'_>,
    field: &'static str,
    target: &mut i64,
) -> Result<(), FeedError> {
    match reader.next_token()? {
        Token::Number(number) => match number.as_int() {
            Some(value) => *target = value,
            None => return Err(type_mismatch(reader, field)),
        },
        Token::String(text) => match text.parse::<i64>() {
            Ok(value) => *target = value,
            Err(_) => return Err(type_mismatch(reader, field)),
        },
        Token::Null => {}
        _ => return Err(type_mismatch(reader, field)),
    }
    Ok(())
}
