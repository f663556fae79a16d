// SPDX-License-Identifier: Apache-2.0

//! Fetches a social user feed and decodes it into typed records.
//!
//! The decoder pulls tokens from a [`TokenReader`] and fills [`User`] and
//! [`Friend`] values directly, skipping unknown fields without building a
//! generic JSON tree. [`FetchCoordinator`] wraps an [`HttpClient`] and
//! delivers the result to a callback on a worker thread.
//!
//! ```
//! use socialfeed::UserListDecoder;
//!
//! let users = UserListDecoder::new()
//!     .decode_str(r#"[{"_id": "1", "friends": [{"id": 5, "name": "Bob"}]}]"#)
//!     .unwrap();
//! assert_eq!(users[0].friends[0].name, "Bob");
//! ```

mod config;
mod decoder;
mod error;
mod escape;
mod fetch;
mod model;
mod nesting;
mod number;
mod parse_error;
mod token_reader;

pub use config::{ConfigError, FeedConfig, ENDPOINT_ENV};
pub use decoder::{
    decode_friend, decode_friends, decode_user, decode_user_list, DecodeResult, UserListDecoder,
};
pub use error::{ErrorKind, FeedError, TransportError};
pub use fetch::{FetchCoordinator, HttpClient, HttpResponse};
#[cfg(feature = "ureq-client")]
pub use fetch::UreqClient;
pub use model::{Friend, User, UserList};
pub use nesting::MAX_DEPTH;
pub use number::{JsonNumber, NumberResult};
pub use parse_error::{ErrKind, ParseError};
pub use token_reader::{Token, TokenKind, TokenReader};
