// SPDX-License-Identifier: Apache-2.0

/// A friend entry nested inside a [`User`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Friend {
    pub id: i64,
    pub name: String,
}

/// A user record from the social feed.
///
/// Fields missing from the document keep their defaults; `friends` keeps the
/// order of the source array.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub picture_url: String,
    pub email: String,
    pub phone_number: String,
    pub about: String,
    pub friends: Vec<Friend>,
}

/// Users in document order.
pub type UserList = Vec<User>;
