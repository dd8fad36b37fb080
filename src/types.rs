//! Response DTOs the bundled facade decodes into.
//!
//! Shapes are deliberately lenient. The remote API trims fields depending on query parameters,
//! so everything optional defaults instead of failing the decode.

// self
use crate::_prelude::*;

/// A list owned by a user.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct List {
	/// Numeric list identifier.
	#[serde(default)]
	pub id: i64,
	/// URL-safe list slug.
	#[serde(default)]
	pub slug: String,
	/// Display name.
	#[serde(default)]
	pub name: String,
	/// Free-form description.
	#[serde(default)]
	pub description: String,
	/// Number of members.
	#[serde(default)]
	pub member_count: i64,
	/// Number of subscribers.
	#[serde(default)]
	pub subscriber_count: i64,
	/// Visibility mode (`public` or `private`).
	#[serde(default)]
	pub mode: String,
}

/// An account on the remote service.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct User {
	/// Numeric user identifier.
	#[serde(default)]
	pub id: i64,
	/// Handle without the leading `@`.
	#[serde(default)]
	pub screen_name: String,
	/// Display name.
	#[serde(default)]
	pub name: String,
	/// Whether the account's tweets are protected.
	#[serde(default)]
	pub protected: bool,
}

/// A single tweet.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Tweet {
	/// Numeric tweet identifier.
	#[serde(default)]
	pub id: i64,
	/// Tweet body.
	#[serde(default)]
	pub text: String,
	/// Author, when the endpoint includes it.
	#[serde(default)]
	pub user: User,
	/// Whether this tweet is a retweet.
	#[serde(default)]
	pub retweeted: bool,
}

/// Cursored page of users, as returned by the membership listing endpoints.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct UserCursor {
	/// Cursor for the previous page, `0` when exhausted.
	#[serde(default)]
	pub previous_cursor: i64,
	/// Cursor for the next page, `0` when exhausted.
	#[serde(default)]
	pub next_cursor: i64,
	/// Users on this page.
	#[serde(default)]
	pub users: Vec<User>,
}

/// Body wrapper returned by the membership mutation endpoints.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct MemberUpdate {
	/// Users affected by the mutation.
	#[serde(default)]
	pub users: Vec<User>,
}

/// Body wrapper returned by `lists/ownerships`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Ownerships {
	/// Lists on this page.
	#[serde(default)]
	pub lists: Vec<List>,
	/// Cursor for the previous page, `0` when exhausted.
	#[serde(default)]
	pub previous_cursor: i64,
	/// Cursor for the next page, `0` when exhausted.
	#[serde(default)]
	pub next_cursor: i64,
}
