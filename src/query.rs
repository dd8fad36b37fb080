//! Query model shared by the facade, dispatcher, and executor.

// self
use crate::_prelude::*;

/// HTTP method a query is dispatched with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
	/// Parameters are encoded into the query string.
	Get,
	/// Parameters are encoded as a form body.
	Post,
}
impl Method {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Ordered string-to-string parameter set.
///
/// [`set`](ParamSet::set) overwrites and is what endpoint wrappers use for required arguments;
/// [`set_default`](ParamSet::set_default) only fills absent keys, so caller-supplied overlays
/// are never clobbered by defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ParamSet(BTreeMap<String, String>);
impl ParamSet {
	/// Creates an empty parameter set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets a parameter, overwriting any existing value.
	pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
		self.0.insert(key.into(), value.into());
	}

	/// Sets a parameter only when the key is absent.
	pub fn set_default(&mut self, key: impl Into<String>, value: impl Into<String>) {
		self.0.entry(key.into()).or_insert_with(|| value.into());
	}

	/// Builder-style [`set`](ParamSet::set).
	pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.set(key, value);

		self
	}

	/// Returns the value stored under `key`, if any.
	pub fn get(&self, key: &str) -> Option<&str> {
		self.0.get(key).map(String::as_str)
	}

	/// Returns `true` when no parameters are set.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Number of parameters set.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Iterates over the parameters in key order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}
}

/// Logical endpoint grouping that shares one rate-limit budget.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Category(String);
impl Category {
	/// Wraps an explicit category label.
	pub fn new(label: impl Into<String>) -> Self {
		Self(label.into())
	}

	/// Derives the category from an endpoint path.
	///
	/// At most the first two path segments are kept and the `.json` suffix is stripped, so
	/// `lists/members/create_all.json` and `lists/members/destroy.json` land in the same
	/// `lists/members` budget.
	pub fn from_path(path: &str) -> Self {
		let stem = path.trim_matches('/');
		let stem = stem.strip_suffix(".json").unwrap_or(stem);
		let mut segments = stem.split('/').filter(|segment| !segment.is_empty());
		let label = match (segments.next(), segments.next()) {
			(Some(first), Some(second)) => format!("{first}/{second}"),
			(Some(first), None) => first.to_owned(),
			_ => "unknown".to_owned(),
		};

		Self(label)
	}

	/// Returns the category label.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl Display for Category {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

/// A single outbound API call.
///
/// Built by a facade method, consumed exactly once by the dispatcher, never reused. Parameters
/// are only mutated before the query is enqueued.
#[derive(Clone, Debug)]
pub struct Query {
	/// Absolute endpoint URL.
	pub url: Url,
	/// Parameters to encode into the query string or form body.
	pub params: ParamSet,
	/// HTTP method to dispatch with.
	pub method: Method,
	/// Rate-limit category the query is admitted under.
	pub category: Category,
}
impl Query {
	/// Creates a query, deriving the rate-limit category from the URL path.
	pub fn new(url: Url, method: Method, params: ParamSet) -> Self {
		let category = Category::from_path(url.path());

		Self { url, params, method, category }
	}

	/// Overrides the derived rate-limit category.
	pub fn with_category(mut self, category: Category) -> Self {
		self.category = category;

		self
	}
}

/// Raw, undecoded reply delivered on a query's one-shot channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawReply {
	/// HTTP status code of the response.
	pub status: u16,
	/// Response body bytes.
	pub body: Vec<u8>,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn defaults_never_clobber_overlay_values() {
		let mut params = ParamSet::new().with("a", "2").with("b", "3");

		params.set_default("a", "1");

		assert_eq!(params.get("a"), Some("2"));
		assert_eq!(params.get("b"), Some("3"));
		assert_eq!(params.len(), 2);
	}

	#[test]
	fn set_overwrites_existing_values() {
		let mut params = ParamSet::new().with("name", "old");

		params.set("name", "new");

		assert_eq!(params.get("name"), Some("new"));
	}

	#[test]
	fn category_keeps_at_most_two_segments() {
		assert_eq!(Category::from_path("/lists/members/create_all.json").as_str(), "lists/members");
		assert_eq!(Category::from_path("/lists/create.json").as_str(), "lists/create");
		assert_eq!(Category::from_path("statuses/update.json").as_str(), "statuses/update");
		assert_eq!(Category::from_path("/").as_str(), "unknown");
	}

	#[test]
	fn query_derives_category_from_url() {
		let url = Url::parse("https://api.example.com/1.1/lists/members.json")
			.expect("Fixture URL should parse.");
		let query = Query::new(url, Method::Get, ParamSet::new());

		// The version prefix counts as a segment; wrappers that care override the category.
		assert_eq!(query.category.as_str(), "1.1/lists");
	}
}
