//! Typed facade over the dispatch pipeline.
//!
//! Every endpoint wrapper follows the same shape: normalize required arguments into the
//! caller's optional parameter overlay (required arguments overwrite, defaults only fill
//! gaps), build a [`Query`], enqueue it, await the private reply channel, and decode the body
//! into the endpoint's destination type.

// crates.io
use serde::de::DeserializeOwned;
use tokio::{sync::oneshot, task::JoinHandle};
// self
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestExecutor, signer::RequestSigner};
use crate::{
	_prelude::*,
	dispatch::{Dispatcher, QueryQueue, Submission},
	error::{BatchError, ConfigError},
	http::{self, QueryExecutor},
	query::{Category, Method, ParamSet, Query},
	rate::RatePolicy,
	types::{List, MemberUpdate, Ownerships, Tweet, User, UserCursor},
};

/// Page size accepted by the batch membership endpoints.
const MEMBER_PAGE_SIZE: usize = 100;

/// Client configuration validated at construction.
#[derive(Clone, Debug)]
pub struct ClientConfig {
	/// API base URL every endpoint path is joined onto.
	pub base_url: Url,
	/// Behavior when a category's rate budget is exhausted.
	pub rate_policy: RatePolicy,
	/// Capacity of the dispatcher's inbound queue.
	pub queue_capacity: usize,
}
impl ClientConfig {
	const DEFAULT_QUEUE_CAPACITY: usize = 64;

	/// Parses the base URL and applies defaults.
	///
	/// A trailing slash is enforced so endpoint paths join under the full base path instead of
	/// replacing its last segment.
	pub fn new(base_url: &str) -> Result<Self, ConfigError> {
		let mut base_url =
			Url::parse(base_url).map_err(|source| ConfigError::InvalidBaseUrl { source })?;

		if base_url.cannot_be_a_base() {
			return Err(ConfigError::OpaqueBaseUrl);
		}
		if !base_url.path().ends_with('/') {
			base_url.set_path(&format!("{}/", base_url.path()));
		}

		Ok(Self {
			base_url,
			rate_policy: RatePolicy::default(),
			queue_capacity: Self::DEFAULT_QUEUE_CAPACITY,
		})
	}

	/// Overrides the rate-limit exhaustion behavior.
	pub fn with_rate_policy(mut self, policy: RatePolicy) -> Self {
		self.rate_policy = policy;

		self
	}

	/// Overrides the dispatcher queue capacity (validated when the client is built).
	pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
		self.queue_capacity = capacity;

		self
	}
}

/// Identifies a user either by numeric id or by screen name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UserRef {
	/// Numeric user identifier.
	Id(i64),
	/// Handle without the leading `@`.
	ScreenName(String),
}
impl UserRef {
	fn apply(&self, params: &mut ParamSet) {
		match self {
			UserRef::Id(id) => params.set("user_id", id.to_string()),
			UserRef::ScreenName(name) => params.set("screen_name", name.clone()),
		}
	}
}

/// Identifies a list's owner when the list is addressed by slug.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListOwner {
	/// Numeric owner identifier.
	Id(i64),
	/// Owner handle without the leading `@`.
	ScreenName(String),
}
impl ListOwner {
	fn apply(&self, params: &mut ParamSet) {
		match self {
			ListOwner::Id(id) => params.set("owner_id", id.to_string()),
			ListOwner::ScreenName(name) => params.set("owner_screen_name", name.clone()),
		}
	}
}

/// Typed API client; one instance owns one dispatcher worker.
///
/// Dispatcher state (queue + rate tracker) is owned per client, never process-wide, so multiple
/// independently-configured clients coexist in one process. The worker exits once the client
/// (and any queue clones) are dropped.
#[derive(Debug)]
pub struct Client {
	queue: QueryQueue,
	worker: JoinHandle<()>,
	base_url: Url,
}
impl Client {
	#[cfg(feature = "reqwest")]
	/// Builds a reqwest-backed client signing every request with `signer`.
	///
	/// Must be called from within a tokio runtime; the dispatcher worker is spawned here.
	pub fn new(
		config: ClientConfig,
		signer: impl RequestSigner<ReqwestRequest> + 'static,
	) -> Result<Self> {
		let executor = ReqwestExecutor::new(Arc::new(signer))?;

		Self::with_executor(config, Arc::new(executor))
	}

	/// Builds a client over a caller-supplied transport.
	pub fn with_executor(config: ClientConfig, executor: Arc<dyn QueryExecutor>) -> Result<Self> {
		if config.queue_capacity == 0 {
			return Err(ConfigError::ZeroQueueCapacity.into());
		}

		let (queue, worker) =
			Dispatcher::spawn(executor, config.rate_policy, config.queue_capacity);

		Ok(Self { queue, worker, base_url: config.base_url })
	}

	/// Closes the queue and waits for the worker to drain in-flight queries and exit.
	///
	/// Dropping the client has the same effect without the wait.
	pub async fn shutdown(self) {
		let Self { queue, worker, .. } = self;

		drop(queue);

		let _ = worker.await;
	}

	/// Submits one query and decodes the reply into `T`.
	async fn request<T>(&self, method: Method, path: &str, params: ParamSet) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let url = self
			.base_url
			.join(path)
			.map_err(|source| ConfigError::InvalidEndpoint { path: path.to_owned(), source })?;
		// Derive the category from the endpoint path so the base path's version segment does
		// not split budgets.
		let query = Query::new(url, method, params).with_category(Category::from_path(path));
		let (reply_tx, reply_rx) = oneshot::channel();

		self.queue.send(Submission { query, reply: reply_tx }).await.map_err(|_| Error::Closed)?;

		let reply = reply_rx.await.map_err(|_| Error::Closed)??;

		http::decode(&reply)
	}

	/// Creates a new list. `POST lists/create.json`.
	pub async fn create_list(
		&self,
		name: &str,
		description: &str,
		overlay: Option<ParamSet>,
	) -> Result<List> {
		let mut params = overlay.unwrap_or_default();

		params.set("name", name);
		params.set("description", description);

		self.request(Method::Post, "lists/create.json", params).await
	}

	/// Adds one user to a list. `POST lists/members/create.json`.
	pub async fn add_list_member(
		&self,
		screen_name: &str,
		list_id: i64,
		overlay: Option<ParamSet>,
	) -> Result<Vec<User>> {
		let mut params = overlay.unwrap_or_default();

		params.set("list_id", list_id.to_string());
		params.set("screen_name", screen_name);

		let update: MemberUpdate =
			self.request(Method::Post, "lists/members/create.json", params).await?;

		Ok(update.users)
	}

	/// Lists owned by the given user. `GET lists/ownerships.json`.
	pub async fn lists_owned_by(
		&self,
		user_id: i64,
		overlay: Option<ParamSet>,
	) -> Result<Vec<List>> {
		let mut params = overlay.unwrap_or_default();

		params.set("user_id", user_id.to_string());

		let ownerships: Ownerships =
			self.request(Method::Get, "lists/ownerships.json", params).await?;

		Ok(ownerships.lists)
	}

	/// Recent tweets posted to a list. `GET lists/statuses.json`.
	pub async fn list_tweets(
		&self,
		list_id: i64,
		include_rts: bool,
		overlay: Option<ParamSet>,
	) -> Result<Vec<Tweet>> {
		let mut params = overlay.unwrap_or_default();

		params.set("list_id", list_id.to_string());
		params.set("include_rts", include_rts.to_string());

		self.request(Method::Get, "lists/statuses.json", params).await
	}

	/// Members of a list addressed by id. `GET lists/members.json`.
	pub async fn list_members(
		&self,
		list_id: i64,
		overlay: Option<ParamSet>,
	) -> Result<UserCursor> {
		let mut params = overlay.unwrap_or_default();

		params.set("list_id", list_id.to_string());

		self.request(Method::Get, "lists/members.json", params).await
	}

	/// Members of a list addressed by slug + owner. `GET lists/members.json`.
	pub async fn list_members_by_slug(
		&self,
		slug: &str,
		owner: &ListOwner,
		overlay: Option<ParamSet>,
	) -> Result<UserCursor> {
		let mut params = overlay.unwrap_or_default();

		params.set("slug", slug);
		owner.apply(&mut params);

		self.request(Method::Get, "lists/members.json", params).await
	}

	/// Removes one member from a slug-addressed list. `POST lists/members/destroy.json`.
	pub async fn remove_list_member(
		&self,
		slug: &str,
		member: &UserRef,
		owner: &ListOwner,
		overlay: Option<ParamSet>,
	) -> Result<UserCursor> {
		let mut params = overlay.unwrap_or_default();

		params.set("slug", slug);
		member.apply(&mut params);
		owner.apply(&mut params);

		self.request(Method::Post, "lists/members/destroy.json", params).await
	}

	/// Adds users to a slug-addressed list in batches. `POST lists/members/create_all.json`.
	///
	/// Input is split into chunks of 100 ids serviced in order; an empty slice is a no-op. A
	/// failing chunk aborts the remainder, and users from the completed chunks travel inside
	/// the returned [`BatchError`] rather than being lost.
	pub async fn add_list_members(
		&self,
		user_ids: &[i64],
		slug: &str,
		owner_id: i64,
		overlay: Option<ParamSet>,
	) -> Result<Vec<User>, BatchError<User>> {
		self.mutate_list_members("lists/members/create_all.json", user_ids, slug, owner_id, overlay)
			.await
	}

	/// Removes users from a slug-addressed list in batches. `POST lists/members/destroy_all.json`.
	///
	/// Chunking and partial-failure semantics match [`add_list_members`](Client::add_list_members).
	pub async fn remove_list_members(
		&self,
		user_ids: &[i64],
		slug: &str,
		owner_id: i64,
		overlay: Option<ParamSet>,
	) -> Result<Vec<User>, BatchError<User>> {
		self.mutate_list_members(
			"lists/members/destroy_all.json",
			user_ids,
			slug,
			owner_id,
			overlay,
		)
		.await
	}

	async fn mutate_list_members(
		&self,
		path: &'static str,
		user_ids: &[i64],
		slug: &str,
		owner_id: i64,
		overlay: Option<ParamSet>,
	) -> Result<Vec<User>, BatchError<User>> {
		let overlay = overlay.unwrap_or_default();
		let total = user_ids.chunks(MEMBER_PAGE_SIZE).len();
		let mut aggregated = Vec::with_capacity(user_ids.len());

		for (completed, chunk) in user_ids.chunks(MEMBER_PAGE_SIZE).enumerate() {
			let ids = chunk.iter().map(i64::to_string).collect::<Vec<_>>().join(",");
			let mut params = overlay.clone();

			params.set("slug", slug);
			params.set("user_id", ids);
			params.set("owner_id", owner_id.to_string());

			match self.request::<MemberUpdate>(Method::Post, path, params).await {
				Ok(update) => aggregated.extend(update.users),
				Err(source) =>
					return Err(BatchError { completed, total, partial: aggregated, source }),
			}
		}

		Ok(aggregated)
	}

	/// Looks up a single user. `GET users/show.json`.
	pub async fn show_user(&self, user: &UserRef, overlay: Option<ParamSet>) -> Result<User> {
		let mut params = overlay.unwrap_or_default();

		user.apply(&mut params);

		self.request(Method::Get, "users/show.json", params).await
	}

	/// Posts a new tweet. `POST statuses/update.json`.
	pub async fn post_tweet(&self, status: &str, overlay: Option<ParamSet>) -> Result<Tweet> {
		let mut params = overlay.unwrap_or_default();

		params.set("status", status);

		self.request(Method::Post, "statuses/update.json", params).await
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn base_url_gains_a_trailing_slash() {
		let config =
			ClientConfig::new("https://api.example.com/1.1").expect("Base URL should parse.");

		assert_eq!(config.base_url.as_str(), "https://api.example.com/1.1/");
		assert_eq!(
			config.base_url.join("lists/create.json").expect("Join should succeed.").as_str(),
			"https://api.example.com/1.1/lists/create.json",
		);
	}

	#[test]
	fn opaque_base_urls_are_rejected() {
		assert!(matches!(
			ClientConfig::new("mailto:owner@example.com"),
			Err(ConfigError::OpaqueBaseUrl),
		));
	}

	#[test]
	fn malformed_base_urls_are_rejected() {
		assert!(matches!(
			ClientConfig::new("not a url"),
			Err(ConfigError::InvalidBaseUrl { .. }),
		));
	}

	#[test]
	fn user_ref_sets_the_matching_parameter() {
		let mut by_id = ParamSet::new();
		let mut by_name = ParamSet::new();

		UserRef::Id(42).apply(&mut by_id);
		UserRef::ScreenName("gopher".into()).apply(&mut by_name);

		assert_eq!(by_id.get("user_id"), Some("42"));
		assert_eq!(by_id.get("screen_name"), None);
		assert_eq!(by_name.get("screen_name"), Some("gopher"));
		assert_eq!(by_name.get("user_id"), None);
	}

	#[test]
	fn list_owner_sets_the_owner_parameters() {
		let mut by_id = ParamSet::new();
		let mut by_name = ParamSet::new();

		ListOwner::Id(7).apply(&mut by_id);
		ListOwner::ScreenName("admin".into()).apply(&mut by_name);

		assert_eq!(by_id.get("owner_id"), Some("7"));
		assert_eq!(by_name.get("owner_screen_name"), Some("admin"));
	}
}
