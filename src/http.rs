//! Transport primitives for query execution.
//!
//! The module exposes [`QueryExecutor`] alongside [`RateMetadata`] and [`RateMetadataSlot`] so
//! downstream crates can integrate custom HTTP clients without losing rate-limit tracking.
//! Implementations call [`RateMetadataSlot::take`] before dispatching a request and
//! [`RateMetadataSlot::store`] once rate-limit headers are known, error statuses included, so a
//! 429 still teaches the tracker.

// crates.io
#[cfg(feature = "reqwest")] use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde::de::DeserializeOwned;
#[cfg(feature = "reqwest")] use time::format_description::well_known::Rfc2822;
// self
#[cfg(feature = "reqwest")]
use crate::{
	error::{ApiError, ConfigError, TransportError},
	query::Method,
	signer::RequestSigner,
};
use crate::{
	_prelude::*,
	error::DecodeError,
	query::{Query, RawReply},
};

/// Boxed future returned by [`QueryExecutor::execute`].
pub type ExecFuture<'a> = Pin<Box<dyn Future<Output = Result<RawReply>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing one signed API query.
///
/// The trait is the dispatch core's only dependency on an HTTP stack. Implementations must be
/// `Send + Sync + 'static` so one executor can serve the dispatcher worker for the lifetime of
/// the client.
pub trait QueryExecutor
where
	Self: 'static + Send + Sync,
{
	/// Performs the network call described by `query`.
	///
	/// # Metadata Contract
	///
	/// - Call [`RateMetadataSlot::take`] before submitting the request so stale information never
	///   leaks across calls.
	/// - Once a response provides rate-limit headers, save them with [`RateMetadataSlot::store`]
	///   regardless of the status code.
	/// - Map transport failures to [`TransportError`](crate::error::TransportError) and non-2xx
	///   statuses to [`ApiError`](crate::error::ApiError); only 2xx replies return a [`RawReply`].
	fn execute<'a>(&'a self, query: &'a Query, slot: &'a RateMetadataSlot) -> ExecFuture<'a>;
}

/// Rate-limit facts captured from the most recent response.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RateMetadata {
	/// Calls left in the current window, from `x-rate-limit-remaining`.
	pub remaining: Option<u32>,
	/// Window reset instant, from `x-rate-limit-reset` (unix seconds).
	pub reset_at: Option<OffsetDateTime>,
	/// Retry-After hint expressed as a relative duration.
	pub retry_after: Option<Duration>,
}

/// Thread-safe slot for handing [`RateMetadata`] from the executor to the dispatcher.
///
/// The dispatcher creates a fresh slot for each query and drains it into the rate tracker
/// immediately after the executor resolves. Executors borrow the slot just long enough to call
/// [`store`](RateMetadataSlot::store).
#[derive(Clone, Debug, Default)]
pub struct RateMetadataSlot(Arc<Mutex<Option<RateMetadata>>>);
impl RateMetadataSlot {
	/// Stores new metadata for the current query.
	pub fn store(&self, meta: RateMetadata) {
		*self.0.lock() = Some(meta);
	}

	/// Returns the captured metadata, if any, consuming it from the slot.
	pub fn take(&self) -> Option<RateMetadata> {
		self.0.lock().take()
	}
}

/// Decodes a raw reply body into the caller's destination shape.
pub fn decode<T>(reply: &RawReply) -> Result<T>
where
	T: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_slice(&reply.body);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| DecodeError { source, status: Some(reply.status) }.into())
}

#[cfg(feature = "reqwest")]
/// Default [`QueryExecutor`] backed by reqwest.
///
/// Encodes parameters into the query string for GET and a form body for POST, signs the built
/// request through the configured [`RequestSigner`], and publishes observed rate headers to the
/// dispatcher's slot.
#[derive(Clone)]
pub struct ReqwestExecutor {
	client: ReqwestClient,
	signer: Arc<dyn RequestSigner<ReqwestRequest>>,
}
#[cfg(feature = "reqwest")]
impl ReqwestExecutor {
	/// Builds an executor with a fresh reqwest client.
	pub fn new(signer: Arc<dyn RequestSigner<ReqwestRequest>>) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().build().map_err(ConfigError::http_client_build)?;

		Ok(Self::with_client(client, signer))
	}

	/// Wraps an existing reqwest client.
	pub fn with_client(
		client: ReqwestClient,
		signer: Arc<dyn RequestSigner<ReqwestRequest>>,
	) -> Self {
		Self { client, signer }
	}

	async fn run(&self, query: &Query, slot: &RateMetadataSlot) -> Result<RawReply> {
		slot.take();

		let builder = match query.method {
			Method::Get => self.client.get(query.url.clone()).query(&query.params),
			Method::Post => self.client.post(query.url.clone()).form(&query.params),
		};
		let request = builder.build().map_err(ConfigError::request_build)?;
		let request = self.signer.sign(request)?;
		let response =
			self.client.execute(request).await.map_err(TransportError::from)?;
		let status = response.status().as_u16();

		if let Some(meta) = parse_rate_headers(response.headers()) {
			slot.store(meta);
		}

		let body = response.bytes().await.map_err(TransportError::from)?.to_vec();

		if !(200..300).contains(&status) {
			return Err(ApiError::from_body(status, &body).into());
		}

		Ok(RawReply { status, body })
	}
}
#[cfg(feature = "reqwest")]
impl QueryExecutor for ReqwestExecutor {
	fn execute<'a>(&'a self, query: &'a Query, slot: &'a RateMetadataSlot) -> ExecFuture<'a> {
		Box::pin(self.run(query, slot))
	}
}

#[cfg(feature = "reqwest")]
fn parse_rate_headers(headers: &HeaderMap) -> Option<RateMetadata> {
	let remaining = header_value(headers, "x-rate-limit-remaining")
		.and_then(|raw| raw.parse::<u32>().ok());
	let reset_at = header_value(headers, "x-rate-limit-reset")
		.and_then(|raw| raw.parse::<i64>().ok())
		.and_then(|secs| OffsetDateTime::from_unix_timestamp(secs).ok());
	let retry_after = parse_retry_after(headers);

	if remaining.is_none() && reset_at.is_none() && retry_after.is_none() {
		return None;
	}

	Some(RateMetadata { remaining, reset_at, retry_after })
}

#[cfg(feature = "reqwest")]
fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
	headers.get(name).and_then(|value| value.to_str().ok()).map(str::trim)
}

#[cfg(feature = "reqwest")]
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let raw = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return Some(Duration::seconds(secs as i64));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}
