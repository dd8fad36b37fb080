//! Client-level error types shared across the dispatcher, executor, and facade.

// self
use crate::{_prelude::*, query::Category};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
///
/// The dispatcher never swallows or retries these; whatever the executor produced is forwarded
/// verbatim on the query's reply channel.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS); retrying is the caller's responsibility.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Remote API rejected the call with a non-2xx status.
	#[error(transparent)]
	Api(#[from] ApiError),
	/// Response body could not be decoded into the requested shape.
	#[error(transparent)]
	Decode(#[from] DecodeError),

	/// Admission denied because the category's call budget is exhausted.
	#[error("Rate limit exhausted for `{category}`.")]
	RateLimited {
		/// Rate-limit category whose budget ran out.
		category: Category,
		/// Instant the budget resets, when the tracker knows it.
		reset_at: Option<OffsetDateTime>,
	},
	/// The dispatcher worker has shut down and can no longer service queries.
	#[error("Dispatcher is no longer running.")]
	Closed,
}

/// Configuration and validation failures raised while building a client.
///
/// These are the only failures allowed to be fatal at construction time; everything the remote
/// side does wrong surfaces as a regular [`Error`] instead.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Request construction failed before dispatch.
	#[error("Request could not be built.")]
	RequestBuild {
		/// Underlying request builder failure.
		#[source]
		source: BoxError,
	},
	/// Base URL cannot be parsed.
	#[error("Base URL is invalid.")]
	InvalidBaseUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Endpoint path cannot be joined onto the base URL.
	#[error("Endpoint path `{path}` is invalid.")]
	InvalidEndpoint {
		/// Offending endpoint path.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Base URL cannot serve as a base for endpoint paths.
	#[error("Base URL cannot serve as a base for endpoint paths.")]
	OpaqueBaseUrl,
	/// Signing credentials are missing or malformed.
	#[error("Signing credentials are missing or malformed.")]
	MissingCredentials,
	/// Queue capacity must be non-zero.
	#[error("Queue capacity must be non-zero.")]
	ZeroQueueCapacity,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}

	/// Wraps a request builder failure inside [`ConfigError`].
	pub fn request_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::RequestBuild { source: Box::new(src) }
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the API.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Structured error the remote API attached to a non-2xx response.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("API call failed with status {status}: {message}")]
pub struct ApiError {
	/// HTTP status code of the response.
	pub status: u16,
	/// Machine-readable error code from the structured body, when present.
	pub code: Option<u32>,
	/// Human-readable message from the structured body, or the raw body text.
	pub message: String,
}
impl ApiError {
	/// Builds an [`ApiError`] from a non-2xx response body.
	///
	/// The API reports failures as `{"errors":[{"code":..,"message":..}]}`; anything that does
	/// not match that shape is carried verbatim as the message.
	pub fn from_body(status: u16, body: &[u8]) -> Self {
		#[derive(Deserialize)]
		struct ErrorBody {
			#[serde(default)]
			errors: Vec<ErrorEntry>,
		}
		#[derive(Deserialize)]
		struct ErrorEntry {
			code: Option<u32>,
			message: String,
		}

		if let Ok(parsed) = serde_json::from_slice::<ErrorBody>(body)
			&& let Some(entry) = parsed.errors.into_iter().next()
		{
			return Self { status, code: entry.code, message: entry.message };
		}

		Self { status, code: None, message: String::from_utf8_lossy(body).trim().to_owned() }
	}
}

/// Response body did not match the destination shape.
#[derive(Debug, ThisError)]
#[error("Response body could not be decoded.")]
pub struct DecodeError {
	/// Structured parsing failure with the JSON path that diverged.
	#[source]
	pub source: serde_path_to_error::Error<serde_json::Error>,
	/// HTTP status code of the reply, when available.
	pub status: Option<u16>,
}

/// Partial-failure outcome of a chunked batch operation.
///
/// Chunks are serviced in input order; the first failing chunk aborts the remainder, and items
/// aggregated from the chunks that completed travel alongside the error instead of being lost.
#[derive(Debug, ThisError)]
#[error("Batch aborted after {completed} of {total} chunks.")]
pub struct BatchError<T>
where
	T: Debug,
{
	/// Number of chunks that completed before the failure.
	pub completed: usize,
	/// Total number of chunks the input was split into.
	pub total: usize,
	/// Items aggregated from the completed chunks.
	pub partial: Vec<T>,
	/// Error that aborted the batch.
	#[source]
	pub source: Error,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn api_error_parses_structured_body() {
		let body = br#"{"errors":[{"code":34,"message":"Sorry, that page does not exist."}]}"#;
		let err = ApiError::from_body(404, body);

		assert_eq!(err.status, 404);
		assert_eq!(err.code, Some(34));
		assert_eq!(err.message, "Sorry, that page does not exist.");
	}

	#[test]
	fn api_error_falls_back_to_raw_body() {
		let err = ApiError::from_body(502, b"Bad Gateway\n");

		assert_eq!(err.status, 502);
		assert_eq!(err.code, None);
		assert_eq!(err.message, "Bad Gateway");
	}

	#[test]
	fn rate_limited_names_the_category() {
		let err = Error::RateLimited {
			category: Category::new("lists/members"),
			reset_at: None,
		};

		assert!(err.to_string().contains("lists/members"));
	}
}
