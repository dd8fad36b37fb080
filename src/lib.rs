//! Typed client for Twitter-style REST APIs: a rate-limit-aware query dispatcher, pluggable
//! request signing, and chunk-safe batch endpoints in one crate.
//!
//! Every endpoint wrapper funnels into the same pipeline: the facade builds a [`query::Query`],
//! enqueues it on the dispatcher's FIFO queue, and awaits a private one-shot reply channel. The
//! dispatcher consults the per-category rate tracker before each call, delegates to a pluggable
//! [`http::QueryExecutor`], and always completes the reply exactly once per query.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod client;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod obs;
pub mod query;
pub mod rate;
pub mod signer;
pub mod types;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		client::{Client, ClientConfig},
		rate::RatePolicy,
		signer::BearerSigner,
	};

	/// Bearer token every mock-backed test client signs with.
	pub const TEST_BEARER_TOKEN: &str = "test-bearer-token";

	/// Builds a client pointed at a mock server with the requested rate policy.
	pub fn build_mock_client(base_url: &str, policy: RatePolicy) -> Client {
		let config = ClientConfig::new(base_url)
			.expect("Mock base URL should parse successfully.")
			.with_rate_policy(policy);
		let signer =
			BearerSigner::new(TEST_BEARER_TOKEN).expect("Test bearer token should be accepted.");

		Client::new(config, signer).expect("Mock client should build successfully.")
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError, Request as ReqwestRequest};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use httpmock as _;
#[cfg(test)] use chirp_client as _;
