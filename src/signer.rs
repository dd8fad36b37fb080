//! Request signing contracts that keep the dispatch core independent of any concrete HTTP
//! client or credential scheme.

// crates.io
#[cfg(feature = "reqwest")] use reqwest::header::{AUTHORIZATION, HeaderValue};
// self
use crate::_prelude::*;
#[cfg(feature = "reqwest")] use crate::error::ConfigError;

/// Attaches authentication state to an outbound request without constraining the transport's
/// request type.
///
/// The trait is intentionally generic over the request so implementers can integrate with any
/// client (`reqwest`, a bespoke SDK, a test stub) while the dispatch core stays free of those
/// dependencies. Signing happens once per query, after parameter encoding and before transport.
pub trait RequestSigner<Request>
where
	Self: Send + Sync,
{
	/// Consumes the built request and returns it with authorization applied.
	fn sign(&self, request: Request) -> Result<Request>;
}

#[cfg(feature = "reqwest")]
/// Signs requests with a static OAuth 2.0 bearer token.
#[derive(Clone, Debug)]
pub struct BearerSigner(HeaderValue);
#[cfg(feature = "reqwest")]
impl BearerSigner {
	/// Validates and stores the bearer token.
	///
	/// Empty or non-header-safe tokens are rejected at construction so a misconfigured client
	/// fails before its first query.
	pub fn new(token: impl AsRef<str>) -> Result<Self, ConfigError> {
		let token = token.as_ref().trim();

		if token.is_empty() {
			return Err(ConfigError::MissingCredentials);
		}

		let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
			.map_err(|_| ConfigError::MissingCredentials)?;

		value.set_sensitive(true);

		Ok(Self(value))
	}
}
#[cfg(feature = "reqwest")]
impl RequestSigner<ReqwestRequest> for BearerSigner {
	fn sign(&self, mut request: ReqwestRequest) -> Result<ReqwestRequest> {
		request.headers_mut().insert(AUTHORIZATION, self.0.clone());

		Ok(request)
	}
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// self
	use super::*;
	use crate::error::ConfigError;

	#[test]
	fn bearer_signer_rejects_empty_tokens() {
		assert!(matches!(BearerSigner::new(""), Err(ConfigError::MissingCredentials)));
		assert!(matches!(BearerSigner::new("   "), Err(ConfigError::MissingCredentials)));
	}

	#[test]
	fn bearer_signer_sets_the_authorization_header() {
		let signer = BearerSigner::new("token-123").expect("Token should be accepted.");
		let request = ReqwestRequest::new(
			reqwest::Method::GET,
			Url::parse("https://api.example.com/1.1/lists/members.json")
				.expect("Fixture URL should parse."),
		);
		let signed = signer.sign(request).expect("Signing should succeed.");

		assert_eq!(
			signed.headers().get(AUTHORIZATION).map(|value| value.is_sensitive()),
			Some(true),
		);
	}
}
