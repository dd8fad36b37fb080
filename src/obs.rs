//! Optional observability helpers for the dispatch pipeline.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `chirp_client.query` with the `category`
//!   (rate-limit group) and `stage` (call site) fields.
//! - Enable `metrics` to increment the `chirp_client_query_total` counter for every
//!   attempt/success/failure, labeled by `category` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Outcome labels recorded for each serviced query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QueryOutcome {
	/// Entry into the dispatcher's service path.
	Attempt,
	/// Successful completion delivered to the caller.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl QueryOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			QueryOutcome::Attempt => "attempt",
			QueryOutcome::Success => "success",
			QueryOutcome::Failure => "failure",
		}
	}
}
impl Display for QueryOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
