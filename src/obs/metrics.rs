// self
use crate::{obs::QueryOutcome, query::Category};

/// Records a query outcome via the global metrics recorder (when enabled).
pub fn record_query_outcome(category: &Category, outcome: QueryOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"chirp_client_query_total",
			"category" => category.as_str().to_owned(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (category, outcome);
	}
}
