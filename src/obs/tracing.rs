// self
use crate::{_prelude::*, query::Category};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedQuery<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedQuery<F> = F;

/// A span builder used around each serviced query.
#[derive(Clone, Debug)]
pub struct QuerySpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl QuerySpan {
	/// Creates a new span tagged with the query's category + stage.
	pub fn new(category: &Category, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("chirp_client.query", category = %category, stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (category, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedQuery<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn instrument_passes_the_future_through() {
		let span = QuerySpan::new(&Category::new("lists/statuses"), "test");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}
}
