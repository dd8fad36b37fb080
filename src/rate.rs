//! Per-category call budgets and the admission policy applied before dispatch.

// std
use std::collections::HashMap;
// self
use crate::{_prelude::*, http::RateMetadata, query::Category};

/// What the dispatcher does when a category's budget is exhausted.
///
/// Explicit configuration; the dispatcher never guesses between the two.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RatePolicy {
	/// Sleep until the tracked reset instant, then retry admission.
	#[default]
	WaitForReset,
	/// Surface [`Error::RateLimited`](crate::error::Error::RateLimited) immediately.
	FailFast,
}

/// Remaining call budget for one category.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateBudget {
	/// Calls left in the current window.
	pub remaining: u32,
	/// Instant the window resets.
	pub reset_at: OffsetDateTime,
}

/// Admission decision for a single query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateDecision {
	/// The query may be dispatched immediately.
	Allow,
	/// The category's budget is exhausted until the reset instant.
	Deny {
		/// Instant the budget resets.
		reset_at: OffsetDateTime,
	},
}

/// Tracks remaining call budgets per category.
///
/// Owned exclusively by the dispatcher worker (single-owner actor), so no lock is needed; the
/// clock is passed in rather than read internally so tests can simulate time.
#[derive(Debug, Default)]
pub struct RateTracker(HashMap<Category, RateBudget>);
impl RateTracker {
	/// Decides whether a query in `category` may be dispatched at `now`.
	///
	/// Categories never seen before are optimistically admitted; the first response's headers
	/// inform the tracker.
	pub fn admit(&self, category: &Category, now: OffsetDateTime) -> RateDecision {
		match self.0.get(category) {
			Some(budget) if budget.remaining == 0 && now <= budget.reset_at =>
				RateDecision::Deny { reset_at: budget.reset_at },
			_ => RateDecision::Allow,
		}
	}

	/// Replaces a category's budget with authoritative values.
	pub fn update(&mut self, category: &Category, remaining: u32, reset_at: OffsetDateTime) {
		self.0.insert(category.clone(), RateBudget { remaining, reset_at });
	}

	/// Folds rate metadata captured from a response into the budget.
	///
	/// Header-provided values win; a `Retry-After` hint stands in for a missing reset instant.
	/// A hint without a remaining count marks the window exhausted until the hinted instant, so
	/// a bare 429 still closes the category. Metadata with neither degrades to a local
	/// decrement.
	pub fn observe(&mut self, category: &Category, meta: &RateMetadata, now: OffsetDateTime) {
		let hinted = meta.reset_at.or_else(|| meta.retry_after.map(|delay| now + delay));

		match (meta.remaining, hinted) {
			(Some(remaining), Some(reset_at)) => self.update(category, remaining, reset_at),
			(Some(remaining), None) => {
				let reset_at =
					self.0.get(category).map(|budget| budget.reset_at).unwrap_or(now);

				self.update(category, remaining, reset_at);
			},
			(None, Some(reset_at)) => self.update(category, 0, reset_at),
			(None, None) => self.record_call(category),
		}
	}

	/// Locally decrements a category's budget when a response carried no rate headers.
	pub fn record_call(&mut self, category: &Category) {
		if let Some(budget) = self.0.get_mut(category) {
			budget.remaining = budget.remaining.saturating_sub(1);
		}
	}

	/// Returns the tracked budget for a category, if any.
	pub fn budget(&self, category: &Category) -> Option<RateBudget> {
		self.0.get(category).copied()
	}
}
