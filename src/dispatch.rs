//! The query dispatcher: one long-lived worker per client that serializes outbound calls,
//! applies rate-limit admission, and completes each caller's one-shot reply channel.

// crates.io
use tokio::{
	sync::{mpsc, oneshot},
	task::JoinHandle,
};
// self
use crate::{
	_prelude::*,
	http::{QueryExecutor, RateMetadataSlot},
	obs::{QueryOutcome, QuerySpan, record_query_outcome},
	query::{Query, RawReply},
	rate::{RateDecision, RatePolicy, RateTracker},
};

/// Margin added to rate-limit waits so the retried admission lands past the reset instant.
const RESET_SLACK: std::time::Duration = std::time::Duration::from_millis(50);

/// One enqueued query plus the channel its outcome is delivered on.
///
/// Exactly one reply is sent per submission. The send is non-blocking, so a caller that
/// abandoned the wait (timeout, drop) merely causes the reply to be discarded; the worker is
/// never wedged.
#[derive(Debug)]
pub struct Submission {
	/// Query to execute.
	pub query: Query,
	/// One-shot completion channel owned by the submitting caller.
	pub reply: oneshot::Sender<Result<RawReply>>,
}

/// Sending half handed to facades; submissions are serviced in FIFO order.
pub type QueryQueue = mpsc::Sender<Submission>;

/// Long-lived worker that drains the query queue.
///
/// The worker owns the rate tracker outright (single-owner actor), so admission checks and
/// header-driven updates need no locking. No lock is held across the network call either; the
/// executor hands rate metadata back through a per-query [`RateMetadataSlot`].
pub struct Dispatcher {
	executor: Arc<dyn QueryExecutor>,
	tracker: RateTracker,
	policy: RatePolicy,
	queue: mpsc::Receiver<Submission>,
}
impl Dispatcher {
	/// Spawns the worker task, returning the queue handle and the worker's join handle.
	///
	/// The worker exits once every [`QueryQueue`] clone is dropped and the queue drains.
	pub fn spawn(
		executor: Arc<dyn QueryExecutor>,
		policy: RatePolicy,
		capacity: usize,
	) -> (QueryQueue, JoinHandle<()>) {
		let (queue_tx, queue_rx) = mpsc::channel(capacity);
		let dispatcher =
			Self { executor, tracker: RateTracker::default(), policy, queue: queue_rx };
		let worker = tokio::spawn(dispatcher.run());

		(queue_tx, worker)
	}

	async fn run(mut self) {
		while let Some(Submission { query, reply }) = self.queue.recv().await {
			record_query_outcome(&query.category, QueryOutcome::Attempt);

			let span = QuerySpan::new(&query.category, "dispatch");
			let outcome = span.instrument(self.service(&query)).await;
			let label =
				if outcome.is_ok() { QueryOutcome::Success } else { QueryOutcome::Failure };

			record_query_outcome(&query.category, label);

			let _ = reply.send(outcome);
		}
	}

	/// Services one query: admission loop, executor call, tracker update.
	///
	/// Executor errors are forwarded verbatim; network and decode failures are never retried
	/// here. Rate-limit waits are bounded by the tracked reset instant, so a throttled query
	/// cannot stall the queue indefinitely.
	async fn service(&mut self, query: &Query) -> Result<RawReply> {
		loop {
			match self.tracker.admit(&query.category, OffsetDateTime::now_utc()) {
				RateDecision::Allow => break,
				RateDecision::Deny { reset_at } => match self.policy {
					RatePolicy::FailFast =>
						return Err(Error::RateLimited {
							category: query.category.clone(),
							reset_at: Some(reset_at),
						}),
					RatePolicy::WaitForReset => {
						let pause = reset_at - OffsetDateTime::now_utc();
						let pause = if pause.is_positive() {
							pause.unsigned_abs() + RESET_SLACK
						} else {
							RESET_SLACK
						};

						tokio::time::sleep(pause).await;
					},
				},
			}
		}

		let slot = RateMetadataSlot::default();
		let outcome = self.executor.execute(query, &slot).await;

		match slot.take() {
			Some(meta) =>
				self.tracker.observe(&query.category, &meta, OffsetDateTime::now_utc()),
			None => self.tracker.record_call(&query.category),
		}

		outcome
	}
}
