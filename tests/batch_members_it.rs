// std
use std::sync::Arc;
// crates.io
use parking_lot::Mutex;
// self
use chirp_client::{
	client::{Client, ClientConfig},
	error::{ApiError, Error},
	http::{ExecFuture, QueryExecutor, RateMetadataSlot},
	query::{Query, RawReply},
	types::{MemberUpdate, User},
};

/// Echoes every id in the `user_id` parameter back as a member, optionally failing one call.
struct ScriptedExecutor {
	chunks: Mutex<Vec<String>>,
	fail_on_call: Option<usize>,
}
impl ScriptedExecutor {
	fn succeeding() -> Self {
		Self { chunks: Mutex::default(), fail_on_call: None }
	}

	fn failing_on(call: usize) -> Self {
		Self { chunks: Mutex::default(), fail_on_call: Some(call) }
	}
}
impl QueryExecutor for ScriptedExecutor {
	fn execute<'a>(&'a self, query: &'a Query, _slot: &'a RateMetadataSlot) -> ExecFuture<'a> {
		Box::pin(async move {
			let ids = query.params.get("user_id").unwrap_or_default().to_owned();
			let call = {
				let mut chunks = self.chunks.lock();

				chunks.push(ids.clone());
				chunks.len() - 1
			};

			if self.fail_on_call == Some(call) {
				return Err(ApiError {
					status: 403,
					code: Some(104),
					message: "You aren't allowed to add members to this list.".into(),
				}
				.into());
			}

			let users = ids
				.split(',')
				.filter(|raw| !raw.is_empty())
				.map(|raw| User { id: raw.parse().unwrap_or_default(), ..Default::default() })
				.collect::<Vec<_>>();
			let body = serde_json::to_vec(&MemberUpdate { users })
				.expect("Fixture body should serialize.");

			Ok(RawReply { status: 200, body })
		})
	}
}

fn build_client(executor: Arc<ScriptedExecutor>) -> Client {
	let config =
		ClientConfig::new("https://api.example.com/1.1").expect("Base URL should parse.");

	Client::with_executor(config, executor).expect("Client should build successfully.")
}

#[tokio::test]
async fn two_hundred_fifty_ids_split_into_three_ordered_chunks() {
	let executor = Arc::new(ScriptedExecutor::succeeding());
	let client = build_client(executor.clone());
	let ids = (1..=250).collect::<Vec<i64>>();
	let users = client
		.add_list_members(&ids, "friends", 7, None)
		.await
		.expect("Batch addition should succeed.");

	assert_eq!(users.len(), 250);
	assert_eq!(users[0].id, 1);
	assert_eq!(users[249].id, 250);

	let chunks = executor.chunks.lock();
	let sizes = chunks.iter().map(|ids| ids.split(',').count()).collect::<Vec<_>>();

	assert_eq!(sizes, vec![100, 100, 50]);
	assert!(chunks[0].starts_with("1,2,"));
	assert!(chunks[2].ends_with(",250"));
}

#[tokio::test]
async fn failing_chunk_aborts_the_remainder_and_keeps_the_partial() {
	let executor = Arc::new(ScriptedExecutor::failing_on(1));
	let client = build_client(executor.clone());
	let ids = (1..=250).collect::<Vec<i64>>();
	let err = client
		.remove_list_members(&ids, "friends", 7, None)
		.await
		.expect_err("A failing chunk should abort the batch.");

	assert_eq!(err.completed, 1);
	assert_eq!(err.total, 3);
	assert_eq!(err.partial.len(), 100);
	assert_eq!(err.partial[0].id, 1);
	assert_eq!(err.partial[99].id, 100);
	assert!(matches!(err.source, Error::Api(_)));

	// Chunk 3 was never attempted.
	assert_eq!(executor.chunks.lock().len(), 2);
}

#[tokio::test]
async fn empty_input_issues_no_calls() {
	let executor = Arc::new(ScriptedExecutor::succeeding());
	let client = build_client(executor.clone());
	let users = client
		.add_list_members(&[], "friends", 7, None)
		.await
		.expect("An empty batch should be a no-op.");

	assert!(users.is_empty());
	assert!(executor.chunks.lock().is_empty());
}
