// crates.io
use httpmock::prelude::*;
// self
use chirp_client::{_preludet::*, rate::RatePolicy};

#[tokio::test]
async fn exhausted_budget_fails_fast_until_reset() {
	let server = MockServer::start_async().await;
	let reset_at = OffsetDateTime::now_utc().unix_timestamp() + 3_600;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/lists/statuses.json");
			then.status(200)
				.header("content-type", "application/json")
				.header("x-rate-limit-remaining", "0")
				.header("x-rate-limit-reset", reset_at.to_string())
				.body("[]");
		})
		.await;
	let client = build_mock_client(&server.base_url(), RatePolicy::FailFast);

	client.list_tweets(1, false, None).await.expect("First call should be admitted.");

	let err = client
		.list_tweets(1, false, None)
		.await
		.expect_err("Second call should be denied while the budget is exhausted.");

	match err {
		Error::RateLimited { category, reset_at: tracked } => {
			assert_eq!(category.as_str(), "lists/statuses");
			assert_eq!(tracked.map(|at| at.unix_timestamp()), Some(reset_at));
		},
		other => panic!("Expected a rate-limit error, got {other:?}."),
	}

	// The denied query never reached the wire.
	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn unrelated_categories_are_not_throttled_together() {
	let server = MockServer::start_async().await;
	let reset_at = OffsetDateTime::now_utc().unix_timestamp() + 3_600;
	let throttled = server
		.mock_async(|when, then| {
			when.method(GET).path("/lists/statuses.json");
			then.status(200)
				.header("content-type", "application/json")
				.header("x-rate-limit-remaining", "0")
				.header("x-rate-limit-reset", reset_at.to_string())
				.body("[]");
		})
		.await;
	let open = server
		.mock_async(|when, then| {
			when.method(GET).path("/lists/members.json");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"previous_cursor":0,"next_cursor":0,"users":[]}"#);
		})
		.await;
	let client = build_mock_client(&server.base_url(), RatePolicy::FailFast);

	client.list_tweets(1, false, None).await.expect("Timeline call should be admitted.");
	client
		.list_tweets(1, false, None)
		.await
		.expect_err("Timeline budget should be exhausted.");
	// A different category still has budget and goes straight through.
	client.list_members(1, None).await.expect("Members call should not be throttled.");

	throttled.assert_calls_async(1).await;
	open.assert_async().await;
}

#[tokio::test]
async fn wait_for_reset_blocks_then_retries() {
	let server = MockServer::start_async().await;
	let reset_at = OffsetDateTime::now_utc().unix_timestamp() + 2;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/lists/statuses.json");
			then.status(200)
				.header("content-type", "application/json")
				.header("x-rate-limit-remaining", "0")
				.header("x-rate-limit-reset", reset_at.to_string())
				.body("[]");
		})
		.await;
	let client = build_mock_client(&server.base_url(), RatePolicy::WaitForReset);

	client.list_tweets(1, false, None).await.expect("First call should be admitted.");

	let started = std::time::Instant::now();

	client
		.list_tweets(1, false, None)
		.await
		.expect("Throttled call should succeed after the window reopens.");

	assert!(started.elapsed() >= std::time::Duration::from_millis(900));

	mock.assert_calls_async(2).await;
}
