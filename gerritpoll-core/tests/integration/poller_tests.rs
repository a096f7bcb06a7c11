//! End-to-end poll behavior against the captured query fixture

use gerritpoll_core::{
    MemoryWatermarkStore, PollEngine, PollError, PollSettings, TriggerParameters, Watermark,
};

use super::support::{FIXTURE_CREATED_ON_MS, MockTransport, fixture_body};

fn params() -> TriggerParameters {
    TriggerParameters::new("gerrit", "review.example.com").unwrap()
}

fn engine_over(
    transport: MockTransport,
    store: MemoryWatermarkStore,
) -> PollEngine<MockTransport, MemoryWatermarkStore> {
    PollEngine::new(transport, store, params(), PollSettings::default())
}

fn stored_watermark(engine: &PollEngine<MockTransport, MemoryWatermarkStore>) -> Option<Watermark> {
    Watermark::load(engine.store()).unwrap()
}

#[tokio::test]
async fn absent_watermark_yields_empty_result_and_fresh_baseline() {
    let mut engine = engine_over(
        MockTransport::replying(&fixture_body()),
        MemoryWatermarkStore::new(),
    );

    let patch_sets = engine.poll().await.unwrap();
    assert!(patch_sets.is_empty());

    let mark = stored_watermark(&engine).expect("baseline must be written");
    assert_ne!(mark.as_millis(), FIXTURE_CREATED_ON_MS);
}

#[tokio::test]
async fn watermark_equal_to_created_on_excludes_the_record() {
    let store = MemoryWatermarkStore::with_watermark(Watermark::from_millis(FIXTURE_CREATED_ON_MS));
    let mut engine = engine_over(MockTransport::replying(&fixture_body()), store);

    assert!(engine.poll().await.unwrap().is_empty());
}

#[tokio::test]
async fn watermark_one_ms_newer_excludes_the_record() {
    let store =
        MemoryWatermarkStore::with_watermark(Watermark::from_millis(FIXTURE_CREATED_ON_MS + 1));
    let mut engine = engine_over(MockTransport::replying(&fixture_body()), store);

    assert!(engine.poll().await.unwrap().is_empty());
}

#[tokio::test]
async fn watermark_one_ms_older_yields_the_record_and_advances() {
    let store =
        MemoryWatermarkStore::with_watermark(Watermark::from_millis(FIXTURE_CREATED_ON_MS - 1));
    let mut engine = engine_over(MockTransport::replying(&fixture_body()), store);

    let patch_sets = engine.poll().await.unwrap();
    assert_eq!(patch_sets.len(), 1);

    let patch_set = &patch_sets[0];
    assert_eq!(patch_set.project, "abraham");
    assert_eq!(patch_set.branch, "bush");
    assert_eq!(patch_set.ref_name, "refs/changes/48/2448/7");
    assert_eq!(patch_set.created_on_ms, FIXTURE_CREATED_ON_MS);

    assert_eq!(
        stored_watermark(&engine),
        Some(Watermark::from_millis(FIXTURE_CREATED_ON_MS))
    );
}

#[tokio::test]
async fn repeated_polls_with_same_data_are_idempotent() {
    let store = MemoryWatermarkStore::with_watermark(Watermark::from_millis(FIXTURE_CREATED_ON_MS));
    let mut engine = engine_over(MockTransport::replying(&fixture_body()), store);

    assert!(engine.poll().await.unwrap().is_empty());
    let first = stored_watermark(&engine);

    assert!(engine.poll().await.unwrap().is_empty());
    assert_eq!(stored_watermark(&engine), first);
}

#[tokio::test]
async fn remote_stderr_fails_the_poll() {
    let transport = MockTransport::replying_with_stderr(
        &fixture_body(),
        "gerrit: fatal: this query is not allowed",
    );
    let store =
        MemoryWatermarkStore::with_watermark(Watermark::from_millis(FIXTURE_CREATED_ON_MS - 1));
    let mut engine = engine_over(transport, store);

    let err = engine.poll().await.unwrap_err();
    assert!(matches!(err, PollError::Transport(_)));
    // The failed poll must not have advanced the watermark.
    assert_eq!(
        stored_watermark(&engine),
        Some(Watermark::from_millis(FIXTURE_CREATED_ON_MS - 1))
    );
}

#[tokio::test]
async fn session_open_failure_fails_the_poll() {
    let store = MemoryWatermarkStore::with_watermark(Watermark::from_millis(1));
    let mut engine = engine_over(MockTransport::failing(), store);

    let err = engine.poll().await.unwrap_err();
    assert!(matches!(err, PollError::Transport(_)));
}
