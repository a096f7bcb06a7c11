//! Poll-and-queue behavior of the trigger glue

use gerritpoll_core::{
    MemoryWatermarkStore, PollEngine, PollSettings, PolledTrigger, TRIGGER_DISPLAY_NAME,
    TRIGGER_INITIATOR, TRIGGER_NAME, TriggerParameters, Watermark,
};

use super::support::{
    FIXTURE_CREATED_ON_MS, MockTransport, RecordingQueue, RejectingQueue, fixture_body,
};

fn params() -> TriggerParameters {
    TriggerParameters::new("gerrit", "review.example.com")
        .unwrap()
        .with_project("abraham")
}

fn trigger_over<Q: gerritpoll_core::BuildQueue>(
    transport: MockTransport,
    store: MemoryWatermarkStore,
    queue: Q,
) -> PolledTrigger<MockTransport, MemoryWatermarkStore, Q> {
    let engine = PollEngine::new(transport, store, params(), PollSettings::default());
    PolledTrigger::new(engine, queue)
}

#[test]
fn registration_constants_are_stable() {
    assert_eq!(TRIGGER_NAME, "gerritBuildTrigger");
    assert_eq!(TRIGGER_DISPLAY_NAME, "Gerrit Build Trigger");
    assert_eq!(TRIGGER_INITIATOR, "Gerrit");
}

#[tokio::test]
async fn new_patch_set_queues_one_build_with_derived_branch() {
    let store = MemoryWatermarkStore::with_watermark(Watermark::from_millis(
        FIXTURE_CREATED_ON_MS - 1,
    ));
    let queue = RecordingQueue::new();
    let mut trigger = trigger_over(
        MockTransport::replying(&fixture_body()),
        store,
        queue.clone(),
    );

    let queued = trigger.poll_and_queue().await;
    assert_eq!(queued, 1);

    let builds = queue.builds();
    assert_eq!(builds.len(), 1);
    assert_eq!(builds[0].branch_name, "changes/48/2448/7");
    assert_eq!(builds[0].initiator, TRIGGER_INITIATOR);
}

#[tokio::test]
async fn nothing_new_queues_nothing() {
    let store = MemoryWatermarkStore::with_watermark(Watermark::from_millis(FIXTURE_CREATED_ON_MS));
    let queue = RecordingQueue::new();
    let mut trigger = trigger_over(
        MockTransport::replying(&fixture_body()),
        store,
        queue.clone(),
    );

    assert_eq!(trigger.poll_and_queue().await, 0);
    assert!(queue.builds().is_empty());
}

#[tokio::test]
async fn transport_failure_is_swallowed_and_queues_nothing() {
    let store = MemoryWatermarkStore::with_watermark(Watermark::from_millis(1));
    let queue = RecordingQueue::new();
    let mut trigger = trigger_over(MockTransport::failing(), store, queue.clone());

    // Must not panic or propagate; the scheduler just sees zero builds.
    assert_eq!(trigger.poll_and_queue().await, 0);
    assert!(queue.builds().is_empty());
}

#[tokio::test]
async fn rejected_submission_is_not_counted() {
    let store = MemoryWatermarkStore::with_watermark(Watermark::from_millis(
        FIXTURE_CREATED_ON_MS - 1,
    ));
    let mut trigger = trigger_over(
        MockTransport::replying(&fixture_body()),
        store,
        RejectingQueue,
    );

    assert_eq!(trigger.poll_and_queue().await, 0);
}

#[tokio::test]
async fn describe_reports_the_watched_target() {
    let store = MemoryWatermarkStore::new();
    let trigger = trigger_over(
        MockTransport::replying(&fixture_body()),
        store,
        RecordingQueue::new(),
    );

    assert_eq!(
        trigger.describe(),
        "Listening to abraham on review.example.com"
    );
}
