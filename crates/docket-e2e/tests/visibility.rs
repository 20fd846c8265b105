mod helpers;

use docket_core::{ClaimOptions, QueueError};

#[test]
fn delayed_message_is_invisible_until_the_deadline() {
    let (queue, clock) = helpers::manual_queue("delayed", 30_000);

    let id = queue.enqueue_delayed(&"later", 5_000).unwrap();

    assert!(queue.claim().unwrap().is_none(), "not visible at enqueue");

    clock.advance(4_999);
    assert!(queue.claim().unwrap().is_none(), "not visible 1ms early");

    // Exactly at the deadline the message becomes claimable.
    clock.advance(1);
    let msg = queue.claim().unwrap().expect("visible at the deadline");
    assert_eq!(msg.id, id);
}

#[test]
fn queue_level_default_delay_applies_to_plain_enqueue() {
    let clock = std::sync::Arc::new(docket_core::ManualClock::new(helpers::EPOCH));
    let mut config = docket_core::QueueConfig::new("default-delay");
    config.delay_ms = 2_000;
    let queue = docket_core::MessageStore::with_clock(
        std::sync::Arc::new(docket_core::MemoryStore::new()),
        config,
        clock.clone(),
    );

    queue.enqueue(&"later").unwrap();
    assert!(
        queue.claim().unwrap().is_none(),
        "hidden for the queue's default delay"
    );

    clock.advance(2_000);
    assert!(queue.claim().unwrap().is_some());
}

#[test]
fn an_unrenewed_lease_expires_and_the_message_is_reclaimed() {
    let (queue, clock) = helpers::manual_queue("expiry", 1_000);
    queue.enqueue(&"job").unwrap();

    let first = queue.claim().unwrap().unwrap();
    assert_eq!(first.tries, 1);

    // While the lease is live, no one else can claim it.
    clock.advance(999);
    assert!(queue.claim().unwrap().is_none());

    // The instant the deadline passes, a subsequent claim re-matches it —
    // nothing proactively reverts the message.
    clock.advance(1);
    let second = queue.claim().unwrap().expect("reclaimable after expiry");
    assert_eq!(second.id, first.id);
    assert_eq!(second.tries, 2, "each re-claim increments tries");
    assert_ne!(second.lease_token, first.lease_token);
}

#[test]
fn tries_accumulate_across_repeated_expiries() {
    let (queue, clock) = helpers::manual_queue("retries", 1_000);
    queue.enqueue(&"flaky").unwrap();

    for expected_tries in 1..=4 {
        let msg = queue.claim().unwrap().unwrap();
        assert_eq!(msg.tries, expected_tries);
        clock.advance(1_000);
    }
}

#[test]
fn renew_keeps_the_lease_alive_past_the_original_deadline() {
    let (queue, clock) = helpers::manual_queue("renewal", 1_000);
    queue.enqueue(&"slow-job").unwrap();

    let msg = queue.claim().unwrap().unwrap();
    let token = msg.lease_token.unwrap();

    clock.advance(800);
    assert_eq!(queue.renew(token).unwrap(), msg.id);

    // Past the original deadline: still held.
    clock.advance(400);
    assert!(queue.claim().unwrap().is_none());

    // Past the renewed deadline: reclaimable again.
    clock.advance(600);
    let reclaimed = queue.claim().unwrap().expect("renewed lease expired");
    assert_eq!(reclaimed.id, msg.id);
}

#[test]
fn renew_of_an_expired_lease_fails_with_unknown_lease() {
    let (queue, clock) = helpers::manual_queue("late-renew", 1_000);
    queue.enqueue(&"job").unwrap();

    let token = queue.claim().unwrap().unwrap().lease_token.unwrap();
    clock.advance(1_000);

    let err = queue.renew(token).unwrap_err();
    assert!(matches!(err, QueueError::UnknownLease(t) if t == token));
}

#[test]
fn acknowledge_after_expiry_fails_rather_than_stealing_the_message() {
    let (queue, clock) = helpers::manual_queue("late-ack", 1_000);
    queue.enqueue(&"job").unwrap();

    let stale = queue.claim().unwrap().unwrap().lease_token.unwrap();
    clock.advance(1_000);

    // Another consumer re-claims the message.
    let fresh = queue.claim().unwrap().unwrap();

    // The original holder's acknowledge must not touch the new lease.
    let err = queue.acknowledge(stale).unwrap_err();
    assert!(matches!(err, QueueError::UnknownLease(_)));

    // The new lease is unaffected and still acknowledgeable.
    let id = queue.acknowledge(fresh.lease_token.unwrap()).unwrap();
    assert_eq!(id, fresh.id);
}

#[test]
fn per_claim_lease_override_outlives_the_queue_default() {
    let (queue, clock) = helpers::manual_queue("override", 1_000);
    queue.enqueue(&"long-job").unwrap();

    queue
        .claim_with(ClaimOptions {
            lease_ms: Some(10_000),
            ..Default::default()
        })
        .unwrap()
        .unwrap();

    // Far past the queue default of 1s, the extended lease still holds.
    clock.advance(9_999);
    assert!(queue.claim().unwrap().is_none());

    clock.advance(1);
    assert!(queue.claim().unwrap().is_some());
}

#[test]
fn renew_with_explicit_duration_sets_the_new_deadline() {
    let (queue, clock) = helpers::manual_queue("renew-for", 1_000);
    queue.enqueue(&"job").unwrap();

    let token = queue.claim().unwrap().unwrap().lease_token.unwrap();
    queue.renew_for(token, 5_000).unwrap();

    clock.advance(4_999);
    assert!(queue.claim().unwrap().is_none());
    clock.advance(1);
    assert!(queue.claim().unwrap().is_some());
}
