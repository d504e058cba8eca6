use mret_types::EntityKey;
use mret_xrc::{EventDispatcher, EventKind, EventQueues, RemoteSession, XrcEvent};
use proptest::prelude::*;
use std::sync::{Arc, Mutex};
use std::thread;

fn session(id: &str) -> RemoteSession {
    RemoteSession {
        id: id.to_string(),
        name: format!("Session {id}"),
        group: "MRET".into(),
        master_alias: "ada".into(),
        participants: 1,
    }
}

fn deleted(id: &str) -> XrcEvent {
    XrcEvent::ParticipantDeleted(EntityKey::new(id).unwrap())
}

fn recorder(
    dispatcher: &mut EventDispatcher,
    kinds: &[EventKind],
) -> Arc<Mutex<Vec<XrcEvent>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    for kind in kinds {
        let seen = Arc::clone(&seen);
        dispatcher.add_listener(
            *kind,
            Box::new(move |event| seen.lock().unwrap().push(event.clone())),
        );
    }
    seen
}

// ── Queues ───────────────────────────────────────────────────────

#[test]
fn post_pairs_payload_and_handle() {
    let queues = EventQueues::new();
    queues.post(deleted("u1"));
    queues.post(XrcEvent::RemoteSessionAdded(session("s1")));

    assert_eq!(queues.pending_handles(), 2);
    assert_eq!(queues.pending(EventKind::ParticipantDeleted), 1);
    assert_eq!(queues.pending(EventKind::RemoteSessionAdded), 1);
    assert!(!queues.is_empty());
}

#[test]
fn each_handle_releases_its_own_payload() {
    let queues = Arc::new(EventQueues::new());
    let mut dispatcher = EventDispatcher::new(Arc::clone(&queues), 1);
    let sessions = recorder(&mut dispatcher, &[EventKind::RemoteSessionDeleted]);

    queues.post(deleted("a"));
    queues.post(XrcEvent::RemoteSessionDeleted("s".into()));
    queues.post(deleted("b"));

    assert_eq!(dispatcher.tick(), 1);
    assert_eq!(queues.pending(EventKind::ParticipantDeleted), 1);
    assert_eq!(queues.pending_handles(), 2);

    assert_eq!(dispatcher.tick(), 1);
    assert_eq!(
        *sessions.lock().unwrap(),
        vec![XrcEvent::RemoteSessionDeleted("s".into())]
    );

    // A listener added later gets the payload paired with the pending handle.
    queues.post(deleted("c"));
    let people = recorder(&mut dispatcher, &[EventKind::ParticipantDeleted]);
    assert_eq!(dispatcher.tick(), 1);
    assert_eq!(dispatcher.tick(), 1);
    assert_eq!(*people.lock().unwrap(), vec![deleted("b"), deleted("c")]);
    assert!(queues.is_empty());
    assert_eq!(queues.pending(EventKind::ParticipantDeleted), 0);
}

#[test]
fn posting_from_many_threads_keeps_every_event() {
    let queues = Arc::new(EventQueues::new());
    let handles: Vec<_> = (0..4)
        .map(|t| {
            let queues = Arc::clone(&queues);
            thread::spawn(move || {
                for i in 0..25 {
                    queues.post(deleted(&format!("u{t}-{i}")));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(queues.pending_handles(), 100);
    assert_eq!(queues.pending(EventKind::ParticipantDeleted), 100);
}

// ── Dispatcher ───────────────────────────────────────────────────

#[test]
fn tick_dispatches_at_most_three_by_default() {
    let queues = Arc::new(EventQueues::new());
    let mut dispatcher =
        EventDispatcher::new(Arc::clone(&queues), mret_xrc::DEFAULT_MAX_EVENTS_PER_TICK);
    let seen = recorder(&mut dispatcher, &[EventKind::ParticipantDeleted]);

    for i in 0..7 {
        queues.post(deleted(&format!("u{i}")));
    }

    assert_eq!(dispatcher.tick(), 3);
    assert_eq!(seen.lock().unwrap().len(), 3);
    assert_eq!(queues.pending_handles(), 4);

    assert_eq!(dispatcher.tick(), 3);
    assert_eq!(dispatcher.tick(), 1);
    assert_eq!(dispatcher.tick(), 0);
    assert_eq!(seen.lock().unwrap().len(), 7);
}

#[test]
fn zero_cap_is_raised_to_one() {
    let dispatcher = EventDispatcher::new(Arc::new(EventQueues::new()), 0);
    assert_eq!(dispatcher.max_per_tick(), 1);
}

#[test]
fn events_arrive_in_post_order_across_kinds() {
    let queues = Arc::new(EventQueues::new());
    let mut dispatcher = EventDispatcher::new(Arc::clone(&queues), 10);
    let seen = recorder(
        &mut dispatcher,
        &[EventKind::ParticipantDeleted, EventKind::RemoteSessionDeleted],
    );

    queues.post(deleted("a"));
    queues.post(XrcEvent::RemoteSessionDeleted("s".into()));
    queues.post(deleted("b"));
    dispatcher.tick();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            deleted("a"),
            XrcEvent::RemoteSessionDeleted("s".into()),
            deleted("b"),
        ]
    );
}

#[test]
fn unheard_events_are_discarded() {
    let queues = Arc::new(EventQueues::new());
    let mut dispatcher = EventDispatcher::new(Arc::clone(&queues), 3);
    let seen = recorder(&mut dispatcher, &[EventKind::RemoteSessionDeleted]);

    queues.post(deleted("a"));
    queues.post(XrcEvent::RemoteSessionDeleted("s".into()));

    assert_eq!(dispatcher.tick(), 2);
    assert_eq!(queues.pending(EventKind::ParticipantDeleted), 0);
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[test]
fn every_listener_sees_the_event() {
    let queues = Arc::new(EventQueues::new());
    let mut dispatcher = EventDispatcher::new(Arc::clone(&queues), 3);
    let first = recorder(&mut dispatcher, &[EventKind::ParticipantDeleted]);
    let second = recorder(&mut dispatcher, &[EventKind::ParticipantDeleted]);

    queues.post(deleted("a"));
    dispatcher.tick();

    assert_eq!(*first.lock().unwrap(), vec![deleted("a")]);
    assert_eq!(*second.lock().unwrap(), vec![deleted("a")]);
}

// ── Properties ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn dispatch_preserves_fifo_under_any_cap(count in 0usize..40, cap in 1usize..8) {
        let queues = Arc::new(EventQueues::new());
        let mut dispatcher = EventDispatcher::new(Arc::clone(&queues), cap);
        let seen = recorder(&mut dispatcher, &[EventKind::ParticipantDeleted]);

        let ids: Vec<String> = (0..count).map(|i| format!("u{i}")).collect();
        for id in &ids {
            queues.post(deleted(id));
        }
        while !queues.is_empty() {
            prop_assert!(dispatcher.tick() <= cap);
        }

        let expected: Vec<XrcEvent> = ids.iter().map(|id| deleted(id)).collect();
        prop_assert_eq!(seen.lock().unwrap().clone(), expected);
    }
}
