// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

// New-data hooks: callbacks and bounded wakeup queues.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use common::read_i32;
use parking_lot::Mutex;
use rtflow::{ConnPolicy, FlowStatus, InputPort, LinkWakeupEvent, NewDataHook, OutputPort};

fn counting_hook() -> (NewDataHook, Arc<AtomicUsize>) {
    let count = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&count);
    let hook = NewDataHook::callback(move |_port| {
        seen.fetch_add(1, Ordering::SeqCst);
    });
    (hook, count)
}

#[test]
fn test_buffer_fires_on_empty_to_non_empty_only() {
    for policy in [ConnPolicy::buffer(4), ConnPolicy::buffer(4).lock_free()] {
        let w = OutputPort::<i32>::new("w");
        let r = InputPort::<i32>::with_policy("r", policy);
        let (hook, count) = counting_hook();
        r.set_new_data_hook(Some(hook));
        w.connect_to(&r).unwrap();

        w.write(1);
        w.write(2);
        w.write(3);
        assert_eq!(count.load(Ordering::SeqCst), 1, "{policy}");

        // Drain, then the next write is a new transition.
        while read_i32(&r).0 == FlowStatus::NewData {}
        w.write(4);
        assert_eq!(count.load(Ordering::SeqCst), 2, "{policy}");

        // A full buffer never fires.
        w.write(5);
        w.write(6);
        w.write(7);
        w.write(8);
        assert_eq!(count.load(Ordering::SeqCst), 2, "{policy}");
    }
}

#[test]
fn test_data_fires_until_read() {
    for policy in [ConnPolicy::data(), ConnPolicy::data().lock_free()] {
        let w = OutputPort::<i32>::new("w");
        let r = InputPort::<i32>::with_policy("r", policy);
        let (hook, count) = counting_hook();
        w.connect_to(&r).unwrap();
        r.set_new_data_hook(Some(hook));

        w.write(1);
        w.write(2);
        assert_eq!(count.load(Ordering::SeqCst), 1, "{policy}");

        assert_eq!(read_i32(&r), (FlowStatus::NewData, 2));
        w.write(3);
        assert_eq!(count.load(Ordering::SeqCst), 2, "{policy}");
    }
}

#[test]
fn test_callback_receives_reader_identity() {
    let w = OutputPort::<i32>::new("w");
    let r = InputPort::<i32>::new("sensor");
    let names = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&names);
    r.set_new_data_hook(Some(NewDataHook::callback(move |port| {
        sink.lock().push(port.name.to_string());
    })));
    w.connect_to(&r).unwrap();
    w.write(1);
    assert_eq!(*names.lock(), vec!["sensor".to_string()]);
}

#[test]
fn test_pull_links_never_fire() {
    let w = OutputPort::<i32>::new("w");
    let r = InputPort::<i32>::new("r");
    let (hook, count) = counting_hook();
    r.set_new_data_hook(Some(hook));
    w.connect_to_with(&r, ConnPolicy::buffer(2).with_pull(true))
        .unwrap();

    w.write(1);
    assert_eq!(count.load(Ordering::SeqCst), 0);
    assert_eq!(read_i32(&r), (FlowStatus::NewData, 1));
}

#[test]
fn test_removed_hook_stops_firing() {
    let w = OutputPort::<i32>::new("w");
    let r = InputPort::<i32>::new("r");
    let (hook, count) = counting_hook();
    r.set_new_data_hook(Some(hook));
    w.connect_to(&r).unwrap();
    w.write(1);
    r.set_new_data_hook(None);
    read_i32(&r);
    w.write(2);
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn test_wakeup_queue_drops_when_full() {
    let (tx, rx) = crossbeam_channel::bounded(1);
    let w1 = OutputPort::<i32>::new("w1");
    let w2 = OutputPort::<i32>::new("w2");
    let r = InputPort::<i32>::with_policy("r", ConnPolicy::buffer(4));
    r.set_new_data_hook(Some(NewDataHook::wakeup(tx)));
    w1.connect_to(&r).unwrap();
    w2.connect_to(&r).unwrap();

    w1.write(1);
    // Queue holds one wakeup; this one is dropped and counted.
    w2.write(2);

    assert_eq!(
        rx.try_recv().unwrap(),
        LinkWakeupEvent::DataAvailable(r.identity().clone())
    );
    assert!(rx.try_recv().is_err());

    let missed: u64 = r.link_stats().iter().map(|s| s.missed_wakeups).sum();
    assert_eq!(missed, 1);

    // The data itself is not lost.
    assert_eq!(read_i32(&r), (FlowStatus::NewData, 1));
    assert_eq!(read_i32(&r), (FlowStatus::NewData, 2));
}

#[test]
fn test_wakeup_with_dropped_scheduler_is_harmless() {
    let (tx, rx) = crossbeam_channel::bounded(4);
    drop(rx);
    let w = OutputPort::<i32>::new("w");
    let r = InputPort::<i32>::new("r");
    r.set_new_data_hook(Some(NewDataHook::wakeup(tx)));
    w.connect_to(&r).unwrap();
    w.write(1);
    assert_eq!(r.link_stats()[0].missed_wakeups, 0);
    assert_eq!(read_i32(&r), (FlowStatus::NewData, 1));
}

#[test]
fn test_callback_may_disconnect_reader() {
    for policy in [ConnPolicy::data(), ConnPolicy::buffer(2).lock_free()] {
        let w = OutputPort::<i32>::new("w");
        let r = InputPort::<i32>::with_policy("r", policy);
        let slot = Arc::new(Mutex::new(Some(r.clone())));
        let target = Arc::clone(&slot);
        r.set_new_data_hook(Some(NewDataHook::callback(move |_| {
            if let Some(port) = target.lock().take() {
                assert!(port.disconnect());
            }
        })));
        w.connect_to(&r).unwrap();

        w.write(1);
        assert!(slot.lock().is_none(), "{policy}");
        assert!(!r.connected(), "{policy}");
        assert!(!w.connected(), "{policy}");
        assert_eq!(w.last_written_value(), Some(1));

        // The writer keeps working with nothing attached.
        w.write(2);
        assert_eq!(w.last_written_value(), Some(2));
    }
}

#[test]
fn test_callback_may_disconnect_writer() {
    let w = OutputPort::<i32>::new("w");
    let r1 = InputPort::<i32>::new("r1");
    let r2 = InputPort::<i32>::new("r2");
    let slot = Arc::new(Mutex::new(Some(w.clone())));
    let target = Arc::clone(&slot);
    r1.set_new_data_hook(Some(NewDataHook::callback(move |_| {
        if let Some(port) = target.lock().take() {
            port.disconnect();
        }
    })));
    w.connect_to(&r1).unwrap();
    w.connect_to(&r2).unwrap();

    w.write(1);
    assert!(!w.connected());
    // r2's link went away with the sample stored in it.
    assert_eq!(read_i32(&r2), (FlowStatus::NoData, 0));
    assert!(!r2.connected());
}

#[test]
fn test_callback_during_init_sample_connect() {
    let w = OutputPort::<i32>::new("w");
    let r = InputPort::<i32>::new("r");
    w.write(3);

    let (hook, count) = counting_hook();
    r.set_new_data_hook(Some(hook));
    w.connect_to_with(&r, ConnPolicy::data().with_init(true))
        .unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 1);

    let slot = Arc::new(Mutex::new(Some(w.clone())));
    let target = Arc::clone(&slot);
    let late = InputPort::<i32>::new("late");
    late.set_new_data_hook(Some(NewDataHook::callback(move |_| {
        if let Some(port) = target.lock().take() {
            port.disconnect();
        }
    })));
    w.connect_to_with(&late, ConnPolicy::data().with_init(true))
        .unwrap();
    assert!(slot.lock().is_none());
    assert!(!w.connected());
    assert!(!late.connected());
}
