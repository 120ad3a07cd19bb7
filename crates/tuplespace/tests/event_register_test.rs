// SPDX-License-Identifier: LGPL-2.1-or-later
// Copyright (C) 2025 Shahzad A. Bhatti <bhatti@plexobject.com>
//
// This file is part of Linda.
//
// Linda is free software: you can redistribute it and/or modify
// it under the terms of the GNU Lesser General Public License as published by
// the Free Software Foundation, either version 2.1 of the License, or
// (at your option) any later version.
//
// Linda is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Lesser General Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public License
// along with Linda. If not, see <https://www.gnu.org/licenses/>.

//! Integration tests for `event_register`
//!
//! Covers immediate vs future timing, fire-once delivery, callbacks that
//! re-register themselves, take-mode claims, and callbacks that must not
//! hold up writers.

use linda_tuplespace::{
    template, tuple, Callback, EventMode, EventTiming, FieldType, Template, Tuple, TupleSpace,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

fn sink() -> (Callback, mpsc::UnboundedReceiver<Tuple>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let callback: Callback = Arc::new(move |t: Tuple| {
        let _ = tx.send(t);
    });
    (callback, rx)
}

fn alert_template() -> Template {
    template!("alert", FieldType::Integer)
}

async fn next(rx: &mut mpsc::UnboundedReceiver<Tuple>) -> Tuple {
    timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("callback never fired")
        .expect("callback dropped")
}

async fn assert_silent(rx: &mut mpsc::UnboundedReceiver<Tuple>) {
    assert!(timeout(Duration::from_millis(100), rx.recv()).await.is_err());
}

#[tokio::test]
async fn test_immediate_fires_for_present_tuple() {
    let space = TupleSpace::new();
    space.write(tuple!("alert", 1i64)).unwrap();

    let (callback, mut rx) = sink();
    space
        .event_register(EventMode::Read, EventTiming::Immediate, alert_template(), callback)
        .unwrap();

    assert_eq!(next(&mut rx).await, tuple!("alert", 1i64));
    assert_eq!(space.len(), 1);
    assert_eq!(space.stats().pending_subscriptions(), 0);
}

#[tokio::test]
async fn test_future_ignores_present_tuple() {
    let space = TupleSpace::new();
    space.write(tuple!("alert", 1i64)).unwrap();

    let (callback, mut rx) = sink();
    space
        .event_register(EventMode::Read, EventTiming::Future, alert_template(), callback)
        .unwrap();
    assert_silent(&mut rx).await;

    space.write(tuple!("alert", 2i64)).unwrap();
    assert_eq!(next(&mut rx).await, tuple!("alert", 2i64));
    assert_eq!(space.len(), 2);
}

#[tokio::test]
async fn test_immediate_take_removes_present_tuple() {
    let space = TupleSpace::new();
    space.write(tuple!("alert", 7i64)).unwrap();

    let (callback, mut rx) = sink();
    space
        .event_register(EventMode::Take, EventTiming::Immediate, alert_template(), callback)
        .unwrap();

    assert_eq!(next(&mut rx).await, tuple!("alert", 7i64));
    assert!(space.is_empty());
}

#[tokio::test]
async fn test_callback_fires_at_most_once() {
    let space = TupleSpace::new();
    let (callback, mut rx) = sink();
    space
        .event_register(EventMode::Read, EventTiming::Future, alert_template(), callback)
        .unwrap();

    space.write(tuple!("alert", 1i64)).unwrap();
    space.write(tuple!("alert", 2i64)).unwrap();

    assert_eq!(next(&mut rx).await, tuple!("alert", 1i64));
    assert_silent(&mut rx).await;
    assert_eq!(space.stats().callbacks_fired(), 1);
}

#[tokio::test]
async fn test_take_event_claims_future_tuple() {
    let space = TupleSpace::new();
    let (callback, mut rx) = sink();
    space
        .event_register(EventMode::Take, EventTiming::Future, alert_template(), callback)
        .unwrap();

    space.write(tuple!("alert", 3i64)).unwrap();
    assert_eq!(next(&mut rx).await, tuple!("alert", 3i64));

    // Claimed by the callback, never stored
    assert!(space.is_empty());
    assert_eq!(space.try_read(alert_template()).unwrap(), None);
}

#[tokio::test]
async fn test_only_one_take_subscription_claims_a_tuple() {
    let space = TupleSpace::new();
    let fired = Arc::new(AtomicUsize::new(0));
    let (tx, mut rx) = mpsc::unbounded_channel::<Tuple>();

    for _ in 0..3 {
        let fired = fired.clone();
        let tx = tx.clone();
        let callback: Callback = Arc::new(move |t: Tuple| {
            fired.fetch_add(1, Ordering::SeqCst);
            let _ = tx.send(t);
        });
        space
            .event_register(EventMode::Take, EventTiming::Future, alert_template(), callback)
            .unwrap();
    }

    space.write(tuple!("alert", 1i64)).unwrap();
    assert_eq!(next(&mut rx).await, tuple!("alert", 1i64));
    assert_silent(&mut rx).await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert_eq!(space.stats().pending_subscriptions(), 2);

    // The next writes go to the remaining subscriptions
    space.write(tuple!("alert", 2i64)).unwrap();
    space.write(tuple!("alert", 3i64)).unwrap();
    next(&mut rx).await;
    next(&mut rx).await;
    assert_eq!(fired.load(Ordering::SeqCst), 3);
    assert!(space.is_empty());
}

#[tokio::test]
async fn test_read_subscriptions_all_see_a_taken_tuple() {
    let space = TupleSpace::new();
    let (reader_a, mut rx_a) = sink();
    let (reader_b, mut rx_b) = sink();
    let (taker, mut rx_take) = sink();

    space
        .event_register(EventMode::Read, EventTiming::Future, alert_template(), reader_a)
        .unwrap();
    space
        .event_register(EventMode::Take, EventTiming::Future, alert_template(), taker)
        .unwrap();
    space
        .event_register(EventMode::Read, EventTiming::Future, alert_template(), reader_b)
        .unwrap();

    space.write(tuple!("alert", 9i64)).unwrap();

    assert_eq!(next(&mut rx_a).await, tuple!("alert", 9i64));
    assert_eq!(next(&mut rx_b).await, tuple!("alert", 9i64));
    assert_eq!(next(&mut rx_take).await, tuple!("alert", 9i64));
    assert!(space.is_empty());
}

#[tokio::test]
async fn test_callback_can_reregister_itself() {
    let space = TupleSpace::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<()>();

    fn register(space: TupleSpace, seen: Arc<Mutex<Vec<Tuple>>>, done: mpsc::UnboundedSender<()>) {
        let callback: Callback = {
            let space = space.clone();
            Arc::new(move |t: Tuple| {
                let count = {
                    let mut seen = seen.lock().unwrap();
                    seen.push(t);
                    seen.len()
                };
                if count < 3 {
                    register(space.clone(), seen.clone(), done.clone());
                } else {
                    let _ = done.send(());
                }
            })
        };
        space
            .event_register(
                EventMode::Take,
                EventTiming::Future,
                template!("tick", FieldType::Integer),
                callback,
            )
            .unwrap();
    }

    register(space.clone(), seen.clone(), done_tx);

    for i in 0..3i64 {
        space.write(tuple!("tick", i)).unwrap();
        // Wait for the re-registration before the next write
        timeout(Duration::from_secs(5), async {
            loop {
                let n = seen.lock().unwrap().len();
                if n as i64 > i && (n == 3 || space.stats().pending_subscriptions() == 1) {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .expect("callback did not re-register");
    }

    timeout(Duration::from_secs(5), done_rx.recv())
        .await
        .expect("third tick never observed");
    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen, vec![tuple!("tick", 0i64), tuple!("tick", 1i64), tuple!("tick", 2i64)]);
    assert!(space.is_empty());
    assert_eq!(space.stats().pending_subscriptions(), 0);
    space.shutdown();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_slow_callback_does_not_block_writer() {
    let space = TupleSpace::new();
    let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
    let release_rx = Arc::new(Mutex::new(release_rx));
    let (callback, mut rx) = {
        let (tx, rx) = mpsc::unbounded_channel::<Tuple>();
        let release_rx = release_rx.clone();
        let callback: Callback = Arc::new(move |t: Tuple| {
            let _ = release_rx.lock().unwrap().recv_timeout(Duration::from_secs(5));
            let _ = tx.send(t);
        });
        (callback, rx)
    };

    space
        .event_register(EventMode::Read, EventTiming::Future, alert_template(), callback)
        .unwrap();

    // write returns while the callback is parked
    space.write(tuple!("alert", 1i64)).unwrap();
    space.write(tuple!("alert", 2i64)).unwrap();
    assert_eq!(space.len(), 2);
    assert_eq!(
        space.take(template!("alert", 2i64)).await.unwrap(),
        tuple!("alert", 2i64)
    );

    release_tx.send(()).unwrap();
    assert_eq!(next(&mut rx).await, tuple!("alert", 1i64));
}

#[tokio::test]
async fn test_panicking_callback_does_not_poison_space() {
    let space = TupleSpace::new();
    let bad: Callback = Arc::new(|_: Tuple| panic!("boom"));
    space
        .event_register(EventMode::Read, EventTiming::Future, alert_template(), bad)
        .unwrap();
    space.write(tuple!("alert", 1i64)).unwrap();

    let (callback, mut rx) = sink();
    space
        .event_register(EventMode::Read, EventTiming::Future, alert_template(), callback)
        .unwrap();
    space.write(tuple!("alert", 2i64)).unwrap();

    assert_eq!(next(&mut rx).await, tuple!("alert", 2i64));
    assert_eq!(space.len(), 2);
}

#[tokio::test]
async fn test_register_after_shutdown_fails() {
    let space = TupleSpace::new();
    space.shutdown();
    let (callback, _rx) = sink();
    assert!(space
        .event_register(EventMode::Read, EventTiming::Future, alert_template(), callback)
        .is_err());
}
