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

//! Integration tests: a manager and a pool of searchers sharing one space,
//! including through a [`Linda`] proxy instead of the engine itself.

use async_trait::async_trait;
use linda_search::{levenshtein, Manager, Searcher};
use linda_tuplespace::{
    Callback, EventMode, EventTiming, Linda, SharedLinda, Template, Tuple, TupleSpace,
    TupleSpaceResult,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const WORDS: &[&str] = &[
    "coordination", "coordinate", "cordination", "generative", "communication",
    "tuple", "template", "space", "linda", "lindy", "blinda", "carriero", "gelernter",
];

/// Forwards to a space and counts the operations that went through it
struct CountingLinda {
    inner: TupleSpace,
    writes: AtomicUsize,
    takes: AtomicUsize,
}

#[async_trait]
impl Linda for CountingLinda {
    async fn write(&self, tuple: Tuple) -> TupleSpaceResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.write(tuple)
    }

    async fn take(&self, template: Template) -> TupleSpaceResult<Tuple> {
        self.takes.fetch_add(1, Ordering::SeqCst);
        self.inner.take(template).await
    }

    async fn read(&self, template: Template) -> TupleSpaceResult<Tuple> {
        self.inner.read(template).await
    }

    async fn try_take(&self, template: Template) -> TupleSpaceResult<Option<Tuple>> {
        self.takes.fetch_add(1, Ordering::SeqCst);
        self.inner.try_take(template)
    }

    async fn try_read(&self, template: Template) -> TupleSpaceResult<Option<Tuple>> {
        self.inner.try_read(template)
    }

    async fn take_all(&self, template: Template) -> TupleSpaceResult<Vec<Tuple>> {
        self.inner.take_all(template)
    }

    async fn read_all(&self, template: Template) -> TupleSpaceResult<Vec<Tuple>> {
        self.inner.read_all(template)
    }

    async fn event_register(
        &self,
        mode: EventMode,
        timing: EventTiming,
        template: Template,
        callback: Callback,
    ) -> TupleSpaceResult<()> {
        self.inner.event_register(mode, timing, template, callback)
    }
}

fn expected(query: &str, max_distance: usize) -> Vec<(usize, String)> {
    let mut expected: Vec<_> = WORDS
        .iter()
        .map(|w| (levenshtein(query, w), w.to_string()))
        .filter(|(d, _)| *d < max_distance)
        .collect();
    expected.sort();
    expected
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_pool_of_searchers_finds_every_match_once() {
    const SEARCHERS: usize = 4;
    let space = TupleSpace::new();
    let linda: SharedLinda = Arc::new(space.clone());

    let mut workers = Vec::new();
    for _ in 0..SEARCHERS {
        let searcher = Searcher::new(linda.clone())
            .with_max_searchers(SEARCHERS as i64)
            .with_max_distance(4);
        workers.push(tokio::spawn(async move { searcher.run().await }));
    }

    let manager = Manager::new(linda.clone());
    let found = tokio::time::timeout(Duration::from_secs(10), manager.search("linda", WORDS))
        .await
        .expect("search hung")
        .unwrap();

    let found: Vec<_> = found.into_iter().map(|m| (m.distance, m.candidate)).collect();
    assert_eq!(found, expected("linda", 4));

    space.shutdown();
    let mut examined = 0;
    for worker in workers {
        if let Some(pass) = worker.await.unwrap().unwrap() {
            examined += pass.examined;
        }
    }
    assert!(examined <= WORDS.len());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_consecutive_searches_share_searchers() {
    let space = TupleSpace::new();
    let linda: SharedLinda = Arc::new(space.clone());

    // Each searcher serves requests until one runs to completion
    let mut workers = Vec::new();
    for _ in 0..2 {
        let searcher = Searcher::new(linda.clone());
        workers.push(tokio::spawn(async move { searcher.run().await }));
    }

    let manager = Manager::new(linda.clone());
    let first = manager.search("tuple", WORDS).await.unwrap();
    let second = manager.search("space", WORDS).await.unwrap();

    assert_eq!(first[0].candidate, "tuple");
    assert_eq!(second[0].candidate, "space");

    space.shutdown();
    for worker in workers {
        worker.await.unwrap().unwrap();
    }
}

#[tokio::test]
async fn test_search_through_proxy() {
    let proxy = Arc::new(CountingLinda {
        inner: TupleSpace::new(),
        writes: AtomicUsize::new(0),
        takes: AtomicUsize::new(0),
    });
    let linda: SharedLinda = proxy.clone();

    let searcher = Searcher::new(linda.clone()).with_max_distance(3);
    let worker = tokio::spawn(async move { searcher.run().await });

    let found = Manager::new(linda)
        .search("linda", ["linda", "lindy"])
        .await
        .unwrap();
    assert_eq!(found.len(), 2);

    // manager status + request + 2 values, then per value a result and a signal
    assert_eq!(proxy.writes.load(Ordering::SeqCst), 8);
    assert!(proxy.takes.load(Ordering::SeqCst) >= 3);

    proxy.inner.shutdown();
    worker.await.unwrap().unwrap();
}
