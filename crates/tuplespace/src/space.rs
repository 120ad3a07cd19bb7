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

//! TupleSpace façade.
//!
//! Composes the [`TupleStore`], the [`WaitCoordinator`] and the
//! [`EventDispatcher`] behind one mutex. Every public call holds that mutex
//! for a single short critical section and never across an `.await`, so
//! store mutation, waiter hand-off and subscription matching are atomic with
//! respect to each other. Callback bodies run later, on the dispatcher.
//!
//! ## Write path
//! 1. every matching blocked `read` and `READ` subscription gets a copy
//! 2. the oldest matching blocked `take` claims the tuple, else
//! 3. the oldest matching `TAKE` subscription claims it, else
//! 4. the tuple is stored

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace};

use crate::config::SpaceConfig;
use crate::error::{TupleSpaceError, TupleSpaceResult};
use crate::events::{spawn_dispatcher, Callback, EventDispatcher, EventMode, EventTiming, Notification};
use crate::store::TupleStore;
use crate::template::Template;
use crate::tuple::Tuple;
use crate::wait::{WaitCoordinator, WaitMode, WaiterId};

/// Statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TupleSpaceStats {
    total_writes: u64,
    total_reads: u64,
    total_takes: u64,
    current_size: usize,
    pending_waiters: usize,
    pending_subscriptions: usize,
    callbacks_fired: u64,
}

impl TupleSpaceStats {
    /// Get total number of write operations
    pub fn total_writes(&self) -> u64 {
        self.total_writes
    }

    /// Get total number of read-family operations (`read`, `try_read`, `read_all`)
    pub fn total_reads(&self) -> u64 {
        self.total_reads
    }

    /// Get total number of take-family operations (`take`, `try_take`, `take_all`)
    pub fn total_takes(&self) -> u64 {
        self.total_takes
    }

    /// Get current number of tuples in the space
    pub fn current_size(&self) -> usize {
        self.current_size
    }

    /// Callers currently blocked in `take`/`read`
    pub fn pending_waiters(&self) -> usize {
        self.pending_waiters
    }

    /// Subscriptions that have not fired yet
    pub fn pending_subscriptions(&self) -> usize {
        self.pending_subscriptions
    }

    /// Callbacks handed to the dispatcher so far
    pub fn callbacks_fired(&self) -> u64 {
        self.callbacks_fired
    }
}

/// Everything guarded by the space mutex
struct SpaceState {
    store: TupleStore,
    waiters: WaitCoordinator,
    subscriptions: EventDispatcher,
    notifier: Option<mpsc::UnboundedSender<Notification>>,
    stats: TupleSpaceStats,
}

impl SpaceState {
    fn ensure_open(&self) -> TupleSpaceResult<()> {
        if self.notifier.is_some() {
            Ok(())
        } else {
            Err(TupleSpaceError::ShutDown)
        }
    }

    /// Route a new tuple to waiters and subscriptions, storing it if unclaimed
    fn publish(&mut self, tuple: Tuple) {
        let mut fired = Vec::new();

        let readers = self.waiters.offer_read(&tuple);
        self.subscriptions.offer_read(&tuple, &mut fired);

        let unclaimed = self
            .waiters
            .offer_take(tuple)
            .and_then(|tuple| self.subscriptions.offer_take(tuple, &mut fired));

        trace!(
            readers,
            callbacks = fired.len(),
            stored = unclaimed.is_some(),
            "published tuple"
        );

        if let Some(tuple) = unclaimed {
            self.store.insert(tuple);
        }
        self.notify(fired);
    }

    fn notify(&mut self, fired: Vec<Notification>) {
        if let Some(notifier) = &self.notifier {
            for notification in fired {
                // The dispatcher only stops after shutdown drops the sender
                let _ = notifier.send(notification);
            }
        }
    }
}

struct SpaceInner {
    config: SpaceConfig,
    state: Mutex<SpaceState>,
    callbacks_fired: Arc<AtomicU64>,
}

impl SpaceInner {
    fn lock(&self) -> MutexGuard<'_, SpaceState> {
        // Callbacks never run under this lock, a poisoned state is still consistent
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_template(&self, template: &Template) -> TupleSpaceResult<()> {
        template.validate(&self.config).map_err(|e| {
            tracing::warn!(error = %e, "rejected template");
            e
        })
    }
}

/// A blocked caller's registration, withdrawn if the caller goes away.
///
/// If the future awaiting the hand-off is dropped (timeout, cancellation),
/// the waiter is removed under the lock; a tuple already handed to a `take`
/// goes back through the write path so it is never lost.
struct PendingWait<'a> {
    inner: &'a SpaceInner,
    id: WaiterId,
    mode: WaitMode,
    receiver: oneshot::Receiver<Tuple>,
    finished: bool,
}

impl PendingWait<'_> {
    /// `None` means the waiter was dropped without a tuple (shutdown)
    async fn wait(&mut self) -> Option<Tuple> {
        let outcome = (&mut self.receiver).await.ok();
        self.finished = true;
        outcome
    }
}

impl Drop for PendingWait<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }

        let mut state = self.inner.lock();
        state.waiters.cancel(self.id);
        if let Ok(tuple) = self.receiver.try_recv() {
            if self.mode == WaitMode::Take && state.ensure_open().is_ok() {
                trace!(%tuple, "abandoned take, republishing");
                state.publish(tuple);
                state.stats.current_size = state.store.len();
            }
        }
        state.stats.pending_waiters = state.waiters.len();
    }
}

/// Linda tuple space engine.
///
/// A cheap, cloneable handle: clones share the same space. Construct one per
/// process or service and hand clones to every component that needs it; call
/// [`TupleSpace::shutdown`] to release blocked callers at the end of its life.
#[derive(Clone)]
pub struct TupleSpace {
    inner: Arc<SpaceInner>,
}

impl std::fmt::Debug for TupleSpace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TupleSpace")
            .field("config", &self.inner.config)
            .field("stats", &self.stats())
            .finish()
    }
}

impl TupleSpace {
    /// Create a space with the default configuration.
    ///
    /// # Panics
    /// Outside a tokio runtime (the callback dispatcher is spawned on it);
    /// [`TupleSpace::with_config`] reports that as an error instead.
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        match Self::with_config(SpaceConfig::default()) {
            Ok(space) => space,
            Err(e) => panic!("{}", e),
        }
    }

    /// Create a space with an explicit configuration (CODE - highest priority)
    ///
    /// Fails with `InvalidConfiguration` for a self-contradictory config and
    /// with `NoRuntime` outside a tokio runtime.
    pub fn with_config(config: SpaceConfig) -> TupleSpaceResult<Self> {
        config.validate()?;
        let callbacks_fired = Arc::new(AtomicU64::new(0));
        let notifier = spawn_dispatcher(config.max_concurrent_callbacks, callbacks_fired.clone())?;

        debug!(?config, "tuple space created");

        Ok(TupleSpace {
            inner: Arc::new(SpaceInner {
                config,
                state: Mutex::new(SpaceState {
                    store: TupleStore::new(),
                    waiters: WaitCoordinator::new(),
                    subscriptions: EventDispatcher::new(),
                    notifier: Some(notifier),
                    stats: TupleSpaceStats::default(),
                }),
                callbacks_fired,
            }),
        })
    }

    /// Configuration this space was built with
    pub fn config(&self) -> &SpaceConfig {
        &self.inner.config
    }

    /// Write a tuple to the space.
    ///
    /// Never blocks; fails only for a malformed tuple or after shutdown.
    pub fn write(&self, tuple: Tuple) -> TupleSpaceResult<()> {
        self.inner
            .config
            .check_arity(tuple.arity())
            .map_err(TupleSpaceError::MalformedTuple)?;

        let mut state = self.inner.lock();
        state.ensure_open()?;
        debug!(%tuple, "write");

        state.stats.total_writes += 1;
        state.publish(tuple);
        state.stats.current_size = state.store.len();
        state.stats.pending_waiters = state.waiters.len();
        Ok(())
    }

    /// Remove and return a matching tuple, waiting until one is written
    pub async fn take(&self, template: Template) -> TupleSpaceResult<Tuple> {
        self.retrieve(template, WaitMode::Take).await
    }

    /// Return a copy of a matching tuple, waiting until one is written
    pub async fn read(&self, template: Template) -> TupleSpaceResult<Tuple> {
        self.retrieve(template, WaitMode::Read).await
    }

    /// [`take`](Self::take) bounded by `timeout`; `Ok(None)` when it expires
    pub async fn take_timeout(
        &self,
        template: Template,
        timeout: Duration,
    ) -> TupleSpaceResult<Option<Tuple>> {
        match tokio::time::timeout(timeout, self.take(template)).await {
            Ok(result) => result.map(Some),
            Err(_) => Ok(None),
        }
    }

    /// [`read`](Self::read) bounded by `timeout`; `Ok(None)` when it expires
    pub async fn read_timeout(
        &self,
        template: Template,
        timeout: Duration,
    ) -> TupleSpaceResult<Option<Tuple>> {
        match tokio::time::timeout(timeout, self.read(template)).await {
            Ok(result) => result.map(Some),
            Err(_) => Ok(None),
        }
    }

    /// Remove and return a matching tuple if one is present right now
    pub fn try_take(&self, template: Template) -> TupleSpaceResult<Option<Tuple>> {
        self.inner.check_template(&template)?;

        let mut state = self.inner.lock();
        state.ensure_open()?;
        state.stats.total_takes += 1;

        let taken = state.store.remove_one(&template);
        state.stats.current_size = state.store.len();
        debug!(arity = template.arity(), found = taken.is_some(), "try_take");
        Ok(taken)
    }

    /// Return a copy of a matching tuple if one is present right now
    pub fn try_read(&self, template: Template) -> TupleSpaceResult<Option<Tuple>> {
        self.inner.check_template(&template)?;

        let mut state = self.inner.lock();
        state.ensure_open()?;
        state.stats.total_reads += 1;

        let found = state.store.find_one(&template).cloned();
        debug!(arity = template.arity(), found = found.is_some(), "try_read");
        Ok(found)
    }

    /// Remove and return every tuple currently matching; possibly empty.
    ///
    /// Only each individual removal is atomic: concurrent bulk takes may split
    /// the matching tuples between them.
    pub fn take_all(&self, template: Template) -> TupleSpaceResult<Vec<Tuple>> {
        self.inner.check_template(&template)?;

        let mut state = self.inner.lock();
        state.ensure_open()?;
        state.stats.total_takes += 1;

        let taken = state.store.remove_all(&template);
        state.stats.current_size = state.store.len();
        debug!(arity = template.arity(), count = taken.len(), "take_all");
        Ok(taken)
    }

    /// Copies of every tuple currently matching; possibly empty.
    ///
    /// A snapshot with no consistency promise against concurrent writers.
    pub fn read_all(&self, template: Template) -> TupleSpaceResult<Vec<Tuple>> {
        self.inner.check_template(&template)?;

        let mut state = self.inner.lock();
        state.ensure_open()?;
        state.stats.total_reads += 1;

        let found = state.store.find_all(&template);
        debug!(arity = template.arity(), count = found.len(), "read_all");
        Ok(found)
    }

    /// Register a fire-once callback for tuples matching `template`.
    ///
    /// With [`EventTiming::Immediate`] a tuple already in the space satisfies
    /// the registration at once (removed first in [`EventMode::Take`]);
    /// otherwise, and with [`EventTiming::Future`], only later writes count.
    /// The callback runs on the blocking pool, never in the caller or writer,
    /// and at most once; to keep watching it must register again.
    ///
    /// Beware of a `Read`/`Immediate` callback that re-registers itself while
    /// its tuple stays in the space: it fires again straight away, forever.
    pub fn event_register(
        &self,
        mode: EventMode,
        timing: EventTiming,
        template: Template,
        callback: Callback,
    ) -> TupleSpaceResult<()> {
        self.inner.check_template(&template)?;

        let mut state = self.inner.lock();
        state.ensure_open()?;
        debug!(?mode, ?timing, arity = template.arity(), "event_register");

        if timing == EventTiming::Immediate {
            let present = match mode {
                EventMode::Take => state.store.remove_one(&template),
                EventMode::Read => state.store.find_one(&template).cloned(),
            };
            if let Some(tuple) = present {
                state.stats.current_size = state.store.len();
                state.notify(vec![Notification::immediate(callback, tuple)]);
                return Ok(());
            }
        }

        state.subscriptions.subscribe(mode, template, callback);
        state.stats.pending_subscriptions = state.subscriptions.len();
        Ok(())
    }

    /// Snapshot of the space statistics
    pub fn stats(&self) -> TupleSpaceStats {
        let state = self.inner.lock();
        let mut stats = state.stats.clone();
        stats.current_size = state.store.len();
        stats.pending_waiters = state.waiters.len();
        stats.pending_subscriptions = state.subscriptions.len();
        stats.callbacks_fired = self.inner.callbacks_fired.load(Ordering::Relaxed);
        stats
    }

    /// Number of tuples in the space
    pub fn len(&self) -> usize {
        self.inner.lock().store.len()
    }

    /// Whether the space holds no tuples
    pub fn is_empty(&self) -> bool {
        self.inner.lock().store.is_empty()
    }

    /// Close the space.
    ///
    /// Blocked `take`/`read` callers fail with [`TupleSpaceError::ShutDown`],
    /// pending subscriptions are dropped without firing, already queued
    /// callbacks still run, and every later call fails with `ShutDown`.
    /// Calling it again is a no-op.
    pub fn shutdown(&self) {
        let mut state = self.inner.lock();
        if state.notifier.take().is_none() {
            return;
        }

        let waiters = state.waiters.close_all();
        let subscriptions = state.subscriptions.clear();
        state.store.clear();
        state.stats.current_size = 0;
        state.stats.pending_waiters = 0;
        state.stats.pending_subscriptions = 0;
        debug!(waiters, subscriptions, "tuple space shut down");
    }

    /// Whether [`shutdown`](Self::shutdown) was called
    pub fn is_shut_down(&self) -> bool {
        self.inner.lock().notifier.is_none()
    }

    async fn retrieve(&self, template: Template, mode: WaitMode) -> TupleSpaceResult<Tuple> {
        self.inner.check_template(&template)?;

        loop {
            let mut pending = {
                let mut state = self.inner.lock();
                state.ensure_open()?;
                match mode {
                    WaitMode::Take => state.stats.total_takes += 1,
                    WaitMode::Read => state.stats.total_reads += 1,
                }

                let found = match mode {
                    WaitMode::Take => state.store.remove_one(&template),
                    WaitMode::Read => state.store.find_one(&template).cloned(),
                };
                if let Some(tuple) = found {
                    state.stats.current_size = state.store.len();
                    debug!(?mode, %tuple, "retrieved without waiting");
                    return Ok(tuple);
                }

                let (id, receiver) = state.waiters.register(template.clone(), mode);
                state.stats.pending_waiters = state.waiters.len();
                debug!(?mode, arity = template.arity(), "blocking until a match is written");

                PendingWait {
                    inner: self.inner.as_ref(),
                    id,
                    mode,
                    receiver,
                    finished: false,
                }
            };

            match pending.wait().await {
                Some(tuple) => return Ok(tuple),
                // Dropped without a tuple: the retry sees the shutdown
                None => continue,
            }
        }
    }
}
