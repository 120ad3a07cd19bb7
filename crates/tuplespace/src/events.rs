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

//! Fire-once event subscriptions and their asynchronous dispatch.
//!
//! ## Design
//! - A subscription is removed from the registry in the same critical section
//!   that matches it, so each registration fires at most once
//! - Matching only produces a [`Notification`]; the callback itself runs on
//!   tokio's blocking pool, driven by a dispatcher task fed through an
//!   unbounded channel, so a slow callback never holds up a writer
//! - `READ` subscriptions all fire for the same tuple; among `TAKE`
//!   subscriptions the oldest matching one claims it
//! - A callback that wants to keep watching registers again from its own body

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, Semaphore};

use crate::error::{TupleSpaceError, TupleSpaceResult};
use crate::template::{matches, Template};
use crate::tuple::Tuple;

/// Callback invoked with the tuple that satisfied a subscription
pub type Callback = Arc<dyn Fn(Tuple) + Send + Sync>;

/// Whether a firing subscription consumes the tuple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventMode {
    /// Remove the tuple from the space
    Take,
    /// Leave the tuple in the space
    Read,
}

/// Which tuples a subscription considers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTiming {
    /// Current contents first, then future writes
    Immediate,
    /// Only tuples written after registration
    Future,
}

/// Identity of a registered subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// A callback ready to run, detached from the registry
pub struct Notification {
    subscription: Option<SubscriptionId>,
    callback: Callback,
    tuple: Tuple,
}

impl Notification {
    /// Notification for a subscription that fired at registration time
    pub(crate) fn immediate(callback: Callback, tuple: Tuple) -> Self {
        Notification {
            subscription: None,
            callback,
            tuple,
        }
    }
}

impl fmt::Debug for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notification")
            .field("subscription", &self.subscription)
            .field("callback", &"<function>")
            .field("tuple", &self.tuple)
            .finish()
    }
}

struct Subscription {
    id: SubscriptionId,
    mode: EventMode,
    template: Template,
    callback: Callback,
}

impl Subscription {
    fn into_notification(self, tuple: Tuple) -> Notification {
        Notification {
            subscription: Some(self.id),
            callback: self.callback,
            tuple,
        }
    }
}

/// Registry of pending fire-once subscriptions
#[derive(Default)]
pub struct EventDispatcher {
    subscriptions: VecDeque<Subscription>,
    next_id: u64,
}

impl EventDispatcher {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscription for future writes
    pub fn subscribe(
        &mut self,
        mode: EventMode,
        template: Template,
        callback: Callback,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push_back(Subscription {
            id,
            mode,
            template,
            callback,
        });
        id
    }

    /// Fire every matching `READ` subscription for `tuple`
    pub fn offer_read(&mut self, tuple: &Tuple, fired: &mut Vec<Notification>) {
        let mut remaining = VecDeque::with_capacity(self.subscriptions.len());

        for subscription in self.subscriptions.drain(..) {
            if subscription.mode == EventMode::Read && matches(&subscription.template, tuple) {
                fired.push(subscription.into_notification(tuple.clone()));
            } else {
                remaining.push_back(subscription);
            }
        }

        self.subscriptions = remaining;
    }

    /// Let the oldest matching `TAKE` subscription claim `tuple`.
    ///
    /// Returns the tuple back when no subscription claimed it.
    pub fn offer_take(&mut self, tuple: Tuple, fired: &mut Vec<Notification>) -> Option<Tuple> {
        let index = self.subscriptions.iter().position(|subscription| {
            subscription.mode == EventMode::Take && matches(&subscription.template, &tuple)
        });

        match index.and_then(|index| self.subscriptions.remove(index)) {
            Some(subscription) => {
                fired.push(subscription.into_notification(tuple));
                None
            }
            None => Some(tuple),
        }
    }

    /// Number of pending subscriptions
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Whether no subscription is pending
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Drop every pending subscription
    pub fn clear(&mut self) -> usize {
        let count = self.subscriptions.len();
        self.subscriptions.clear();
        count
    }
}

/// Start the task that runs callbacks off the writer's path.
///
/// Fails with [`TupleSpaceError::NoRuntime`] outside a tokio runtime. The
/// task ends once every sender is dropped and the queue is drained.
pub(crate) fn spawn_dispatcher(
    max_concurrent: usize,
    fired: Arc<AtomicU64>,
) -> TupleSpaceResult<mpsc::UnboundedSender<Notification>> {
    let runtime = Handle::try_current().map_err(|e| TupleSpaceError::NoRuntime(e.to_string()))?;
    let (sender, mut receiver) = mpsc::unbounded_channel::<Notification>();
    let limit = (max_concurrent > 0).then(|| Arc::new(Semaphore::new(max_concurrent)));

    runtime.spawn(async move {
        while let Some(notification) = receiver.recv().await {
            let permit = match &limit {
                Some(semaphore) => match semaphore.clone().acquire_owned().await {
                    Ok(permit) => Some(permit),
                    Err(_) => break,
                },
                None => None,
            };

            let Notification {
                subscription,
                callback,
                tuple,
            } = notification;
            tracing::trace!(?subscription, %tuple, "firing callback");
            fired.fetch_add(1, Ordering::Relaxed);

            let handle = tokio::task::spawn_blocking(move || {
                let _permit = permit;
                callback(tuple)
            });
            tokio::spawn(async move {
                if let Err(e) = handle.await {
                    if e.is_panic() {
                        tracing::warn!(?subscription, "event callback panicked");
                    }
                }
            });
        }
        tracing::debug!("callback dispatcher stopped");
    });

    Ok(sender)
}
