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

//! Parking and waking of blocked `take`/`read` callers.
//!
//! A blocked caller registers a waiter holding its template and the sending
//! half of a oneshot channel, then awaits the receiving half outside the
//! space lock. Writers offer each new tuple to the registered waiters while
//! still inside their critical section:
//! - every matching `READ` waiter receives a copy
//! - the oldest matching `TAKE` waiter receives the tuple itself, which then
//!   never reaches the store
//!
//! Waiters are served in registration order (FIFO). A waiter whose receiver
//! is gone is skipped and discarded, so a vanished caller never swallows a
//! tuple.

use std::collections::VecDeque;
use tokio::sync::oneshot;

use crate::template::{matches, Template};
use crate::tuple::Tuple;

/// Identity of a registered waiter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WaiterId(u64);

/// What a blocked caller wants to do with the tuple it waits for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitMode {
    /// Remove the tuple
    Take,
    /// Leave the tuple in place
    Read,
}

/// Pending wait request
struct Waiter {
    id: WaiterId,
    template: Template,
    mode: WaitMode,
    sender: oneshot::Sender<Tuple>,
}

/// Registry of blocked callers
#[derive(Default)]
pub struct WaitCoordinator {
    waiters: VecDeque<Waiter>,
    next_id: u64,
}

impl WaitCoordinator {
    /// Create an empty coordinator
    pub fn new() -> Self {
        Self::default()
    }

    /// Park a caller until a matching tuple is offered
    pub fn register(
        &mut self,
        template: Template,
        mode: WaitMode,
    ) -> (WaiterId, oneshot::Receiver<Tuple>) {
        let id = WaiterId(self.next_id);
        self.next_id += 1;

        let (sender, receiver) = oneshot::channel();
        self.waiters.push_back(Waiter {
            id,
            template,
            mode,
            sender,
        });
        (id, receiver)
    }

    /// Withdraw a waiter; false if it was already served or discarded
    pub fn cancel(&mut self, id: WaiterId) -> bool {
        match self.waiters.iter().position(|waiter| waiter.id == id) {
            Some(index) => {
                self.waiters.remove(index);
                true
            }
            None => false,
        }
    }

    /// Hand a copy of `tuple` to every matching `READ` waiter.
    ///
    /// Returns how many waiters were served.
    pub fn offer_read(&mut self, tuple: &Tuple) -> usize {
        let mut served = 0;
        let mut remaining = VecDeque::with_capacity(self.waiters.len());

        for waiter in self.waiters.drain(..) {
            if waiter.sender.is_closed() {
                continue;
            }
            if waiter.mode != WaitMode::Read || !matches(&waiter.template, tuple) {
                remaining.push_back(waiter);
                continue;
            }
            if waiter.sender.send(tuple.clone()).is_ok() {
                served += 1;
            }
        }

        self.waiters = remaining;
        served
    }

    /// Hand `tuple` to the oldest matching `TAKE` waiter.
    ///
    /// Returns the tuple back when no waiter claimed it.
    pub fn offer_take(&mut self, tuple: Tuple) -> Option<Tuple> {
        let mut tuple = tuple;
        loop {
            let Some(index) = self.waiters.iter().position(|waiter| {
                waiter.mode == WaitMode::Take && matches(&waiter.template, &tuple)
            }) else {
                return Some(tuple);
            };
            let Some(waiter) = self.waiters.remove(index) else {
                return Some(tuple);
            };

            match waiter.sender.send(tuple) {
                Ok(()) => return None,
                // Receiver vanished between registration and now; try the next one
                Err(returned) => tuple = returned,
            }
        }
    }

    /// Number of parked callers
    pub fn len(&self) -> usize {
        self.waiters.len()
    }

    /// Whether nobody is parked
    pub fn is_empty(&self) -> bool {
        self.waiters.is_empty()
    }

    /// Drop every waiter; their receivers observe a closed channel
    pub fn close_all(&mut self) -> usize {
        let count = self.waiters.len();
        self.waiters.clear();
        count
    }
}
