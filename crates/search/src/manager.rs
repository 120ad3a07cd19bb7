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


//! Manager: publishes a search and gathers what the searchers found.
//!
//! ## Protocol
//! 1. Write `("manager", id)` so searchers know someone is waiting.
//! 2. Write the request and one `value` tuple per candidate.
//! 3. Wait for one `("searcher", "searching", id)` signal per candidate.
//!    Each signal is written after the value's result, so once all of them
//!    arrived every result is in the space.
//! 4. Withdraw the status tuple and any leftovers, then `take_all` results.
//!
//! With a deadline the manager stops waiting early and returns whatever
//! results exist by then; searchers still holding a value notice the
//! missing status tuple, give up and take back anything they wrote after
//! the withdrawal.

use std::time::Duration;

use linda_tuplespace::SharedLinda;
use tokio::time::Instant;
use tracing::{info, warn};
use ulid::Ulid;

use crate::protocol::{self, Request};
use crate::SearchError;

/// A candidate reported by a searcher
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SearchMatch {
    /// Edit distance to the query
    pub distance: usize,
    /// The candidate word
    pub candidate: String,
}

/// Drives one search at a time over a shared space
pub struct Manager {
    linda: SharedLinda,
    deadline: Option<Duration>,
}

impl Manager {
    /// Manager that waits until every candidate has been scored
    pub fn new(linda: SharedLinda) -> Self {
        Self {
            linda,
            deadline: None,
        }
    }

    /// Stop waiting for searchers after `deadline`
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Search `candidates` for words close to `query`, best match first
    pub async fn search<I, S>(&self, query: &str, candidates: I) -> Result<Vec<SearchMatch>, SearchError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let id = Ulid::new();
        let started = Instant::now();

        self.linda.write(protocol::manager(id)).await?;
        let request = Request {
            id,
            query: query.to_string(),
            searchers: 0,
        };
        self.linda.write(request.to_tuple()).await?;

        let mut expected = 0usize;
        for candidate in candidates {
            self.linda
                .write(protocol::value(id, candidate.as_ref()))
                .await?;
            expected += 1;
        }
        info!(request = %id, query, candidates = expected, "Search published");

        let scored = self.await_searchers(id, expected, started).await?;
        if scored < expected {
            warn!(request = %id, scored, expected, "Deadline reached before all candidates were scored");
        }

        // Withdraw first: searchers check the status tuple after every write
        self.linda.try_take(protocol::manager_of(id)).await?;
        self.linda.take_all(protocol::request_for(id)).await?;
        self.linda.take_all(protocol::values_of(id)).await?;
        self.linda.take_all(protocol::searching_on(id)).await?;

        let mut matches = self
            .linda
            .take_all(protocol::results_of(id))
            .await?
            .iter()
            .map(|tuple| {
                let candidate = tuple.get(2).and_then(|f| f.as_str());
                let distance = tuple.get(3).and_then(|f| f.as_integer());
                match (candidate, distance) {
                    (Some(candidate), Some(distance)) if distance >= 0 => Ok(SearchMatch {
                        distance: distance as usize,
                        candidate: candidate.to_string(),
                    }),
                    _ => Err(SearchError::Protocol(format!("malformed result {tuple}"))),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        matches.sort();

        info!(request = %id, found = matches.len(), elapsed = ?started.elapsed(), "Search finished");
        Ok(matches)
    }

    /// Count liveness signals until `expected` arrived or the deadline passed
    async fn await_searchers(
        &self,
        id: Ulid,
        expected: usize,
        started: Instant,
    ) -> Result<usize, SearchError> {
        let mut scored = 0;
        while scored < expected {
            match self.deadline {
                None => {
                    self.linda.take(protocol::searching_on(id)).await?;
                }
                Some(deadline) => {
                    let remaining = deadline.saturating_sub(started.elapsed());
                    let signal = self
                        .linda
                        .take_timeout(protocol::searching_on(id), remaining)
                        .await?;
                    if signal.is_none() {
                        break;
                    }
                }
            }
            scored += 1;
        }
        Ok(scored)
    }
}
