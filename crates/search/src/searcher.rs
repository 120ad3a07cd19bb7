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


//! Searcher: a worker that scores candidate values against a request.

use linda_tuplespace::{SharedLinda, Template, TupleSpaceError};
use tracing::{debug, info, instrument};
use ulid::Ulid;

use crate::levenshtein::levenshtein;
use crate::protocol::{self, Request};
use crate::SearchError;

/// Default number of searchers a request is offered to
pub const DEFAULT_MAX_SEARCHERS: i64 = 1;

/// Default distance bound; only candidates strictly closer are reported
pub const DEFAULT_MAX_DISTANCE: usize = 10;

/// Outcome of one request handled by a searcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPass {
    /// Request that was worked on
    pub request: Ulid,
    /// Values taken and scored
    pub examined: usize,
    /// Results written
    pub matched: usize,
    /// The manager withdrew before the values ran out
    pub abandoned: bool,
}

/// Scores `value` tuples of a request and writes `result` tuples
pub struct Searcher {
    linda: SharedLinda,
    max_searchers: i64,
    max_distance: usize,
}

impl Searcher {
    /// Searcher with the default limits
    pub fn new(linda: SharedLinda) -> Self {
        Self {
            linda,
            max_searchers: DEFAULT_MAX_SEARCHERS,
            max_distance: DEFAULT_MAX_DISTANCE,
        }
    }

    /// How many searchers may share a request
    pub fn with_max_searchers(mut self, max_searchers: i64) -> Self {
        self.max_searchers = max_searchers;
        self
    }

    /// Only report candidates closer than `max_distance`
    pub fn with_max_distance(mut self, max_distance: usize) -> Self {
        self.max_distance = max_distance;
        self
    }

    /// Handle requests until one is worked to completion
    ///
    /// A pass abandoned by its manager sends the searcher back for another
    /// request. Returns `Ok(None)` once the space shuts down.
    pub async fn run(&self) -> Result<Option<SearchPass>, SearchError> {
        loop {
            match self.run_once().await {
                Ok(pass) if pass.abandoned => continue,
                Ok(pass) => return Ok(Some(pass)),
                Err(SearchError::Space(TupleSpaceError::ShutDown)) => {
                    info!("Tuple space shut down, searcher stopping");
                    return Ok(None);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Take one request (waiting for it) and work through its values
    #[instrument(skip(self))]
    pub async fn run_once(&self) -> Result<SearchPass, SearchError> {
        let taken = self.linda.take(protocol::any_request()).await?;
        let request = Request::from_tuple(&taken)?;
        info!(request = %request.id, query = %request.query, "Looking for matches");

        // Offer the request to one more searcher while there is room
        if request.searchers < self.max_searchers - 1 {
            let shared = Request {
                searchers: request.searchers + 1,
                ..request.clone()
            };
            self.linda.write(shared.to_tuple()).await?;
        }

        let mut pass = SearchPass {
            request: request.id,
            examined: 0,
            matched: 0,
            abandoned: false,
        };

        while let Some(tuple) = self.linda.try_take(protocol::values_of(request.id)).await? {
            let candidate = tuple.get(2).and_then(|f| f.as_str()).ok_or_else(|| {
                SearchError::Protocol(format!("malformed value {tuple}"))
            })?;
            let distance = levenshtein(&request.query, candidate);
            pass.examined += 1;

            if !self.manager_waiting(request.id).await? {
                info!(request = %request.id, "Manager gone, abandoning request");
                pass.abandoned = true;
                break;
            }

            let result = (distance < self.max_distance)
                .then(|| protocol::result(request.id, candidate, distance));
            if let Some(result) = &result {
                debug!(candidate, distance, "Match");
                self.linda.write(result.clone()).await?;
            }
            let signal = protocol::searching(request.id);
            self.linda.write(signal.clone()).await?;

            // The manager withdraws before it collects, so writes that raced
            // with a withdrawal may have missed the collection
            if !self.manager_waiting(request.id).await? {
                info!(request = %request.id, "Manager left while writing, retracting");
                if let Some(result) = &result {
                    self.linda.try_take(Template::exact(result)).await?;
                }
                self.linda.try_take(Template::exact(&signal)).await?;
                pass.abandoned = true;
                break;
            }

            if result.is_some() {
                pass.matched += 1;
            }
        }

        debug!(?pass, "Search pass finished");
        Ok(pass)
    }

    async fn manager_waiting(&self, id: Ulid) -> Result<bool, SearchError> {
        Ok(self.linda.try_read(protocol::manager_of(id)).await?.is_some())
    }
}
