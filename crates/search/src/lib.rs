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


//! Distributed fuzzy word search over a Linda tuple space
//!
//! A [`Manager`] publishes a query and its candidate words as tuples; any
//! number of [`Searcher`]s, sharing the space, take the candidates, score
//! them by edit distance and write back the close ones. Neither side knows
//! about the other beyond the tuple conventions in [`protocol`].

#![warn(missing_docs)]

pub mod levenshtein;
pub mod manager;
pub mod protocol;
pub mod searcher;
pub mod tracing_setup;

use linda_tuplespace::TupleSpaceError;
use thiserror::Error;

pub use levenshtein::levenshtein;
pub use manager::{Manager, SearchMatch};
pub use searcher::{SearchPass, Searcher, DEFAULT_MAX_DISTANCE, DEFAULT_MAX_SEARCHERS};

/// Errors raised by the search protocol
#[derive(Debug, Error)]
pub enum SearchError {
    /// The tuple space rejected an operation
    #[error("Tuple space error: {0}")]
    Space(#[from] TupleSpaceError),

    /// A tuple did not follow the search conventions
    #[error("Protocol error: {0}")]
    Protocol(String),
}
