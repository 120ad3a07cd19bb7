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


//! Linda: tuple space coordination for Rust
//!
//! Umbrella crate over the workspace:
//! - [`tuplespace`]: the engine (`write`, `take`, `read`, their non-blocking
//!   and bulk variants, fire-once events)
//! - [`search`]: a distributed fuzzy word search built on it

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub use linda_search as search;
pub use linda_tuplespace as tuplespace;

// Re-export core types for convenience
pub use tuplespace::{
    matches, template, tuple, Callback, EventMode, EventTiming, FieldType, Linda, Matcher,
    SharedLinda, SpaceConfig, Template, Tuple, TupleField, TupleSpace, TupleSpaceError,
    TupleSpaceResult,
};
