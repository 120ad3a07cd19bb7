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

//! Linda-style tuplespace coordination
//!
//! A shared associative memory: independent workers insert immutable tuples
//! and retrieve them with templates that pin each position to an exact value
//! or to a value type.
//!
//! ## Operations
//! - `write` adds a tuple (never blocks)
//! - `take` / `read` wait for a match (`take` removes it)
//! - `try_take` / `try_read` answer immediately, `None` on a miss
//! - `take_all` / `read_all` return every current match, weakly consistent
//! - `event_register` installs a fire-once callback, run off the writer's path
//!
//! ## Example
//! ```rust
//! use linda_tuplespace::{template, tuple, FieldType, TupleSpace};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), linda_tuplespace::TupleSpaceError> {
//! let space = TupleSpace::new();
//! space.write(tuple!(5i64, "x"))?;
//!
//! let found = space.take(template!(5i64, FieldType::String)).await?;
//! assert_eq!(found, tuple!(5i64, "x"));
//! assert!(space.try_take(template!(5i64, FieldType::String))?.is_none());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod events;
pub mod provider;
pub mod space;
pub mod store;
pub mod template;
pub mod tuple;
pub mod wait;

// Re-export main types
pub use config::SpaceConfig;
pub use error::{TupleSpaceError, TupleSpaceResult};
pub use events::{Callback, EventMode, EventTiming};
pub use provider::{Linda, SharedLinda};
pub use space::{TupleSpace, TupleSpaceStats};
pub use template::{matches, Matcher, Template};
pub use tuple::{FieldType, OrderedFloat, Tuple, TupleField};
