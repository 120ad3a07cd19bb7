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

//! The `Linda` trait: the coordination surface applications program against.
//!
//! ## Purpose
//! Application protocols (such as the distributed search in `linda-search`)
//! and remote transports depend on this trait rather than on the engine, so
//! a proxy that marshals calls to another process can stand in for a local
//! [`TupleSpace`]. Transport failures are the proxy's business and are not
//! part of [`TupleSpaceError`].
//!
//! ## Example
//! ```rust,no_run
//! use linda_tuplespace::provider::{Linda, SharedLinda};
//! use linda_tuplespace::{template, tuple, FieldType, TupleSpace};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let linda: SharedLinda = Arc::new(TupleSpace::new());
//! linda.write(tuple!("ping", 1i64)).await?;
//! let pong = linda.take(template!("ping", FieldType::Integer)).await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::events::{Callback, EventMode, EventTiming};
use crate::{Template, Tuple, TupleSpace, TupleSpaceResult};

/// Linda coordination operations
#[async_trait]
pub trait Linda: Send + Sync {
    /// Add a tuple to the space
    async fn write(&self, tuple: Tuple) -> TupleSpaceResult<()>;

    /// Remove and return a matching tuple; waits until one exists
    async fn take(&self, template: Template) -> TupleSpaceResult<Tuple>;

    /// Return a matching tuple, leaving it in place; waits until one exists
    async fn read(&self, template: Template) -> TupleSpaceResult<Tuple>;

    /// Remove and return a matching tuple, `None` if there is none right now
    async fn try_take(&self, template: Template) -> TupleSpaceResult<Option<Tuple>>;

    /// Return a matching tuple, `None` if there is none right now
    async fn try_read(&self, template: Template) -> TupleSpaceResult<Option<Tuple>>;

    /// Remove and return all matching tuples (never waits)
    async fn take_all(&self, template: Template) -> TupleSpaceResult<Vec<Tuple>>;

    /// Return all matching tuples (never waits)
    async fn read_all(&self, template: Template) -> TupleSpaceResult<Vec<Tuple>>;

    /// Register a fire-once callback
    async fn event_register(
        &self,
        mode: EventMode,
        timing: EventTiming,
        template: Template,
        callback: Callback,
    ) -> TupleSpaceResult<()>;

    /// `take` that gives up after `timeout`, returning `None`
    async fn take_timeout(
        &self,
        template: Template,
        timeout: Duration,
    ) -> TupleSpaceResult<Option<Tuple>> {
        match tokio::time::timeout(timeout, self.take(template)).await {
            Ok(result) => result.map(Some),
            Err(_) => Ok(None),
        }
    }

    /// `read` that gives up after `timeout`, returning `None`
    async fn read_timeout(
        &self,
        template: Template,
        timeout: Duration,
    ) -> TupleSpaceResult<Option<Tuple>> {
        match tokio::time::timeout(timeout, self.read(template)).await {
            Ok(result) => result.map(Some),
            Err(_) => Ok(None),
        }
    }
}

/// Type alias for Arc-wrapped spaces (for sharing across tasks)
pub type SharedLinda = Arc<dyn Linda>;

#[async_trait]
impl Linda for TupleSpace {
    async fn write(&self, tuple: Tuple) -> TupleSpaceResult<()> {
        TupleSpace::write(self, tuple)
    }

    async fn take(&self, template: Template) -> TupleSpaceResult<Tuple> {
        TupleSpace::take(self, template).await
    }

    async fn read(&self, template: Template) -> TupleSpaceResult<Tuple> {
        TupleSpace::read(self, template).await
    }

    async fn try_take(&self, template: Template) -> TupleSpaceResult<Option<Tuple>> {
        TupleSpace::try_take(self, template)
    }

    async fn try_read(&self, template: Template) -> TupleSpaceResult<Option<Tuple>> {
        TupleSpace::try_read(self, template)
    }

    async fn take_all(&self, template: Template) -> TupleSpaceResult<Vec<Tuple>> {
        TupleSpace::take_all(self, template)
    }

    async fn read_all(&self, template: Template) -> TupleSpaceResult<Vec<Tuple>> {
        TupleSpace::read_all(self, template)
    }

    async fn event_register(
        &self,
        mode: EventMode,
        timing: EventTiming,
        template: Template,
        callback: Callback,
    ) -> TupleSpaceResult<()> {
        TupleSpace::event_register(self, mode, timing, template, callback)
    }

    async fn take_timeout(
        &self,
        template: Template,
        timeout: Duration,
    ) -> TupleSpaceResult<Option<Tuple>> {
        TupleSpace::take_timeout(self, template, timeout).await
    }

    async fn read_timeout(
        &self,
        template: Template,
        timeout: Duration,
    ) -> TupleSpaceResult<Option<Tuple>> {
        TupleSpace::read_timeout(self, template, timeout).await
    }
}
