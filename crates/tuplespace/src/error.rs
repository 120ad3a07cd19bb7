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

//! Error types for tuple space operations.
//!
//! A miss is not an error: non-blocking retrievals report absence as
//! `Ok(None)` or an empty `Vec`. Transport failures belong to whatever layer
//! carries these calls between processes and have no variant here.

use thiserror::Error;

/// Result type for tuple space operations.
pub type TupleSpaceResult<T> = Result<T, TupleSpaceError>;

/// TupleSpace errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TupleSpaceError {
    /// Template rejected before any state change (caller error)
    #[error("Malformed template: {0}")]
    MalformedTemplate(String),

    /// Tuple rejected before any state change (caller error)
    #[error("Malformed tuple: {0}")]
    MalformedTuple(String),

    /// The space was shut down before or while the operation ran
    #[error("Tuple space is shut down")]
    ShutDown,

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Constructed outside a tokio runtime, so callbacks could never run
    #[error("No tokio runtime: {0}")]
    NoRuntime(String),
}

impl TupleSpaceError {
    /// Whether the error was caused by the caller's input
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            TupleSpaceError::MalformedTemplate(_) | TupleSpaceError::MalformedTuple(_)
        )
    }
}

impl From<serde_json::Error> for TupleSpaceError {
    fn from(err: serde_json::Error) -> Self {
        TupleSpaceError::InvalidConfiguration(format!("JSON error: {}", err))
    }
}

impl From<serde_yaml::Error> for TupleSpaceError {
    fn from(err: serde_yaml::Error) -> Self {
        TupleSpaceError::InvalidConfiguration(format!("YAML error: {}", err))
    }
}

impl From<toml::de::Error> for TupleSpaceError {
    fn from(err: toml::de::Error) -> Self {
        TupleSpaceError::InvalidConfiguration(format!("TOML error: {}", err))
    }
}
