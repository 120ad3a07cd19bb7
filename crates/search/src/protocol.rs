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


//! Tuple conventions shared by the search manager and its searchers.
//!
//! Every tuple starts with a [`Code`] string naming its role:
//!
//! | Tuple                                        | Written by |
//! |----------------------------------------------|------------|
//! | `("request", id, query, searchers)`          | manager, re-published by searchers |
//! | `("value", id, candidate)`                   | manager    |
//! | `("result", id, candidate, distance)`        | searcher   |
//! | `("searcher", "searching", id)`              | searcher, once per examined value |
//! | `("manager", id)`                            | manager, present while it waits |

use linda_tuplespace::{template, tuple, FieldType, Template, Tuple};
use ulid::Ulid;

use crate::SearchError;

/// Role tag in the first field of every search tuple
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Code {
    /// A search to perform
    Request,
    /// A candidate word to compare against the query
    Value,
    /// A candidate close enough to the query
    Result,
    /// Liveness signal from a searcher
    Searcher,
    /// Status of the manager owning a request
    Manager,
}

impl Code {
    /// Wire form of the code
    pub fn as_str(self) -> &'static str {
        match self {
            Code::Request => "request",
            Code::Value => "value",
            Code::Result => "result",
            Code::Searcher => "searcher",
            Code::Manager => "manager",
        }
    }
}

const SEARCHING: &str = "searching";

/// A decoded `request` tuple
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Request identifier
    pub id: Ulid,
    /// Query string
    pub query: String,
    /// Searchers already working on it
    pub searchers: i64,
}

impl Request {
    /// Encode as a tuple
    pub fn to_tuple(&self) -> Tuple {
        tuple!(Code::Request.as_str(), self.id, self.query.as_str(), self.searchers)
    }

    /// Decode a tuple matched by [`any_request`]
    pub fn from_tuple(tuple: &Tuple) -> Result<Self, SearchError> {
        let malformed = || SearchError::Protocol(format!("malformed request {tuple}"));
        Ok(Request {
            id: tuple.get(1).and_then(|f| f.as_id()).ok_or_else(malformed)?,
            query: tuple
                .get(2)
                .and_then(|f| f.as_str())
                .ok_or_else(malformed)?
                .to_string(),
            searchers: tuple.get(3).and_then(|f| f.as_integer()).ok_or_else(malformed)?,
        })
    }
}

/// Any pending request
pub fn any_request() -> Template {
    template!(
        Code::Request.as_str(),
        FieldType::Id,
        FieldType::String,
        FieldType::Integer
    )
}

/// The pending request `id`, whatever its searcher count
pub fn request_for(id: Ulid) -> Template {
    template!(Code::Request.as_str(), id, FieldType::String, FieldType::Integer)
}

/// Candidate word for request `id`
pub fn value(id: Ulid, candidate: &str) -> Tuple {
    tuple!(Code::Value.as_str(), id, candidate)
}

/// Candidates of request `id`
pub fn values_of(id: Ulid) -> Template {
    template!(Code::Value.as_str(), id, FieldType::String)
}

/// Match found for request `id`
pub fn result(id: Ulid, candidate: &str, distance: usize) -> Tuple {
    tuple!(Code::Result.as_str(), id, candidate, distance)
}

/// Matches found for request `id`
pub fn results_of(id: Ulid) -> Template {
    template!(Code::Result.as_str(), id, FieldType::String, FieldType::Integer)
}

/// Liveness signal for request `id`
pub fn searching(id: Ulid) -> Tuple {
    tuple!(Code::Searcher.as_str(), SEARCHING, id)
}

/// Liveness signals for request `id`
pub fn searching_on(id: Ulid) -> Template {
    template!(Code::Searcher.as_str(), SEARCHING, id)
}

/// Manager status for request `id`
pub fn manager(id: Ulid) -> Tuple {
    tuple!(Code::Manager.as_str(), id)
}

/// Template for the manager status of request `id`
pub fn manager_of(id: Ulid) -> Template {
    Template::exact(&manager(id))
}
