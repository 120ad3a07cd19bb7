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

//! In-memory tuple bag.
//!
//! ## Design
//! - **Storage**: one `BTreeMap<EntryId, Tuple>` per arity, so a lookup only
//!   scans tuples that could possibly match the template
//! - **Identity**: each written instance gets its own [`EntryId`]; equal tuples
//!   stay distinct, independently removable entries
//! - **Atomicity**: the store is plain data; the owning space serialises all
//!   access, which makes every find-and-remove a single step
//!
//! Callers must not rely on which candidate `find_one`/`remove_one` picks.

use std::collections::{BTreeMap, HashMap};

use crate::template::{matches, Template};
use crate::tuple::Tuple;

/// Store-assigned identity of one written tuple instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u64);

/// Bag of tuples
#[derive(Debug, Default)]
pub struct TupleStore {
    buckets: HashMap<usize, BTreeMap<EntryId, Tuple>>,
    next_id: u64,
    len: usize,
}

impl TupleStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tuple instance to the bag
    pub fn insert(&mut self, tuple: Tuple) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        self.buckets.entry(tuple.arity()).or_default().insert(id, tuple);
        self.len += 1;
        id
    }

    /// Some tuple matching `template`, left in place
    pub fn find_one(&self, template: &Template) -> Option<&Tuple> {
        self.buckets
            .get(&template.arity())?
            .values()
            .find(|tuple| matches(template, tuple))
    }

    /// Find a matching tuple and remove it in the same step
    pub fn remove_one(&mut self, template: &Template) -> Option<Tuple> {
        let bucket = self.buckets.get_mut(&template.arity())?;
        let id = bucket
            .iter()
            .find(|(_, tuple)| matches(template, tuple))
            .map(|(id, _)| *id)?;
        let tuple = bucket.remove(&id)?;
        self.len -= 1;
        Some(tuple)
    }

    /// Copies of every tuple matching `template`
    pub fn find_all(&self, template: &Template) -> Vec<Tuple> {
        self.buckets
            .get(&template.arity())
            .map(|bucket| {
                bucket
                    .values()
                    .filter(|tuple| matches(template, tuple))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Remove and return every tuple matching `template`
    pub fn remove_all(&mut self, template: &Template) -> Vec<Tuple> {
        let Some(bucket) = self.buckets.get_mut(&template.arity()) else {
            return Vec::new();
        };

        let ids: Vec<EntryId> = bucket
            .iter()
            .filter(|(_, tuple)| matches(template, tuple))
            .map(|(id, _)| *id)
            .collect();

        let taken: Vec<Tuple> = ids.iter().filter_map(|id| bucket.remove(id)).collect();
        self.len -= taken.len();
        taken
    }

    /// Number of stored tuples
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the bag is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drop every tuple
    pub fn clear(&mut self) {
        self.buckets.clear();
        self.len = 0;
    }
}
