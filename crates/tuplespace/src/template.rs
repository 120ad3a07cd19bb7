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

//! Templates and the matching predicate.
//!
//! A [`Template`] is a transient lookup pattern: one [`Matcher`] per position,
//! each either an exact value or a type constraint. Templates are never
//! stored in the space.

use crate::config::SpaceConfig;
use crate::error::{TupleSpaceError, TupleSpaceResult};
use crate::tuple::{FieldType, Tuple, TupleField};
use serde::{Deserialize, Serialize};

/// Pattern for matching tuples
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Template {
    /// One matcher per position
    fields: Vec<Matcher>,
}

impl Template {
    /// Create a new template
    pub fn new(fields: Vec<Matcher>) -> Self {
        Template { fields }
    }

    /// Template matching exactly the values of `tuple`
    pub fn exact(tuple: &Tuple) -> Self {
        Template {
            fields: tuple.fields().iter().cloned().map(Matcher::Exact).collect(),
        }
    }

    /// Matchers of this template
    pub fn fields(&self) -> &[Matcher] {
        &self.fields
    }

    /// Number of positions
    pub fn arity(&self) -> usize {
        self.fields.len()
    }

    /// Check if a tuple matches this template
    pub fn matches(&self, tuple: &Tuple) -> bool {
        matches(self, tuple)
    }

    /// Reject templates the space could never answer meaningfully.
    pub(crate) fn validate(&self, config: &SpaceConfig) -> TupleSpaceResult<()> {
        config
            .check_arity(self.arity())
            .map_err(TupleSpaceError::MalformedTemplate)?;

        for (position, matcher) in self.fields.iter().enumerate() {
            if let Matcher::Exact(TupleField::Float(value)) = matcher {
                if value.is_nan() {
                    return Err(TupleSpaceError::MalformedTemplate(format!(
                        "exact matcher at position {} holds NaN",
                        position
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Matcher for a single template position
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Matcher {
    /// Position must hold exactly this value (same type, same value)
    Exact(TupleField),
    /// Position must hold a value whose type is assignable to this type
    Type(FieldType),
}

impl Matcher {
    /// Exact-value matcher
    pub fn exact(value: impl Into<TupleField>) -> Self {
        Matcher::Exact(value.into())
    }

    /// Type matcher
    pub fn of_type(field_type: FieldType) -> Self {
        Matcher::Type(field_type)
    }

    /// Matcher accepting any value
    pub fn any() -> Self {
        Matcher::Type(FieldType::Any)
    }

    /// Check if a field matches this matcher
    pub fn matches(&self, field: &TupleField) -> bool {
        match self {
            Matcher::Exact(expected) => field == expected,
            Matcher::Type(field_type) => field_type.is_assignable_from(field.field_type()),
        }
    }
}

impl From<FieldType> for Matcher {
    fn from(field_type: FieldType) -> Self {
        Matcher::Type(field_type)
    }
}

macro_rules! exact_matcher_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Matcher {
                fn from(value: $ty) -> Self {
                    Matcher::Exact(TupleField::from(value))
                }
            }
        )*
    };
}

exact_matcher_from!(i64, i32, usize, String, &str, bool, Vec<u8>, f64, ulid::Ulid);

impl From<TupleField> for Matcher {
    fn from(value: TupleField) -> Self {
        Matcher::Exact(value)
    }
}

/// Whether `tuple` satisfies `template`.
///
/// Arity mismatch is a plain non-match, not an error.
pub fn matches(template: &Template, tuple: &Tuple) -> bool {
    if template.fields.len() != tuple.arity() {
        return false;
    }

    template
        .fields
        .iter()
        .zip(tuple.fields().iter())
        .all(|(matcher, field)| matcher.matches(field))
}

/// Build a [`Template`] from exact values and [`FieldType`]s
///
/// # Examples
/// ```
/// # use linda_tuplespace::{template, tuple, FieldType, Matcher, Template, TupleField};
/// let t = template!(5i64, FieldType::String);
/// assert!(t.matches(&tuple!(5i64, "x")));
/// ```
#[macro_export]
macro_rules! template {
    ($($field:expr),* $(,)?) => {
        $crate::Template::new(vec![$($crate::Matcher::from($field)),*])
    };
}
