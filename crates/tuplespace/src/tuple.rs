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

//! Tuple model: immutable ordered records of runtime-tagged fields.
//!
//! Every [`TupleField`] carries its own [`FieldType`] tag so that templates can
//! constrain a position by type without knowing the value. Tuples compare by
//! value, but the store treats each written instance as a distinct entry.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use ulid::Ulid;

/// A tuple in the space
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tuple {
    /// Tuple fields
    fields: Vec<TupleField>,
}

impl Tuple {
    /// Create a new tuple from fields
    pub fn new(fields: Vec<TupleField>) -> Self {
        Tuple { fields }
    }

    /// Get the fields of the tuple
    pub fn fields(&self) -> &[TupleField] {
        &self.fields
    }

    /// Field at `index`, if any
    pub fn get(&self, index: usize) -> Option<&TupleField> {
        self.fields.get(index)
    }

    /// Number of fields
    pub fn arity(&self) -> usize {
        self.fields.len()
    }

    /// Copy of this tuple with the field at `index` replaced.
    ///
    /// Tuples are immutable once written; this is how a caller derives an
    /// updated tuple to write back (e.g. bumping a counter field).
    /// Returns `None` when `index` is out of range.
    pub fn with_field(&self, index: usize, field: impl Into<TupleField>) -> Option<Tuple> {
        if index >= self.fields.len() {
            return None;
        }
        let mut fields = self.fields.clone();
        fields[index] = field.into();
        Some(Tuple { fields })
    }

    /// Consume the tuple, returning its fields
    pub fn into_fields(self) -> Vec<TupleField> {
        self.fields
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", field)?;
        }
        write!(f, "]")
    }
}

/// Field in a tuple
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub enum TupleField {
    /// Integer value
    Integer(i64),
    /// String value
    String(String),
    /// Boolean value
    Boolean(bool),
    /// Binary data
    Binary(Vec<u8>),
    /// Floating point
    Float(OrderedFloat),
    /// Unique identifier (request correlation and the like)
    Id(Ulid),
    /// Null value
    Null,
}

impl TupleField {
    /// Runtime type tag of this value
    pub fn field_type(&self) -> FieldType {
        match self {
            TupleField::Integer(_) => FieldType::Integer,
            TupleField::String(_) => FieldType::String,
            TupleField::Boolean(_) => FieldType::Boolean,
            TupleField::Binary(_) => FieldType::Binary,
            TupleField::Float(_) => FieldType::Float,
            TupleField::Id(_) => FieldType::Id,
            TupleField::Null => FieldType::Null,
        }
    }

    /// Integer payload, if this is an integer field
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            TupleField::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// String payload, if this is a string field
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TupleField::String(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Identifier payload, if this is an id field
    pub fn as_id(&self) -> Option<Ulid> {
        match self {
            TupleField::Id(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for TupleField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TupleField::Integer(v) => write!(f, "{}", v),
            TupleField::String(v) => write!(f, "{:?}", v),
            TupleField::Boolean(v) => write!(f, "{}", v),
            TupleField::Binary(v) => write!(f, "<{} bytes>", v.len()),
            TupleField::Float(v) => write!(f, "{}", v.get()),
            TupleField::Id(v) => write!(f, "{}", v),
            TupleField::Null => write!(f, "null"),
        }
    }
}

/// Ordered float for hashing
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrderedFloat(f64);

impl OrderedFloat {
    /// Create a new OrderedFloat from a float value
    pub fn new(value: f64) -> Self {
        OrderedFloat(value)
    }

    /// Get the inner float value
    pub fn get(&self) -> f64 {
        self.0
    }

    /// Whether the wrapped value is NaN
    pub fn is_nan(&self) -> bool {
        self.0.is_nan()
    }
}

impl PartialEq for OrderedFloat {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for OrderedFloat {}

impl PartialOrd for OrderedFloat {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedFloat {
    fn cmp(&self, other: &Self) -> Ordering {
        // NaN sorts after every number
        match (self.0.is_nan(), other.0.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => self.0.total_cmp(&other.0),
        }
    }
}

impl std::hash::Hash for OrderedFloat {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

/// Runtime type of a tuple field, as used by `TYPE` matchers.
///
/// `Number` and `Any` are supertypes: they are never the tag of a concrete
/// value, only targets a value can be assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FieldType {
    /// Integer type
    Integer,
    /// String type
    String,
    /// Boolean type
    Boolean,
    /// Binary data type
    Binary,
    /// Floating point type
    Float,
    /// Identifier type
    Id,
    /// Null/empty type
    Null,
    /// Integer or Float
    Number,
    /// Any value
    Any,
}

impl FieldType {
    /// Whether a value tagged `value_type` may be assigned to `self`
    pub fn is_assignable_from(self, value_type: FieldType) -> bool {
        match self {
            FieldType::Any => true,
            FieldType::Number => matches!(value_type, FieldType::Integer | FieldType::Float),
            exact => exact == value_type,
        }
    }
}

/// Build a [`Tuple`] from values convertible into [`TupleField`]
///
/// # Examples
/// ```
/// # use linda_tuplespace::{tuple, Tuple, TupleField};
/// let t = tuple!(5i64, "x", true);
/// assert_eq!(t.arity(), 3);
/// ```
#[macro_export]
macro_rules! tuple {
    ($($field:expr),* $(,)?) => {
        $crate::Tuple::new(vec![$($crate::TupleField::from($field)),*])
    };
}

// Conversion traits
impl From<i64> for TupleField {
    fn from(val: i64) -> Self {
        TupleField::Integer(val)
    }
}

impl From<i32> for TupleField {
    fn from(val: i32) -> Self {
        TupleField::Integer(val as i64)
    }
}

impl From<usize> for TupleField {
    fn from(val: usize) -> Self {
        TupleField::Integer(val as i64)
    }
}

impl From<String> for TupleField {
    fn from(val: String) -> Self {
        TupleField::String(val)
    }
}

impl From<&str> for TupleField {
    fn from(val: &str) -> Self {
        TupleField::String(val.to_string())
    }
}

impl From<bool> for TupleField {
    fn from(val: bool) -> Self {
        TupleField::Boolean(val)
    }
}

impl From<Vec<u8>> for TupleField {
    fn from(val: Vec<u8>) -> Self {
        TupleField::Binary(val)
    }
}

impl From<f64> for TupleField {
    fn from(val: f64) -> Self {
        TupleField::Float(OrderedFloat(val))
    }
}

impl From<Ulid> for TupleField {
    fn from(val: Ulid) -> Self {
        TupleField::Id(val)
    }
}
