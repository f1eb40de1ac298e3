// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0
//! # Cursor based pagination
//!
//! Collections are ordered ascending by a unique and immutable key. The cursor
//! carries the key of the last returned entry and the next page starts
//! strictly after it, so no entry is skipped or returned twice.
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use sea_orm::{ColumnTrait, Condition};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use utoipa::ToSchema;

/// Page size used when the client does not ask for one.
pub const DEFAULT_LIMIT: u64 = 10;
/// Largest page size.
pub const MAX_LIMIT: u64 = 100;

#[derive(Error, Debug, PartialEq)]
pub enum PaginationError {
    /// The cursor is malformed or refers to the field the collection is not
    /// sorted by.
    #[error("invalid cursor: {0}")]
    InvalidCursor(String),
}

/// Opaque continuation token.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ToSchema)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    /// Encode the sort key fields.
    pub fn encode(fields: &BTreeMap<String, String>) -> Result<Self, PaginationError> {
        let query = serde_urlencoded::to_string(fields)
            .map_err(|e| PaginationError::InvalidCursor(e.to_string()))?;
        Ok(Self(URL_SAFE_NO_PAD.encode(query)))
    }

    /// Decode the cursor accepting only the fields from the `allowed` list.
    pub fn decode(&self, allowed: &[&str]) -> Result<BTreeMap<String, String>, PaginationError> {
        let raw = URL_SAFE_NO_PAD
            .decode(&self.0)
            .map_err(|_| PaginationError::InvalidCursor("not base64 encoded".into()))?;
        let query = String::from_utf8(raw)
            .map_err(|_| PaginationError::InvalidCursor("not utf-8 encoded".into()))?;
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(&query)
            .map_err(|_| PaginationError::InvalidCursor("not form encoded".into()))?;
        let mut fields = BTreeMap::new();
        for (key, val) in pairs {
            if !allowed.contains(&key.as_str()) {
                return Err(PaginationError::InvalidCursor(format!(
                    "field '{key}' is not sortable"
                )));
            }
            fields.insert(key, val);
        }
        Ok(fields)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Cursor {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Cursor {
    fn from(value: &str) -> Self {
        Self(value.into())
    }
}

/// Effective page size for the requested one.
///
/// Values below 1 (and a missing value) fall back to [`DEFAULT_LIMIT`], values
/// above [`MAX_LIMIT`] are capped.
pub fn limit(requested: Option<i64>) -> u64 {
    match requested {
        Some(val) if val > 0 => (val as u64).min(MAX_LIMIT),
        _ => DEFAULT_LIMIT,
    }
}

/// Pagination parameters of the list call.
#[derive(Clone, Debug, PartialEq)]
pub struct PageRequest {
    pub cursor: Option<Cursor>,
    pub limit: u64,
}

impl PageRequest {
    pub fn new(cursor: Option<Cursor>, requested_limit: Option<i64>) -> Self {
        Self {
            cursor,
            limit: limit(requested_limit),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Continuation predicate `(f1, .., fn) > (v1, .., vn)`.
#[derive(Clone, Debug, PartialEq)]
pub struct RangePredicate {
    fields: Vec<(String, String)>,
}

impl RangePredicate {
    /// Build the predicate from the cursor. The cursor must carry every field
    /// of the sort key listed in `allowed`; the predicate keeps that order.
    pub fn from_cursor(cursor: &Cursor, allowed: &[&str]) -> Result<Self, PaginationError> {
        let mut decoded = cursor.decode(allowed)?;
        let fields = allowed
            .iter()
            .map(|name| {
                decoded
                    .remove(*name)
                    .map(|val| (name.to_string(), val))
                    .ok_or_else(|| {
                        PaginationError::InvalidCursor(format!("field '{name}' is missing"))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { fields })
    }

    /// Cursor values in the sort key order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(_, val)| val.as_str())
    }

    /// Render the predicate as SQL with positional `$n` parameters starting
    /// after `param_offset`.
    pub fn to_sql(&self, param_offset: usize) -> (String, Vec<String>) {
        let columns = self
            .fields
            .iter()
            .map(|(name, _)| format!("\"{name}\""))
            .collect::<Vec<_>>();
        let params = (1..=self.fields.len())
            .map(|idx| format!("${}", param_offset + idx))
            .collect::<Vec<_>>();
        let clause = if self.fields.len() == 1 {
            format!("{} > {}", columns.join(", "), params.join(", "))
        } else {
            format!("({}) > ({})", columns.join(", "), params.join(", "))
        };
        (clause, self.values().map(Into::into).collect())
    }

    /// Lexicographic comparison as a query condition. `columns` follow the
    /// sort key order.
    pub fn condition<C: ColumnTrait>(&self, columns: &[C]) -> Condition {
        let mut any = Condition::any();
        for (idx, column) in columns.iter().enumerate().take(self.fields.len()) {
            let mut all = Condition::all();
            for (prev, (_, val)) in columns.iter().zip(self.fields.iter()).take(idx) {
                all = all.add(prev.eq(val.clone()));
            }
            all = all.add(column.gt(self.fields[idx].1.clone()));
            any = any.add(all);
        }
        any
    }
}

/// Single page of the collection.
#[derive(Clone, Debug, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Cursor of the following page, set only when the page is full.
    pub next: Option<Cursor>,
}

impl<T> Page<T> {
    /// Wrap the fetched entries. `key` returns the sort key of the entry.
    pub fn new<F>(items: Vec<T>, limit: u64, key: F) -> Result<Self, PaginationError>
    where
        F: Fn(&T) -> BTreeMap<String, String>,
    {
        let next = match items.last() {
            Some(last) if items.len() as u64 == limit => Some(Cursor::encode(&key(last))?),
            _ => None,
        };
        Ok(Self { items, next })
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next: self.next,
        }
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            next: None,
        }
    }
}

/// Sort key consisting of the `id` only.
pub fn id_key<S: Into<String>>(id: S) -> BTreeMap<String, String> {
    BTreeMap::from([("id".to_string(), id.into())])
}
