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
//! # Storage error
use thiserror::Error;

use crate::error::DatabaseError;
use crate::pagination::PaginationError;

/// Storage engine error.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Database error.
    #[error(transparent)]
    Database {
        /// The source of the error.
        #[from]
        source: DatabaseError,
    },

    /// Group not found.
    #[error("group {0} not found")]
    GroupNotFound(String),

    /// Group cannot be deleted while it has members.
    #[error("group {0} is not empty")]
    GroupNotEmpty(String),

    /// Invalid `AS OF SYSTEM TIME` hint.
    #[error("invalid as of system time hint: {0}")]
    InvalidAsOfSystemTime(String),

    /// Issuer not found.
    #[error("issuer {0} not found")]
    IssuerNotFound(String),

    /// Json serialization error of the stored claim mappings.
    #[error("json serde error: {}", source)]
    Json {
        /// The source of the error.
        #[from]
        source: serde_json::Error,
    },

    /// Member not found.
    #[error("member {member_id} of the group {group_id} not found")]
    MemberNotFound { group_id: String, member_id: String },

    /// Unique name (or issuer uri) is already in use.
    #[error("{0} is already in use")]
    NameConflict(String),

    /// OAuth client not found.
    #[error("oauth client {0} not found")]
    OAuthClientNotFound(String),

    /// Pagination error.
    #[error(transparent)]
    Pagination {
        /// The source of the error.
        #[from]
        source: PaginationError,
    },

    /// Seed data is invalid.
    #[error("invalid seed data: {0}")]
    Seed(String),

    /// Transaction lifecycle misuse.
    #[error("transaction error: {0}")]
    Transaction(String),

    /// User not found.
    #[error("user {0} not found")]
    UserNotFound(String),
}

impl StorageError {
    /// Map the unique constraint violation to the [`StorageError::NameConflict`].
    pub(crate) fn conflict_on<S: Into<String>>(name: S) -> impl FnOnce(DatabaseError) -> Self {
        let name = name.into();
        move |err| match err {
            DatabaseError::Conflict { .. } => Self::NameConflict(name),
            other => Self::Database { source: other },
        }
    }
}
