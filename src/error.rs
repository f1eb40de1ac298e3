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
//! # Error
//!
//! Diverse errors that can occur during the service processing (not the API).
use sea_orm::SqlErr;
use thiserror::Error;

use crate::group::GroupProviderError;
use crate::issuer::IssuerProviderError;
use crate::keys::KeyProviderError;
use crate::oauth_client::OAuthClientProviderError;
use crate::policy::PolicyError;
use crate::relationship::RelationshipError;
use crate::storage::StorageError;
use crate::token_exchange::TokenExchangeError;
use crate::user::UserProviderError;

/// Service error.
#[derive(Debug, Error)]
pub enum StsError {
    #[error(transparent)]
    Group {
        #[from]
        source: GroupProviderError,
    },

    #[error(transparent)]
    IO {
        #[from]
        source: std::io::Error,
    },

    #[error(transparent)]
    Issuer {
        #[from]
        source: IssuerProviderError,
    },

    /// Json serialization error.
    #[error("json serde error: {}", source)]
    JsonError {
        /// The source of the error.
        #[from]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Keys {
        #[from]
        source: KeyProviderError,
    },

    #[error(transparent)]
    OAuthClient {
        #[from]
        source: OAuthClientProviderError,
    },

    #[error(transparent)]
    Policy {
        #[from]
        source: PolicyError,
    },

    /// Policy engine is not configured.
    #[error("policy enforcement is requested, but no policy engine url is configured")]
    PolicyEnforcementNotAvailable,

    #[error(transparent)]
    Relationship {
        #[from]
        source: RelationshipError,
    },

    #[error(transparent)]
    Storage {
        #[from]
        source: StorageError,
    },

    #[error(transparent)]
    TokenExchange {
        #[from]
        source: TokenExchangeError,
    },

    #[error(transparent)]
    User {
        #[from]
        source: UserProviderError,
    },

    /// Url parsing error
    #[error(transparent)]
    UrlParse {
        #[from]
        source: url::ParseError,
    },
}

/// Database error with the context of the operation.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Conflict
    #[error("{message}")]
    Conflict { message: String, context: String },

    /// SqlError
    #[error("{message}")]
    Sql { message: String, context: String },

    /// Database error
    #[error("Database error while {context}")]
    Database {
        source: sea_orm::DbErr,
        context: String,
    },
}

/// Convert the DB error into the [DatabaseError] with the context
/// information.
pub fn db_err(e: sea_orm::DbErr, context: &str) -> DatabaseError {
    e.sql_err().map_or_else(
        || DatabaseError::Database {
            source: e,
            context: context.to_string(),
        },
        |err| match err {
            SqlErr::UniqueConstraintViolation(descr) => DatabaseError::Conflict {
                message: descr.to_string(),
                context: context.to_string(),
            },
            SqlErr::ForeignKeyConstraintViolation(descr) => DatabaseError::Conflict {
                message: descr.to_string(),
                context: context.to_string(),
            },
            other => DatabaseError::Sql {
                message: other.to_string(),
                context: context.to_string(),
            },
        },
    )
}

/// Attach the operation context to the database results.
pub trait DbContextExt<T> {
    fn context(self, context: &str) -> Result<T, DatabaseError>;
}

impl<T> DbContextExt<T> for Result<T, sea_orm::DbErr> {
    fn context(self, context: &str) -> Result<T, DatabaseError> {
        self.map_err(|e| db_err(e, context))
    }
}

/// Builder error.
///
/// A wrapper error that is used instead of the error generated by the
/// `derive_builder`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BuilderError {
    /// Uninitialized field.
    #[error("{0}")]
    UninitializedField(String),
    /// Custom validation error.
    #[error("{0}")]
    Validation(String),
}

impl From<String> for BuilderError {
    fn from(s: String) -> Self {
        Self::Validation(s)
    }
}

impl From<derive_builder::UninitializedFieldError> for BuilderError {
    fn from(ufe: derive_builder::UninitializedFieldError) -> Self {
        Self::UninitializedField(ufe.to_string())
    }
}
