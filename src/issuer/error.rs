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
//! # Issuer error
use thiserror::Error;

use crate::expression::{EvalError, ParseError};
use crate::storage::StorageError;

/// Issuer provider error.
#[derive(Error, Debug)]
pub enum IssuerProviderError {
    /// Claim mapping or condition does not compile.
    #[error("expression '{name}' does not compile: {source}")]
    ExpressionParse {
        /// Mapped claim name or `claim_conditions`.
        name: String,
        /// The source of the error.
        source: ParseError,
    },

    /// Claim mapping or condition failed to evaluate.
    #[error("expression '{name}' failed: {source}")]
    ExpressionEval {
        /// Mapped claim name or `claim_conditions`.
        name: String,
        /// The source of the error.
        source: EvalError,
    },

    /// Invalid issuer attribute.
    #[error("invalid issuer: {0}")]
    InvalidIssuer(String),

    /// Issuer not found.
    #[error("issuer {0} not found")]
    IssuerNotFound(String),

    /// The subject token misses the claim required for the mapping.
    #[error("subject token is missing the '{claim}' claim")]
    MissingClaim { claim: String },

    /// Issuer URI is already registered.
    #[error("issuer uri {0} is already registered")]
    UriConflict(String),

    /// Storage error.
    #[error(transparent)]
    Storage {
        /// The source of the error.
        source: StorageError,
    },
}

impl From<StorageError> for IssuerProviderError {
    fn from(source: StorageError) -> Self {
        match source {
            StorageError::IssuerNotFound(id) => Self::IssuerNotFound(id),
            StorageError::NameConflict(uri) => Self::UriConflict(uri),
            other => Self::Storage { source: other },
        }
    }
}
