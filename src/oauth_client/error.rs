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
//! # OAuth client error
use thiserror::Error;

use crate::storage::StorageError;

/// OAuth client provider error.
#[derive(Error, Debug)]
pub enum OAuthClientProviderError {
    /// Hashing or verifying the secret failed.
    #[error("secret hashing error: {0}")]
    Hashing(#[from] bcrypt::BcryptError),

    /// Client ID or secret mismatch.
    #[error("invalid client credentials")]
    InvalidCredentials,

    /// Client not found.
    #[error("oauth client {0} not found")]
    OAuthClientNotFound(String),

    /// Storage error.
    #[error(transparent)]
    Storage {
        /// The source of the error.
        source: StorageError,
    },

    /// Hashing task failed.
    #[error("secret hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<StorageError> for OAuthClientProviderError {
    fn from(source: StorageError) -> Self {
        match source {
            StorageError::OAuthClientNotFound(id) => Self::OAuthClientNotFound(id),
            other => Self::Storage { source: other },
        }
    }
}
