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
//! # User error
use thiserror::Error;

use crate::storage::StorageError;

/// User provider error.
#[derive(Error, Debug)]
pub enum UserProviderError {
    /// Issuer not found.
    #[error("issuer {0} not found")]
    IssuerNotFound(String),

    /// Storage error.
    #[error(transparent)]
    Storage {
        /// The source of the error.
        source: StorageError,
    },

    /// User not found.
    #[error("user {0} not found")]
    UserNotFound(String),
}

impl From<StorageError> for UserProviderError {
    fn from(source: StorageError) -> Self {
        match source {
            StorageError::IssuerNotFound(id) => Self::IssuerNotFound(id),
            StorageError::UserNotFound(id) => Self::UserNotFound(id),
            other => Self::Storage { source: other },
        }
    }
}
