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
//! # Group error
use thiserror::Error;

use crate::relationship::RelationshipError;
use crate::storage::StorageError;

/// Group provider error.
#[derive(Error, Debug)]
pub enum GroupProviderError {
    /// Group not found.
    #[error("group {0} not found")]
    GroupNotFound(String),

    /// Group still has members.
    #[error("group {0} is not empty")]
    GroupNotEmpty(String),

    /// Invalid member identifier.
    #[error(transparent)]
    InvalidMember {
        /// The source of the error.
        source: RelationshipError,
    },

    /// Member not found.
    #[error("member {member_id} of the group {group_id} not found")]
    MemberNotFound { group_id: String, member_id: String },

    /// Group name is already used by the owner.
    #[error("group name {0} is already in use")]
    NameConflict(String),

    /// Relationship publication failed.
    #[error("publishing relationship events failed")]
    Relationship {
        /// The source of the error.
        #[from]
        source: RelationshipError,
    },

    /// Storage error.
    #[error(transparent)]
    Storage {
        /// The source of the error.
        source: StorageError,
    },
}

impl From<StorageError> for GroupProviderError {
    fn from(source: StorageError) -> Self {
        match source {
            StorageError::GroupNotFound(id) => Self::GroupNotFound(id),
            StorageError::GroupNotEmpty(id) => Self::GroupNotEmpty(id),
            StorageError::MemberNotFound {
                group_id,
                member_id,
            } => Self::MemberNotFound {
                group_id,
                member_id,
            },
            StorageError::NameConflict(name) => Self::NameConflict(name),
            other => Self::Storage { source: other },
        }
    }
}
