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
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::BuilderError;

/// Group of subjects owned by a tenant.
#[derive(Builder, Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[builder(build_fn(error = "BuilderError"))]
#[builder(setter(strip_option, into))]
pub struct Group {
    /// Group ID.
    pub id: String,

    /// Tenant owning the group.
    pub owner_id: String,

    /// Group name, unique per owner.
    pub name: String,

    #[builder(default)]
    pub description: Option<String>,
}

/// New group.
#[derive(Builder, Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[builder(build_fn(error = "BuilderError"))]
#[builder(setter(strip_option, into))]
pub struct GroupCreate {
    /// Optional group ID. Generated when absent.
    #[builder(default)]
    pub id: Option<String>,

    pub owner_id: String,

    pub name: String,

    #[builder(default)]
    pub description: Option<String>,
}

/// Group update.
#[derive(Builder, Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[builder(build_fn(error = "BuilderError"))]
#[builder(setter(strip_option, into))]
pub struct GroupUpdate {
    #[builder(default)]
    pub name: Option<String>,

    #[builder(default)]
    pub description: Option<String>,
}

impl GroupUpdate {
    /// Apply the update to the group.
    pub fn apply_to(&self, group: &mut Group) {
        if let Some(val) = &self.name {
            group.name.clone_from(val);
        }
        if let Some(val) = &self.description {
            group.description = Some(val.clone());
        }
    }
}

/// Effective change of the group membership.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct MembershipChange {
    /// Members that were not present before.
    pub added: Vec<String>,
    /// Members that are no longer present.
    pub removed: Vec<String>,
}

impl MembershipChange {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}
