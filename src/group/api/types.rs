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
//! Group API types.
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::group::types;
use crate::pagination::Page;

/// Group of the tenant.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize, ToSchema)]
pub struct Group {
    pub id: String,

    /// Tenant owning the group.
    pub owner_id: String,

    /// Group name, unique per owner.
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Group response.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, ToSchema)]
pub struct GroupResponse {
    pub group: Group,
}

/// New group data.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize, ToSchema, Validate)]
pub struct GroupCreate {
    /// Optional group ID. Generated when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(nullable = false)]
    #[validate(length(min = 1, max = 64))]
    pub id: Option<String>,

    #[validate(length(min = 1, max = 64))]
    pub owner_id: String,

    #[validate(length(min = 1, max = 255))]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(nullable = false)]
    #[validate(length(max = 1024))]
    pub description: Option<String>,
}

/// Group create request.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, ToSchema, Validate)]
pub struct GroupCreateRequest {
    #[validate(nested)]
    pub group: GroupCreate,
}

/// Group changes.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize, ToSchema, Validate)]
pub struct GroupUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 1024))]
    pub description: Option<String>,
}

/// Group update request.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, ToSchema, Validate)]
pub struct GroupUpdateRequest {
    #[validate(nested)]
    pub group: GroupUpdate,
}

/// Page of groups.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize, ToSchema)]
pub struct GroupList {
    pub groups: Vec<Group>,

    /// Cursor of the following page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

/// Members to add, or the complete membership to converge to.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize, ToSchema, Validate)]
pub struct MembersRequest {
    /// Prefixed member identifiers (`user:<id>`).
    #[validate(length(max = 1000))]
    pub members: Vec<String>,
}

/// Page of group members.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize, ToSchema)]
pub struct MemberList {
    pub members: Vec<String>,

    /// Cursor of the following page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

/// Effective change of the membership.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize, ToSchema)]
pub struct MembershipChange {
    /// Members that were not present before.
    pub added: Vec<String>,
    /// Members that are no longer present.
    pub removed: Vec<String>,
}

impl From<types::Group> for Group {
    fn from(value: types::Group) -> Self {
        Self {
            id: value.id,
            owner_id: value.owner_id,
            name: value.name,
            description: value.description,
        }
    }
}

impl From<GroupCreateRequest> for types::GroupCreate {
    fn from(value: GroupCreateRequest) -> Self {
        Self {
            id: value.group.id,
            owner_id: value.group.owner_id,
            name: value.group.name,
            description: value.group.description,
        }
    }
}

impl From<GroupUpdateRequest> for types::GroupUpdate {
    fn from(value: GroupUpdateRequest) -> Self {
        Self {
            name: value.group.name,
            description: value.group.description,
        }
    }
}

impl From<Page<types::Group>> for GroupList {
    fn from(value: Page<types::Group>) -> Self {
        let page = value.map(Group::from);
        Self {
            groups: page.items,
            next: page.next.map(|x| x.to_string()),
        }
    }
}

impl From<Page<String>> for MemberList {
    fn from(value: Page<String>) -> Self {
        Self {
            members: value.items,
            next: value.next.map(|x| x.to_string()),
        }
    }
}

impl From<types::MembershipChange> for MembershipChange {
    fn from(value: types::MembershipChange) -> Self {
        Self {
            added: value.added,
            removed: value.removed,
        }
    }
}

impl IntoResponse for types::Group {
    fn into_response(self) -> Response {
        (
            StatusCode::OK,
            Json(GroupResponse {
                group: Group::from(self),
            }),
        )
            .into_response()
    }
}

impl IntoResponse for GroupList {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

impl IntoResponse for MemberList {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

impl IntoResponse for MembershipChange {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}
