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
//! User API types.
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::pagination::Page;
use crate::user::types;

/// External identity observed through the issuer.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize, ToSchema)]
pub struct UserInfo {
    pub id: String,

    /// Issuer the identity comes from.
    pub issuer_id: String,

    /// The `sub` claim of the identity at the issuer.
    pub subject: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// User response.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, ToSchema)]
pub struct UserInfoResponse {
    pub user: UserInfo,
}

/// User data keyed by the subject.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize, ToSchema, Validate)]
pub struct UserInfoUpsert {
    #[validate(length(min = 1, max = 255))]
    pub subject: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(nullable = false)]
    #[validate(length(max = 255))]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(nullable = false)]
    #[validate(email, length(max = 255))]
    pub email: Option<String>,
}

/// User upsert request.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, ToSchema, Validate)]
pub struct UserInfoUpsertRequest {
    #[validate(nested)]
    pub user: UserInfoUpsert,
}

/// Page of users.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize, ToSchema)]
pub struct UserInfoList {
    pub users: Vec<UserInfo>,

    /// Cursor of the following page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

impl From<types::UserInfo> for UserInfo {
    fn from(value: types::UserInfo) -> Self {
        Self {
            id: value.id,
            issuer_id: value.issuer_id,
            subject: value.subject,
            name: value.name,
            email: value.email,
        }
    }
}

impl UserInfoUpsertRequest {
    /// Provider input for the users of the issuer.
    pub fn into_create<S: Into<String>>(self, issuer_id: S) -> types::UserInfoCreate {
        types::UserInfoCreate {
            issuer_id: issuer_id.into(),
            subject: self.user.subject,
            name: self.user.name,
            email: self.user.email,
        }
    }
}

impl From<Page<types::UserInfo>> for UserInfoList {
    fn from(value: Page<types::UserInfo>) -> Self {
        let page = value.map(UserInfo::from);
        Self {
            users: page.items,
            next: page.next.map(|x| x.to_string()),
        }
    }
}

impl IntoResponse for types::UserInfo {
    fn into_response(self) -> Response {
        (
            StatusCode::OK,
            Json(UserInfoResponse {
                user: UserInfo::from(self),
            }),
        )
            .into_response()
    }
}

impl IntoResponse for UserInfoList {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}
