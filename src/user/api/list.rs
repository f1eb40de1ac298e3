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
//! Users: list
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use mockall_double::double;
use serde_json::json;
use validator::Validate;

use crate::api::auth::Auth;
use crate::api::common::{PaginationQuery, policy_target};
use crate::api::error::ApiError;
#[double]
use crate::policy::Policy;
use crate::service::ServiceState;
use crate::user::{UserApi, api::types::*};

use super::issuer_owner;

/// List users of the issuer.
#[utoipa::path(
    get,
    path = "/issuers/{issuer_id}/users",
    operation_id = "/issuer/user:list",
    params(
        ("issuer_id" = String, Path, description = "The ID of the issuer."),
        PaginationQuery
    ),
    responses(
        (status = OK, description = "Page of users", body = UserInfoList),
        (status = 404, description = "Issuer not found"),
    ),
    security(("bearer" = [])),
    tag="users"
)]
#[tracing::instrument(
    name = "api::user::list",
    level = "debug",
    skip(state, user_auth, policy),
    err(Debug)
)]
pub(super) async fn list(
    Auth(user_auth): Auth,
    mut policy: Policy,
    Path(issuer_id): Path<String>,
    Query(query): Query<PaginationQuery>,
    State(state): State<ServiceState>,
) -> Result<impl IntoResponse, ApiError> {
    query.validate()?;
    let owner_id = issuer_owner(&state, &issuer_id).await?;
    policy
        .enforce(
            "sts/user/list",
            &user_auth,
            policy_target(None, &owner_id, &json!({"issuer_id": issuer_id}))?,
            None,
        )
        .await?;

    let page = state
        .provider
        .get_user_provider()
        .list_user_info(&state, &issuer_id, &query.page())
        .await?;
    Ok(UserInfoList::from(page))
}
