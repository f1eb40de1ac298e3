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
//! Users: create or update
use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use mockall_double::double;
use validator::Validate;

use crate::api::auth::Auth;
use crate::api::common::policy_target;
use crate::api::error::ApiError;
#[double]
use crate::policy::Policy;
use crate::service::ServiceState;
use crate::user::{UserApi, api::types::*};

use super::issuer_owner;

/// Store the user of the issuer.
///
/// The user is keyed by the subject. An existing user gets the new name and
/// email.
#[utoipa::path(
    put,
    path = "/issuers/{issuer_id}/users",
    operation_id = "/issuer/user:upsert",
    params(
        ("issuer_id" = String, Path, description = "The ID of the issuer.")
    ),
    responses(
        (status = OK, description = "User object", body = UserInfoResponse),
        (status = 404, description = "Issuer not found"),
    ),
    security(("bearer" = [])),
    tag="users"
)]
#[tracing::instrument(
    name = "api::user::upsert",
    level = "debug",
    skip(state, user_auth, policy),
    err(Debug)
)]
pub(super) async fn upsert(
    Auth(user_auth): Auth,
    mut policy: Policy,
    Path(issuer_id): Path<String>,
    State(state): State<ServiceState>,
    Json(req): Json<UserInfoUpsertRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;
    let owner_id = issuer_owner(&state, &issuer_id).await?;
    policy
        .enforce(
            "sts/user/upsert",
            &user_auth,
            policy_target(None, &owner_id, &serde_json::json!({"issuer_id": issuer_id}))?,
            Some(serde_json::to_value(&req.user)?),
        )
        .await?;

    let res = state
        .provider
        .get_user_provider()
        .store_user_info(&state, req.into_create(issuer_id))
        .await?;
    Ok(res)
}
