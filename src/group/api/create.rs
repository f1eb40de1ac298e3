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
//! Groups: create
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use mockall_double::double;
use validator::Validate;

use crate::api::auth::Auth;
use crate::api::common::policy_target;
use crate::api::error::ApiError;
use crate::group::{GroupApi, api::types::*};
#[double]
use crate::policy::Policy;
use crate::service::ServiceState;

/// Create the group.
///
/// The owner relationship of the group is published together with it.
#[utoipa::path(
    post,
    path = "/",
    operation_id = "/group:create",
    responses(
        (status = CREATED, description = "Group object", body = GroupResponse),
        (status = 409, description = "The name is already used by the owner"),
    ),
    security(("bearer" = [])),
    tag="groups"
)]
#[tracing::instrument(
    name = "api::group::create",
    level = "debug",
    skip(state, user_auth, policy),
    err(Debug)
)]
pub(super) async fn create(
    Auth(user_auth): Auth,
    mut policy: Policy,
    State(state): State<ServiceState>,
    Json(req): Json<GroupCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;
    policy
        .enforce(
            "sts/group/create",
            &user_auth,
            policy_target(req.group.id.as_deref(), &req.group.owner_id, &req.group)?,
            None,
        )
        .await?;

    let res = state
        .provider
        .get_group_provider()
        .create_group(&state, req.into())
        .await?;
    Ok((StatusCode::CREATED, res).into_response())
}
