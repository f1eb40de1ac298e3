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
//! Groups: show
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use mockall_double::double;

use crate::api::auth::Auth;
use crate::api::common::policy_target;
use crate::api::error::ApiError;
use crate::group::{GroupApi, api::types::*};
#[double]
use crate::policy::Policy;
use crate::service::ServiceState;

/// Get single group.
#[utoipa::path(
    get,
    path = "/{group_id}",
    operation_id = "/group:show",
    params(
        ("group_id" = String, Path, description = "The ID of the group.")
    ),
    responses(
        (status = OK, description = "Group object", body = GroupResponse),
        (status = 404, description = "Group not found"),
    ),
    security(("bearer" = [])),
    tag="groups"
)]
#[tracing::instrument(
    name = "api::group::show",
    level = "debug",
    skip(state, user_auth, policy),
    err(Debug)
)]
pub(super) async fn show(
    Auth(user_auth): Auth,
    mut policy: Policy,
    Path(group_id): Path<String>,
    State(state): State<ServiceState>,
) -> Result<impl IntoResponse, ApiError> {
    let current = state
        .provider
        .get_group_provider()
        .get_group(&state, &group_id)
        .await?
        .ok_or_else(|| ApiError::not_found("group", &group_id))?;

    policy
        .enforce(
            "sts/group/show",
            &user_auth,
            policy_target(
                Some(&current.id),
                &current.owner_id,
                &Group::from(current.clone()),
            )?,
            None,
        )
        .await?;
    Ok(current)
}
