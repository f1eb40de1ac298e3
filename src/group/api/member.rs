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
//! Groups: membership
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use mockall_double::double;
use serde_json::Value;
use validator::Validate;

use crate::api::auth::{Auth, Principal};
use crate::api::common::{PaginationQuery, policy_target};
use crate::api::error::ApiError;
use crate::group::{GroupApi, api::types::*};
#[double]
use crate::policy::Policy;
use crate::service::ServiceState;

/// Check the permission on the members of the existing group.
async fn enforce(
    state: &ServiceState,
    policy: &mut Policy,
    user_auth: &Principal,
    group_id: &str,
    action: &str,
    update: Option<Value>,
) -> Result<(), ApiError> {
    let current = state
        .provider
        .get_group_provider()
        .get_group(state, group_id)
        .await?
        .ok_or_else(|| ApiError::not_found("group", group_id))?;

    policy
        .enforce(
            format!("sts/group/member/{action}").as_str(),
            user_auth,
            policy_target(
                Some(&current.id),
                &current.owner_id,
                &Group::from(current.clone()),
            )?,
            update,
        )
        .await?;
    Ok(())
}

/// List group members.
#[utoipa::path(
    get,
    path = "/{group_id}/members",
    operation_id = "/group/member:list",
    params(
        ("group_id" = String, Path, description = "The ID of the group."),
        PaginationQuery
    ),
    responses(
        (status = OK, description = "Page of members", body = MemberList),
        (status = 404, description = "Group not found"),
    ),
    security(("bearer" = [])),
    tag="group_members"
)]
#[tracing::instrument(
    name = "api::group::member::list",
    level = "debug",
    skip(state, user_auth, policy),
    err(Debug)
)]
pub(super) async fn list(
    Auth(user_auth): Auth,
    mut policy: Policy,
    Path(group_id): Path<String>,
    Query(query): Query<PaginationQuery>,
    State(state): State<ServiceState>,
) -> Result<impl IntoResponse, ApiError> {
    query.validate()?;
    enforce(&state, &mut policy, &user_auth, &group_id, "list", None).await?;

    let page = state
        .provider
        .get_group_provider()
        .list_group_members(&state, &group_id, &query.page())
        .await?;
    Ok(MemberList::from(page))
}

/// Add group members.
///
/// Members already present are kept. The response lists the members that were
/// actually added.
#[utoipa::path(
    post,
    path = "/{group_id}/members",
    operation_id = "/group/member:add",
    params(
        ("group_id" = String, Path, description = "The ID of the group.")
    ),
    request_body = MembersRequest,
    responses(
        (status = OK, description = "Effective change", body = MembershipChange),
        (status = 400, description = "Invalid member ID"),
        (status = 404, description = "Group not found"),
    ),
    security(("bearer" = [])),
    tag="group_members"
)]
#[tracing::instrument(
    name = "api::group::member::add",
    level = "debug",
    skip(state, user_auth, policy),
    err(Debug)
)]
pub(super) async fn add(
    Auth(user_auth): Auth,
    mut policy: Policy,
    Path(group_id): Path<String>,
    State(state): State<ServiceState>,
    Json(req): Json<MembersRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;
    enforce(
        &state,
        &mut policy,
        &user_auth,
        &group_id,
        "add",
        Some(serde_json::to_value(&req)?),
    )
    .await?;

    let change = state
        .provider
        .get_group_provider()
        .add_group_members(&state, &group_id, req.members)
        .await?;
    Ok(MembershipChange::from(change))
}

/// Replace group members.
///
/// Converges the membership to the given set. Unchanged members are left
/// alone.
#[utoipa::path(
    put,
    path = "/{group_id}/members",
    operation_id = "/group/member:replace",
    params(
        ("group_id" = String, Path, description = "The ID of the group.")
    ),
    request_body = MembersRequest,
    responses(
        (status = OK, description = "Effective change", body = MembershipChange),
        (status = 400, description = "Invalid member ID"),
        (status = 404, description = "Group not found"),
    ),
    security(("bearer" = [])),
    tag="group_members"
)]
#[tracing::instrument(
    name = "api::group::member::replace",
    level = "debug",
    skip(state, user_auth, policy),
    err(Debug)
)]
pub(super) async fn replace(
    Auth(user_auth): Auth,
    mut policy: Policy,
    Path(group_id): Path<String>,
    State(state): State<ServiceState>,
    Json(req): Json<MembersRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;
    enforce(
        &state,
        &mut policy,
        &user_auth,
        &group_id,
        "replace",
        Some(serde_json::to_value(&req)?),
    )
    .await?;

    let change = state
        .provider
        .get_group_provider()
        .replace_group_members(&state, &group_id, req.members)
        .await?;
    Ok(MembershipChange::from(change))
}

/// Remove the group member.
#[utoipa::path(
    delete,
    path = "/{group_id}/members/{member_id}",
    operation_id = "/group/member:remove",
    params(
        ("group_id" = String, Path, description = "The ID of the group."),
        ("member_id" = String, Path, description = "Prefixed ID of the member (`user:<id>`).")
    ),
    responses(
        (status = 204, description = "Removed"),
        (status = 404, description = "Group or member not found"),
    ),
    security(("bearer" = [])),
    tag="group_members"
)]
#[tracing::instrument(
    name = "api::group::member::remove",
    level = "debug",
    skip(state, user_auth, policy),
    err(Debug)
)]
pub(super) async fn remove(
    Auth(user_auth): Auth,
    mut policy: Policy,
    Path((group_id, member_id)): Path<(String, String)>,
    State(state): State<ServiceState>,
) -> Result<impl IntoResponse, ApiError> {
    enforce(
        &state,
        &mut policy,
        &user_auth,
        &group_id,
        "remove",
        Some(serde_json::json!({"member_id": member_id})),
    )
    .await?;

    state
        .provider
        .get_group_provider()
        .remove_group_member(&state, &group_id, &member_id)
        .await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
