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
//! Issuers: update
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
use crate::issuer::{IssuerApi, api::types::*};
#[double]
use crate::policy::Policy;
use crate::service::ServiceState;

/// Update the issuer.
///
/// Only the fields present in the request are changed. The claim mappings are
/// replaced as a whole.
#[utoipa::path(
    patch,
    path = "/{issuer_id}",
    operation_id = "/issuer:update",
    params(
        ("issuer_id" = String, Path, description = "The ID of the issuer.")
    ),
    responses(
        (status = OK, description = "Issuer object", body = IssuerResponse),
        (status = 400, description = "Invalid issuer"),
        (status = 404, description = "Issuer not found"),
    ),
    security(("bearer" = [])),
    tag="issuers"
)]
#[tracing::instrument(
    name = "api::issuer::update",
    level = "debug",
    skip(state, user_auth, policy),
    err(Debug)
)]
pub(super) async fn update(
    Auth(user_auth): Auth,
    mut policy: Policy,
    Path(issuer_id): Path<String>,
    State(state): State<ServiceState>,
    Json(req): Json<IssuerUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;
    // The current object takes part in the policy evaluation.
    let current = state
        .provider
        .get_issuer_provider()
        .get_issuer(&state, &issuer_id)
        .await?
        .ok_or_else(|| ApiError::not_found("issuer", &issuer_id))?;

    policy
        .enforce(
            "sts/issuer/update",
            &user_auth,
            policy_target(
                Some(&current.id),
                &current.owner_id,
                &Issuer::from(current.clone()),
            )?,
            Some(serde_json::to_value(&req.issuer)?),
        )
        .await?;

    let res = state
        .provider
        .get_issuer_provider()
        .update_issuer(&state, &issuer_id, req.into())
        .await?;
    Ok(res)
}
