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
//! Issuers: delete
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use mockall_double::double;

use crate::api::auth::Auth;
use crate::api::common::policy_target;
use crate::api::error::ApiError;
use crate::issuer::{IssuerApi, api::types::Issuer};
#[double]
use crate::policy::Policy;
use crate::service::ServiceState;

/// Delete the issuer.
///
/// The user records observed through the issuer are deleted with it.
#[utoipa::path(
    delete,
    path = "/{issuer_id}",
    operation_id = "/issuer:delete",
    params(
        ("issuer_id" = String, Path, description = "The ID of the issuer.")
    ),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Issuer not found"),
    ),
    security(("bearer" = [])),
    tag="issuers"
)]
#[tracing::instrument(
    name = "api::issuer::delete",
    level = "debug",
    skip(state, user_auth, policy),
    err(Debug)
)]
pub(super) async fn remove(
    Auth(user_auth): Auth,
    mut policy: Policy,
    Path(issuer_id): Path<String>,
    State(state): State<ServiceState>,
) -> Result<impl IntoResponse, ApiError> {
    let current = state
        .provider
        .get_issuer_provider()
        .get_issuer(&state, &issuer_id)
        .await?
        .ok_or_else(|| ApiError::not_found("issuer", &issuer_id))?;

    policy
        .enforce(
            "sts/issuer/delete",
            &user_auth,
            policy_target(
                Some(&current.id),
                &current.owner_id,
                &Issuer::from(current.clone()),
            )?,
            None,
        )
        .await?;

    state
        .provider
        .get_issuer_provider()
        .delete_issuer(&state, &issuer_id)
        .await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
