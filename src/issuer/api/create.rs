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
//! Issuers: create
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use mockall_double::double;
use validator::Validate;

use crate::api::auth::Auth;
use crate::api::common::policy_target;
use crate::api::error::ApiError;
use crate::issuer::{IssuerApi, api::types::*};
#[double]
use crate::policy::Policy;
use crate::service::ServiceState;

/// Create the issuer.
///
/// Registers the issuer compiling its claim mappings. Invalid expressions are
/// rejected.
#[utoipa::path(
    post,
    path = "/",
    operation_id = "/issuer:create",
    responses(
        (status = CREATED, description = "Issuer object", body = IssuerResponse),
        (status = 400, description = "Invalid issuer"),
        (status = 409, description = "The uri is already registered"),
    ),
    security(("bearer" = [])),
    tag="issuers"
)]
#[tracing::instrument(
    name = "api::issuer::create",
    level = "debug",
    skip(state, user_auth, policy),
    err(Debug)
)]
pub(super) async fn create(
    Auth(user_auth): Auth,
    mut policy: Policy,
    State(state): State<ServiceState>,
    Json(req): Json<IssuerCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;
    policy
        .enforce(
            "sts/issuer/create",
            &user_auth,
            policy_target(req.issuer.id.as_deref(), &req.issuer.owner_id, &req.issuer)?,
            None,
        )
        .await?;

    let res = state
        .provider
        .get_issuer_provider()
        .create_issuer(&state, req.into())
        .await?;
    Ok((StatusCode::CREATED, res).into_response())
}
