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
//! OAuth clients: create
use axum::{Json, extract::State, response::IntoResponse};
use mockall_double::double;
use validator::Validate;

use crate::api::auth::Auth;
use crate::api::common::policy_target;
use crate::api::error::ApiError;
use crate::oauth_client::{OAuthClientApi, api::types::*};
#[double]
use crate::policy::Policy;
use crate::service::ServiceState;

/// Register the OAuth client.
///
/// The response carries the generated client secret. It is not retrievable
/// afterwards.
#[utoipa::path(
    post,
    path = "/",
    operation_id = "/client:create",
    responses(
        (status = CREATED, description = "Client with its secret", body = OAuthClientCreateResponse),
        (status = 409, description = "The client ID is already used"),
    ),
    security(("bearer" = [])),
    tag="clients"
)]
#[tracing::instrument(
    name = "api::client::create",
    level = "debug",
    skip(state, user_auth, policy),
    err(Debug)
)]
pub(super) async fn create(
    Auth(user_auth): Auth,
    mut policy: Policy,
    State(state): State<ServiceState>,
    Json(req): Json<OAuthClientCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;
    policy
        .enforce(
            "sts/client/create",
            &user_auth,
            policy_target(req.client.id.as_deref(), &req.client.owner_id, &req.client)?,
            None,
        )
        .await?;

    let res = state
        .provider
        .get_oauth_client_provider()
        .create_oauth_client(&state, req.into())
        .await?;
    Ok(res)
}
