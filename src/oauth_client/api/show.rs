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
//! OAuth clients: show
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use mockall_double::double;

use crate::api::auth::Auth;
use crate::api::common::policy_target;
use crate::api::error::ApiError;
use crate::oauth_client::{OAuthClientApi, api::types::*};
#[double]
use crate::policy::Policy;
use crate::service::ServiceState;

/// Get single OAuth client. The secret is never returned.
#[utoipa::path(
    get,
    path = "/{client_id}",
    operation_id = "/client:show",
    params(
        ("client_id" = String, Path, description = "The ID of the client.")
    ),
    responses(
        (status = OK, description = "Client object", body = OAuthClientResponse),
        (status = 404, description = "Client not found"),
    ),
    security(("bearer" = [])),
    tag="clients"
)]
#[tracing::instrument(
    name = "api::client::show",
    level = "debug",
    skip(state, user_auth, policy),
    err(Debug)
)]
pub(super) async fn show(
    Auth(user_auth): Auth,
    mut policy: Policy,
    Path(client_id): Path<String>,
    State(state): State<ServiceState>,
) -> Result<impl IntoResponse, ApiError> {
    let current = state
        .provider
        .get_oauth_client_provider()
        .get_oauth_client(&state, &client_id)
        .await?
        .ok_or_else(|| ApiError::not_found("client", &client_id))?;

    policy
        .enforce(
            "sts/client/show",
            &user_auth,
            policy_target(
                Some(&current.id),
                &current.owner_id,
                &OAuthClient::from(current.clone()),
            )?,
            None,
        )
        .await?;
    Ok(current)
}
