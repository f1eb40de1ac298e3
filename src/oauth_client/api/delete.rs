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
//! OAuth clients: delete
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use mockall_double::double;

use crate::api::auth::Auth;
use crate::api::common::policy_target;
use crate::api::error::ApiError;
use crate::oauth_client::{OAuthClientApi, api::types::OAuthClient};
#[double]
use crate::policy::Policy;
use crate::service::ServiceState;

/// Delete the OAuth client.
#[utoipa::path(
    delete,
    path = "/{client_id}",
    operation_id = "/client:delete",
    params(
        ("client_id" = String, Path, description = "The ID of the client.")
    ),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Client not found"),
    ),
    security(("bearer" = [])),
    tag="clients"
)]
#[tracing::instrument(
    name = "api::client::delete",
    level = "debug",
    skip(state, user_auth, policy),
    err(Debug)
)]
pub(super) async fn remove(
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
            "sts/client/delete",
            &user_auth,
            policy_target(
                Some(&current.id),
                &current.owner_id,
                &OAuthClient::from(current.clone()),
            )?,
            None,
        )
        .await?;

    state
        .provider
        .get_oauth_client_provider()
        .delete_oauth_client(&state, &client_id)
        .await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use tower::ServiceExt; // for `call`, `oneshot`, and `ready`
    use tower_http::trace::TraceLayer;
    use tracing_test::traced_test;

    use super::super::openapi_router;
    use crate::oauth_client::{MockOAuthClientProvider, types as provider_types};
    use crate::provider::Provider;
    use crate::tests::api::{get_mocked_state, json_request};

    #[tokio::test]
    #[traced_test]
    async fn test_delete() {
        let mut client_mock = MockOAuthClientProvider::default();
        client_mock
            .expect_get_oauth_client()
            .withf(|_, id: &'_ str| id == "c1")
            .returning(|_, _| {
                Ok(Some(provider_types::OAuthClient {
                    id: "c1".into(),
                    owner_id: "o1".into(),
                    ..Default::default()
                }))
            });
        client_mock
            .expect_get_oauth_client()
            .withf(|_, id: &'_ str| id != "c1")
            .returning(|_, _| Ok(None));
        client_mock
            .expect_delete_oauth_client()
            .withf(|_, id: &'_ str| id == "c1")
            .returning(|_, _| Ok(()));

        let state = get_mocked_state(Provider::mocked_builder().oauth_client(client_mock), true);
        let mut api = openapi_router()
            .layer(TraceLayer::new_for_http())
            .with_state(state);

        let response = api
            .as_service()
            .oneshot(json_request("DELETE", "/c2", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = api
            .as_service()
            .oneshot(json_request("DELETE", "/c1", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}
