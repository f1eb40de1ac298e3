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
//! Issuers: show
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use mockall_double::double;

use crate::api::auth::Auth;
use crate::api::common::policy_target;
use crate::api::error::ApiError;
use crate::issuer::{IssuerApi, api::types::*};
#[double]
use crate::policy::Policy;
use crate::service::ServiceState;

/// Get single issuer.
#[utoipa::path(
    get,
    path = "/{issuer_id}",
    operation_id = "/issuer:show",
    params(
        ("issuer_id" = String, Path, description = "The ID of the issuer.")
    ),
    responses(
        (status = OK, description = "Issuer object", body = IssuerResponse),
        (status = 404, description = "Issuer not found"),
    ),
    security(("bearer" = [])),
    tag="issuers"
)]
#[tracing::instrument(
    name = "api::issuer::show",
    level = "debug",
    skip(state, user_auth, policy),
    err(Debug)
)]
pub(super) async fn show(
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
            "sts/issuer/show",
            &user_auth,
            policy_target(
                Some(&current.id),
                &current.owner_id,
                &Issuer::from(current.clone()),
            )?,
            None,
        )
        .await?;
    Ok(current)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use http_body_util::BodyExt; // for `collect`
    use tower::ServiceExt; // for `call`, `oneshot`, and `ready`
    use tower_http::trace::TraceLayer;
    use tracing_test::traced_test;

    use super::{super::openapi_router, *};
    use crate::issuer::{MockIssuerProvider, types as provider_types};
    use crate::provider::Provider;
    use crate::tests::api::{get_mocked_state, json_request};

    fn issuer_mock() -> MockIssuerProvider {
        let mut issuer_mock = MockIssuerProvider::default();
        issuer_mock
            .expect_get_issuer()
            .withf(|_, id: &'_ str| id == "foo")
            .returning(|_, _| Ok(None));
        issuer_mock
            .expect_get_issuer()
            .withf(|_, id: &'_ str| id == "bar")
            .returning(|_, _| {
                Ok(Some(provider_types::Issuer {
                    id: "bar".into(),
                    owner_id: "o1".into(),
                    name: "idp".into(),
                    uri: "https://idp".into(),
                    jwks_uri: "https://idp/jwks".into(),
                    ..Default::default()
                }))
            });
        issuer_mock
    }

    #[tokio::test]
    #[traced_test]
    async fn test_show() {
        let state = get_mocked_state(Provider::mocked_builder().issuer(issuer_mock()), true);
        let mut api = openapi_router()
            .layer(TraceLayer::new_for_http())
            .with_state(state);

        let response = api
            .as_service()
            .oneshot(json_request("GET", "/foo", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = api
            .as_service()
            .oneshot(json_request("GET", "/bar", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let res: IssuerResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            Issuer {
                id: "bar".into(),
                owner_id: "o1".into(),
                name: "idp".into(),
                uri: "https://idp".into(),
                jwks_uri: "https://idp/jwks".into(),
                ..Default::default()
            },
            res.issuer
        );
    }

    #[tokio::test]
    async fn test_show_forbidden() {
        let state = get_mocked_state(Provider::mocked_builder().issuer(issuer_mock()), false);
        let mut api = openapi_router().with_state(state);

        let response = api
            .as_service()
            .oneshot(json_request("GET", "/bar", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
