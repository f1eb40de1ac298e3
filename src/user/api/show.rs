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
//! Users: show
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use mockall_double::double;

use crate::api::auth::Auth;
use crate::api::common::policy_target;
use crate::api::error::ApiError;
#[double]
use crate::policy::Policy;
use crate::service::ServiceState;
use crate::user::{UserApi, api::types::*};

/// Get single user.
///
/// Authorized against the tenant owning the issuer of the user.
#[utoipa::path(
    get,
    path = "/users/{user_id}",
    operation_id = "/user:show",
    params(
        ("user_id" = String, Path, description = "The ID of the user.")
    ),
    responses(
        (status = OK, description = "User object", body = UserInfoResponse),
        (status = 404, description = "User not found"),
    ),
    security(("bearer" = [])),
    tag="users"
)]
#[tracing::instrument(
    name = "api::user::show",
    level = "debug",
    skip(state, user_auth, policy),
    err(Debug)
)]
pub(super) async fn show(
    Auth(user_auth): Auth,
    mut policy: Policy,
    Path(user_id): Path<String>,
    State(state): State<ServiceState>,
) -> Result<impl IntoResponse, ApiError> {
    let current = state
        .provider
        .get_user_provider()
        .get_user_info(&state, &user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("user", &user_id))?;
    let owner_id = state
        .provider
        .get_user_provider()
        .get_user_owner_id(&state, &user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("user", &user_id))?;

    policy
        .enforce(
            "sts/user/show",
            &user_auth,
            policy_target(
                Some(&current.id),
                &owner_id,
                &UserInfo::from(current.clone()),
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
    use crate::provider::Provider;
    use crate::tests::api::{get_mocked_state, json_request};
    use crate::user::{MockUserProvider, types as provider_types};

    fn user_mock() -> MockUserProvider {
        let mut user_mock = MockUserProvider::default();
        user_mock
            .expect_get_user_info()
            .withf(|_, id: &'_ str| id == "u1")
            .returning(|_, _| {
                Ok(Some(provider_types::UserInfo {
                    id: "u1".into(),
                    issuer_id: "i1".into(),
                    subject: "alice".into(),
                    name: Some("Alice".into()),
                    email: None,
                }))
            });
        user_mock
            .expect_get_user_info()
            .withf(|_, id: &'_ str| id != "u1")
            .returning(|_, _| Ok(None));
        user_mock
            .expect_get_user_owner_id()
            .withf(|_, id: &'_ str| id == "u1")
            .returning(|_, _| Ok(Some("o1".into())));
        user_mock
    }

    #[tokio::test]
    #[traced_test]
    async fn test_show() {
        let state = get_mocked_state(Provider::mocked_builder().user(user_mock()), true);
        let mut api = openapi_router()
            .layer(TraceLayer::new_for_http())
            .with_state(state);

        let response = api
            .as_service()
            .oneshot(json_request("GET", "/users/u1", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let res: UserInfoResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            UserInfo {
                id: "u1".into(),
                issuer_id: "i1".into(),
                subject: "alice".into(),
                name: Some("Alice".into()),
                email: None,
            },
            res.user
        );

        let response = api
            .as_service()
            .oneshot(json_request("GET", "/users/u2", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_show_forbidden() {
        let state = get_mocked_state(Provider::mocked_builder().user(user_mock()), false);
        let mut api = openapi_router().with_state(state);

        let response = api
            .as_service()
            .oneshot(json_request("GET", "/users/u1", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
