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
//! Groups: update
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
use crate::group::{GroupApi, api::types::*};
#[double]
use crate::policy::Policy;
use crate::service::ServiceState;

/// Update the group.
#[utoipa::path(
    patch,
    path = "/{group_id}",
    operation_id = "/group:update",
    params(
        ("group_id" = String, Path, description = "The ID of the group.")
    ),
    responses(
        (status = OK, description = "Group object", body = GroupResponse),
        (status = 404, description = "Group not found"),
        (status = 409, description = "The name is already used by the owner"),
    ),
    security(("bearer" = [])),
    tag="groups"
)]
#[tracing::instrument(
    name = "api::group::update",
    level = "debug",
    skip(state, user_auth, policy),
    err(Debug)
)]
pub(super) async fn update(
    Auth(user_auth): Auth,
    mut policy: Policy,
    Path(group_id): Path<String>,
    State(state): State<ServiceState>,
    Json(req): Json<GroupUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;
    let current = state
        .provider
        .get_group_provider()
        .get_group(&state, &group_id)
        .await?
        .ok_or_else(|| ApiError::not_found("group", &group_id))?;

    policy
        .enforce(
            "sts/group/update",
            &user_auth,
            policy_target(
                Some(&current.id),
                &current.owner_id,
                &Group::from(current.clone()),
            )?,
            Some(serde_json::to_value(&req.group)?),
        )
        .await?;

    let res = state
        .provider
        .get_group_provider()
        .update_group(&state, &group_id, req.into())
        .await?;
    Ok(res)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use http_body_util::BodyExt; // for `collect`
    use serde_json::json;
    use tower::ServiceExt; // for `call`, `oneshot`, and `ready`
    use tower_http::trace::TraceLayer;
    use tracing_test::traced_test;

    use super::{super::openapi_router, *};
    use crate::group::{GroupProviderError, MockGroupProvider, types as provider_types};
    use crate::provider::Provider;
    use crate::tests::api::{get_mocked_state, json_request};

    fn group_mock() -> MockGroupProvider {
        let mut group_mock = MockGroupProvider::default();
        group_mock.expect_get_group().returning(|_, id| {
            Ok(Some(provider_types::Group {
                id: id.into(),
                owner_id: "o1".into(),
                name: "ops".into(),
                description: None,
            }))
        });
        group_mock
    }

    #[tokio::test]
    #[traced_test]
    async fn test_update() {
        let mut group_mock = group_mock();
        group_mock
            .expect_update_group()
            .withf(|_, id: &'_ str, req: &provider_types::GroupUpdate| {
                id == "g1" && req.name.as_deref() == Some("dev")
            })
            .returning(|_, id, req| {
                Ok(provider_types::Group {
                    id: id.into(),
                    owner_id: "o1".into(),
                    name: req.name.unwrap_or_default(),
                    description: None,
                })
            });

        let state = get_mocked_state(Provider::mocked_builder().group(group_mock), true);
        let mut api = openapi_router()
            .layer(TraceLayer::new_for_http())
            .with_state(state);

        let response = api
            .as_service()
            .oneshot(json_request(
                "PATCH",
                "/g1",
                Some(json!({"group": {"name": "dev"}})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let res: GroupResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!("dev", res.group.name);
    }

    #[tokio::test]
    async fn test_update_conflict() {
        let mut group_mock = group_mock();
        group_mock
            .expect_update_group()
            .returning(|_, _, _| Err(GroupProviderError::NameConflict("dev".into())));

        let state = get_mocked_state(Provider::mocked_builder().group(group_mock), true);
        let mut api = openapi_router().with_state(state);

        let response = api
            .as_service()
            .oneshot(json_request(
                "PATCH",
                "/g1",
                Some(json!({"group": {"name": "dev"}})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
