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
//! Groups: list
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use mockall_double::double;
use validator::Validate;

use crate::api::auth::Auth;
use crate::api::common::{OwnerListParameters, policy_target};
use crate::api::error::ApiError;
use crate::group::{GroupApi, api::types::*};
#[double]
use crate::policy::Policy;
use crate::service::ServiceState;

/// List groups.
///
/// List the groups of the tenant ordered by the ID.
#[utoipa::path(
    get,
    path = "/",
    operation_id = "/group:list",
    params(OwnerListParameters),
    responses(
        (status = OK, description = "Page of groups", body = GroupList),
        (status = 400, description = "Invalid cursor"),
    ),
    security(("bearer" = [])),
    tag="groups"
)]
#[tracing::instrument(
    name = "api::group::list",
    level = "debug",
    skip(state, user_auth, policy),
    err(Debug)
)]
pub(super) async fn list(
    Auth(user_auth): Auth,
    mut policy: Policy,
    Query(query): Query<OwnerListParameters>,
    State(state): State<ServiceState>,
) -> Result<impl IntoResponse, ApiError> {
    query.validate()?;
    policy
        .enforce(
            "sts/group/list",
            &user_auth,
            policy_target(None, &query.owner_id, &())?,
            None,
        )
        .await?;

    let page = state
        .provider
        .get_group_provider()
        .list_groups(&state, &query.owner_id, &query.page())
        .await?;
    Ok(GroupList::from(page))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use http_body_util::BodyExt; // for `collect`
    use tower::ServiceExt; // for `call`, `oneshot`, and `ready`
    use tower_http::trace::TraceLayer;
    use tracing_test::traced_test;

    use super::{super::openapi_router, *};
    use crate::group::{GroupProviderError, MockGroupProvider, types as provider_types};
    use crate::pagination::{Page, PageRequest, PaginationError};
    use crate::provider::Provider;
    use crate::storage::StorageError;
    use crate::tests::api::{get_mocked_state, json_request};

    #[tokio::test]
    #[traced_test]
    async fn test_list() {
        let mut group_mock = MockGroupProvider::default();
        group_mock
            .expect_list_groups()
            .withf(|_, owner_id: &'_ str, page: &PageRequest| {
                owner_id == "o1" && *page == PageRequest::default()
            })
            .returning(|_, _, _| {
                Ok(Page {
                    items: vec![provider_types::Group {
                        id: "g1".into(),
                        owner_id: "o1".into(),
                        name: "ops".into(),
                        description: None,
                    }],
                    next: None,
                })
            });

        let state = get_mocked_state(Provider::mocked_builder().group(group_mock), true);
        let mut api = openapi_router()
            .layer(TraceLayer::new_for_http())
            .with_state(state);

        let response = api
            .as_service()
            .oneshot(json_request("GET", "/?owner_id=o1", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let res: GroupList = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            GroupList {
                groups: vec![Group {
                    id: "g1".into(),
                    owner_id: "o1".into(),
                    name: "ops".into(),
                    description: None,
                }],
                next: None
            },
            res
        );
    }

    #[tokio::test]
    async fn test_list_invalid_cursor() {
        let mut group_mock = MockGroupProvider::default();
        group_mock.expect_list_groups().returning(|_, _, _| {
            Err(GroupProviderError::Storage {
                source: StorageError::Pagination {
                    source: PaginationError::InvalidCursor("forged".into()),
                },
            })
        });

        let state = get_mocked_state(Provider::mocked_builder().group(group_mock), true);
        let mut api = openapi_router().with_state(state);

        let response = api
            .as_service()
            .oneshot(json_request("GET", "/?owner_id=o1&cursor=forged", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
