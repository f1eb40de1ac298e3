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
//! Issuers: list
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use mockall_double::double;
use validator::Validate;

use crate::api::auth::Auth;
use crate::api::common::{OwnerListParameters, policy_target};
use crate::api::error::ApiError;
use crate::issuer::{IssuerApi, api::types::*};
#[double]
use crate::policy::Policy;
use crate::service::ServiceState;

/// List issuers.
///
/// List the issuers of the tenant ordered by the ID. The `next` cursor of a
/// full page continues the listing.
#[utoipa::path(
    get,
    path = "/",
    operation_id = "/issuer:list",
    params(OwnerListParameters),
    responses(
        (status = OK, description = "Page of issuers", body = IssuerList),
        (status = 400, description = "Invalid cursor"),
    ),
    security(("bearer" = [])),
    tag="issuers"
)]
#[tracing::instrument(
    name = "api::issuer::list",
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
            "sts/issuer/list",
            &user_auth,
            policy_target(None, &query.owner_id, &())?,
            None,
        )
        .await?;

    let page = state
        .provider
        .get_issuer_provider()
        .list_issuers(&state, &query.owner_id, &query.page())
        .await?;
    Ok(IssuerList::from(page))
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
    use crate::pagination::{Cursor, Page, PageRequest};
    use crate::provider::Provider;
    use crate::tests::api::{get_mocked_state, json_request};

    #[tokio::test]
    #[traced_test]
    async fn test_list() {
        let mut issuer_mock = MockIssuerProvider::default();
        issuer_mock
            .expect_list_issuers()
            .withf(|_, owner_id: &'_ str, page: &PageRequest| {
                owner_id == "o1"
                    && *page == PageRequest::new(Some(Cursor::from("abc")), Some(1))
            })
            .returning(|_, _, _| {
                Ok(Page {
                    items: vec![provider_types::Issuer {
                        id: "i1".into(),
                        owner_id: "o1".into(),
                        name: "idp".into(),
                        ..Default::default()
                    }],
                    next: Some(Cursor::from("def")),
                })
            });

        let state = get_mocked_state(Provider::mocked_builder().issuer(issuer_mock), true);
        let mut api = openapi_router()
            .layer(TraceLayer::new_for_http())
            .with_state(state);

        let response = api
            .as_service()
            .oneshot(json_request("GET", "/?owner_id=o1&cursor=abc&limit=1", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let res: IssuerList = serde_json::from_slice(&body).unwrap();
        assert_eq!(1, res.issuers.len());
        assert_eq!("i1", res.issuers[0].id);
        assert_eq!(Some("def".to_string()), res.next);
    }

    #[tokio::test]
    async fn test_list_requires_owner() {
        let mut issuer_mock = MockIssuerProvider::default();
        issuer_mock.expect_list_issuers().never();

        let state = get_mocked_state(Provider::mocked_builder().issuer(issuer_mock), true);
        let mut api = openapi_router().with_state(state);

        let response = api
            .as_service()
            .oneshot(json_request("GET", "/", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
