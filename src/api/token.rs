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
//! # Token endpoint
//!
//! - `POST /token`: OAuth 2.0 token endpoint.
//! - `GET /jwks.json`: public keys of the issued tokens.
//! - `GET /userinfo`: claims of the presented access token.
use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, header::AUTHORIZATION},
    response::IntoResponse,
};
use base64::{Engine, engine::general_purpose::STANDARD};
use std::sync::LazyLock;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::api::auth::Auth;
use crate::api::error::ApiError;
use crate::keys::{JwkSet, SigningKeyProvider};
use crate::oauth_client::{ClientStore, OAuthClientProviderError};
use crate::oauth2::{GrantRegistry, OAuth2Error, TokenRequest, TokenResponse};
use crate::service::ServiceState;

pub(crate) static GRANTS: LazyLock<GrantRegistry> = LazyLock::new(GrantRegistry::default);

pub(crate) fn openapi_router() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new()
        .routes(routes!(token))
        .routes(routes!(jwks))
        .routes(routes!(userinfo))
}

/// Decode the form-urlencoded component of the basic credentials.
fn form_decode(value: &str) -> String {
    url::form_urlencoded::parse(format!("v={value}").as_bytes())
        .next()
        .map(|(_, v)| v.into_owned())
        .unwrap_or_default()
}

/// Client credentials of the `client_secret_basic` or `client_secret_post`
/// authentication. Using both at once is invalid.
fn client_credentials(
    headers: &HeaderMap,
    req: &TokenRequest,
) -> Result<(String, String), OAuth2Error> {
    let basic = match headers.get(AUTHORIZATION) {
        Some(value) => {
            let value = value
                .to_str()
                .map_err(|_| OAuth2Error::InvalidClient("malformed authorization header".into()))?;
            let encoded = match value.split_once(' ') {
                Some((scheme, encoded)) if scheme.eq_ignore_ascii_case("basic") => encoded.trim(),
                _ => {
                    return Err(OAuth2Error::InvalidClient(
                        "unsupported authorization scheme".into(),
                    ));
                }
            };
            let decoded = STANDARD
                .decode(encoded)
                .ok()
                .and_then(|x| String::from_utf8(x).ok())
                .ok_or_else(|| OAuth2Error::InvalidClient("malformed basic credentials".into()))?;
            let (id, secret) = decoded
                .split_once(':')
                .ok_or_else(|| OAuth2Error::InvalidClient("malformed basic credentials".into()))?;
            Some((form_decode(id), form_decode(secret)))
        }
        None => None,
    };
    let post = match (&req.client_id, &req.client_secret) {
        (Some(id), Some(secret)) => Some((id.clone(), secret.clone())),
        _ => None,
    };
    match (basic, post) {
        (Some(_), Some(_)) => Err(OAuth2Error::InvalidRequest(
            "multiple client authentication methods used".into(),
        )),
        (Some(creds), None) | (None, Some(creds)) => Ok(creds),
        (None, None) => Err(OAuth2Error::InvalidClient(
            "client authentication is required".into(),
        )),
    }
}

/// OAuth 2.0 token endpoint.
///
/// Issues the access token for the `urn:ietf:params:oauth:grant-type:token-exchange`
/// grant. The client authenticates with `client_secret_basic` or
/// `client_secret_post`.
#[utoipa::path(
    post,
    path = "/token",
    operation_id = "/token:create",
    request_body(content = TokenRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = OK, description = "Issued token", body = TokenResponse),
        (status = 400, description = "Invalid request", body = crate::oauth2::error::OAuth2ErrorBody),
        (status = 401, description = "Client authentication failed", body = crate::oauth2::error::OAuth2ErrorBody),
    ),
    tag = "oauth2"
)]
#[tracing::instrument(name = "api::token", level = "debug", skip_all, err(Debug))]
pub(super) async fn token(
    State(state): State<ServiceState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<TokenResponse, OAuth2Error> {
    let req = TokenRequest::from_form(&body)?;
    let (client_id, secret) = client_credentials(&headers, &req)?;
    let client = state
        .provider
        .get_oauth_client_provider()
        .authenticate_client(&state, &client_id, &secret)
        .await
        .map_err(|err| match err {
            OAuthClientProviderError::InvalidCredentials
            | OAuthClientProviderError::OAuthClientNotFound(_) => {
                OAuth2Error::InvalidClient("invalid client credentials".into())
            }
            other => {
                tracing::error!("client authentication failed: {other:?}");
                OAuth2Error::ServerError("temporary failure, please retry".into())
            }
        })?;

    GRANTS
        .get(&req.grant_type)?
        .handle(&state, &client, &req)
        .await
}

/// Public keys of the issued tokens.
#[utoipa::path(
    get,
    path = "/jwks.json",
    operation_id = "/jwks:show",
    responses(
        (status = OK, description = "JSON Web Key Set", body = JwkSet),
    ),
    tag = "oauth2"
)]
#[tracing::instrument(name = "api::jwks", level = "debug", skip(state))]
pub(super) async fn jwks(State(state): State<ServiceState>) -> impl IntoResponse {
    Json(state.provider.get_key_provider().public_jwks())
}

/// Claims of the presented access token.
#[utoipa::path(
    get,
    path = "/userinfo",
    operation_id = "/userinfo:show",
    responses(
        (status = OK, description = "Claims of the access token", body = Object),
        (status = 401, description = "Missing or invalid access token"),
    ),
    security(("bearer" = [])),
    tag = "oauth2"
)]
#[tracing::instrument(name = "api::userinfo", level = "debug", skip_all, err(Debug))]
pub(super) async fn userinfo(Auth(principal): Auth) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(principal.claims))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use http_body_util::BodyExt; // for `collect`
    use serde_json::{Value, json};
    use tower::ServiceExt; // for `call`, `oneshot`, and `ready`
    use tracing_test::traced_test;

    use super::*;
    use crate::keys::{Jwk, MockKeyProvider};
    use crate::oauth_client::MockOAuthClientProvider;
    use crate::oauth_client::types::OAuthClient;
    use crate::oauth2::{GRANT_TYPE_TOKEN_EXCHANGE, TOKEN_TYPE_JWT};
    use crate::provider::Provider;
    use crate::tests::api::{auth_key_mock, json_request};
    use crate::tests::get_memory_state;
    use crate::token_exchange::{
        MockTokenExchangeProvider, TokenExchangeError, TokenExchangeRequest,
    };

    fn client_mock() -> MockOAuthClientProvider {
        let mut client_mock = MockOAuthClientProvider::default();
        client_mock
            .expect_authenticate_client()
            .withf(|_, id: &'_ str, secret: &'_ str| id == "cli" && secret == "s3cr=t")
            .returning(|_, _, _| {
                Ok(OAuthClient {
                    id: "cli".into(),
                    ..Default::default()
                })
            });
        client_mock
            .expect_authenticate_client()
            .withf(|_, id: &'_ str, secret: &'_ str| !(id == "cli" && secret == "s3cr=t"))
            .returning(|_, _, _| Err(OAuthClientProviderError::InvalidCredentials));
        client_mock
    }

    fn exchange_mock() -> MockTokenExchangeProvider {
        let mut token_exchange_mock = MockTokenExchangeProvider::default();
        token_exchange_mock
            .expect_exchange_token()
            .withf(|_, client: &OAuthClient, req: &TokenExchangeRequest| {
                client.id == "cli" && req.subject_token == "subject"
            })
            .returning(|_, _, _| {
                Ok(TokenResponse {
                    access_token: "issued".into(),
                    issued_token_type: TOKEN_TYPE_JWT.into(),
                    token_type: "bearer".into(),
                    expires_in: 3600,
                })
            });
        token_exchange_mock
    }

    fn exchange_form(extra: &str) -> String {
        format!(
            "grant_type={}&subject_token=subject&subject_token_type={}{extra}",
            url::form_urlencoded::byte_serialize(GRANT_TYPE_TOKEN_EXCHANGE.as_bytes())
                .collect::<String>(),
            url::form_urlencoded::byte_serialize(TOKEN_TYPE_JWT.as_bytes()).collect::<String>(),
        )
    }

    fn form_request(body: String, basic: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/token")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(basic) = basic {
            builder = builder.header(
                header::AUTHORIZATION,
                format!("Basic {}", STANDARD.encode(basic)),
            );
        }
        builder.body(Body::from(body)).unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    #[traced_test]
    async fn test_token_basic() {
        let state = get_memory_state(
            Provider::mocked_builder()
                .oauth_client(client_mock())
                .token_exchange(exchange_mock()),
        );
        let mut api = openapi_router().with_state(state);

        let response = api
            .as_service()
            .oneshot(form_request(exchange_form(""), Some("cli:s3cr%3Dt")))
            .await
            .unwrap();
        assert_eq!(StatusCode::OK, response.status());
        assert_eq!("no-store", response.headers()[header::CACHE_CONTROL]);
        assert_eq!(
            json!({
                "access_token": "issued",
                "issued_token_type": TOKEN_TYPE_JWT,
                "token_type": "bearer",
                "expires_in": 3600
            }),
            json_body(response).await
        );
    }

    #[tokio::test]
    async fn test_token_post() {
        let state = get_memory_state(
            Provider::mocked_builder()
                .oauth_client(client_mock())
                .token_exchange(exchange_mock()),
        );
        let mut api = openapi_router().with_state(state);

        let response = api
            .as_service()
            .oneshot(form_request(
                exchange_form("&client_id=cli&client_secret=s3cr%3Dt"),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(StatusCode::OK, response.status());
    }

    #[tokio::test]
    async fn test_token_client_authentication() {
        let mut token_exchange_mock = MockTokenExchangeProvider::default();
        token_exchange_mock.expect_exchange_token().never();
        let state = get_memory_state(
            Provider::mocked_builder()
                .oauth_client(client_mock())
                .token_exchange(token_exchange_mock),
        );
        let mut api = openapi_router().with_state(state);

        let response = api
            .as_service()
            .oneshot(form_request(exchange_form(""), Some("cli:wrong")))
            .await
            .unwrap();
        assert_eq!(StatusCode::UNAUTHORIZED, response.status());
        assert_eq!("invalid_client", json_body(response).await["error"]);

        let response = api
            .as_service()
            .oneshot(form_request(exchange_form(""), None))
            .await
            .unwrap();
        assert_eq!(StatusCode::UNAUTHORIZED, response.status());

        let response = api
            .as_service()
            .oneshot(form_request(
                exchange_form("&client_id=cli&client_secret=s3cr%3Dt"),
                Some("cli:s3cr%3Dt"),
            ))
            .await
            .unwrap();
        assert_eq!(StatusCode::BAD_REQUEST, response.status());
        assert_eq!("invalid_request", json_body(response).await["error"]);
    }

    #[tokio::test]
    async fn test_token_unsupported_grant() {
        let state = get_memory_state(Provider::mocked_builder().oauth_client(client_mock()));
        let mut api = openapi_router().with_state(state);

        let response = api
            .as_service()
            .oneshot(form_request(
                "grant_type=password&username=a&password=b".into(),
                Some("cli:s3cr%3Dt"),
            ))
            .await
            .unwrap();
        assert_eq!(StatusCode::BAD_REQUEST, response.status());
        assert_eq!("unsupported_grant_type", json_body(response).await["error"]);
    }

    #[tokio::test]
    async fn test_token_actor_token_rejected() {
        let mut token_exchange_mock = MockTokenExchangeProvider::default();
        token_exchange_mock.expect_exchange_token().never();
        let state = get_memory_state(
            Provider::mocked_builder()
                .oauth_client(client_mock())
                .token_exchange(token_exchange_mock),
        );
        let mut api = openapi_router().with_state(state);

        let response = api
            .as_service()
            .oneshot(form_request(
                exchange_form("&actor_token=actor"),
                Some("cli:s3cr%3Dt"),
            ))
            .await
            .unwrap();
        assert_eq!(StatusCode::BAD_REQUEST, response.status());
        assert_eq!(
            json!({"error": "invalid_request", "error_description": "delegation unsupported"}),
            json_body(response).await
        );
    }

    #[tokio::test]
    async fn test_token_server_error() {
        let mut token_exchange_mock = MockTokenExchangeProvider::default();
        token_exchange_mock.expect_exchange_token().returning(|_, _, _| {
            Err(TokenExchangeError::Signing {
                source: crate::keys::KeyProviderError::NoSigningKey,
            })
        });
        let state = get_memory_state(
            Provider::mocked_builder()
                .oauth_client(client_mock())
                .token_exchange(token_exchange_mock),
        );
        let mut api = openapi_router().with_state(state);

        let response = api
            .as_service()
            .oneshot(form_request(exchange_form(""), Some("cli:s3cr%3Dt")))
            .await
            .unwrap();
        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, response.status());
        assert_eq!("server_error", json_body(response).await["error"]);
    }

    #[tokio::test]
    async fn test_jwks() {
        let mut key_mock = MockKeyProvider::default();
        key_mock.expect_public_jwks().returning(|| JwkSet {
            keys: vec![Jwk {
                kty: "RSA".into(),
                kid: Some("k1".into()),
                n: Some("AQAB".into()),
                e: Some("AQAB".into()),
                ..Default::default()
            }],
        });
        let state = get_memory_state(Provider::mocked_builder().keys(key_mock));
        let mut api = openapi_router().with_state(state);

        let response = api
            .as_service()
            .oneshot(Request::builder().uri("/jwks.json").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(StatusCode::OK, response.status());
        assert_eq!(
            json!({"keys": [{"kty": "RSA", "kid": "k1", "n": "AQAB", "e": "AQAB"}]}),
            json_body(response).await
        );
    }

    #[tokio::test]
    async fn test_userinfo() {
        let state = get_memory_state(Provider::mocked_builder().keys(auth_key_mock()));
        let mut api = openapi_router().with_state(state);

        let response = api
            .as_service()
            .oneshot(json_request("GET", "/userinfo", None))
            .await
            .unwrap();
        assert_eq!(StatusCode::OK, response.status());
        assert_eq!("user", json_body(response).await["sub"]);

        let response = api
            .as_service()
            .oneshot(Request::builder().uri("/userinfo").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(StatusCode::UNAUTHORIZED, response.status());
    }
}
