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
//! Token exchange over HTTP against the SQL storage.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::Utc;
use eyre::Result;
use http_body_util::BodyExt; // for `collect`
use httpmock::MockServer;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use tower::ServiceExt; // for `call`, `oneshot`, and `ready`
use tracing_test::traced_test;
use utoipa_axum::router::OpenApiRouter;

use token_exchange_sts::api;
use token_exchange_sts::issuer::{IssuerApi, types::IssuerCreateBuilder};
use token_exchange_sts::keys::local::LocalKey;
use token_exchange_sts::oauth_client::{OAuthClientApi, types::OAuthClientCreateBuilder};
use token_exchange_sts::oauth2::{GRANT_TYPE_TOKEN_EXCHANGE, TOKEN_TYPE_JWT, TokenResponse};
use token_exchange_sts::service::ServiceState;

use crate::common::{STS_ISSUER, fixture, get_state};

const IDP_KID: &str = "idp-1";

/// Identity provider publishing its key set on the mock server.
struct Idp {
    server: MockServer,
    encoding: EncodingKey,
}

impl Idp {
    fn start() -> Result<Self> {
        let pem = std::fs::read_to_string(fixture("idp_key.pem"))?;
        let public = LocalKey::from_pem(IDP_KID, Algorithm::RS256, &pem)?
            .public()
            .clone();
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method("GET").path("/jwks");
            then.status(200).json_body(json!({ "keys": [public] }));
        });
        Ok(Self {
            server,
            encoding: EncodingKey::from_rsa_pem(pem.as_bytes())?,
        })
    }

    fn uri(&self) -> String {
        self.server.base_url()
    }

    fn token(&self, claims: Value) -> Result<String> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(IDP_KID.into());
        Ok(jsonwebtoken::encode(&header, &claims, &self.encoding)?)
    }
}

async fn setup(idp: &Idp) -> Result<(ServiceState, Router, String)> {
    let state = get_state().await?;
    state
        .provider
        .get_issuer_provider()
        .create_issuer(
            &state,
            IssuerCreateBuilder::default()
                .owner_id("o1")
                .name("idp")
                .uri(idp.uri())
                .jwks_uri(idp.server.url("/jwks"))
                .claim_mappings(BTreeMap::from([
                    ("email".to_string(), "claims.email".to_string()),
                    ("sub_digest".to_string(), "subSHA256".to_string()),
                ]))
                .claim_conditions("claims.email_verified == true")
                .build()?,
        )
        .await?;
    let creds = state
        .provider
        .get_oauth_client_provider()
        .create_oauth_client(
            &state,
            OAuthClientCreateBuilder::default()
                .id("cli")
                .owner_id("o1")
                .name("service")
                .audience(vec!["api".to_string()])
                .build()?,
        )
        .await?;
    let (router, _api) = OpenApiRouter::with_openapi(api::openapi_doc())
        .merge(api::openapi_router())
        .split_for_parts();
    let secret = secrecy::ExposeSecret::expose_secret(&creds.secret).to_string();
    Ok((state.clone(), router.with_state(state), secret))
}

fn token_request(secret: &str, subject_token: &str, audience: &str) -> Result<Request<Body>> {
    let body = serde_urlencoded::to_string([
        ("grant_type", GRANT_TYPE_TOKEN_EXCHANGE),
        ("subject_token", subject_token),
        ("subject_token_type", TOKEN_TYPE_JWT),
        ("audience", audience),
    ])?;
    Ok(Request::builder()
        .method("POST")
        .uri("/token")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header(
            header::AUTHORIZATION,
            format!("Basic {}", STANDARD.encode(format!("cli:{secret}"))),
        )
        .body(Body::from(body))?)
}

async fn json_body(rsp: axum::response::Response) -> Result<Value> {
    let body = rsp.into_body().collect().await?.to_bytes();
    Ok(serde_json::from_slice(&body)?)
}

#[tokio::test]
#[traced_test]
async fn test_exchange() -> Result<()> {
    let idp = Idp::start()?;
    let (_state, app, secret) = setup(&idp).await?;
    let exp = Utc::now().timestamp() + 600;
    let subject_token = idp.token(json!({
        "iss": idp.uri(),
        "sub": "alice",
        "email": "alice@example.com",
        "email_verified": true,
        "exp": exp,
    }))?;

    let rsp = app
        .clone()
        .oneshot(token_request(&secret, &subject_token, "api")?)
        .await?;
    assert_eq!(StatusCode::OK, rsp.status());
    let issued: TokenResponse = serde_json::from_value(json_body(rsp).await?)?;
    assert_eq!(TOKEN_TYPE_JWT, issued.issued_token_type);
    assert_eq!("bearer", issued.token_type);

    // The issued token authenticates the caller of this service.
    let rsp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/userinfo")
                .header(
                    header::AUTHORIZATION,
                    format!("Bearer {}", issued.access_token),
                )
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(StatusCode::OK, rsp.status());
    let claims = json_body(rsp).await?;
    assert_eq!(json!("alice"), claims["sub"]);
    assert_eq!(json!(STS_ISSUER), claims["iss"]);
    assert_eq!(json!("cli"), claims["client_id"]);
    assert_eq!(json!("api"), claims["aud"]);
    assert_eq!(json!("alice@example.com"), claims["email"]);
    assert_eq!(
        json!("2bd806c97f0e00af1a1fc3328fa763a9269723c8db8fac4f93af71db186d6e90"),
        claims["sub_digest"]
    );

    let rsp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/groups")
                .header(
                    header::AUTHORIZATION,
                    format!("Bearer {}", issued.access_token),
                )
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({"group": {"owner_id": "o1", "name": "admins"}}).to_string(),
                ))?,
        )
        .await?;
    assert_eq!(StatusCode::CREATED, rsp.status());
    Ok(())
}

#[tokio::test]
#[traced_test]
async fn test_exchange_rejections() -> Result<()> {
    let idp = Idp::start()?;
    let (_state, app, secret) = setup(&idp).await?;
    let exp = Utc::now().timestamp() + 600;

    // Condition not satisfied.
    let subject_token = idp.token(json!({
        "iss": idp.uri(),
        "sub": "alice",
        "email": "alice@example.com",
        "email_verified": false,
        "exp": exp,
    }))?;
    let rsp = app
        .clone()
        .oneshot(token_request(&secret, &subject_token, "api")?)
        .await?;
    assert_eq!(StatusCode::BAD_REQUEST, rsp.status());
    assert_eq!(json!("invalid_request"), json_body(rsp).await?["error"]);

    // Audience not allowed for the client.
    let subject_token = idp.token(json!({
        "iss": idp.uri(),
        "sub": "alice",
        "email": "alice@example.com",
        "email_verified": true,
        "exp": exp,
    }))?;
    let rsp = app
        .clone()
        .oneshot(token_request(&secret, &subject_token, "other")?)
        .await?;
    assert_eq!(StatusCode::BAD_REQUEST, rsp.status());
    assert_eq!(json!("invalid_target"), json_body(rsp).await?["error"]);

    // Wrong client secret.
    let rsp = app
        .clone()
        .oneshot(token_request("wrong", &subject_token, "api")?)
        .await?;
    assert_eq!(StatusCode::UNAUTHORIZED, rsp.status());
    assert_eq!(json!("invalid_client"), json_body(rsp).await?["error"]);
    Ok(())
}
