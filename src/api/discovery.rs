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
//! # Discovery document
//!
//! `GET /.well-known/openid-configuration` advertises the endpoints of the
//! service. The base url is the configured public endpoint. Without one it is
//! derived from the request, honoring the `X-Forwarded-Proto` and
//! `X-Forwarded-Host` headers only when the peer is a trusted proxy.
use axum::{
    Json,
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderMap, Request, header::HOST},
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tracing::debug;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::api::token::GRANTS;
use crate::config::Config;
use crate::service::ServiceState;

pub(crate) fn openapi_router() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new().routes(routes!(configuration))
}

/// OpenID provider metadata.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, ToSchema)]
pub struct DiscoveryDocument {
    pub issuer: String,
    pub token_endpoint: String,
    pub jwks_uri: String,
    pub userinfo_endpoint: String,
    pub grant_types_supported: Vec<String>,
    pub token_endpoint_auth_methods_supported: Vec<String>,
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|x| x.to_str().ok())
        // Only the first entry of a proxy chain is relevant.
        .and_then(|x| x.split(',').next())
        .map(str::trim)
        .filter(|x| !x.is_empty())
}

/// Base url the clients reach the service at.
pub(crate) fn base_url(config: &Config, headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    if let Some(endpoint) = config.public_endpoint() {
        return endpoint;
    }
    let trusted = peer.is_some_and(|addr| config.discovery.trusted_proxies.contains(&addr.ip()));
    if trusted && let Some(host) = header_str(headers, "x-forwarded-host") {
        let proto = header_str(headers, "x-forwarded-proto").unwrap_or("http");
        return format!("{proto}://{host}");
    }
    if !trusted && headers.contains_key("x-forwarded-host") {
        debug!("ignoring forwarded headers of an untrusted peer {peer:?}");
    }
    match header_str(headers, HOST.as_str()) {
        Some(host) => format!("http://{host}"),
        None => config.token.issuer.trim_end_matches('/').to_string(),
    }
}

/// OpenID provider configuration.
#[utoipa::path(
    get,
    path = "/.well-known/openid-configuration",
    operation_id = "/discovery:show",
    responses(
        (status = OK, description = "Provider metadata", body = DiscoveryDocument),
    ),
    tag = "oauth2"
)]
#[tracing::instrument(name = "api::discovery", level = "debug", skip_all)]
pub(super) async fn configuration(
    State(state): State<ServiceState>,
    request: Request<Body>,
) -> Json<DiscoveryDocument> {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let base = base_url(&state.config, request.headers(), peer);
    Json(DiscoveryDocument {
        issuer: state.config.token.issuer.clone(),
        token_endpoint: format!("{base}/token"),
        jwks_uri: format!("{base}/jwks.json"),
        userinfo_endpoint: format!("{base}/userinfo"),
        grant_types_supported: GRANTS.grant_types().into_iter().map(Into::into).collect(),
        token_endpoint_auth_methods_supported: vec![
            "client_secret_basic".into(),
            "client_secret_post".into(),
        ],
    })
}
