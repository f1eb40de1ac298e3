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
//! # HTTP API
//!
//! The OAuth2 surface (`/token`, `/jwks`, `/userinfo` and the discovery
//! document) lives at the root. Tenant management lives under `/v1`.
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};
use utoipa_axum::router::OpenApiRouter;

use crate::service::ServiceState;
use crate::{group, issuer, oauth_client, user};

pub mod auth;
pub(crate) mod common;
pub mod discovery;
pub mod error;
pub mod token;

#[derive(OpenApi)]
#[openapi(
    info(title = "Token exchange STS", version = "1.0.0"),
    modifiers(&SecurityAddon),
    tags(
        (name="oauth2", description=r#"OAuth2 endpoints.

The token endpoint implements the RFC 8693 token exchange grant. Clients authenticate with the
client secret using either HTTP Basic or form parameters."#),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi
            .components
            .get_or_insert_with(Default::default)
            .add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Access token issued by this service"))
                        .build(),
                ),
            );
    }
}

/// OpenAPI document with the tags of every API area.
pub fn openapi_doc() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.merge(issuer::api::ApiDoc::openapi());
    doc.merge(group::api::ApiDoc::openapi());
    doc.merge(oauth_client::api::ApiDoc::openapi());
    doc.merge(user::api::ApiDoc::openapi());
    doc
}

pub fn openapi_router() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new()
        .merge(token::openapi_router())
        .merge(discovery::openapi_router())
        .nest(
            "/v1",
            OpenApiRouter::new()
                .nest("/issuers", issuer::api::openapi_router())
                .nest("/groups", group::api::openapi_router())
                .nest("/clients", oauth_client::api::openapi_router())
                .merge(user::api::openapi_router()),
        )
}
