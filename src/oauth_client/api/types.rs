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
//! OAuth client API types.
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::oauth_client::types;

/// OAuth client allowed to call the token endpoint.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize, ToSchema)]
pub struct OAuthClient {
    pub id: String,

    /// Tenant owning the client.
    pub owner_id: String,

    pub name: String,

    /// Audiences the client may request.
    pub audience: Vec<String>,
}

/// OAuth client response.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, ToSchema)]
pub struct OAuthClientResponse {
    pub client: OAuthClient,
}

/// Registered client with its secret. The secret is never returned again.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, ToSchema)]
pub struct OAuthClientCreateResponse {
    pub client: OAuthClient,
    pub client_secret: String,
}

/// New OAuth client data.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize, ToSchema, Validate)]
pub struct OAuthClientCreate {
    /// Optional client ID. Generated when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(nullable = false)]
    #[validate(length(min = 1, max = 64))]
    pub id: Option<String>,

    #[validate(length(min = 1, max = 64))]
    pub owner_id: String,

    #[validate(length(min = 1, max = 255))]
    pub name: String,

    #[serde(default)]
    #[validate(length(max = 100))]
    pub audience: Vec<String>,
}

/// OAuth client create request.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, ToSchema, Validate)]
pub struct OAuthClientCreateRequest {
    #[validate(nested)]
    pub client: OAuthClientCreate,
}

impl From<types::OAuthClient> for OAuthClient {
    fn from(value: types::OAuthClient) -> Self {
        Self {
            id: value.id,
            owner_id: value.owner_id,
            name: value.name,
            audience: value.audience,
        }
    }
}

impl From<OAuthClientCreateRequest> for types::OAuthClientCreate {
    fn from(value: OAuthClientCreateRequest) -> Self {
        Self {
            id: value.client.id,
            owner_id: value.client.owner_id,
            name: value.client.name,
            audience: value.client.audience,
        }
    }
}

impl IntoResponse for types::OAuthClient {
    fn into_response(self) -> Response {
        (
            StatusCode::OK,
            Json(OAuthClientResponse {
                client: OAuthClient::from(self),
            }),
        )
            .into_response()
    }
}

impl IntoResponse for types::OAuthClientCredentials {
    fn into_response(self) -> Response {
        (
            StatusCode::CREATED,
            Json(OAuthClientCreateResponse {
                client_secret: self.secret.expose_secret().to_string(),
                client: OAuthClient::from(self.client),
            }),
        )
            .into_response()
    }
}
