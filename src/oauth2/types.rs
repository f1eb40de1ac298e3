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
//! # Token endpoint request and response
use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::oauth2::OAuth2Error;

/// Token request form.
///
/// Only `audience` may be repeated. Any other repeated parameter makes the
/// request invalid.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize, ToSchema)]
pub struct TokenRequest {
    pub grant_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_token_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_token_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_token_type: Option<String>,

    /// Requested audiences of the issued token.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub audience: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl TokenRequest {
    /// Parse the `application/x-www-form-urlencoded` body.
    pub fn from_form(body: &[u8]) -> Result<Self, OAuth2Error> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)
            .map_err(|_| OAuth2Error::InvalidRequest("malformed form body".into()))?;

        let mut req = Self::default();
        let mut grant_type = None;
        for (key, val) in pairs {
            let slot = match key.as_str() {
                "audience" => {
                    req.audience.push(val);
                    continue;
                }
                "grant_type" => &mut grant_type,
                "client_id" => &mut req.client_id,
                "client_secret" => &mut req.client_secret,
                "subject_token" => &mut req.subject_token,
                "subject_token_type" => &mut req.subject_token_type,
                "actor_token" => &mut req.actor_token,
                "actor_token_type" => &mut req.actor_token_type,
                "requested_token_type" => &mut req.requested_token_type,
                "scope" => &mut req.scope,
                _ => continue,
            };
            if slot.is_some() {
                return Err(OAuth2Error::InvalidRequest(format!(
                    "parameter {key} is repeated"
                )));
            }
            *slot = Some(val);
        }
        req.grant_type = grant_type
            .filter(|x| !x.is_empty())
            .ok_or_else(|| OAuth2Error::InvalidRequest("grant_type is required".into()))?;
        Ok(req)
    }
}

/// Successful token response.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, ToSchema)]
pub struct TokenResponse {
    /// The issued token.
    pub access_token: String,

    /// Type of the issued token.
    pub issued_token_type: String,

    /// How the issued token is used.
    pub token_type: String,

    /// Lifetime of the issued token in seconds.
    pub expires_in: u64,
}

impl IntoResponse for TokenResponse {
    fn into_response(self) -> Response {
        let mut response = (StatusCode::OK, Json(self)).into_response();
        response
            .headers_mut()
            .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
        response
    }
}
