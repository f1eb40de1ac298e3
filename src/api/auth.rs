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
//! # Bearer authentication
//!
//! The management API and the user info endpoint accept the access tokens
//! minted by this service only.
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use serde_json::Value;
use tracing::debug;

use crate::api::error::ApiError;
use crate::issuer::types::JsonClaims;
use crate::keys::SigningKeyProvider;
use crate::service::ServiceState;

/// Authenticated caller.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Principal {
    /// Subject of the access token.
    pub sub: String,
    /// Client the access token was issued to.
    pub client_id: Option<String>,
    /// All the claims of the access token.
    pub claims: JsonClaims,
}

impl TryFrom<JsonClaims> for Principal {
    type Error = ApiError;

    fn try_from(claims: JsonClaims) -> Result<Self, Self::Error> {
        let sub = claims
            .get("sub")
            .and_then(Value::as_str)
            .filter(|x| !x.is_empty())
            .ok_or_else(|| ApiError::Unauthorized(Some("The token has no subject.".into())))?
            .to_string();
        let client_id = claims
            .get("client_id")
            .and_then(Value::as_str)
            .map(Into::into);
        Ok(Self {
            sub,
            client_id,
            claims,
        })
    }
}

/// Bearer token of the `Authorization` header.
pub(crate) fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    let value = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or(ApiError::Unauthorized(None))?
        .to_str()
        .map_err(|_| ApiError::Unauthorized(Some("Malformed authorization header.".into())))?;
    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() => {
            Ok(token.trim())
        }
        _ => Err(ApiError::Unauthorized(Some(
            "Bearer authorization is required.".into(),
        ))),
    }
}

/// Extractor of the authenticated caller.
#[derive(Debug, Clone)]
pub struct Auth(pub Principal);

impl FromRequestParts<ServiceState> for Auth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServiceState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = state
            .provider
            .get_key_provider()
            .verify_access_token(token, &state.config.token.issuer)
            .map_err(|err| {
                debug!("access token rejected: {err}");
                ApiError::Unauthorized(Some("The access token is invalid.".into()))
            })?;
        Ok(Self(Principal::try_from(claims)?))
    }
}
