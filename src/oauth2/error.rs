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
//! # OAuth 2.0 token endpoint errors
//!
//! Rendered as the RFC 6749 section 5.2 error response.
use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};
use utoipa::ToSchema;

/// Token endpoint error.
#[derive(Debug, Error, PartialEq)]
pub enum OAuth2Error {
    /// The request is missing a parameter, repeats one, or is otherwise
    /// malformed.
    #[error("{0}")]
    InvalidRequest(String),

    /// Client authentication failed.
    #[error("{0}")]
    InvalidClient(String),

    /// The provided grant is invalid or expired.
    #[error("{0}")]
    InvalidGrant(String),

    /// The client is not allowed to use the grant type.
    #[error("{0}")]
    UnauthorizedClient(String),

    #[error("grant type {0} is not supported")]
    UnsupportedGrantType(String),

    /// The requested audience is not allowed for the client.
    #[error("{0}")]
    InvalidTarget(String),

    /// Unexpected condition prevented the request fulfillment. The client may
    /// retry.
    #[error("{0}")]
    ServerError(String),
}

/// Error body.
#[derive(Debug, Serialize, ToSchema)]
pub struct OAuth2ErrorBody {
    /// Error code.
    pub error: &'static str,
    /// Human readable hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

impl OAuth2Error {
    /// RFC 6749 error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request",
            Self::InvalidClient(_) => "invalid_client",
            Self::InvalidGrant(_) => "invalid_grant",
            Self::UnauthorizedClient(_) => "unauthorized_client",
            Self::UnsupportedGrantType(_) => "unsupported_grant_type",
            Self::InvalidTarget(_) => "invalid_target",
            Self::ServerError(_) => "server_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidClient(_) => StatusCode::UNAUTHORIZED,
            Self::ServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    pub fn body(&self) -> OAuth2ErrorBody {
        let description = self.to_string();
        OAuth2ErrorBody {
            error: self.code(),
            error_description: (!description.is_empty()).then_some(description),
        }
    }
}

impl IntoResponse for OAuth2Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("token request failed: {:?}", self);
        } else {
            info!(error = self.code(), "token request rejected: {}", self);
        }
        let mut response = (status, Json(self.body())).into_response();
        let headers = response.headers_mut();
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
        if matches!(self, Self::InvalidClient(_)) {
            headers.insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Basic realm=\"token\""),
            );
        }
        response
    }
}
