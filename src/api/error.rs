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
//! # Management API error.
use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::group::GroupProviderError;
use crate::issuer::IssuerProviderError;
use crate::oauth_client::OAuthClientProviderError;
use crate::policy::PolicyError;
use crate::storage::StorageError;
use crate::user::UserProviderError;

/// Management API operation errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("could not find {resource}: {identifier}")]
    NotFound {
        resource: String,
        identifier: String,
    },

    #[error("{0}.")]
    BadRequest(String),

    #[error("{}", .0.clone().unwrap_or("The request you have made requires authentication.".to_string()))]
    Unauthorized(Option<String>),

    #[error("{0}")]
    Forbidden(String),

    #[error("internal server error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Group { source: GroupProviderError },

    #[error(transparent)]
    Issuer { source: IssuerProviderError },

    #[error(transparent)]
    OAuthClient { source: OAuthClientProviderError },

    #[error(transparent)]
    Policy { source: PolicyError },

    #[error(transparent)]
    Storage { source: StorageError },

    #[error(transparent)]
    User { source: UserProviderError },

    #[error(transparent)]
    Serde {
        #[from]
        source: serde_json::Error,
    },

    #[error(transparent)]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error(transparent)]
    QueryExtractorRejection(#[from] QueryRejection),

    /// Request validation error.
    #[error("request validation failed: {source}")]
    Validator {
        /// The source of the error.
        #[from]
        source: validator::ValidationErrors,
    },
}

impl ApiError {
    pub fn not_found<R: Into<String>, I: Into<String>>(resource: R, identifier: I) -> Self {
        Self::NotFound {
            resource: resource.into(),
            identifier: identifier.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest(..)
            | ApiError::Serde { .. }
            | ApiError::JsonExtractorRejection(..)
            | ApiError::QueryExtractorRejection(..)
            | ApiError::Validator { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(..) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(..) => StatusCode::FORBIDDEN,
            ApiError::InternalError(_)
            | ApiError::Group { .. }
            | ApiError::Issuer { .. }
            | ApiError::OAuthClient { .. }
            | ApiError::Policy { .. }
            | ApiError::Storage { .. }
            | ApiError::User { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = self.status();
        if status_code.is_server_error() {
            error!("Error happened during request processing: {:#?}", self);
        }
        // Internal details are not exposed to the caller.
        let message = if status_code.is_server_error() {
            "The server encountered an unexpected error.".to_string()
        } else {
            self.to_string()
        };

        (
            status_code,
            Json(json!({"error": {"code": status_code.as_u16(), "message": message}})),
        )
            .into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(value: StorageError) -> Self {
        match value {
            StorageError::GroupNotFound(x) => Self::not_found("group", x),
            StorageError::IssuerNotFound(x) => Self::not_found("issuer", x),
            StorageError::OAuthClientNotFound(x) => Self::not_found("client", x),
            StorageError::UserNotFound(x) => Self::not_found("user", x),
            StorageError::MemberNotFound { member_id, .. } => Self::not_found("member", member_id),
            StorageError::NameConflict(x) => Self::Conflict(format!("{x} is already in use")),
            StorageError::GroupNotEmpty(x) => Self::Conflict(format!("group {x} is not empty")),
            StorageError::Pagination { source } => Self::BadRequest(source.to_string()),
            other => Self::Storage { source: other },
        }
    }
}

impl From<GroupProviderError> for ApiError {
    fn from(value: GroupProviderError) -> Self {
        match value {
            GroupProviderError::GroupNotFound(x) => Self::not_found("group", x),
            GroupProviderError::MemberNotFound { member_id, .. } => {
                Self::not_found("member", member_id)
            }
            GroupProviderError::GroupNotEmpty(_) | GroupProviderError::NameConflict(_) => {
                Self::Conflict(value.to_string())
            }
            GroupProviderError::InvalidMember { .. } => Self::BadRequest(value.to_string()),
            GroupProviderError::Storage { source } => source.into(),
            other => Self::Group { source: other },
        }
    }
}

impl From<IssuerProviderError> for ApiError {
    fn from(value: IssuerProviderError) -> Self {
        match value {
            IssuerProviderError::IssuerNotFound(x) => Self::not_found("issuer", x),
            IssuerProviderError::UriConflict(_) => Self::Conflict(value.to_string()),
            IssuerProviderError::ExpressionParse { .. } | IssuerProviderError::InvalidIssuer(_) => {
                Self::BadRequest(value.to_string())
            }
            IssuerProviderError::Storage { source } => source.into(),
            other => Self::Issuer { source: other },
        }
    }
}

impl From<OAuthClientProviderError> for ApiError {
    fn from(value: OAuthClientProviderError) -> Self {
        match value {
            OAuthClientProviderError::OAuthClientNotFound(x) => Self::not_found("client", x),
            OAuthClientProviderError::Storage { source } => source.into(),
            other => Self::OAuthClient { source: other },
        }
    }
}

impl From<UserProviderError> for ApiError {
    fn from(value: UserProviderError) -> Self {
        match value {
            UserProviderError::IssuerNotFound(x) => Self::not_found("issuer", x),
            UserProviderError::UserNotFound(x) => Self::not_found("user", x),
            UserProviderError::Storage { source } => source.into(),
        }
    }
}

impl From<PolicyError> for ApiError {
    fn from(value: PolicyError) -> Self {
        match value {
            PolicyError::Forbidden(_) => Self::Forbidden(value.to_string()),
            other => Self::Policy { source: other },
        }
    }
}
