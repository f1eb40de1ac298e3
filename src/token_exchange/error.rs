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
//! # Token exchange errors
use thiserror::Error;

use crate::issuer::IssuerProviderError;
use crate::keys::KeyProviderError;
use crate::oauth2::OAuth2Error;

/// Token exchange error.
#[derive(Error, Debug)]
pub enum TokenExchangeError {
    /// Delegation through an actor token is not supported.
    #[error("delegation unsupported")]
    ActorTokenUnsupported,

    /// The subject token claims are not admitted by the issuer condition.
    #[error("claims condition not satisfied")]
    ConditionNotSatisfied,

    /// Claim mapping failed.
    #[error("claim mapping failed: {source}")]
    ClaimMapping {
        /// The source of the error.
        source: IssuerProviderError,
    },

    /// Requested audience is not allowed for the client.
    #[error("audience {0} is not allowed for the client")]
    InvalidTarget(String),

    /// Required request parameter is missing.
    #[error("{0} is required")]
    MissingParameter(&'static str),

    /// Signing of the issued token failed.
    #[error("signing of the issued token failed: {source}")]
    Signing {
        /// The source of the error.
        source: KeyProviderError,
    },

    /// Subject token verification failed.
    #[error("invalid subject token: {source}")]
    SubjectToken {
        /// The source of the error.
        source: KeyProviderError,
    },

    /// Subject token type is not supported.
    #[error("subject token type {0} is not supported")]
    UnsupportedTokenType(String),
}

impl TokenExchangeError {
    /// Whether the failure is caused by the service infrastructure rather
    /// than the request. Such requests may be retried by the client.
    pub fn is_server_error(&self) -> bool {
        match self {
            Self::SubjectToken { source } => source.is_server_error(),
            Self::ClaimMapping { source } => matches!(source, IssuerProviderError::Storage { .. }),
            Self::Signing { .. } => true,
            _ => false,
        }
    }
}

impl From<TokenExchangeError> for OAuth2Error {
    fn from(value: TokenExchangeError) -> Self {
        if value.is_server_error() {
            tracing::error!("token exchange failed: {:?}", value);
            return OAuth2Error::ServerError("temporary failure, please retry".into());
        }
        match value {
            TokenExchangeError::InvalidTarget(_) => OAuth2Error::InvalidTarget(value.to_string()),
            other => OAuth2Error::InvalidRequest(other.to_string()),
        }
    }
}
