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
//! # Token exchange types
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::oauth_client::types::OAuthClient;
use crate::oauth2::{TokenRequest, TokenResponse};
use crate::service::ServiceState;
use crate::token_exchange::TokenExchangeError;

/// Validated token exchange request.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct TokenExchangeRequest {
    /// Token issued by the external identity provider.
    pub subject_token: String,

    /// Type of the subject token.
    pub subject_token_type: String,

    /// Requested audiences.
    pub audience: Vec<String>,
}

impl TryFrom<&TokenRequest> for TokenExchangeRequest {
    type Error = TokenExchangeError;

    fn try_from(value: &TokenRequest) -> Result<Self, Self::Error> {
        if value.actor_token.as_ref().is_some_and(|x| !x.is_empty()) {
            return Err(TokenExchangeError::ActorTokenUnsupported);
        }
        let subject_token = value
            .subject_token
            .clone()
            .filter(|x| !x.is_empty())
            .ok_or(TokenExchangeError::MissingParameter("subject_token"))?;
        let subject_token_type = value
            .subject_token_type
            .clone()
            .filter(|x| !x.is_empty())
            .ok_or(TokenExchangeError::MissingParameter("subject_token_type"))?;
        Ok(Self {
            subject_token,
            subject_token_type,
            audience: value.audience.clone(),
        })
    }
}

#[async_trait]
pub trait TokenExchangeApi: Send + Sync {
    /// Exchange the subject token for the token asserting the mapped
    /// identity of the subject.
    async fn exchange_token(
        &self,
        state: &ServiceState,
        client: &OAuthClient,
        request: &TokenExchangeRequest,
    ) -> Result<TokenResponse, TokenExchangeError>;
}
