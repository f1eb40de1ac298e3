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
//! # OAuth 2.0 token endpoint plumbing
//!
//! The token endpoint authenticates the client and dispatches the request to
//! the [`GrantHandler`] registered for the requested grant type. Only the
//! RFC 8693 token exchange grant is registered.
use async_trait::async_trait;

pub mod error;
pub mod types;

pub use error::OAuth2Error;
pub use types::{TokenRequest, TokenResponse};

use crate::oauth_client::types::OAuthClient;
use crate::service::ServiceState;

/// RFC 8693 token exchange grant type.
pub const GRANT_TYPE_TOKEN_EXCHANGE: &str = "urn:ietf:params:oauth:grant-type:token-exchange";

/// Token type of a JWT.
pub const TOKEN_TYPE_JWT: &str = "urn:ietf:params:oauth:token-type:jwt";

/// Handler of a single grant type.
#[async_trait]
pub trait GrantHandler: Send + Sync {
    /// Grant type served by the handler.
    fn grant_type(&self) -> &'static str;

    /// Serve the token request of the authenticated client.
    async fn handle(
        &self,
        state: &ServiceState,
        client: &OAuthClient,
        request: &TokenRequest,
    ) -> Result<TokenResponse, OAuth2Error>;
}

/// Grant handlers of the token endpoint.
pub struct GrantRegistry {
    handlers: Vec<Box<dyn GrantHandler>>,
}

impl GrantRegistry {
    pub fn new(handlers: Vec<Box<dyn GrantHandler>>) -> Self {
        Self { handlers }
    }

    /// Handler for the grant type.
    pub fn get(&self, grant_type: &str) -> Result<&dyn GrantHandler, OAuth2Error> {
        self.handlers
            .iter()
            .find(|x| x.grant_type() == grant_type)
            .map(|x| x.as_ref())
            .ok_or_else(|| OAuth2Error::UnsupportedGrantType(grant_type.into()))
    }

    pub fn grant_types(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|x| x.grant_type()).collect()
    }
}

impl Default for GrantRegistry {
    fn default() -> Self {
        Self::new(vec![Box::new(
            crate::token_exchange::grant::TokenExchangeGrant,
        )])
    }
}
