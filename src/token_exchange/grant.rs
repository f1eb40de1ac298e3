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
//! Token exchange grant of the token endpoint.
use async_trait::async_trait;

use crate::oauth_client::types::OAuthClient;
use crate::oauth2::{GRANT_TYPE_TOKEN_EXCHANGE, GrantHandler, OAuth2Error, TokenRequest, TokenResponse};
use crate::service::ServiceState;
use crate::token_exchange::{TokenExchangeApi, TokenExchangeRequest};

/// Dispatches the token exchange grant to the token exchange provider.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokenExchangeGrant;

#[async_trait]
impl GrantHandler for TokenExchangeGrant {
    fn grant_type(&self) -> &'static str {
        GRANT_TYPE_TOKEN_EXCHANGE
    }

    async fn handle(
        &self,
        state: &ServiceState,
        client: &OAuthClient,
        request: &TokenRequest,
    ) -> Result<TokenResponse, OAuth2Error> {
        let request = TokenExchangeRequest::try_from(request)?;
        Ok(state
            .provider
            .get_token_exchange_provider()
            .exchange_token(state, client, &request)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth2::TOKEN_TYPE_JWT;
    use crate::provider::Provider;
    use crate::tests::get_memory_state;
    use crate::token_exchange::{MockTokenExchangeProvider, TokenExchangeError};

    #[tokio::test]
    async fn test_handle() {
        let mut token_exchange_mock = MockTokenExchangeProvider::default();
        token_exchange_mock
            .expect_exchange_token()
            .withf(|_, client: &OAuthClient, req: &TokenExchangeRequest| {
                client.id == "c" && req.subject_token == "t"
            })
            .returning(|_, _, _| {
                Ok(TokenResponse {
                    access_token: "issued".into(),
                    issued_token_type: TOKEN_TYPE_JWT.into(),
                    token_type: "bearer".into(),
                    expires_in: 10,
                })
            });
        let state =
            get_memory_state(Provider::mocked_builder().token_exchange(token_exchange_mock));
        let client = OAuthClient {
            id: "c".into(),
            ..Default::default()
        };

        let rsp = TokenExchangeGrant
            .handle(
                &state,
                &client,
                &TokenRequest {
                    grant_type: GRANT_TYPE_TOKEN_EXCHANGE.into(),
                    subject_token: Some("t".into()),
                    subject_token_type: Some(TOKEN_TYPE_JWT.into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!("issued", rsp.access_token);
    }

    #[tokio::test]
    async fn test_handle_delegation_rejected() {
        let mut token_exchange_mock = MockTokenExchangeProvider::default();
        token_exchange_mock.expect_exchange_token().never();
        let state =
            get_memory_state(Provider::mocked_builder().token_exchange(token_exchange_mock));

        let err = TokenExchangeGrant
            .handle(
                &state,
                &OAuthClient::default(),
                &TokenRequest {
                    grant_type: GRANT_TYPE_TOKEN_EXCHANGE.into(),
                    subject_token: Some("t".into()),
                    subject_token_type: Some(TOKEN_TYPE_JWT.into()),
                    actor_token: Some("a".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(
            OAuth2Error::from(TokenExchangeError::ActorTokenUnsupported),
            err
        );
    }
}
