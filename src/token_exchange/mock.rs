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
use async_trait::async_trait;
use mockall::mock;

use crate::config::Config;
use crate::oauth_client::types::OAuthClient;
use crate::oauth2::TokenResponse;
use crate::service::ServiceState;
use crate::token_exchange::TokenExchangeError;
use crate::token_exchange::types::{TokenExchangeApi, TokenExchangeRequest};

mock! {
    pub TokenExchangeProvider {
        pub fn new(cfg: &Config) -> Result<Self, TokenExchangeError>;
    }

    #[async_trait]
    impl TokenExchangeApi for TokenExchangeProvider {
        async fn exchange_token(
            &self,
            state: &ServiceState,
            client: &OAuthClient,
            request: &TokenExchangeRequest,
        ) -> Result<TokenResponse, TokenExchangeError>;
    }

    impl Clone for TokenExchangeProvider {
        fn clone(&self) -> Self;
    }
}
