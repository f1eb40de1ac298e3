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
//! # Provider manager
//!
//! Provider manager gives access to the individual service providers. It is
//! passed down to the providers that need to call other providers and allows
//! an easy injection of the mocked providers.
use derive_builder::Builder;
use mockall_double::double;

use crate::config::Config;
use crate::error::StsError;
use crate::group::GroupApi;
#[double]
use crate::group::GroupProvider;
use crate::issuer::IssuerApi;
#[double]
use crate::issuer::IssuerProvider;
use crate::keys::KeyApi;
#[double]
use crate::keys::KeyProvider;
use crate::oauth_client::OAuthClientApi;
#[double]
use crate::oauth_client::OAuthClientProvider;
use crate::token_exchange::TokenExchangeApi;
#[double]
use crate::token_exchange::TokenExchangeProvider;
use crate::user::UserApi;
#[double]
use crate::user::UserProvider;

/// Global provider manager.
#[derive(Builder, Clone)]
// The owned pattern avoids the builder cloning the mocks.
#[builder(pattern = "owned")]
pub struct Provider {
    /// Configuration.
    pub config: Config,
    /// Group provider.
    group: GroupProvider,
    /// Issuer provider.
    issuer: IssuerProvider,
    /// Key provider.
    keys: KeyProvider,
    /// OAuth client provider.
    oauth_client: OAuthClientProvider,
    /// Token exchange provider.
    token_exchange: TokenExchangeProvider,
    /// User provider.
    user: UserProvider,
}

impl Provider {
    pub fn new(cfg: Config) -> Result<Self, StsError> {
        let group_provider = GroupProvider::new(&cfg)?;
        let issuer_provider = IssuerProvider::new(&cfg)?;
        let key_provider = KeyProvider::new(&cfg)?;
        let oauth_client_provider = OAuthClientProvider::new(&cfg)?;
        let token_exchange_provider = TokenExchangeProvider::new(&cfg)?;
        let user_provider = UserProvider::new(&cfg)?;

        Ok(Self {
            config: cfg,
            group: group_provider,
            issuer: issuer_provider,
            keys: key_provider,
            oauth_client: oauth_client_provider,
            token_exchange: token_exchange_provider,
            user: user_provider,
        })
    }

    /// Get the group provider.
    pub fn get_group_provider(&self) -> &impl GroupApi {
        &self.group
    }

    /// Get the issuer provider.
    pub fn get_issuer_provider(&self) -> &impl IssuerApi {
        &self.issuer
    }

    /// Get the key provider.
    pub fn get_key_provider(&self) -> &impl KeyApi {
        &self.keys
    }

    /// Get the OAuth client provider.
    pub fn get_oauth_client_provider(&self) -> &impl OAuthClientApi {
        &self.oauth_client
    }

    /// Get the token exchange provider.
    pub fn get_token_exchange_provider(&self) -> &impl TokenExchangeApi {
        &self.token_exchange
    }

    /// Get the user provider.
    pub fn get_user_provider(&self) -> &impl UserApi {
        &self.user
    }
}

#[cfg(test)]
impl Provider {
    pub fn mocked_builder() -> ProviderBuilder {
        let config = Config::default();
        let group_mock = crate::group::MockGroupProvider::default();
        let issuer_mock = crate::issuer::MockIssuerProvider::default();
        let key_mock = crate::keys::MockKeyProvider::default();
        let oauth_client_mock = crate::oauth_client::MockOAuthClientProvider::default();
        let token_exchange_mock = crate::token_exchange::MockTokenExchangeProvider::default();
        let user_mock = crate::user::MockUserProvider::default();

        ProviderBuilder::default()
            .config(config.clone())
            .group(group_mock)
            .issuer(issuer_mock)
            .keys(key_mock)
            .oauth_client(oauth_client_mock)
            .token_exchange(token_exchange_mock)
            .user(user_mock)
    }
}
