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
//! # OAuth client provider
//!
//! The OAuth clients allowed to call the token endpoint. The client secret is
//! generated on registration, returned exactly once and only its bcrypt hash
//! is stored.
use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

pub mod api;
pub mod error;
#[cfg(test)]
mod mock;
pub mod secret;
pub mod types;

use crate::config::Config;
use crate::service::ServiceState;

pub use error::OAuthClientProviderError;
#[cfg(test)]
pub use mock::MockOAuthClientProvider;
pub use types::{ClientStore, OAuthClientApi};
use types::{OAuthClient, OAuthClientCreate, OAuthClientCredentials};

#[derive(Clone, Debug)]
pub struct OAuthClientProvider {
    /// bcrypt cost of the secret hashes.
    hash_cost: u32,
}

impl Default for OAuthClientProvider {
    fn default() -> Self {
        Self {
            hash_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl OAuthClientProvider {
    pub fn new(_config: &Config) -> Result<Self, OAuthClientProviderError> {
        Ok(Self::default())
    }
}

#[async_trait]
impl ClientStore for OAuthClientProvider {
    /// Unknown clients and wrong secrets are indistinguishable for the
    /// caller.
    #[tracing::instrument(level = "info", skip(self, state, secret))]
    async fn authenticate_client<'a>(
        &self,
        state: &ServiceState,
        client_id: &'a str,
        secret: &'a str,
    ) -> Result<OAuthClient, OAuthClientProviderError> {
        let Some(client) = state.storage.get_oauth_client(None, client_id).await? else {
            debug!("unknown oauth client");
            return Err(OAuthClientProviderError::InvalidCredentials);
        };
        if !secret::verify_secret(secret, &client.secret_hash).await? {
            debug!("oauth client secret mismatch");
            return Err(OAuthClientProviderError::InvalidCredentials);
        }
        Ok(client)
    }
}

#[async_trait]
impl OAuthClientApi for OAuthClientProvider {
    #[tracing::instrument(level = "info", skip(self, state))]
    async fn create_oauth_client(
        &self,
        state: &ServiceState,
        client: OAuthClientCreate,
    ) -> Result<OAuthClientCredentials, OAuthClientProviderError> {
        let secret = secret::generate_secret();
        let client = OAuthClient {
            id: client
                .id
                .unwrap_or_else(|| Uuid::new_v4().simple().to_string()),
            owner_id: client.owner_id,
            name: client.name,
            secret_hash: secret::hash_secret(&secret, self.hash_cost).await?,
            audience: client.audience,
        };
        let mut txn = state.storage.begin().await?;
        let res = state
            .storage
            .create_oauth_client(&mut txn, client)
            .await
            .map_err(OAuthClientProviderError::from);
        let client = txn.finish(res).await?;
        Ok(OAuthClientCredentials { client, secret })
    }

    #[tracing::instrument(level = "info", skip(self, state))]
    async fn delete_oauth_client<'a>(
        &self,
        state: &ServiceState,
        id: &'a str,
    ) -> Result<(), OAuthClientProviderError> {
        let mut txn = state.storage.begin().await?;
        let res = state
            .storage
            .delete_oauth_client(&mut txn, id)
            .await
            .map_err(Into::into);
        txn.finish(res).await
    }

    #[tracing::instrument(level = "info", skip(self, state))]
    async fn get_oauth_client<'a>(
        &self,
        state: &ServiceState,
        id: &'a str,
    ) -> Result<Option<OAuthClient>, OAuthClientProviderError> {
        Ok(state.storage.get_oauth_client(None, id).await?)
    }
}
