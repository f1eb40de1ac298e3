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
//! # User provider
//!
//! External identities observed through the registered issuers. A user is
//! keyed by the issuer and the `sub` claim it asserts. The ID is derived from
//! both with the global HMAC secret so that it is stable across the
//! deployments sharing the secret, and random when no secret is configured.
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use uuid::Uuid;

pub mod api;
pub mod error;
#[cfg(test)]
mod mock;
pub mod types;

use crate::config::Config;
use crate::pagination::{Page, PageRequest};
use crate::service::ServiceState;

pub use error::UserProviderError;
#[cfg(test)]
pub use mock::MockUserProvider;
pub use types::UserApi;
use types::{UserInfo, UserInfoCreate};

type HmacSha256 = Hmac<Sha256>;

#[derive(Clone, Debug, Default)]
pub struct UserProvider {
    hmac_secret: Option<SecretString>,
}

impl UserProvider {
    pub fn new(config: &Config) -> Result<Self, UserProviderError> {
        Ok(Self {
            hmac_secret: config.token.hmac_secret.clone(),
        })
    }

    /// ID of the user with the given issuer and subject.
    pub fn user_id(&self, issuer_id: &str, subject: &str) -> String {
        self.hmac_secret
            .as_ref()
            .and_then(|secret| HmacSha256::new_from_slice(secret.expose_secret().as_bytes()).ok())
            .map(|mut mac| {
                mac.update(issuer_id.as_bytes());
                mac.update(b"\0");
                mac.update(subject.as_bytes());
                hex::encode(mac.finalize().into_bytes())
            })
            .unwrap_or_else(|| Uuid::new_v4().simple().to_string())
    }
}

#[async_trait]
impl UserApi for UserProvider {
    #[tracing::instrument(level = "info", skip(self, state))]
    async fn find_user_info<'a>(
        &self,
        state: &ServiceState,
        issuer_id: &'a str,
        subject: &'a str,
    ) -> Result<Option<UserInfo>, UserProviderError> {
        Ok(state
            .storage
            .get_user_info_by_claims(None, issuer_id, subject)
            .await?)
    }

    #[tracing::instrument(level = "info", skip(self, state))]
    async fn get_user_info<'a>(
        &self,
        state: &ServiceState,
        id: &'a str,
    ) -> Result<Option<UserInfo>, UserProviderError> {
        Ok(state.storage.get_user_info(None, id).await?)
    }

    #[tracing::instrument(level = "info", skip(self, state))]
    async fn get_user_owner_id<'a>(
        &self,
        state: &ServiceState,
        id: &'a str,
    ) -> Result<Option<String>, UserProviderError> {
        Ok(state.storage.get_user_owner_id(None, id).await?)
    }

    #[tracing::instrument(level = "info", skip(self, state))]
    async fn list_user_info<'a>(
        &self,
        state: &ServiceState,
        issuer_id: &'a str,
        page: &PageRequest,
    ) -> Result<Page<UserInfo>, UserProviderError> {
        Ok(state.storage.list_user_info(None, issuer_id, page).await?)
    }

    /// Insert or update the user. An existing user keeps its ID.
    #[tracing::instrument(level = "info", skip(self, state))]
    async fn store_user_info(
        &self,
        state: &ServiceState,
        user: UserInfoCreate,
    ) -> Result<UserInfo, UserProviderError> {
        let user = UserInfo {
            id: self.user_id(&user.issuer_id, &user.subject),
            issuer_id: user.issuer_id,
            subject: user.subject,
            name: user.name,
            email: user.email,
        };
        let mut txn = state.storage.begin().await?;
        let res = state
            .storage
            .store_user_info(&mut txn, user)
            .await
            .map_err(Into::into);
        txn.finish(res).await
    }
}
