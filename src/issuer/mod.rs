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
//! # Issuer provider
//!
//! Issuers are the external identity providers a tenant trusts. Each one is
//! identified by the `iss` claim of the tokens it mints and publishes the key
//! set used to verify them.
//!
//! ## Claim mappings
//!
//! Every issuer carries the named expressions computing the claims of the
//! exchanged token and an optional condition gating the admission of the
//! subject token. Both are compiled when the issuer is created or updated, so
//! that no invalid expression is ever persisted. They are evaluated against
//! the `claims` of the verified subject token and the `subSHA256` digest of
//! its subject.
use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

pub mod api;
pub mod error;
pub mod mapping;
#[cfg(test)]
mod mock;
pub mod types;

use crate::config::Config;
use crate::pagination::{Page, PageRequest};
use crate::service::ServiceState;

pub use error::IssuerProviderError;
#[cfg(test)]
pub use mock::MockIssuerProvider;
pub use types::{ClaimsMapper, IssuerApi};
use types::{Issuer, IssuerCreate, IssuerUpdate, JsonClaims};

#[derive(Clone, Debug, Default)]
pub struct IssuerProvider {}

impl IssuerProvider {
    pub fn new(_config: &Config) -> Result<Self, IssuerProviderError> {
        Ok(Self {})
    }

    /// Issuer of the subject token. `sub` and `iss` are checked before the
    /// lookup.
    async fn subject_issuer(
        &self,
        state: &ServiceState,
        subject_claims: &JsonClaims,
    ) -> Result<Issuer, IssuerProviderError> {
        mapping::required_claim(subject_claims, "sub")?;
        let iss = mapping::required_claim(subject_claims, "iss")?;
        state
            .storage
            .get_issuer_by_uri(None, iss)
            .await?
            .ok_or_else(|| IssuerProviderError::IssuerNotFound(iss.into()))
    }
}

#[async_trait]
impl ClaimsMapper for IssuerProvider {
    #[tracing::instrument(level = "info", skip(self, state, subject_claims))]
    async fn map_claims(
        &self,
        state: &ServiceState,
        subject_claims: &JsonClaims,
    ) -> Result<JsonClaims, IssuerProviderError> {
        let issuer = self.subject_issuer(state, subject_claims).await?;
        let env = mapping::environment(subject_claims)?;
        mapping::apply_mappings(&issuer, &env)
    }

    #[tracing::instrument(level = "info", skip(self, state, subject_claims))]
    async fn eval_claim_conditions(
        &self,
        state: &ServiceState,
        subject_claims: &JsonClaims,
    ) -> Result<bool, IssuerProviderError> {
        let issuer = self.subject_issuer(state, subject_claims).await?;
        let env = mapping::environment(subject_claims)?;
        let admitted = mapping::admit(&issuer, &env)?;
        debug!(issuer_id = %issuer.id, admitted, "claim conditions evaluated");
        Ok(admitted)
    }

    #[tracing::instrument(level = "info", skip(self, state, subject_claims))]
    async fn map_admitted_claims(
        &self,
        state: &ServiceState,
        subject_claims: &JsonClaims,
    ) -> Result<Option<JsonClaims>, IssuerProviderError> {
        let issuer = self.subject_issuer(state, subject_claims).await?;
        let env = mapping::environment(subject_claims)?;
        let mapped = mapping::apply_mappings(&issuer, &env)?;
        let admitted = mapping::admit(&issuer, &env)?;
        debug!(issuer_id = %issuer.id, admitted, "subject claims mapped");
        Ok(admitted.then_some(mapped))
    }
}

#[async_trait]
impl IssuerApi for IssuerProvider {
    /// Register the issuer.
    #[tracing::instrument(level = "info", skip(self, state))]
    async fn create_issuer(
        &self,
        state: &ServiceState,
        issuer: IssuerCreate,
    ) -> Result<Issuer, IssuerProviderError> {
        let id = issuer
            .id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().simple().to_string());
        let issuer = mapping::build_issuer(id, issuer)?;
        let mut txn = state.storage.begin().await?;
        let res = state
            .storage
            .create_issuer(&mut txn, issuer)
            .await
            .map_err(Into::into);
        txn.finish(res).await
    }

    #[tracing::instrument(level = "info", skip(self, state))]
    async fn delete_issuer<'a>(
        &self,
        state: &ServiceState,
        id: &'a str,
    ) -> Result<(), IssuerProviderError> {
        let mut txn = state.storage.begin().await?;
        let res = state
            .storage
            .delete_issuer(&mut txn, id)
            .await
            .map_err(Into::into);
        txn.finish(res).await
    }

    #[tracing::instrument(level = "info", skip(self, state))]
    async fn get_issuer<'a>(
        &self,
        state: &ServiceState,
        id: &'a str,
    ) -> Result<Option<Issuer>, IssuerProviderError> {
        Ok(state.storage.get_issuer(None, id).await?)
    }

    #[tracing::instrument(level = "info", skip(self, state))]
    async fn get_issuer_by_uri<'a>(
        &self,
        state: &ServiceState,
        uri: &'a str,
    ) -> Result<Option<Issuer>, IssuerProviderError> {
        Ok(state.storage.get_issuer_by_uri(None, uri).await?)
    }

    #[tracing::instrument(level = "info", skip(self, state))]
    async fn get_issuer_jwks_uri<'a>(
        &self,
        state: &ServiceState,
        uri: &'a str,
    ) -> Result<String, IssuerProviderError> {
        state
            .storage
            .get_issuer_by_uri(None, uri)
            .await?
            .map(|issuer| issuer.jwks_uri)
            .ok_or_else(|| IssuerProviderError::IssuerNotFound(uri.into()))
    }

    #[tracing::instrument(level = "info", skip(self, state))]
    async fn list_issuers<'a>(
        &self,
        state: &ServiceState,
        owner_id: &'a str,
        page: &PageRequest,
    ) -> Result<Page<Issuer>, IssuerProviderError> {
        Ok(state.storage.list_issuers(None, owner_id, page).await?)
    }

    /// Update the issuer. The mappings and the condition are replaced as a
    /// whole.
    #[tracing::instrument(level = "info", skip(self, state))]
    async fn update_issuer<'a>(
        &self,
        state: &ServiceState,
        id: &'a str,
        update: IssuerUpdate,
    ) -> Result<Issuer, IssuerProviderError> {
        let patch = mapping::build_patch(update)?;
        let mut txn = state.storage.begin().await?;
        let res = state
            .storage
            .update_issuer(&mut txn, id, &patch)
            .await
            .map_err(Into::into);
        txn.finish(res).await
    }
}
