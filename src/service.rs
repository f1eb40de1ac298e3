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
//! # Service state
//!
//! Shared state of the request handlers.
use axum::extract::{FromRef, FromRequestParts};
use mockall_double::double;
use std::sync::Arc;
use tracing::info;

use crate::api::error::ApiError;
use crate::config::Config;
use crate::error::StsError;
#[double]
use crate::policy::Policy;
#[double]
use crate::policy::PolicyFactory;
use crate::provider::Provider;
use crate::relationship::RelationshipPublisher;
use crate::storage::StorageBackend;

#[derive(FromRef)]
pub struct Service {
    /// Config file
    pub config: Config,
    /// Service/resource Provider
    pub provider: Provider,
    /// Storage engine.
    #[from_ref(skip)]
    pub storage: Arc<dyn StorageBackend>,
    /// Policy factory
    pub policy_factory: Arc<PolicyFactory>,
    /// Authorization relationship publisher.
    #[from_ref(skip)]
    pub relationship: Arc<dyn RelationshipPublisher>,
    /// Shutdown flag
    pub shutdown: bool,
}

pub type ServiceState = Arc<Service>;

impl Service {
    pub fn new(
        cfg: Config,
        storage: Arc<dyn StorageBackend>,
        provider: Provider,
        policy_factory: PolicyFactory,
        relationship: Arc<dyn RelationshipPublisher>,
    ) -> Result<Self, StsError> {
        Ok(Self {
            config: cfg,
            provider,
            storage,
            policy_factory: Arc::new(policy_factory),
            relationship,
            shutdown: false,
        })
    }

    pub async fn terminate(&self) -> Result<(), StsError> {
        info!("Terminating the token exchange service");
        Ok(())
    }
}

impl FromRequestParts<ServiceState> for Policy {
    type Rejection = ApiError;

    async fn from_request_parts(
        _parts: &mut axum::http::request::Parts,
        state: &ServiceState,
    ) -> Result<Self, Self::Rejection> {
        let policy = state.policy_factory.instantiate().await?;
        Ok(policy)
    }
}
