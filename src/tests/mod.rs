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
//! Test helpers shared by the unit tests.
use std::sync::Arc;

use crate::config::Config;
use crate::policy::{MockPolicy, MockPolicyFactory, PolicyEvaluationResult};
use crate::provider::ProviderBuilder;
use crate::relationship::{LoggingRelationshipPublisher, RelationshipPublisher};
use crate::service::{Service, ServiceState};
use crate::storage::StorageBackend;
use crate::storage::memory::MemoryStorage;


/// Policy factory whose policies allow (or deny) every request.
pub(crate) fn policy_factory(allowed: bool) -> MockPolicyFactory {
    let mut policy_factory_mock = MockPolicyFactory::default();
    policy_factory_mock.expect_instantiate().returning(move || {
        let mut policy_mock = MockPolicy::default();
        if allowed {
            policy_mock
                .expect_enforce()
                .returning(|_, _, _, _| Ok(PolicyEvaluationResult::allowed()));
        } else {
            policy_mock.expect_enforce().returning(|_, _, _, _| {
                Err(crate::policy::PolicyError::Forbidden(
                    PolicyEvaluationResult::forbidden(),
                ))
            });
        }
        Ok(policy_mock)
    });
    policy_factory_mock
}

/// Service state with the given storage and relationship publisher.
pub(crate) fn get_state(
    builder: ProviderBuilder,
    storage: Arc<dyn StorageBackend>,
    relationship: Arc<dyn RelationshipPublisher>,
) -> ServiceState {
    Arc::new(
        Service::new(
            Config::default(),
            storage,
            builder.build().unwrap(),
            policy_factory(true),
            relationship,
        )
        .unwrap(),
    )
}

/// Service state backed by the in-memory storage.
pub(crate) fn get_memory_state(builder: ProviderBuilder) -> ServiceState {
    get_state(
        builder,
        Arc::new(MemoryStorage::new()),
        Arc::new(LoggingRelationshipPublisher),
    )
}
