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
use crate::issuer::types::JsonClaims;
use crate::keys::KeyProviderError;
use crate::keys::types::{JwkSet, KeyApi, SigningKeyProvider};
use crate::service::ServiceState;

mock! {
    pub KeyProvider {
        pub fn new(cfg: &Config) -> Result<Self, KeyProviderError>;
    }

    impl SigningKeyProvider for KeyProvider {
        fn sign(&self, claims: &JsonClaims) -> Result<String, KeyProviderError>;

        fn public_jwks(&self) -> JwkSet;

        fn verify_access_token(
            &self,
            token: &str,
            issuer: &str,
        ) -> Result<JsonClaims, KeyProviderError>;
    }

    #[async_trait]
    impl KeyApi for KeyProvider {
        async fn verify_subject_token<'a>(
            &self,
            state: &ServiceState,
            token: &'a str,
        ) -> Result<JsonClaims, KeyProviderError>;

        async fn cleanup(&self) -> Result<(), KeyProviderError>;
    }

    impl Clone for KeyProvider {
        fn clone(&self) -> Self;
    }
}
