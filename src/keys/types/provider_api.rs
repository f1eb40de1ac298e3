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

use crate::issuer::types::JsonClaims;
use crate::keys::KeyProviderError;
use crate::keys::types::JwkSet;
use crate::service::ServiceState;

/// Local signing keys of the service.
pub trait SigningKeyProvider: Send + Sync {
    /// Sign the claims with the active key. The `kid` header names the key.
    fn sign(&self, claims: &JsonClaims) -> Result<String, KeyProviderError>;

    /// Public parameters of every configured key.
    fn public_jwks(&self) -> JwkSet;

    /// Verify the access token minted by this service.
    fn verify_access_token(
        &self,
        token: &str,
        issuer: &str,
    ) -> Result<JsonClaims, KeyProviderError>;
}

#[async_trait]
pub trait KeyApi: SigningKeyProvider + Send + Sync {
    /// Verify the subject token with the key set of its issuer and return
    /// its claims.
    async fn verify_subject_token<'a>(
        &self,
        state: &ServiceState,
        token: &'a str,
    ) -> Result<JsonClaims, KeyProviderError>;

    /// Evict the expired remote key sets.
    async fn cleanup(&self) -> Result<(), KeyProviderError>;
}
