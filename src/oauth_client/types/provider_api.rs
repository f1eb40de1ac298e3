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

use crate::oauth_client::OAuthClientProviderError;
use crate::oauth_client::types::*;
use crate::service::ServiceState;

/// Client authentication for the token endpoint.
#[async_trait]
pub trait ClientStore: Send + Sync {
    /// Verify the client secret and return the client.
    async fn authenticate_client<'a>(
        &self,
        state: &ServiceState,
        client_id: &'a str,
        secret: &'a str,
    ) -> Result<OAuthClient, OAuthClientProviderError>;
}

#[async_trait]
pub trait OAuthClientApi: ClientStore + Send + Sync {
    /// Register the client generating its secret.
    async fn create_oauth_client(
        &self,
        state: &ServiceState,
        client: OAuthClientCreate,
    ) -> Result<OAuthClientCredentials, OAuthClientProviderError>;

    async fn delete_oauth_client<'a>(
        &self,
        state: &ServiceState,
        id: &'a str,
    ) -> Result<(), OAuthClientProviderError>;

    async fn get_oauth_client<'a>(
        &self,
        state: &ServiceState,
        id: &'a str,
    ) -> Result<Option<OAuthClient>, OAuthClientProviderError>;
}
