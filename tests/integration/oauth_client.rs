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
//! OAuth clients in the SQL storage.

use eyre::Result;
use secrecy::ExposeSecret;
use tracing_test::traced_test;

use token_exchange_sts::oauth_client::{
    ClientStore, OAuthClientApi, OAuthClientProviderError, types::OAuthClientCreateBuilder,
};

use crate::common::get_state;

#[tokio::test]
#[traced_test]
async fn test_register_and_authenticate() -> Result<()> {
    let state = get_state().await?;
    let provider = state.provider.get_oauth_client_provider();
    let creds = provider
        .create_oauth_client(
            &state,
            OAuthClientCreateBuilder::default()
                .id("cli")
                .owner_id("o1")
                .name("service")
                .audience(vec!["api".to_string()])
                .build()?,
        )
        .await?;
    assert_ne!(creds.secret.expose_secret(), creds.client.secret_hash);

    let client = provider
        .authenticate_client(&state, "cli", creds.secret.expose_secret())
        .await?;
    assert_eq!(vec!["api"], client.audience);

    assert!(matches!(
        provider.authenticate_client(&state, "cli", "wrong").await,
        Err(OAuthClientProviderError::InvalidCredentials)
    ));

    provider.delete_oauth_client(&state, "cli").await?;
    assert!(provider.get_oauth_client(&state, "cli").await?.is_none());
    assert!(matches!(
        provider.delete_oauth_client(&state, "cli").await,
        Err(OAuthClientProviderError::OAuthClientNotFound(_))
    ));
    Ok(())
}
