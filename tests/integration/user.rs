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
//! External identities in the SQL storage.

use eyre::Result;
use tracing_test::traced_test;

use token_exchange_sts::issuer::{IssuerApi, types::IssuerCreateBuilder};
use token_exchange_sts::pagination::PageRequest;
use token_exchange_sts::user::{UserApi, types::UserInfoCreate};

use crate::common::get_state;

#[tokio::test]
#[traced_test]
async fn test_store_is_upsert() -> Result<()> {
    let state = get_state().await?;
    let issuer = state
        .provider
        .get_issuer_provider()
        .create_issuer(
            &state,
            IssuerCreateBuilder::default()
                .owner_id("o1")
                .name("idp")
                .uri("https://idp.example.com")
                .jwks_uri("https://idp.example.com/jwks")
                .build()?,
        )
        .await?;
    let provider = state.provider.get_user_provider();

    let first = provider
        .store_user_info(
            &state,
            UserInfoCreate {
                issuer_id: issuer.id.clone(),
                subject: "alice".into(),
                name: Some("Alice".into()),
                email: None,
            },
        )
        .await?;
    let second = provider
        .store_user_info(
            &state,
            UserInfoCreate {
                issuer_id: issuer.id.clone(),
                subject: "alice".into(),
                name: Some("Alice A.".into()),
                email: Some("alice@example.com".into()),
            },
        )
        .await?;
    assert_eq!(first.id, second.id);

    let found = provider
        .find_user_info(&state, &issuer.id, "alice")
        .await?
        .expect("user is stored");
    assert_eq!(second, found);
    assert_eq!(
        Some("o1".to_string()),
        provider.get_user_owner_id(&state, &found.id).await?
    );

    let page = provider
        .list_user_info(&state, &issuer.id, &PageRequest::default())
        .await?;
    assert_eq!(vec![second], page.items);
    Ok(())
}
