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
//! Issuers in the SQL storage.

use eyre::Result;
use std::collections::BTreeMap;
use tracing_test::traced_test;

use token_exchange_sts::expression::{MAX_DEPTH, ParseError};
use token_exchange_sts::issuer::{IssuerApi, IssuerProviderError, types::*};
use token_exchange_sts::pagination::PageRequest;
use token_exchange_sts::user::{UserApi, types::UserInfoCreate};

use crate::common::get_state;

fn issuer_create(owner_id: &str, uri: &str) -> Result<IssuerCreate> {
    Ok(IssuerCreateBuilder::default()
        .owner_id(owner_id)
        .name("idp")
        .uri(uri)
        .jwks_uri(format!("{uri}/jwks"))
        .claim_mappings(BTreeMap::from([(
            "email".to_string(),
            "claims.email".to_string(),
        )]))
        .claim_conditions("claims.email_verified == true")
        .build()?)
}

#[tokio::test]
#[traced_test]
async fn test_create_get_update() -> Result<()> {
    let state = get_state().await?;
    let provider = state.provider.get_issuer_provider();

    let created = provider
        .create_issuer(&state, issuer_create("o1", "https://idp.example.com")?)
        .await?;
    let fetched = provider
        .get_issuer_by_uri(&state, "https://idp.example.com")
        .await?
        .expect("issuer is stored");
    assert_eq!(created, fetched);
    assert_eq!(
        Some("claims.email_verified == true"),
        fetched.claim_conditions.as_ref().map(|x| x.source.as_str())
    );

    let updated = provider
        .update_issuer(
            &state,
            &created.id,
            IssuerUpdateBuilder::default()
                .name("renamed")
                .claim_conditions(None::<String>)
                .build()?,
        )
        .await?;
    assert_eq!("renamed", updated.name);
    assert!(updated.claim_conditions.is_none());
    assert_eq!(created.claim_mappings, updated.claim_mappings);
    assert_eq!(Some(updated), provider.get_issuer(&state, &created.id).await?);
    Ok(())
}

#[tokio::test]
#[traced_test]
async fn test_uri_conflict() -> Result<()> {
    let state = get_state().await?;
    let provider = state.provider.get_issuer_provider();
    provider
        .create_issuer(&state, issuer_create("o1", "https://idp.example.com")?)
        .await?;
    assert!(matches!(
        provider
            .create_issuer(&state, issuer_create("o2", "https://idp.example.com")?)
            .await,
        Err(IssuerProviderError::UriConflict(_))
    ));
    Ok(())
}

#[tokio::test]
#[traced_test]
async fn test_invalid_expression_not_stored() -> Result<()> {
    let state = get_state().await?;
    let provider = state.provider.get_issuer_provider();
    let mut req = issuer_create("o1", "https://idp.example.com")?;
    req.claim_mappings
        .insert("broken".into(), "claims.email +".into());
    assert!(matches!(
        provider.create_issuer(&state, req).await,
        Err(IssuerProviderError::ExpressionParse { name, .. }) if name == "broken"
    ));
    assert!(
        provider
            .get_issuer_by_uri(&state, "https://idp.example.com")
            .await?
            .is_none()
    );
    Ok(())
}

#[tokio::test]
#[traced_test]
async fn test_deepest_expressions_restored() -> Result<()> {
    let state = get_state().await?;
    let provider = state.provider.get_issuer_provider();
    let or_chain = |terms: usize| {
        (0..terms)
            .map(|i| format!("claims.g == 'v{i}'"))
            .collect::<Vec<_>>()
            .join(" || ")
    };
    let mut req = issuer_create("o1", "https://idp.example.com")?;
    req.claim_mappings.insert(
        "deep".into(),
        format!("claims{}", ".a".repeat(MAX_DEPTH - 1)),
    );
    req.claim_conditions = Some(or_chain(62));
    let created = provider.create_issuer(&state, req).await?;

    assert_eq!(
        Some(created.clone()),
        provider
            .get_issuer_by_uri(&state, "https://idp.example.com")
            .await?
    );
    let listed = provider
        .list_issuers(&state, "o1", &PageRequest::new(None, None))
        .await?;
    assert_eq!(vec![created], listed.items);

    let mut req = issuer_create("o1", "https://deeper.example.com")?;
    req.claim_conditions = Some(or_chain(63));
    assert!(matches!(
        provider.create_issuer(&state, req).await,
        Err(IssuerProviderError::ExpressionParse {
            source: ParseError::TooDeep { .. },
            ..
        })
    ));
    Ok(())
}

#[tokio::test]
#[traced_test]
async fn test_list_paginated() -> Result<()> {
    let state = get_state().await?;
    let provider = state.provider.get_issuer_provider();
    for idx in 0..3 {
        let mut req = issuer_create("o1", &format!("https://idp{idx}.example.com"))?;
        req.id = Some(format!("issuer-{idx}"));
        provider.create_issuer(&state, req).await?;
    }
    provider
        .create_issuer(&state, issuer_create("o2", "https://other.example.com")?)
        .await?;

    let first = provider
        .list_issuers(&state, "o1", &PageRequest::new(None, Some(2)))
        .await?;
    assert_eq!(
        vec!["issuer-0", "issuer-1"],
        first.items.iter().map(|x| x.id.as_str()).collect::<Vec<_>>()
    );
    let second = provider
        .list_issuers(&state, "o1", &PageRequest::new(first.next, Some(2)))
        .await?;
    assert_eq!(
        vec!["issuer-2"],
        second.items.iter().map(|x| x.id.as_str()).collect::<Vec<_>>()
    );
    assert!(second.next.is_none());
    Ok(())
}

#[tokio::test]
#[traced_test]
async fn test_delete_cascades_user_info() -> Result<()> {
    let state = get_state().await?;
    let issuer = state
        .provider
        .get_issuer_provider()
        .create_issuer(&state, issuer_create("o1", "https://idp.example.com")?)
        .await?;
    let user = state
        .provider
        .get_user_provider()
        .store_user_info(
            &state,
            UserInfoCreate {
                issuer_id: issuer.id.clone(),
                subject: "alice".into(),
                name: None,
                email: None,
            },
        )
        .await?;

    state
        .provider
        .get_issuer_provider()
        .delete_issuer(&state, &issuer.id)
        .await?;
    assert!(
        state
            .provider
            .get_user_provider()
            .get_user_info(&state, &user.id)
            .await?
            .is_none()
    );
    assert!(matches!(
        state
            .provider
            .get_issuer_provider()
            .delete_issuer(&state, &issuer.id)
            .await,
        Err(IssuerProviderError::IssuerNotFound(_))
    ));
    Ok(())
}
