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
//! Groups and their membership in the SQL storage.

use eyre::Result;
use httpmock::MockServer;
use std::sync::Arc;
use std::time::Duration;
use tracing_test::traced_test;
use url::Url;

use token_exchange_sts::group::{GroupApi, GroupProviderError, types::*};
use token_exchange_sts::pagination::PageRequest;
use token_exchange_sts::relationship::HttpRelationshipPublisher;

use crate::common::{get_state, get_state_with};

fn group_create(name: &str) -> Result<GroupCreate> {
    Ok(GroupCreateBuilder::default()
        .owner_id("o1")
        .name(name)
        .build()?)
}

#[tokio::test]
#[traced_test]
async fn test_membership() -> Result<()> {
    let state = get_state().await?;
    let provider = state.provider.get_group_provider();
    let group = provider.create_group(&state, group_create("admins")?).await?;

    let change = provider
        .add_group_members(
            &state,
            &group.id,
            vec!["user:alice".into(), "user:bob".into()],
        )
        .await?;
    assert_eq!(vec!["user:alice", "user:bob"], change.added);

    // Present members are skipped.
    let change = provider
        .add_group_members(&state, &group.id, vec!["user:alice".into()])
        .await?;
    assert!(change.added.is_empty());

    let change = provider
        .replace_group_members(
            &state,
            &group.id,
            vec!["user:bob".into(), "user:carol".into()],
        )
        .await?;
    assert_eq!(vec!["user:carol"], change.added);
    assert_eq!(vec!["user:alice"], change.removed);

    let members = provider
        .list_group_members(&state, &group.id, &PageRequest::default())
        .await?;
    assert_eq!(vec!["user:bob", "user:carol"], members.items);

    assert!(matches!(
        provider
            .remove_group_member(&state, &group.id, "user:alice")
            .await,
        Err(GroupProviderError::MemberNotFound { .. })
    ));
    assert!(matches!(
        provider.delete_group(&state, &group.id).await,
        Err(GroupProviderError::GroupNotEmpty(_))
    ));

    provider
        .replace_group_members(&state, &group.id, Vec::new())
        .await?;
    provider.delete_group(&state, &group.id).await?;
    assert!(provider.get_group(&state, &group.id).await?.is_none());
    Ok(())
}

#[tokio::test]
#[traced_test]
async fn test_name_conflict() -> Result<()> {
    let state = get_state().await?;
    let provider = state.provider.get_group_provider();
    provider.create_group(&state, group_create("admins")?).await?;
    assert!(matches!(
        provider.create_group(&state, group_create("admins")?).await,
        Err(GroupProviderError::NameConflict(_))
    ));
    Ok(())
}

#[tokio::test]
#[traced_test]
async fn test_publish_failure_rolls_back() -> Result<()> {
    let server = MockServer::start();
    let publish = server.mock(|when, then| {
        when.method("POST").path("/events");
        then.status(503);
    });
    let state = get_state_with(Arc::new(HttpRelationshipPublisher::new(
        Url::parse(&server.url("/events"))?,
        Duration::from_secs(5),
    )?))
    .await?;
    let provider = state.provider.get_group_provider();

    assert!(matches!(
        provider.create_group(&state, group_create("admins")?).await,
        Err(GroupProviderError::Relationship { .. })
    ));
    assert!(
        provider
            .list_groups(&state, "o1", &PageRequest::default())
            .await?
            .items
            .is_empty()
    );
    publish.assert_hits(1);
    Ok(())
}

#[tokio::test]
#[traced_test]
async fn test_delete_publish_failure_keeps_group() -> Result<()> {
    let server = MockServer::start();
    let mut publish = server.mock(|when, then| {
        when.method("POST").path("/events");
        then.status(204);
    });
    let state = get_state_with(Arc::new(HttpRelationshipPublisher::new(
        Url::parse(&server.url("/events"))?,
        Duration::from_secs(5),
    )?))
    .await?;
    let provider = state.provider.get_group_provider();
    let group = provider.create_group(&state, group_create("admins")?).await?;

    publish.delete();
    server.mock(|when, then| {
        when.method("POST").path("/events");
        then.status(500);
    });
    assert!(matches!(
        provider.delete_group(&state, &group.id).await,
        Err(GroupProviderError::Relationship { .. })
    ));
    let id = group.id.clone();
    assert_eq!(Some(group), provider.get_group(&state, &id).await?);
    Ok(())
}
