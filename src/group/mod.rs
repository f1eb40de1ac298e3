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
//! # Group provider
//!
//! Groups collect subjects of a tenant. The owner and every member of a group
//! are mirrored into the authorization-relationship service: the events are
//! published inside the storage transaction of the change and a failed
//! publication rolls the change back.
//!
//! Members are identified by [`PrefixedId`]s, i.e. `user:<id>`.
use async_trait::async_trait;
use std::str::FromStr;
use uuid::Uuid;

pub mod api;
pub mod error;
#[cfg(test)]
mod mock;
pub mod types;

use crate::config::Config;
use crate::pagination::{Page, PageRequest};
use crate::relationship::{PrefixedId, RelationshipEvent, RelationshipOperation};
use crate::service::ServiceState;
use crate::storage::TransactionContext;

pub use error::GroupProviderError;
#[cfg(test)]
pub use mock::MockGroupProvider;
pub use types::GroupApi;
use types::{Group, GroupCreate, GroupUpdate, MembershipChange};

#[derive(Clone, Debug, Default)]
pub struct GroupProvider {}

impl GroupProvider {
    pub fn new(_config: &Config) -> Result<Self, GroupProviderError> {
        Ok(Self {})
    }
}

fn validate_members(members: &[String]) -> Result<(), GroupProviderError> {
    for member in members {
        PrefixedId::from_str(member)
            .map_err(|source| GroupProviderError::InvalidMember { source })?;
    }
    Ok(())
}

fn member_events(group_id: &str, change: &MembershipChange) -> Vec<RelationshipEvent> {
    change
        .added
        .iter()
        .map(|x| RelationshipEvent::group_member(RelationshipOperation::Create, group_id, x))
        .chain(
            change.removed.iter().map(|x| {
                RelationshipEvent::group_member(RelationshipOperation::Delete, group_id, x)
            }),
        )
        .collect()
}

async fn publish(
    state: &ServiceState,
    events: &[RelationshipEvent],
) -> Result<(), GroupProviderError> {
    if !events.is_empty() {
        state.relationship.publish(events).await?;
    }
    Ok(())
}

#[async_trait]
impl GroupApi for GroupProvider {
    #[tracing::instrument(level = "info", skip(self, state))]
    async fn add_group_members<'a>(
        &self,
        state: &ServiceState,
        group_id: &'a str,
        members: Vec<String>,
    ) -> Result<MembershipChange, GroupProviderError> {
        validate_members(&members)?;
        let mut ctx = TransactionContext::new();
        ctx.begin(state.storage.as_ref()).await?;
        let res: Result<MembershipChange, GroupProviderError> = async {
            let added = state
                .storage
                .add_group_members(ctx.active_mut()?, group_id, &members)
                .await?;
            let change = MembershipChange {
                added,
                removed: Vec::new(),
            };
            publish(state, &member_events(group_id, &change)).await?;
            Ok(change)
        }
        .await;
        ctx.finish(res).await
    }

    /// Create the group and record its owner.
    #[tracing::instrument(level = "info", skip(self, state))]
    async fn create_group(
        &self,
        state: &ServiceState,
        group: GroupCreate,
    ) -> Result<Group, GroupProviderError> {
        let group = Group {
            id: group
                .id
                .unwrap_or_else(|| Uuid::new_v4().simple().to_string()),
            owner_id: group.owner_id,
            name: group.name,
            description: group.description,
        };
        let mut ctx = TransactionContext::new();
        ctx.begin(state.storage.as_ref()).await?;
        let res: Result<Group, GroupProviderError> = async {
            let created = state
                .storage
                .create_group(ctx.active_mut()?, group)
                .await?;
            publish(
                state,
                &[RelationshipEvent::group_owner(
                    RelationshipOperation::Create,
                    &created.id,
                    &created.owner_id,
                )],
            )
            .await?;
            Ok(created)
        }
        .await;
        ctx.finish(res).await
    }

    /// Delete the empty group and its owner record.
    #[tracing::instrument(level = "info", skip(self, state))]
    async fn delete_group<'a>(
        &self,
        state: &ServiceState,
        id: &'a str,
    ) -> Result<(), GroupProviderError> {
        let mut ctx = TransactionContext::new();
        ctx.begin(state.storage.as_ref()).await?;
        let res: Result<(), GroupProviderError> = async {
            let group = state
                .storage
                .get_group(ctx.active(), id)
                .await?
                .ok_or_else(|| GroupProviderError::GroupNotFound(id.into()))?;
            state.storage.delete_group(ctx.active_mut()?, id).await?;
            publish(
                state,
                &[RelationshipEvent::group_owner(
                    RelationshipOperation::Delete,
                    &group.id,
                    &group.owner_id,
                )],
            )
            .await
        }
        .await;
        ctx.finish(res).await
    }

    #[tracing::instrument(level = "info", skip(self, state))]
    async fn get_group<'a>(
        &self,
        state: &ServiceState,
        id: &'a str,
    ) -> Result<Option<Group>, GroupProviderError> {
        Ok(state.storage.get_group(None, id).await?)
    }

    #[tracing::instrument(level = "info", skip(self, state))]
    async fn list_group_members<'a>(
        &self,
        state: &ServiceState,
        group_id: &'a str,
        page: &PageRequest,
    ) -> Result<Page<String>, GroupProviderError> {
        Ok(state
            .storage
            .list_group_members(None, group_id, page)
            .await?)
    }

    #[tracing::instrument(level = "info", skip(self, state))]
    async fn list_groups<'a>(
        &self,
        state: &ServiceState,
        owner_id: &'a str,
        page: &PageRequest,
    ) -> Result<Page<Group>, GroupProviderError> {
        Ok(state.storage.list_groups(None, owner_id, page).await?)
    }

    #[tracing::instrument(level = "info", skip(self, state))]
    async fn remove_group_member<'a>(
        &self,
        state: &ServiceState,
        group_id: &'a str,
        member_id: &'a str,
    ) -> Result<(), GroupProviderError> {
        let mut ctx = TransactionContext::new();
        ctx.begin(state.storage.as_ref()).await?;
        let res: Result<(), GroupProviderError> = async {
            state
                .storage
                .remove_group_member(ctx.active_mut()?, group_id, member_id)
                .await?;
            publish(
                state,
                &[RelationshipEvent::group_member(
                    RelationshipOperation::Delete,
                    group_id,
                    member_id,
                )],
            )
            .await
        }
        .await;
        ctx.finish(res).await
    }

    /// Reconcile the membership. Events are emitted only for the changed
    /// members.
    #[tracing::instrument(level = "info", skip(self, state))]
    async fn replace_group_members<'a>(
        &self,
        state: &ServiceState,
        group_id: &'a str,
        members: Vec<String>,
    ) -> Result<MembershipChange, GroupProviderError> {
        validate_members(&members)?;
        let mut ctx = TransactionContext::new();
        ctx.begin(state.storage.as_ref()).await?;
        let res: Result<MembershipChange, GroupProviderError> = async {
            let change = state
                .storage
                .replace_group_members(ctx.active_mut()?, group_id, &members)
                .await?;
            publish(state, &member_events(group_id, &change)).await?;
            Ok(change)
        }
        .await;
        ctx.finish(res).await
    }

    #[tracing::instrument(level = "info", skip(self, state))]
    async fn update_group<'a>(
        &self,
        state: &ServiceState,
        id: &'a str,
        update: GroupUpdate,
    ) -> Result<Group, GroupProviderError> {
        let mut txn = state.storage.begin().await?;
        let res = state
            .storage
            .update_group(&mut txn, id, &update)
            .await
            .map_err(Into::into);
        txn.finish(res).await
    }
}
