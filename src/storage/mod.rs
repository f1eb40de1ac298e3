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
//! # Storage engine
//!
//! Transactional persistence of issuers, groups with their membership, user
//! records and OAuth clients. Two interchangeable backends implement the
//! [`StorageBackend`]:
//!
//! - [`sql::SqlStorage`]: PostgreSQL compatible (CockroachDB) and SQLite
//!   databases.
//! - [`memory::MemoryStorage`]: in-process state with snapshot reads and
//!   serialized writers.
//!
//! Writes require the open [`Transaction`]. Reads accept the optional one so
//! that they observe the earlier writes of the same transaction, and use the
//! shared connection otherwise.
use async_trait::async_trait;

pub mod error;
pub mod memory;
pub mod seed;
pub mod sql;
pub mod transaction;

use crate::group::types::{Group, GroupUpdate, MembershipChange};
use crate::issuer::types::{Issuer, IssuerPatch};
use crate::oauth_client::types::OAuthClient;
use crate::pagination::{Page, PageRequest};
use crate::user::types::UserInfo;

pub use error::StorageError;
pub use transaction::{Transaction, TransactionContext};

/// Sort key of the issuer, group, user and client collections.
pub const ID_SORT_KEY: &[&str] = &["id"];
/// Sort key of the group membership collection.
pub const MEMBER_SORT_KEY: &[&str] = &["member_id"];

#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Start the transaction.
    async fn begin(&self) -> Result<Transaction, StorageError>;

    /// Insert the issuer. The uri must be unique.
    async fn create_issuer(
        &self,
        txn: &mut Transaction,
        issuer: Issuer,
    ) -> Result<Issuer, StorageError>;

    /// Delete the issuer together with its user records.
    async fn delete_issuer(&self, txn: &mut Transaction, id: &str) -> Result<(), StorageError>;

    async fn get_issuer(
        &self,
        txn: Option<&Transaction>,
        id: &str,
    ) -> Result<Option<Issuer>, StorageError>;

    async fn get_issuer_by_uri(
        &self,
        txn: Option<&Transaction>,
        uri: &str,
    ) -> Result<Option<Issuer>, StorageError>;

    async fn list_issuers(
        &self,
        txn: Option<&Transaction>,
        owner_id: &str,
        page: &PageRequest,
    ) -> Result<Page<Issuer>, StorageError>;

    async fn update_issuer(
        &self,
        txn: &mut Transaction,
        id: &str,
        patch: &IssuerPatch,
    ) -> Result<Issuer, StorageError>;

    /// Insert the group. The name must be unique per owner.
    async fn create_group(&self, txn: &mut Transaction, group: Group)
    -> Result<Group, StorageError>;

    /// Delete the group. Fails with [`StorageError::GroupNotEmpty`] while it
    /// has members.
    async fn delete_group(&self, txn: &mut Transaction, id: &str) -> Result<(), StorageError>;

    async fn get_group(
        &self,
        txn: Option<&Transaction>,
        id: &str,
    ) -> Result<Option<Group>, StorageError>;

    async fn list_groups(
        &self,
        txn: Option<&Transaction>,
        owner_id: &str,
        page: &PageRequest,
    ) -> Result<Page<Group>, StorageError>;

    async fn update_group(
        &self,
        txn: &mut Transaction,
        id: &str,
        update: &GroupUpdate,
    ) -> Result<Group, StorageError>;

    /// Add the members that are not present yet and return them.
    async fn add_group_members(
        &self,
        txn: &mut Transaction,
        group_id: &str,
        members: &[String],
    ) -> Result<Vec<String>, StorageError>;

    async fn list_group_members(
        &self,
        txn: Option<&Transaction>,
        group_id: &str,
        page: &PageRequest,
    ) -> Result<Page<String>, StorageError>;

    /// Remove the member. Fails with [`StorageError::MemberNotFound`] when
    /// absent.
    async fn remove_group_member(
        &self,
        txn: &mut Transaction,
        group_id: &str,
        member_id: &str,
    ) -> Result<(), StorageError>;

    /// Reconcile the membership with `members` touching only the difference.
    async fn replace_group_members(
        &self,
        txn: &mut Transaction,
        group_id: &str,
        members: &[String],
    ) -> Result<MembershipChange, StorageError>;

    /// Insert the user or update the name and email of the user with the same
    /// issuer and subject.
    async fn store_user_info(
        &self,
        txn: &mut Transaction,
        user: UserInfo,
    ) -> Result<UserInfo, StorageError>;

    async fn get_user_info(
        &self,
        txn: Option<&Transaction>,
        id: &str,
    ) -> Result<Option<UserInfo>, StorageError>;

    async fn get_user_info_by_claims(
        &self,
        txn: Option<&Transaction>,
        issuer_id: &str,
        subject: &str,
    ) -> Result<Option<UserInfo>, StorageError>;

    /// Owner of the issuer of the user.
    async fn get_user_owner_id(
        &self,
        txn: Option<&Transaction>,
        id: &str,
    ) -> Result<Option<String>, StorageError>;

    async fn list_user_info(
        &self,
        txn: Option<&Transaction>,
        issuer_id: &str,
        page: &PageRequest,
    ) -> Result<Page<UserInfo>, StorageError>;

    async fn create_oauth_client(
        &self,
        txn: &mut Transaction,
        client: OAuthClient,
    ) -> Result<OAuthClient, StorageError>;

    async fn delete_oauth_client(&self, txn: &mut Transaction, id: &str)
    -> Result<(), StorageError>;

    async fn get_oauth_client(
        &self,
        txn: Option<&Transaction>,
        id: &str,
    ) -> Result<Option<OAuthClient>, StorageError>;
}

/// Diff of the current and the desired membership.
pub(crate) fn membership_diff(current: &[String], desired: &[String]) -> MembershipChange {
    let current_set: std::collections::BTreeSet<&String> = current.iter().collect();
    let desired_set: std::collections::BTreeSet<&String> = desired.iter().collect();
    MembershipChange {
        added: desired_set
            .difference(&current_set)
            .map(|x| (*x).clone())
            .collect(),
        removed: current_set
            .difference(&desired_set)
            .map(|x| (*x).clone())
            .collect(),
    }
}
