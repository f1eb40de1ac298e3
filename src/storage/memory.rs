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
//! # In-memory storage
//!
//! Committed state lives behind a lock and is only replaced on commit. A
//! transaction holds the writer lock together with a private working copy, so
//! writers are serialized while readers keep seeing the last committed
//! snapshot.
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::debug;

use crate::group::types::{Group, GroupUpdate, MembershipChange};
use crate::issuer::types::{Issuer, IssuerPatch};
use crate::oauth_client::types::OAuthClient;
use crate::pagination::{Page, PageRequest, RangePredicate};
use crate::storage::{
    ID_SORT_KEY, MEMBER_SORT_KEY, StorageBackend, StorageError, Transaction, membership_diff,
};
use crate::user::types::UserInfo;

#[derive(Clone, Debug, Default)]
pub(crate) struct State {
    issuers: BTreeMap<String, Issuer>,
    groups: BTreeMap<String, Group>,
    /// `(group_id, member_id)`
    members: BTreeSet<(String, String)>,
    users: BTreeMap<String, UserInfo>,
    clients: BTreeMap<String, OAuthClient>,
}

impl State {
    fn group_members(&self, group_id: &str) -> Vec<String> {
        self.members
            .iter()
            .filter(|(gid, _)| gid == group_id)
            .map(|(_, mid)| mid.clone())
            .collect()
    }

    fn ensure_group(&self, group_id: &str) -> Result<(), StorageError> {
        if self.groups.contains_key(group_id) {
            Ok(())
        } else {
            Err(StorageError::GroupNotFound(group_id.into()))
        }
    }
}

/// Transaction of the [`MemoryStorage`].
pub struct MemoryTransaction {
    _writer: OwnedMutexGuard<()>,
    committed: Arc<RwLock<State>>,
    working: State,
}

impl MemoryTransaction {
    /// Publish the working copy.
    pub(super) async fn commit(self) {
        *self.committed.write().await = self.working;
    }
}

/// In-memory storage backend.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    state: Arc<RwLock<State>>,
    writer: Arc<Mutex<()>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    async fn read<R, F>(&self, txn: Option<&Transaction>, f: F) -> Result<R, StorageError>
    where
        F: FnOnce(&State) -> Result<R, StorageError> + Send,
    {
        match txn {
            Some(Transaction::Memory(txn)) => f(&txn.working),
            Some(_) => Err(foreign_transaction()),
            None => {
                let state = self.state.read().await;
                f(&state)
            }
        }
    }
}

fn foreign_transaction() -> StorageError {
    StorageError::Transaction("transaction does not belong to the memory storage".into())
}

fn working(txn: &mut Transaction) -> Result<&mut State, StorageError> {
    match txn {
        Transaction::Memory(txn) => Ok(&mut txn.working),
        _ => Err(foreign_transaction()),
    }
}

/// Take the page of `items` sorted ascending by `key`.
fn paginate<'a, T, I, K>(
    items: I,
    page: &PageRequest,
    sort_key: &[&str],
    key: K,
) -> Result<Page<T>, StorageError>
where
    T: Clone + 'a,
    I: Iterator<Item = &'a T>,
    K: Fn(&T) -> Vec<String>,
{
    let after = match &page.cursor {
        Some(cursor) => Some(
            RangePredicate::from_cursor(cursor, sort_key)?
                .values()
                .map(String::from)
                .collect::<Vec<_>>(),
        ),
        None => None,
    };
    let mut selected: Vec<T> = items
        .filter(|item| after.as_ref().is_none_or(|after| key(item) > *after))
        .cloned()
        .collect();
    selected.sort_by_key(|item| key(item));
    selected.truncate(page.limit as usize);
    Ok(Page::new(selected, page.limit, |item| {
        sort_key
            .iter()
            .map(|x| x.to_string())
            .zip(key(item))
            .collect()
    })?)
}

fn issuer_uri_taken(state: &State, uri: &str, except_id: &str) -> bool {
    state
        .issuers
        .values()
        .any(|x| x.uri == uri && x.id != except_id)
}

fn group_name_taken(state: &State, owner_id: &str, name: &str, except_id: &str) -> bool {
    state
        .groups
        .values()
        .any(|x| x.owner_id == owner_id && x.name == name && x.id != except_id)
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    async fn begin(&self) -> Result<Transaction, StorageError> {
        let writer = self.writer.clone().lock_owned().await;
        let working = self.state.read().await.clone();
        debug!("memory transaction started");
        Ok(Transaction::Memory(MemoryTransaction {
            _writer: writer,
            committed: self.state.clone(),
            working,
        }))
    }

    async fn create_issuer(
        &self,
        txn: &mut Transaction,
        issuer: Issuer,
    ) -> Result<Issuer, StorageError> {
        let state = working(txn)?;
        if state.issuers.contains_key(&issuer.id) {
            return Err(StorageError::NameConflict(issuer.id));
        }
        if issuer_uri_taken(state, &issuer.uri, &issuer.id) {
            return Err(StorageError::NameConflict(issuer.uri));
        }
        state.issuers.insert(issuer.id.clone(), issuer.clone());
        Ok(issuer)
    }

    async fn delete_issuer(&self, txn: &mut Transaction, id: &str) -> Result<(), StorageError> {
        let state = working(txn)?;
        state.users.retain(|_, user| user.issuer_id != id);
        state
            .issuers
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StorageError::IssuerNotFound(id.into()))
    }

    async fn get_issuer(
        &self,
        txn: Option<&Transaction>,
        id: &str,
    ) -> Result<Option<Issuer>, StorageError> {
        self.read(txn, |state| Ok(state.issuers.get(id).cloned()))
            .await
    }

    async fn get_issuer_by_uri(
        &self,
        txn: Option<&Transaction>,
        uri: &str,
    ) -> Result<Option<Issuer>, StorageError> {
        self.read(txn, |state| {
            Ok(state.issuers.values().find(|x| x.uri == uri).cloned())
        })
        .await
    }

    async fn list_issuers(
        &self,
        txn: Option<&Transaction>,
        owner_id: &str,
        page: &PageRequest,
    ) -> Result<Page<Issuer>, StorageError> {
        self.read(txn, |state| {
            paginate(
                state.issuers.values().filter(|x| x.owner_id == owner_id),
                page,
                ID_SORT_KEY,
                |x| vec![x.id.clone()],
            )
        })
        .await
    }

    async fn update_issuer(
        &self,
        txn: &mut Transaction,
        id: &str,
        patch: &IssuerPatch,
    ) -> Result<Issuer, StorageError> {
        let state = working(txn)?;
        let mut issuer = state
            .issuers
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::IssuerNotFound(id.into()))?;
        patch.apply_to(&mut issuer);
        if issuer_uri_taken(state, &issuer.uri, id) {
            return Err(StorageError::NameConflict(issuer.uri));
        }
        state.issuers.insert(id.into(), issuer.clone());
        Ok(issuer)
    }

    async fn create_group(
        &self,
        txn: &mut Transaction,
        group: Group,
    ) -> Result<Group, StorageError> {
        let state = working(txn)?;
        if state.groups.contains_key(&group.id) {
            return Err(StorageError::NameConflict(group.id));
        }
        if group_name_taken(state, &group.owner_id, &group.name, &group.id) {
            return Err(StorageError::NameConflict(group.name));
        }
        state.groups.insert(group.id.clone(), group.clone());
        Ok(group)
    }

    async fn delete_group(&self, txn: &mut Transaction, id: &str) -> Result<(), StorageError> {
        let state = working(txn)?;
        state.ensure_group(id)?;
        if state.members.iter().any(|(gid, _)| gid == id) {
            return Err(StorageError::GroupNotEmpty(id.into()));
        }
        state.groups.remove(id);
        Ok(())
    }

    async fn get_group(
        &self,
        txn: Option<&Transaction>,
        id: &str,
    ) -> Result<Option<Group>, StorageError> {
        self.read(txn, |state| Ok(state.groups.get(id).cloned()))
            .await
    }

    async fn list_groups(
        &self,
        txn: Option<&Transaction>,
        owner_id: &str,
        page: &PageRequest,
    ) -> Result<Page<Group>, StorageError> {
        self.read(txn, |state| {
            paginate(
                state.groups.values().filter(|x| x.owner_id == owner_id),
                page,
                ID_SORT_KEY,
                |x| vec![x.id.clone()],
            )
        })
        .await
    }

    async fn update_group(
        &self,
        txn: &mut Transaction,
        id: &str,
        update: &GroupUpdate,
    ) -> Result<Group, StorageError> {
        let state = working(txn)?;
        let mut group = state
            .groups
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::GroupNotFound(id.into()))?;
        update.apply_to(&mut group);
        if group_name_taken(state, &group.owner_id, &group.name, id) {
            return Err(StorageError::NameConflict(group.name));
        }
        state.groups.insert(id.into(), group.clone());
        Ok(group)
    }

    async fn add_group_members(
        &self,
        txn: &mut Transaction,
        group_id: &str,
        members: &[String],
    ) -> Result<Vec<String>, StorageError> {
        let state = working(txn)?;
        state.ensure_group(group_id)?;
        let mut added = Vec::new();
        for member in members {
            if state.members.insert((group_id.into(), member.clone())) {
                added.push(member.clone());
            }
        }
        Ok(added)
    }

    async fn list_group_members(
        &self,
        txn: Option<&Transaction>,
        group_id: &str,
        page: &PageRequest,
    ) -> Result<Page<String>, StorageError> {
        self.read(txn, |state| {
            let members = state.group_members(group_id);
            paginate(members.iter(), page, MEMBER_SORT_KEY, |x| vec![x.clone()])
        })
        .await
    }

    async fn remove_group_member(
        &self,
        txn: &mut Transaction,
        group_id: &str,
        member_id: &str,
    ) -> Result<(), StorageError> {
        let state = working(txn)?;
        state.ensure_group(group_id)?;
        if state
            .members
            .remove(&(group_id.to_string(), member_id.to_string()))
        {
            Ok(())
        } else {
            Err(StorageError::MemberNotFound {
                group_id: group_id.into(),
                member_id: member_id.into(),
            })
        }
    }

    async fn replace_group_members(
        &self,
        txn: &mut Transaction,
        group_id: &str,
        members: &[String],
    ) -> Result<MembershipChange, StorageError> {
        let state = working(txn)?;
        state.ensure_group(group_id)?;
        let change = membership_diff(&state.group_members(group_id), members);
        for member in &change.removed {
            state.members.remove(&(group_id.to_string(), member.clone()));
        }
        for member in &change.added {
            state.members.insert((group_id.to_string(), member.clone()));
        }
        Ok(change)
    }

    async fn store_user_info(
        &self,
        txn: &mut Transaction,
        user: UserInfo,
    ) -> Result<UserInfo, StorageError> {
        let state = working(txn)?;
        if !state.issuers.contains_key(&user.issuer_id) {
            return Err(StorageError::IssuerNotFound(user.issuer_id));
        }
        if let Some(current) = state
            .users
            .values_mut()
            .find(|x| x.issuer_id == user.issuer_id && x.subject == user.subject)
        {
            current.name = user.name;
            current.email = user.email;
            return Ok(current.clone());
        }
        state.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn get_user_info(
        &self,
        txn: Option<&Transaction>,
        id: &str,
    ) -> Result<Option<UserInfo>, StorageError> {
        self.read(txn, |state| Ok(state.users.get(id).cloned()))
            .await
    }

    async fn get_user_info_by_claims(
        &self,
        txn: Option<&Transaction>,
        issuer_id: &str,
        subject: &str,
    ) -> Result<Option<UserInfo>, StorageError> {
        self.read(txn, |state| {
            Ok(state
                .users
                .values()
                .find(|x| x.issuer_id == issuer_id && x.subject == subject)
                .cloned())
        })
        .await
    }

    async fn get_user_owner_id(
        &self,
        txn: Option<&Transaction>,
        id: &str,
    ) -> Result<Option<String>, StorageError> {
        self.read(txn, |state| {
            Ok(state
                .users
                .get(id)
                .and_then(|user| state.issuers.get(&user.issuer_id))
                .map(|issuer| issuer.owner_id.clone()))
        })
        .await
    }

    async fn list_user_info(
        &self,
        txn: Option<&Transaction>,
        issuer_id: &str,
        page: &PageRequest,
    ) -> Result<Page<UserInfo>, StorageError> {
        self.read(txn, |state| {
            paginate(
                state.users.values().filter(|x| x.issuer_id == issuer_id),
                page,
                ID_SORT_KEY,
                |x| vec![x.id.clone()],
            )
        })
        .await
    }

    async fn create_oauth_client(
        &self,
        txn: &mut Transaction,
        client: OAuthClient,
    ) -> Result<OAuthClient, StorageError> {
        let state = working(txn)?;
        if state.clients.contains_key(&client.id) {
            return Err(StorageError::NameConflict(client.id));
        }
        state.clients.insert(client.id.clone(), client.clone());
        Ok(client)
    }

    async fn delete_oauth_client(
        &self,
        txn: &mut Transaction,
        id: &str,
    ) -> Result<(), StorageError> {
        working(txn)?
            .clients
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StorageError::OAuthClientNotFound(id.into()))
    }

    async fn get_oauth_client(
        &self,
        txn: Option<&Transaction>,
        id: &str,
    ) -> Result<Option<OAuthClient>, StorageError> {
        self.read(txn, |state| Ok(state.clients.get(id).cloned()))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::Cursor;

    fn issuer(id: &str, owner: &str, uri: &str) -> Issuer {
        Issuer {
            id: id.into(),
            owner_id: owner.into(),
            name: id.into(),
            uri: uri.into(),
            jwks_uri: format!("{uri}/jwks"),
            ..Default::default()
        }
    }

    fn group(id: &str, owner: &str, name: &str) -> Group {
        Group {
            id: id.into(),
            owner_id: owner.into(),
            name: name.into(),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_read_your_writes_and_isolation() {
        let storage = MemoryStorage::new();
        let mut txn = storage.begin().await.unwrap();
        storage
            .create_issuer(&mut txn, issuer("i1", "o1", "https://a"))
            .await
            .unwrap();
        assert!(storage.get_issuer(Some(&txn), "i1").await.unwrap().is_some());
        assert!(storage.get_issuer(None, "i1").await.unwrap().is_none());
        txn.commit().await.unwrap();
        assert!(storage.get_issuer(None, "i1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_rollback_on_drop() {
        let storage = MemoryStorage::new();
        {
            let mut txn = storage.begin().await.unwrap();
            storage
                .create_group(&mut txn, group("g1", "o1", "admins"))
                .await
                .unwrap();
        }
        assert!(storage.get_group(None, "g1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_issuer_uri_conflict_and_cascade() {
        let storage = MemoryStorage::new();
        let mut txn = storage.begin().await.unwrap();
        storage
            .create_issuer(&mut txn, issuer("i1", "o1", "https://a"))
            .await
            .unwrap();
        assert!(matches!(
            storage
                .create_issuer(&mut txn, issuer("i2", "o1", "https://a"))
                .await,
            Err(StorageError::NameConflict(_))
        ));
        storage
            .store_user_info(
                &mut txn,
                UserInfo {
                    id: "u1".into(),
                    issuer_id: "i1".into(),
                    subject: "foo".into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        storage.delete_issuer(&mut txn, "i1").await.unwrap();
        assert!(storage.get_user_info(Some(&txn), "u1").await.unwrap().is_none());
        assert!(matches!(
            storage.delete_issuer(&mut txn, "i1").await,
            Err(StorageError::IssuerNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_user_upsert() {
        let storage = MemoryStorage::new();
        let mut txn = storage.begin().await.unwrap();
        storage
            .create_issuer(&mut txn, issuer("i1", "o1", "https://a"))
            .await
            .unwrap();
        let first = storage
            .store_user_info(
                &mut txn,
                UserInfo {
                    id: "u1".into(),
                    issuer_id: "i1".into(),
                    subject: "foo".into(),
                    name: Some("Foo".into()),
                    email: None,
                },
            )
            .await
            .unwrap();
        let second = storage
            .store_user_info(
                &mut txn,
                UserInfo {
                    id: "u2".into(),
                    issuer_id: "i1".into(),
                    subject: "foo".into(),
                    name: Some("Bar".into()),
                    email: Some("bar@example.com".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(Some("Bar".into()), second.name);
        assert_eq!(
            Some("o1".to_string()),
            storage.get_user_owner_id(Some(&txn), "u1").await.unwrap()
        );
    }

    #[tokio::test]
    async fn test_group_membership() {
        let storage = MemoryStorage::new();
        let mut txn = storage.begin().await.unwrap();
        storage
            .create_group(&mut txn, group("g1", "o1", "admins"))
            .await
            .unwrap();
        assert!(matches!(
            storage
                .create_group(&mut txn, group("g2", "o1", "admins"))
                .await,
            Err(StorageError::NameConflict(_))
        ));
        let m = vec!["user:a".to_string()];
        assert_eq!(m, storage.add_group_members(&mut txn, "g1", &m).await.unwrap());
        assert!(
            storage
                .add_group_members(&mut txn, "g1", &m)
                .await
                .unwrap()
                .is_empty()
        );
        assert!(matches!(
            storage.delete_group(&mut txn, "g1").await,
            Err(StorageError::GroupNotEmpty(_))
        ));
        let change = storage
            .replace_group_members(&mut txn, "g1", &["user:b".to_string()])
            .await
            .unwrap();
        assert_eq!(vec!["user:b".to_string()], change.added);
        assert_eq!(vec!["user:a".to_string()], change.removed);
        assert!(matches!(
            storage.remove_group_member(&mut txn, "g1", "user:a").await,
            Err(StorageError::MemberNotFound { .. })
        ));
        assert!(matches!(
            storage.remove_group_member(&mut txn, "g2", "user:b").await,
            Err(StorageError::GroupNotFound(_))
        ));
        storage
            .remove_group_member(&mut txn, "g1", "user:b")
            .await
            .unwrap();
        storage.delete_group(&mut txn, "g1").await.unwrap();
    }

    #[tokio::test]
    async fn test_pagination_terminates() {
        let storage = MemoryStorage::new();
        let mut txn = storage.begin().await.unwrap();
        for idx in 0..7 {
            storage
                .create_issuer(
                    &mut txn,
                    issuer(&format!("i{idx}"), "o1", &format!("https://{idx}")),
                )
                .await
                .unwrap();
        }
        storage
            .create_issuer(&mut txn, issuer("x", "o2", "https://x"))
            .await
            .unwrap();
        txn.commit().await.unwrap();

        let mut seen = Vec::new();
        let mut cursor: Option<Cursor> = None;
        loop {
            let page = storage
                .list_issuers(None, "o1", &PageRequest::new(cursor, Some(3)))
                .await
                .unwrap();
            seen.extend(page.items.into_iter().map(|x| x.id));
            match page.next {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        assert_eq!(
            vec!["i0", "i1", "i2", "i3", "i4", "i5", "i6"],
            seen.iter().map(String::as_str).collect::<Vec<_>>()
        );
    }
}
