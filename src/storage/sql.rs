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
//! # SQL storage
//!
//! [`SqlStorage`] persists the entities with `sea-orm`. PostgreSQL compatible
//! databases (including CockroachDB) and SQLite are supported.
use async_trait::async_trait;
use regex::Regex;
use sea_orm::{
    ConnectionTrait, DatabaseBackend, DatabaseConnection, DatabaseTransaction, EntityName,
    EntityTrait, IdenStatic, Iterable, Statement, TransactionTrait, Value,
};
use sea_orm::{ColumnTrait, QueryFilter, QueryOrder, QuerySelect};
use std::sync::LazyLock;
use tracing::debug;

mod group;
mod issuer;
mod oauth_client;
mod user_info;

use crate::error::DbContextExt;
use crate::group::types::{Group, GroupUpdate, MembershipChange};
use crate::issuer::types::{Issuer, IssuerPatch};
use crate::oauth_client::types::OAuthClient;
use crate::pagination::{Page, PageRequest, RangePredicate};
use crate::storage::{StorageBackend, StorageError, Transaction};
use crate::user::types::UserInfo;

static AS_OF_SYSTEM_TIME: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^-?\d+(ms|s|m|h)$").ok());

/// Run `$body` with `$db` bound to the transaction when given, or to the
/// shared connection otherwise.
macro_rules! with_conn {
    ($self:ident, $txn:ident, |$db:ident| $body:expr) => {
        match $txn {
            Some(txn) => {
                let $db = sql_tx(txn)?;
                $body
            }
            None => {
                let $db = &$self.db;
                $body
            }
        }
    };
}

/// SQL storage backend.
#[derive(Debug)]
pub struct SqlStorage {
    db: DatabaseConnection,
    /// `AS OF SYSTEM TIME` staleness hint of the list reads.
    as_of_system_time: Option<String>,
}

impl SqlStorage {
    /// Wrap the connection. The staleness hint must be an interval like
    /// `-5s`.
    pub fn new(
        db: DatabaseConnection,
        as_of_system_time: Option<String>,
    ) -> Result<Self, StorageError> {
        if let Some(hint) = &as_of_system_time {
            if !AS_OF_SYSTEM_TIME
                .as_ref()
                .is_some_and(|re| re.is_match(hint))
            {
                return Err(StorageError::InvalidAsOfSystemTime(hint.clone()));
            }
        }
        Ok(Self {
            db,
            as_of_system_time,
        })
    }

    /// Staleness hint for the non transactional list reads. Only the Postgres
    /// dialect understands it.
    fn as_of(&self) -> Option<&str> {
        match self.db.get_database_backend() {
            DatabaseBackend::Postgres => self.as_of_system_time.as_deref(),
            _ => None,
        }
    }
}

/// Database transaction of the storage transaction.
pub(crate) fn sql_tx(txn: &Transaction) -> Result<&DatabaseTransaction, StorageError> {
    match txn {
        Transaction::Sql(txn) => Ok(txn),
        _ => Err(StorageError::Transaction(
            "transaction does not belong to the sql storage".into(),
        )),
    }
}

/// Keyset select reading as of the given system time.
///
/// The query builder has no notion of `AS OF SYSTEM TIME`, so the statement
/// is rendered by hand.
pub(crate) fn as_of_select<E: EntityTrait>(
    filter: (&str, &str),
    after: Option<&RangePredicate>,
    sort_key: &[&str],
    limit: u64,
    hint: &str,
) -> Statement {
    let mut sql = format!(
        "SELECT {} FROM \"{}\" AS OF SYSTEM TIME '{hint}' WHERE \"{}\" = $1",
        E::Column::iter()
            .map(|x| format!("\"{}\"", x.as_str()))
            .collect::<Vec<_>>()
            .join(", "),
        E::default().table_name(),
        filter.0,
    );
    let mut values: Vec<Value> = vec![filter.1.into()];
    if let Some(after) = after {
        let (clause, params) = after.to_sql(values.len());
        sql.push_str(" AND ");
        sql.push_str(&clause);
        values.extend(params.into_iter().map(Value::from));
    }
    sql.push_str(&format!(
        " ORDER BY {} LIMIT {limit}",
        sort_key
            .iter()
            .map(|x| format!("\"{x}\""))
            .collect::<Vec<_>>()
            .join(", ")
    ));
    Statement::from_sql_and_values(DatabaseBackend::Postgres, sql, values)
}

/// Decode the cursor of the page request.
pub(crate) fn range_predicate(
    page: &PageRequest,
    sort_key: &[&str],
) -> Result<Option<RangePredicate>, StorageError> {
    Ok(page
        .cursor
        .as_ref()
        .map(|cursor| RangePredicate::from_cursor(cursor, sort_key))
        .transpose()?)
}

/// Fetch the rows of the page sorted by the single `sort` column.
pub(crate) async fn keyset_page<E, C>(
    db: &C,
    filter: (E::Column, &str),
    sort: E::Column,
    page: &PageRequest,
    as_of: Option<&str>,
    context: &str,
) -> Result<Vec<E::Model>, StorageError>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let sort_key = [sort.as_str()];
    let after = range_predicate(page, &sort_key)?;
    let rows = match as_of {
        Some(hint) => {
            E::find()
                .from_raw_sql(as_of_select::<E>(
                    (filter.0.as_str(), filter.1),
                    after.as_ref(),
                    &sort_key,
                    page.limit,
                    hint,
                ))
                .all(db)
                .await
        }
        None => {
            let mut select = E::find().filter(filter.0.eq(filter.1));
            if let Some(after) = &after {
                select = select.filter(after.condition(&[sort]));
            }
            select.order_by_asc(sort).limit(page.limit).all(db).await
        }
    };
    Ok(rows.context(context)?)
}

#[async_trait]
impl StorageBackend for SqlStorage {
    async fn begin(&self) -> Result<Transaction, StorageError> {
        let txn = self.db.begin().await.context("starting transaction")?;
        debug!("sql transaction started");
        Ok(Transaction::Sql(txn))
    }

    async fn create_issuer(
        &self,
        txn: &mut Transaction,
        issuer: Issuer,
    ) -> Result<Issuer, StorageError> {
        issuer::create(sql_tx(txn)?, issuer).await
    }

    async fn delete_issuer(&self, txn: &mut Transaction, id: &str) -> Result<(), StorageError> {
        issuer::delete(sql_tx(txn)?, id).await
    }

    async fn get_issuer(
        &self,
        txn: Option<&Transaction>,
        id: &str,
    ) -> Result<Option<Issuer>, StorageError> {
        with_conn!(self, txn, |db| issuer::get(db, id).await)
    }

    async fn get_issuer_by_uri(
        &self,
        txn: Option<&Transaction>,
        uri: &str,
    ) -> Result<Option<Issuer>, StorageError> {
        with_conn!(self, txn, |db| issuer::get_by_uri(db, uri).await)
    }

    async fn list_issuers(
        &self,
        txn: Option<&Transaction>,
        owner_id: &str,
        page: &PageRequest,
    ) -> Result<Page<Issuer>, StorageError> {
        match txn {
            Some(txn) => issuer::list(sql_tx(txn)?, owner_id, page, None).await,
            None => issuer::list(&self.db, owner_id, page, self.as_of()).await,
        }
    }

    async fn update_issuer(
        &self,
        txn: &mut Transaction,
        id: &str,
        patch: &IssuerPatch,
    ) -> Result<Issuer, StorageError> {
        issuer::update(sql_tx(txn)?, id, patch).await
    }

    async fn create_group(
        &self,
        txn: &mut Transaction,
        group: Group,
    ) -> Result<Group, StorageError> {
        group::create(sql_tx(txn)?, group).await
    }

    async fn delete_group(&self, txn: &mut Transaction, id: &str) -> Result<(), StorageError> {
        group::delete(sql_tx(txn)?, id).await
    }

    async fn get_group(
        &self,
        txn: Option<&Transaction>,
        id: &str,
    ) -> Result<Option<Group>, StorageError> {
        with_conn!(self, txn, |db| group::get(db, id).await)
    }

    async fn list_groups(
        &self,
        txn: Option<&Transaction>,
        owner_id: &str,
        page: &PageRequest,
    ) -> Result<Page<Group>, StorageError> {
        match txn {
            Some(txn) => group::list(sql_tx(txn)?, owner_id, page, None).await,
            None => group::list(&self.db, owner_id, page, self.as_of()).await,
        }
    }

    async fn update_group(
        &self,
        txn: &mut Transaction,
        id: &str,
        update: &GroupUpdate,
    ) -> Result<Group, StorageError> {
        group::update(sql_tx(txn)?, id, update).await
    }

    async fn add_group_members(
        &self,
        txn: &mut Transaction,
        group_id: &str,
        members: &[String],
    ) -> Result<Vec<String>, StorageError> {
        group::member::add(sql_tx(txn)?, group_id, members).await
    }

    async fn list_group_members(
        &self,
        txn: Option<&Transaction>,
        group_id: &str,
        page: &PageRequest,
    ) -> Result<Page<String>, StorageError> {
        match txn {
            Some(txn) => group::member::list(sql_tx(txn)?, group_id, page, None).await,
            None => group::member::list(&self.db, group_id, page, self.as_of()).await,
        }
    }

    async fn remove_group_member(
        &self,
        txn: &mut Transaction,
        group_id: &str,
        member_id: &str,
    ) -> Result<(), StorageError> {
        group::member::remove(sql_tx(txn)?, group_id, member_id).await
    }

    async fn replace_group_members(
        &self,
        txn: &mut Transaction,
        group_id: &str,
        members: &[String],
    ) -> Result<MembershipChange, StorageError> {
        group::member::replace(sql_tx(txn)?, group_id, members).await
    }

    async fn store_user_info(
        &self,
        txn: &mut Transaction,
        user: UserInfo,
    ) -> Result<UserInfo, StorageError> {
        user_info::upsert(sql_tx(txn)?, user).await
    }

    async fn get_user_info(
        &self,
        txn: Option<&Transaction>,
        id: &str,
    ) -> Result<Option<UserInfo>, StorageError> {
        with_conn!(self, txn, |db| user_info::get(db, id).await)
    }

    async fn get_user_info_by_claims(
        &self,
        txn: Option<&Transaction>,
        issuer_id: &str,
        subject: &str,
    ) -> Result<Option<UserInfo>, StorageError> {
        with_conn!(self, txn, |db| user_info::get_by_claims(db, issuer_id, subject)
            .await)
    }

    async fn get_user_owner_id(
        &self,
        txn: Option<&Transaction>,
        id: &str,
    ) -> Result<Option<String>, StorageError> {
        with_conn!(self, txn, |db| user_info::get_owner_id(db, id).await)
    }

    async fn list_user_info(
        &self,
        txn: Option<&Transaction>,
        issuer_id: &str,
        page: &PageRequest,
    ) -> Result<Page<UserInfo>, StorageError> {
        match txn {
            Some(txn) => user_info::list(sql_tx(txn)?, issuer_id, page, None).await,
            None => user_info::list(&self.db, issuer_id, page, self.as_of()).await,
        }
    }

    async fn create_oauth_client(
        &self,
        txn: &mut Transaction,
        client: OAuthClient,
    ) -> Result<OAuthClient, StorageError> {
        oauth_client::create(sql_tx(txn)?, client).await
    }

    async fn delete_oauth_client(
        &self,
        txn: &mut Transaction,
        id: &str,
    ) -> Result<(), StorageError> {
        oauth_client::delete(sql_tx(txn)?, id).await
    }

    async fn get_oauth_client(
        &self,
        txn: Option<&Transaction>,
        id: &str,
    ) -> Result<Option<OAuthClient>, StorageError> {
        with_conn!(self, txn, |db| oauth_client::get(db, id).await)
    }
}
