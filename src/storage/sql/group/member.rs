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
//! Group membership.
use sea_orm::ConnectionTrait;
use sea_orm::entity::*;
use sea_orm::query::*;
use std::collections::BTreeSet;

use crate::db::entity::{
    group_member,
    prelude::{Group as DbGroup, GroupMember as DbGroupMember},
};
use crate::error::DbContextExt;
use crate::group::types::MembershipChange;
use crate::pagination::{Page, PageRequest};
use crate::storage::sql::keyset_page;
use crate::storage::{MEMBER_SORT_KEY, StorageError, membership_diff};

async fn ensure_group<C: ConnectionTrait>(db: &C, group_id: &str) -> Result<(), StorageError> {
    DbGroup::find_by_id(group_id)
        .one(db)
        .await
        .context("fetching group")?
        .map(|_| ())
        .ok_or_else(|| StorageError::GroupNotFound(group_id.into()))
}

async fn insert<C: ConnectionTrait>(
    db: &C,
    group_id: &str,
    members: &[String],
) -> Result<(), StorageError> {
    if members.is_empty() {
        return Ok(());
    }
    DbGroupMember::insert_many(members.iter().map(|member| group_member::ActiveModel {
        group_id: Set(group_id.into()),
        member_id: Set(member.clone()),
    }))
    .exec_without_returning(db)
    .await
    .context("adding group members")?;
    Ok(())
}

/// Add the members that are not present yet and return them.
#[tracing::instrument(level = "debug", skip(db))]
pub async fn add<C: ConnectionTrait>(
    db: &C,
    group_id: &str,
    members: &[String],
) -> Result<Vec<String>, StorageError> {
    ensure_group(db, group_id).await?;
    if members.is_empty() {
        return Ok(Vec::new());
    }
    let existing: BTreeSet<String> = DbGroupMember::find()
        .filter(group_member::Column::GroupId.eq(group_id))
        .filter(group_member::Column::MemberId.is_in(members.iter().cloned()))
        .all(db)
        .await
        .context("fetching present group members")?
        .into_iter()
        .map(|x| x.member_id)
        .collect();
    let mut added: Vec<String> = Vec::new();
    for member in members {
        if !existing.contains(member) && !added.contains(member) {
            added.push(member.clone());
        }
    }
    insert(db, group_id, &added).await?;
    Ok(added)
}

/// List the members of the group ordered by the member id.
#[tracing::instrument(level = "debug", skip(db))]
pub async fn list<C: ConnectionTrait>(
    db: &C,
    group_id: &str,
    page: &PageRequest,
    as_of: Option<&str>,
) -> Result<Page<String>, StorageError> {
    let items: Vec<String> = keyset_page::<DbGroupMember, _>(
        db,
        (group_member::Column::GroupId, group_id),
        group_member::Column::MemberId,
        page,
        as_of,
        "listing group members",
    )
    .await?
    .into_iter()
    .map(|x| x.member_id)
    .collect();
    Ok(Page::new(items, page.limit, |x| {
        [(MEMBER_SORT_KEY[0].to_string(), x.clone())].into()
    })?)
}

#[tracing::instrument(level = "debug", skip(db))]
pub async fn remove<C: ConnectionTrait>(
    db: &C,
    group_id: &str,
    member_id: &str,
) -> Result<(), StorageError> {
    ensure_group(db, group_id).await?;
    let res = DbGroupMember::delete_by_id((group_id.to_string(), member_id.to_string()))
        .exec(db)
        .await
        .context("removing group member")?;
    if res.rows_affected == 0 {
        return Err(StorageError::MemberNotFound {
            group_id: group_id.into(),
            member_id: member_id.into(),
        });
    }
    Ok(())
}

/// Reconcile the membership touching only the difference.
#[tracing::instrument(level = "debug", skip(db))]
pub async fn replace<C: ConnectionTrait>(
    db: &C,
    group_id: &str,
    members: &[String],
) -> Result<MembershipChange, StorageError> {
    ensure_group(db, group_id).await?;
    let current: Vec<String> = DbGroupMember::find()
        .filter(group_member::Column::GroupId.eq(group_id))
        .all(db)
        .await
        .context("fetching group members")?
        .into_iter()
        .map(|x| x.member_id)
        .collect();
    let change = membership_diff(&current, members);
    if !change.removed.is_empty() {
        DbGroupMember::delete_many()
            .filter(group_member::Column::GroupId.eq(group_id))
            .filter(group_member::Column::MemberId.is_in(change.removed.iter().cloned()))
            .exec(db)
            .await
            .context("removing group members")?;
    }
    insert(db, group_id, &change.added).await?;
    Ok(change)
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Transaction};

    use super::super::tests::{get_group_mock, get_member_mock};
    use super::*;
    use crate::db::entity::group;

    #[tokio::test]
    async fn test_add_skips_present() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![get_group_mock("g")]])
            .append_query_results([vec![get_member_mock("g", "user:a")]])
            .append_exec_results([MockExecResult {
                rows_affected: 1,
                ..Default::default()
            }])
            .into_connection();

        assert_eq!(
            vec!["user:b".to_string()],
            add(
                &db,
                "g",
                &["user:a".into(), "user:b".into(), "user:b".into()]
            )
            .await
            .unwrap()
        );
        assert_eq!(
            db.into_transaction_log()[2],
            Transaction::from_sql_and_values(
                DatabaseBackend::Postgres,
                r#"INSERT INTO "group_member" ("group_id", "member_id") VALUES ($1, $2)"#,
                ["g".into(), "user:b".into()]
            )
        );
    }

    #[tokio::test]
    async fn test_add_missing_group() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<group::Model>::new()])
            .into_connection();

        assert!(matches!(
            add(&db, "g", &["user:a".into()]).await,
            Err(StorageError::GroupNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![
                get_member_mock("g", "user:a"),
                get_member_mock("g", "user:b"),
            ]])
            .into_connection();

        let page = list(&db, "g", &PageRequest::new(None, Some(2)), None)
            .await
            .unwrap();
        assert_eq!(vec!["user:a".to_string(), "user:b".to_string()], page.items);
        assert_eq!(
            "user:b",
            page.next.unwrap().decode(MEMBER_SORT_KEY).unwrap()["member_id"]
        );
        assert_eq!(
            db.into_transaction_log(),
            [Transaction::from_sql_and_values(
                DatabaseBackend::Postgres,
                r#"SELECT "group_member"."group_id", "group_member"."member_id" FROM "group_member" WHERE "group_member"."group_id" = $1 ORDER BY "group_member"."member_id" ASC LIMIT $2"#,
                ["g".into(), 2u64.into()]
            ),]
        );
    }

    #[tokio::test]
    async fn test_remove() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![get_group_mock("g")],
                vec![get_group_mock("g")],
                vec![],
            ])
            .append_exec_results([
                MockExecResult {
                    rows_affected: 1,
                    ..Default::default()
                },
                MockExecResult::default(),
            ])
            .into_connection();

        remove(&db, "g", "user:a").await.unwrap();
        assert!(matches!(
            remove(&db, "g", "user:a").await,
            Err(StorageError::MemberNotFound { .. })
        ));
        assert!(matches!(
            remove(&db, "missing", "user:a").await,
            Err(StorageError::GroupNotFound(_))
        ));
        let log = db.into_transaction_log();
        assert_eq!(5, log.len());
        assert_eq!(
            log[1],
            Transaction::from_sql_and_values(
                DatabaseBackend::Postgres,
                r#"DELETE FROM "group_member" WHERE "group_member"."group_id" = $1 AND "group_member"."member_id" = $2"#,
                ["g".into(), "user:a".into()]
            )
        );
    }

    #[tokio::test]
    async fn test_replace() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![get_group_mock("g")]])
            .append_query_results([vec![
                get_member_mock("g", "user:a"),
                get_member_mock("g", "user:b"),
            ]])
            .append_exec_results([
                MockExecResult {
                    rows_affected: 1,
                    ..Default::default()
                },
                MockExecResult {
                    rows_affected: 1,
                    ..Default::default()
                },
            ])
            .into_connection();

        let change = replace(&db, "g", &["user:b".into(), "user:c".into()])
            .await
            .unwrap();
        assert_eq!(vec!["user:c".to_string()], change.added);
        assert_eq!(vec!["user:a".to_string()], change.removed);
        assert_eq!(4, db.into_transaction_log().len());
    }

    #[tokio::test]
    async fn test_replace_unchanged() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![get_group_mock("g")]])
            .append_query_results([vec![get_member_mock("g", "user:a")]])
            .into_connection();

        assert!(
            replace(&db, "g", &["user:a".into()])
                .await
                .unwrap()
                .is_empty()
        );
        assert_eq!(2, db.into_transaction_log().len());
    }
}
