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
use sea_orm::ConnectionTrait;
use sea_orm::entity::*;
use sea_orm::query::*;

use crate::db::entity::{
    group_member,
    prelude::{Group as DbGroup, GroupMember as DbGroupMember},
};
use crate::error::DbContextExt;
use crate::storage::StorageError;

/// Delete the empty group.
#[tracing::instrument(level = "debug", skip(db))]
pub async fn delete<C: ConnectionTrait>(db: &C, id: &str) -> Result<(), StorageError> {
    let member = DbGroupMember::find()
        .filter(group_member::Column::GroupId.eq(id))
        .one(db)
        .await
        .context("checking group members")?;
    if member.is_some() {
        return Err(StorageError::GroupNotEmpty(id.into()));
    }
    let res = DbGroup::delete_by_id(id)
        .exec(db)
        .await
        .context("deleting group")?;
    if res.rows_affected == 0 {
        return Err(StorageError::GroupNotFound(id.into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Transaction};

    use super::super::tests::get_member_mock;
    use super::*;

    #[tokio::test]
    async fn test_delete() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<group_member::Model>::new()])
            .append_exec_results([MockExecResult {
                rows_affected: 1,
                ..Default::default()
            }])
            .into_connection();

        delete(&db, "1").await.unwrap();
        assert_eq!(
            db.into_transaction_log(),
            [
                Transaction::from_sql_and_values(
                    DatabaseBackend::Postgres,
                    r#"SELECT "group_member"."group_id", "group_member"."member_id" FROM "group_member" WHERE "group_member"."group_id" = $1 LIMIT $2"#,
                    ["1".into(), 1u64.into()]
                ),
                Transaction::from_sql_and_values(
                    DatabaseBackend::Postgres,
                    r#"DELETE FROM "group" WHERE "group"."id" = $1"#,
                    ["1".into()]
                ),
            ]
        );
    }

    #[tokio::test]
    async fn test_delete_not_empty() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![get_member_mock("1", "user:a")]])
            .into_connection();

        assert!(matches!(
            delete(&db, "1").await,
            Err(StorageError::GroupNotEmpty(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_missing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<group_member::Model>::new()])
            .append_exec_results([MockExecResult::default()])
            .into_connection();

        assert!(matches!(
            delete(&db, "1").await,
            Err(StorageError::GroupNotFound(_))
        ));
    }
}
