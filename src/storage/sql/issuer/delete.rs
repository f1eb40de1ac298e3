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
    prelude::{Issuer as DbIssuer, UserInfo as DbUserInfo},
    user_info,
};
use crate::error::DbContextExt;
use crate::storage::StorageError;

/// Delete the issuer with its user records.
///
/// The foreign key cascades as well, but SQLite only honors it with the
/// `foreign_keys` pragma enabled.
#[tracing::instrument(level = "debug", skip(db))]
pub async fn delete<C: ConnectionTrait>(db: &C, id: &str) -> Result<(), StorageError> {
    DbUserInfo::delete_many()
        .filter(user_info::Column::IssuerId.eq(id))
        .exec(db)
        .await
        .context("deleting users of the issuer")?;
    let res = DbIssuer::delete_by_id(id)
        .exec(db)
        .await
        .context("deleting issuer")?;
    if res.rows_affected == 0 {
        return Err(StorageError::IssuerNotFound(id.into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Transaction};

    use super::*;

    #[tokio::test]
    async fn test_delete() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([
                MockExecResult {
                    rows_affected: 2,
                    ..Default::default()
                },
                MockExecResult {
                    rows_affected: 1,
                    ..Default::default()
                },
            ])
            .into_connection();

        delete(&db, "1").await.unwrap();
        assert_eq!(
            db.into_transaction_log(),
            [
                Transaction::from_sql_and_values(
                    DatabaseBackend::Postgres,
                    r#"DELETE FROM "user_info" WHERE "user_info"."issuer_id" = $1"#,
                    ["1".into()]
                ),
                Transaction::from_sql_and_values(
                    DatabaseBackend::Postgres,
                    r#"DELETE FROM "issuer" WHERE "issuer"."id" = $1"#,
                    ["1".into()]
                ),
            ]
        );
    }

    #[tokio::test]
    async fn test_delete_missing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult::default(), MockExecResult::default()])
            .into_connection();

        assert!(matches!(
            delete(&db, "1").await,
            Err(StorageError::IssuerNotFound(id)) if id == "1"
        ));
    }
}
