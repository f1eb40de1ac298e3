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

use crate::db::entity::prelude::Group as DbGroup;
use crate::error::DbContextExt;
use crate::group::types::{Group, GroupUpdate};
use crate::storage::StorageError;

use super::to_active_model_update;

#[tracing::instrument(level = "debug", skip(db))]
pub async fn update<C: ConnectionTrait>(
    db: &C,
    id: &str,
    update: &GroupUpdate,
) -> Result<Group, StorageError> {
    let current = DbGroup::find_by_id(id)
        .one(db)
        .await
        .context("fetching group for update")?
        .ok_or_else(|| StorageError::GroupNotFound(id.into()))?;
    if *update == GroupUpdate::default() {
        return Ok(current.into());
    }
    let conflict = update.name.clone().unwrap_or_else(|| current.name.clone());
    Ok(to_active_model_update(current, update)
        .update(db)
        .await
        .context("updating group")
        .map_err(StorageError::conflict_on(conflict))?
        .into())
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase, Transaction};

    use super::super::tests::get_group_mock;
    use super::*;

    #[tokio::test]
    async fn test_update() {
        let mut updated = get_group_mock("1");
        updated.description = Some("new".into());
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![get_group_mock("1")], vec![updated]])
            .into_connection();

        let req = GroupUpdate {
            description: Some("new".into()),
            ..Default::default()
        };
        assert_eq!(
            Some("new".to_string()),
            update(&db, "1", &req).await.unwrap().description
        );
        assert_eq!(
            db.into_transaction_log(),
            [
                Transaction::from_sql_and_values(
                    DatabaseBackend::Postgres,
                    r#"SELECT "group"."id", "group"."owner_id", "group"."name", "group"."description" FROM "group" WHERE "group"."id" = $1 LIMIT $2"#,
                    ["1".into(), 1u64.into()]
                ),
                Transaction::from_sql_and_values(
                    DatabaseBackend::Postgres,
                    r#"UPDATE "group" SET "description" = $1 WHERE "group"."id" = $2 RETURNING "id", "owner_id", "name", "description""#,
                    ["new".into(), "1".into()]
                ),
            ]
        );
    }
}
