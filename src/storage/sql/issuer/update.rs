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

use crate::db::entity::prelude::Issuer as DbIssuer;
use crate::error::DbContextExt;
use crate::issuer::types::{Issuer, IssuerPatch};
use crate::storage::StorageError;

use super::to_active_model_update;

#[tracing::instrument(level = "debug", skip(db, patch))]
pub async fn update<C: ConnectionTrait>(
    db: &C,
    id: &str,
    patch: &IssuerPatch,
) -> Result<Issuer, StorageError> {
    let current = DbIssuer::find_by_id(id)
        .one(db)
        .await
        .context("fetching issuer for update")?
        .ok_or_else(|| StorageError::IssuerNotFound(id.into()))?;
    if *patch == IssuerPatch::default() {
        return current.try_into();
    }
    let conflict = patch.uri.clone().unwrap_or_else(|| current.uri.clone());
    to_active_model_update(current, patch)?
        .update(db)
        .await
        .context("updating issuer")
        .map_err(StorageError::conflict_on(conflict))?
        .try_into()
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase, Transaction};

    use super::super::tests::get_issuer_mock;
    use super::*;

    #[tokio::test]
    async fn test_update() {
        let mut updated = get_issuer_mock("1");
        updated.name = "renamed".into();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![get_issuer_mock("1")], vec![updated]])
            .into_connection();

        let patch = IssuerPatch {
            name: Some("renamed".into()),
            ..Default::default()
        };
        assert_eq!("renamed", update(&db, "1", &patch).await.unwrap().name);
        assert_eq!(
            db.into_transaction_log(),
            [
                Transaction::from_sql_and_values(
                    DatabaseBackend::Postgres,
                    r#"SELECT "issuer"."id", "issuer"."owner_id", "issuer"."name", "issuer"."uri", "issuer"."jwks_uri", "issuer"."claim_mappings", "issuer"."claim_conditions" FROM "issuer" WHERE "issuer"."id" = $1 LIMIT $2"#,
                    ["1".into(), 1u64.into()]
                ),
                Transaction::from_sql_and_values(
                    DatabaseBackend::Postgres,
                    r#"UPDATE "issuer" SET "name" = $1 WHERE "issuer"."id" = $2 RETURNING "id", "owner_id", "name", "uri", "jwks_uri", "claim_mappings", "claim_conditions""#,
                    ["renamed".into(), "1".into()]
                ),
            ]
        );
    }

    #[tokio::test]
    async fn test_update_missing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<crate::db::entity::issuer::Model>::new()])
            .into_connection();

        assert!(matches!(
            update(&db, "1", &IssuerPatch::default()).await,
            Err(StorageError::IssuerNotFound(_))
        ));
    }
}
