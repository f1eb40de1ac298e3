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

use crate::db::entity::{issuer as db_issuer, prelude::Issuer as DbIssuer};
use crate::error::DbContextExt;
use crate::issuer::types::Issuer;
use crate::storage::StorageError;

#[tracing::instrument(level = "debug", skip(db))]
pub async fn get<C: ConnectionTrait>(db: &C, id: &str) -> Result<Option<Issuer>, StorageError> {
    DbIssuer::find_by_id(id)
        .one(db)
        .await
        .context("fetching issuer by id")?
        .map(TryInto::try_into)
        .transpose()
}

#[tracing::instrument(level = "debug", skip(db))]
pub async fn get_by_uri<C: ConnectionTrait>(
    db: &C,
    uri: &str,
) -> Result<Option<Issuer>, StorageError> {
    DbIssuer::find()
        .filter(db_issuer::Column::Uri.eq(uri))
        .one(db)
        .await
        .context("fetching issuer by uri")?
        .map(TryInto::try_into)
        .transpose()
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase, Transaction};

    use super::super::tests::get_issuer_mock;
    use super::*;

    #[tokio::test]
    async fn test_get() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![get_issuer_mock("1")], vec![]])
            .into_connection();

        let issuer = get(&db, "1").await.unwrap().unwrap();
        assert_eq!("https://1.example.com", issuer.uri);
        assert_eq!("claims.email", issuer.claim_mappings["email"].source);
        assert!(get(&db, "2").await.unwrap().is_none());

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
                    r#"SELECT "issuer"."id", "issuer"."owner_id", "issuer"."name", "issuer"."uri", "issuer"."jwks_uri", "issuer"."claim_mappings", "issuer"."claim_conditions" FROM "issuer" WHERE "issuer"."id" = $1 LIMIT $2"#,
                    ["2".into(), 1u64.into()]
                ),
            ]
        );
    }

    #[tokio::test]
    async fn test_get_by_uri() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![get_issuer_mock("1")]])
            .into_connection();

        assert_eq!(
            "1",
            get_by_uri(&db, "https://1.example.com")
                .await
                .unwrap()
                .unwrap()
                .id
        );
        assert_eq!(
            db.into_transaction_log(),
            [Transaction::from_sql_and_values(
                DatabaseBackend::Postgres,
                r#"SELECT "issuer"."id", "issuer"."owner_id", "issuer"."name", "issuer"."uri", "issuer"."jwks_uri", "issuer"."claim_mappings", "issuer"."claim_conditions" FROM "issuer" WHERE "issuer"."uri" = $1 LIMIT $2"#,
                ["https://1.example.com".into(), 1u64.into()]
            ),]
        );
    }

    #[tokio::test]
    async fn test_get_corrupted_mappings() {
        let mut mock = get_issuer_mock("1");
        mock.claim_mappings = "not json".into();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![mock]])
            .into_connection();

        assert!(matches!(
            get(&db, "1").await,
            Err(StorageError::Json { .. })
        ));
    }
}
