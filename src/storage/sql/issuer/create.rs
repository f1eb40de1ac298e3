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

use crate::db::entity::issuer as db_issuer;
use crate::error::DbContextExt;
use crate::issuer::types::Issuer;
use crate::storage::StorageError;

#[tracing::instrument(level = "debug", skip(db, issuer), fields(issuer_id = %issuer.id))]
pub async fn create<C: ConnectionTrait>(db: &C, issuer: Issuer) -> Result<Issuer, StorageError> {
    let entry = db_issuer::ActiveModel::try_from(&issuer)?;
    let db_entry: db_issuer::Model = entry
        .insert(db)
        .await
        .context("persisting new issuer")
        .map_err(StorageError::conflict_on(issuer.uri.clone()))?;
    db_entry.try_into()
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase, Transaction};

    use super::super::tests::get_issuer_mock;
    use super::*;

    #[tokio::test]
    async fn test_create() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![get_issuer_mock("1")]])
            .into_connection();
        let issuer: Issuer = get_issuer_mock("1").try_into().unwrap();

        assert_eq!(create(&db, issuer.clone()).await.unwrap(), issuer);
        let mock = get_issuer_mock("1");
        assert_eq!(
            db.into_transaction_log(),
            [Transaction::from_sql_and_values(
                DatabaseBackend::Postgres,
                r#"INSERT INTO "issuer" ("id", "owner_id", "name", "uri", "jwks_uri", "claim_mappings", "claim_conditions") VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING "id", "owner_id", "name", "uri", "jwks_uri", "claim_mappings", "claim_conditions""#,
                [
                    "1".into(),
                    "owner".into(),
                    "idp".into(),
                    "https://1.example.com".into(),
                    "https://1.example.com/jwks".into(),
                    mock.claim_mappings.into(),
                    Option::<String>::None.into(),
                ]
            ),]
        );
    }
}
