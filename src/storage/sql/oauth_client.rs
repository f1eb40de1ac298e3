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
//! OAuth client persistence.
use sea_orm::ConnectionTrait;
use sea_orm::entity::*;

use crate::db::entity::{oauth_client as db_oauth_client, prelude::OauthClient as DbOauthClient};
use crate::error::DbContextExt;
use crate::oauth_client::types::OAuthClient;
use crate::storage::StorageError;

impl TryFrom<db_oauth_client::Model> for OAuthClient {
    type Error = StorageError;

    fn try_from(value: db_oauth_client::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id,
            owner_id: value.owner_id,
            name: value.name,
            secret_hash: value.secret_hash,
            audience: serde_json::from_str(&value.audience)?,
        })
    }
}

#[tracing::instrument(level = "debug", skip(db, client), fields(client_id = %client.id))]
pub async fn create<C: ConnectionTrait>(
    db: &C,
    client: OAuthClient,
) -> Result<OAuthClient, StorageError> {
    let entry = db_oauth_client::ActiveModel {
        id: Set(client.id.clone()),
        owner_id: Set(client.owner_id.clone()),
        name: Set(client.name.clone()),
        secret_hash: Set(client.secret_hash.clone()),
        audience: Set(serde_json::to_string(&client.audience)?),
    };
    entry
        .insert(db)
        .await
        .context("persisting new oauth client")
        .map_err(StorageError::conflict_on(client.id))?
        .try_into()
}

#[tracing::instrument(level = "debug", skip(db))]
pub async fn delete<C: ConnectionTrait>(db: &C, id: &str) -> Result<(), StorageError> {
    let res = DbOauthClient::delete_by_id(id)
        .exec(db)
        .await
        .context("deleting oauth client")?;
    if res.rows_affected == 0 {
        return Err(StorageError::OAuthClientNotFound(id.into()));
    }
    Ok(())
}

#[tracing::instrument(level = "debug", skip(db))]
pub async fn get<C: ConnectionTrait>(
    db: &C,
    id: &str,
) -> Result<Option<OAuthClient>, StorageError> {
    DbOauthClient::find_by_id(id)
        .one(db)
        .await
        .context("fetching oauth client by id")?
        .map(TryInto::try_into)
        .transpose()
}
