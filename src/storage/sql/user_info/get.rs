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
    user_info as db_user_info,
};
use crate::error::DbContextExt;
use crate::storage::StorageError;
use crate::user::types::UserInfo;

#[tracing::instrument(level = "debug", skip(db))]
pub async fn get<C: ConnectionTrait>(db: &C, id: &str) -> Result<Option<UserInfo>, StorageError> {
    Ok(DbUserInfo::find_by_id(id)
        .one(db)
        .await
        .context("fetching user by id")?
        .map(Into::into))
}

/// Find the user by the identity at the issuer.
#[tracing::instrument(level = "debug", skip(db))]
pub async fn get_by_claims<C: ConnectionTrait>(
    db: &C,
    issuer_id: &str,
    subject: &str,
) -> Result<Option<UserInfo>, StorageError> {
    Ok(DbUserInfo::find()
        .filter(db_user_info::Column::IssuerId.eq(issuer_id))
        .filter(db_user_info::Column::Subject.eq(subject))
        .one(db)
        .await
        .context("fetching user by issuer and subject")?
        .map(Into::into))
}

/// Owner of the issuer of the user.
#[tracing::instrument(level = "debug", skip(db))]
pub async fn get_owner_id<C: ConnectionTrait>(
    db: &C,
    id: &str,
) -> Result<Option<String>, StorageError> {
    Ok(DbIssuer::find()
        .inner_join(DbUserInfo)
        .filter(db_user_info::Column::Id.eq(id))
        .one(db)
        .await
        .context("fetching owner of the user")?
        .map(|issuer| issuer.owner_id))
}
