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
use sea_orm::sea_query::OnConflict;

use crate::db::entity::{
    prelude::{Issuer as DbIssuer, UserInfo as DbUserInfo},
    user_info as db_user_info,
};
use crate::error::DbContextExt;
use crate::storage::StorageError;
use crate::user::types::UserInfo;

use super::get_by_claims;

/// Insert the user or refresh the name and email of the present one.
///
/// The id of the present record is kept.
#[tracing::instrument(level = "debug", skip(db, user), fields(issuer_id = %user.issuer_id))]
pub async fn upsert<C: ConnectionTrait>(db: &C, user: UserInfo) -> Result<UserInfo, StorageError> {
    if DbIssuer::find_by_id(&user.issuer_id)
        .one(db)
        .await
        .context("fetching issuer of the user")?
        .is_none()
    {
        return Err(StorageError::IssuerNotFound(user.issuer_id));
    }
    let entry = db_user_info::ActiveModel {
        id: Set(user.id.clone()),
        issuer_id: Set(user.issuer_id.clone()),
        subject: Set(user.subject.clone()),
        name: Set(user.name.clone()),
        email: Set(user.email.clone()),
    };
    DbUserInfo::insert(entry)
        .on_conflict(
            OnConflict::columns([
                db_user_info::Column::IssuerId,
                db_user_info::Column::Subject,
            ])
            .update_columns([db_user_info::Column::Name, db_user_info::Column::Email])
            .to_owned(),
        )
        .exec_without_returning(db)
        .await
        .context("storing user")?;
    get_by_claims(db, &user.issuer_id, &user.subject)
        .await?
        .ok_or(StorageError::UserNotFound(user.id))
}
