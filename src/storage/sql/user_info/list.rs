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

use crate::db::entity::{prelude::UserInfo as DbUserInfo, user_info as db_user_info};
use crate::pagination::{Page, PageRequest, id_key};
use crate::storage::StorageError;
use crate::storage::sql::keyset_page;
use crate::user::types::UserInfo;

/// List the users of the issuer ordered by the id.
#[tracing::instrument(level = "debug", skip(db))]
pub async fn list<C: ConnectionTrait>(
    db: &C,
    issuer_id: &str,
    page: &PageRequest,
    as_of: Option<&str>,
) -> Result<Page<UserInfo>, StorageError> {
    let items: Vec<UserInfo> = keyset_page::<DbUserInfo, _>(
        db,
        (db_user_info::Column::IssuerId, issuer_id),
        db_user_info::Column::Id,
        page,
        as_of,
        "listing users",
    )
    .await?
    .into_iter()
    .map(Into::into)
    .collect();
    Ok(Page::new(items, page.limit, |x| id_key(x.id.clone()))?)
}
