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

use crate::db::entity::{group as db_group, prelude::Group as DbGroup};
use crate::group::types::Group;
use crate::pagination::{Page, PageRequest, id_key};
use crate::storage::StorageError;
use crate::storage::sql::keyset_page;

/// List the groups of the owner ordered by the id.
#[tracing::instrument(level = "debug", skip(db))]
pub async fn list<C: ConnectionTrait>(
    db: &C,
    owner_id: &str,
    page: &PageRequest,
    as_of: Option<&str>,
) -> Result<Page<Group>, StorageError> {
    let items: Vec<Group> = keyset_page::<DbGroup, _>(
        db,
        (db_group::Column::OwnerId, owner_id),
        db_group::Column::Id,
        page,
        as_of,
        "listing groups",
    )
    .await?
    .into_iter()
    .map(Into::into)
    .collect();
    Ok(Page::new(items, page.limit, |x| id_key(x.id.clone()))?)
}
