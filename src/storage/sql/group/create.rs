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

use crate::db::entity::group as db_group;
use crate::error::DbContextExt;
use crate::group::types::Group;
use crate::storage::StorageError;

#[tracing::instrument(level = "debug", skip(db, group), fields(group_id = %group.id))]
pub async fn create<C: ConnectionTrait>(db: &C, group: Group) -> Result<Group, StorageError> {
    let db_entry: db_group::Model = db_group::ActiveModel::from(&group)
        .insert(db)
        .await
        .context("persisting new group")
        .map_err(StorageError::conflict_on(group.name.clone()))?;
    Ok(db_entry.into())
}
