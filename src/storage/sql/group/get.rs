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
use crate::group::types::Group;
use crate::storage::StorageError;

#[tracing::instrument(level = "debug", skip(db))]
pub async fn get<C: ConnectionTrait>(db: &C, id: &str) -> Result<Option<Group>, StorageError> {
    Ok(DbGroup::find_by_id(id)
        .one(db)
        .await
        .context("fetching group by id")?
        .map(Into::into))
}
