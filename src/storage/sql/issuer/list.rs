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

use crate::db::entity::{issuer as db_issuer, prelude::Issuer as DbIssuer};
use crate::issuer::types::Issuer;
use crate::pagination::{Page, PageRequest, id_key};
use crate::storage::StorageError;
use crate::storage::sql::keyset_page;

/// List the issuers of the owner ordered by the id.
#[tracing::instrument(level = "debug", skip(db))]
pub async fn list<C: ConnectionTrait>(
    db: &C,
    owner_id: &str,
    page: &PageRequest,
    as_of: Option<&str>,
) -> Result<Page<Issuer>, StorageError> {
    let items = keyset_page::<DbIssuer, _>(
        db,
        (db_issuer::Column::OwnerId, owner_id),
        db_issuer::Column::Id,
        page,
        as_of,
        "listing issuers",
    )
    .await?
    .into_iter()
    .map(TryInto::try_into)
    .collect::<Result<Vec<Issuer>, _>>()?;
    Ok(Page::new(items, page.limit, |x| id_key(x.id.clone()))?)
}
