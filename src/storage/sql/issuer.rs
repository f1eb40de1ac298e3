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
//! Issuer persistence.
use sea_orm::entity::*;

mod create;
mod delete;
mod get;
mod list;
mod update;

pub use create::create;
pub use delete::delete;
pub use get::{get, get_by_uri};
pub use list::list;
pub use update::update;

use crate::db::entity::issuer as db_issuer;
use crate::issuer::types::{Issuer, IssuerPatch};
use crate::storage::StorageError;

impl TryFrom<db_issuer::Model> for Issuer {
    type Error = StorageError;

    fn try_from(value: db_issuer::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id,
            owner_id: value.owner_id,
            name: value.name,
            uri: value.uri,
            jwks_uri: value.jwks_uri,
            claim_mappings: serde_json::from_str(&value.claim_mappings)?,
            claim_conditions: value
                .claim_conditions
                .as_deref()
                .map(serde_json::from_str)
                .transpose()?,
        })
    }
}

impl TryFrom<&Issuer> for db_issuer::ActiveModel {
    type Error = StorageError;

    fn try_from(value: &Issuer) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Set(value.id.clone()),
            owner_id: Set(value.owner_id.clone()),
            name: Set(value.name.clone()),
            uri: Set(value.uri.clone()),
            jwks_uri: Set(value.jwks_uri.clone()),
            claim_mappings: Set(serde_json::to_string(&value.claim_mappings)?),
            claim_conditions: Set(value
                .claim_conditions
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?),
        })
    }
}

/// Active model updating only the patched columns.
fn to_active_model_update(
    current: db_issuer::Model,
    patch: &IssuerPatch,
) -> Result<db_issuer::ActiveModel, StorageError> {
    let mut entry: db_issuer::ActiveModel = current.into();
    if let Some(val) = &patch.name {
        entry.name = Set(val.clone());
    }
    if let Some(val) = &patch.uri {
        entry.uri = Set(val.clone());
    }
    if let Some(val) = &patch.jwks_uri {
        entry.jwks_uri = Set(val.clone());
    }
    if let Some(val) = &patch.claim_mappings {
        entry.claim_mappings = Set(serde_json::to_string(val)?);
    }
    if let Some(val) = &patch.claim_conditions {
        entry.claim_conditions = Set(val.as_ref().map(serde_json::to_string).transpose()?);
    }
    Ok(entry)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::BTreeMap;

    use crate::db::entity::issuer;
    use crate::expression::compile;

    pub fn get_issuer_mock<S: AsRef<str>>(id: S) -> issuer::Model {
        let mappings = BTreeMap::from([(
            "email".to_string(),
            compile("claims.email").unwrap(),
        )]);
        issuer::Model {
            id: id.as_ref().into(),
            owner_id: "owner".into(),
            name: "idp".into(),
            uri: format!("https://{}.example.com", id.as_ref()),
            jwks_uri: format!("https://{}.example.com/jwks", id.as_ref()),
            claim_mappings: serde_json::to_string(&mappings).unwrap(),
            claim_conditions: None,
        }
    }
}
