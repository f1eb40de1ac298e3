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
//! Group persistence.
use sea_orm::entity::*;

mod create;
mod delete;
mod get;
mod list;
pub mod member;
mod update;

pub use create::create;
pub use delete::delete;
pub use get::get;
pub use list::list;
pub use update::update;

use crate::db::entity::group as db_group;
use crate::group::types::{Group, GroupUpdate};

impl From<db_group::Model> for Group {
    fn from(value: db_group::Model) -> Self {
        Self {
            id: value.id,
            owner_id: value.owner_id,
            name: value.name,
            description: value.description,
        }
    }
}

impl From<&Group> for db_group::ActiveModel {
    fn from(value: &Group) -> Self {
        Self {
            id: Set(value.id.clone()),
            owner_id: Set(value.owner_id.clone()),
            name: Set(value.name.clone()),
            description: Set(value.description.clone()),
        }
    }
}

fn to_active_model_update(current: db_group::Model, update: &GroupUpdate) -> db_group::ActiveModel {
    let mut entry: db_group::ActiveModel = current.into();
    if let Some(val) = &update.name {
        entry.name = Set(val.clone());
    }
    if let Some(val) = &update.description {
        entry.description = Set(Some(val.clone()));
    }
    entry
}
