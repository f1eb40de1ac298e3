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
//! User record persistence.
mod get;
mod list;
mod upsert;

pub use get::{get, get_by_claims, get_owner_id};
pub use list::list;
pub use upsert::upsert;

use crate::db::entity::user_info as db_user_info;
use crate::user::types::UserInfo;

impl From<db_user_info::Model> for UserInfo {
    fn from(value: db_user_info::Model) -> Self {
        Self {
            id: value.id,
            issuer_id: value.issuer_id,
            subject: value.subject,
            name: value.name,
            email: value.email,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use crate::db::entity::user_info;

    pub fn get_user_info_mock<S: AsRef<str>>(id: S) -> user_info::Model {
        user_info::Model {
            id: id.as_ref().into(),
            issuer_id: "iss".into(),
            subject: format!("sub-{}", id.as_ref()),
            name: Some("Jane".into()),
            email: Some("jane@example.com".into()),
        }
    }
}
