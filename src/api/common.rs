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
//! # Common API helpers
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};
use utoipa::IntoParams;
use validator::Validate;

use crate::api::error::ApiError;
use crate::pagination::{Cursor, PageRequest};

/// Policy target of the resource.
///
/// The serialized `object` extended with the `resource_id` and `owner_id`
/// the permission check is keyed by.
pub(crate) fn policy_target<T: Serialize>(
    resource_id: Option<&str>,
    owner_id: &str,
    object: &T,
) -> Result<Value, ApiError> {
    let mut target = match serde_json::to_value(object)? {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };
    target.insert("resource_id".into(), json!(resource_id));
    target.insert("owner_id".into(), json!(owner_id));
    Ok(Value::Object(target))
}

/// Deserialize an explicit `null` as `Some(None)`, keeping an absent field
/// `None`. Requires `#[serde(default)]` on the field.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Pagination query parameters.
#[derive(Clone, Debug, Default, Deserialize, Serialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct PaginationQuery {
    /// Opaque cursor returned as `next` by the previous page.
    #[param(nullable = false)]
    #[validate(length(max = 1024))]
    pub cursor: Option<String>,

    /// Page size. Clamped to the maximum; defaults when zero or absent.
    #[param(nullable = false, maximum = 100)]
    pub limit: Option<i64>,
}

impl PaginationQuery {
    pub fn page(&self) -> PageRequest {
        PageRequest::new(
            self.cursor.as_deref().map(Cursor::from),
            self.limit,
        )
    }
}

/// Query parameters of the listings scoped by the owning tenant.
#[derive(Clone, Debug, Default, Deserialize, Serialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct OwnerListParameters {
    /// Owning tenant.
    #[validate(length(min = 1, max = 64))]
    pub owner_id: String,

    #[param(nullable = false)]
    #[validate(length(max = 1024))]
    pub cursor: Option<String>,

    #[param(nullable = false, maximum = 100)]
    pub limit: Option<i64>,
}

impl OwnerListParameters {
    pub fn page(&self) -> PageRequest {
        PageRequest::new(
            self.cursor.as_deref().map(Cursor::from),
            self.limit,
        )
    }
}
