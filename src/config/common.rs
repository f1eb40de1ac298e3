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
use serde::{Deserialize, Deserializer};

/// Global options.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct DefaultSection {
    /// Debug logging
    pub debug: Option<bool>,
    /// Public endpoint
    pub public_endpoint: Option<String>,
}

/// Comma separated list. Blank entries are skipped.
pub fn csv<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(String::deserialize(deserializer)?
        .split(',')
        .map(str::trim)
        .filter(|x| !x.is_empty())
        .map(Into::into)
        .collect())
}

pub(super) fn default_true() -> bool {
    true
}
