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
use serde::Deserialize;
use url::Url;

/// Authorization relationship service.
#[derive(Debug, Deserialize, Clone)]
pub struct RelationshipSection {
    /// Url receiving the relationship events. Events are only logged when
    /// unset.
    pub endpoint: Option<Url>,

    /// Publication timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

fn default_timeout() -> u64 {
    5
}

impl Default for RelationshipSection {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout: default_timeout(),
        }
    }
}
