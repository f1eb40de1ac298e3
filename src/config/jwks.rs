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

/// Remote JWKS fetching.
#[derive(Debug, Deserialize, Clone)]
pub struct JwksSection {
    /// Lifetime of a fetched key set in seconds.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl: u64,

    /// Fetch timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Minimal age in seconds of a cached key set before an unknown `kid`
    /// triggers a refetch.
    #[serde(default = "default_refetch_interval")]
    pub refetch_interval: u64,
}

fn default_cache_ttl() -> u64 {
    300
}

fn default_timeout() -> u64 {
    10
}

fn default_refetch_interval() -> u64 {
    30
}

impl Default for JwksSection {
    fn default() -> Self {
        Self {
            cache_ttl: default_cache_ttl(),
            timeout: default_timeout(),
            refetch_interval: default_refetch_interval(),
        }
    }
}
