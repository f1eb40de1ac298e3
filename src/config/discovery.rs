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
use std::net::IpAddr;

use super::common::csv;

/// Discovery document options.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct DiscoverySection {
    /// Addresses of the reverse proxies whose `X-Forwarded-*` headers are
    /// trusted.
    #[serde(default, deserialize_with = "ip_list")]
    pub trusted_proxies: Vec<IpAddr>,
}

fn ip_list<'de, D>(deserializer: D) -> Result<Vec<IpAddr>, D::Error>
where
    D: Deserializer<'de>,
{
    csv(deserializer)?
        .iter()
        .map(|x| x.parse().map_err(serde::de::Error::custom))
        .collect()
}
