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
use jsonwebtoken::Algorithm;
use serde::{Deserialize, Deserializer};
use std::path::PathBuf;
use std::str::FromStr;

use super::common::csv;

/// Local signing keys.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct SigningSection {
    /// Comma separated `kid:alg:path` entries. The first entry is the active
    /// signing key, the remaining ones are only published.
    #[serde(default, deserialize_with = "signing_keys")]
    pub keys: Vec<SigningKeyConfig>,
}

/// Single configured private key.
#[derive(Debug, Clone, PartialEq)]
pub struct SigningKeyConfig {
    /// Key ID.
    pub kid: String,
    /// Signature algorithm.
    pub algorithm: Algorithm,
    /// PEM encoded private key location.
    pub path: PathBuf,
}

impl FromStr for SigningKeyConfig {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(kid), Some(alg), Some(path)) if !kid.is_empty() && !path.is_empty() => {
                Ok(Self {
                    kid: kid.into(),
                    algorithm: Algorithm::from_str(alg)
                        .map_err(|_| format!("unsupported signing algorithm {alg}"))?,
                    path: PathBuf::from(path),
                })
            }
            _ => Err(format!("signing key `{s}` must have the `kid:alg:path` form")),
        }
    }
}

fn signing_keys<'de, D>(deserializer: D) -> Result<Vec<SigningKeyConfig>, D::Error>
where
    D: Deserializer<'de>,
{
    csv(deserializer)?
        .iter()
        .map(|x| SigningKeyConfig::from_str(x).map_err(serde::de::Error::custom))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key() {
        assert_eq!(
            SigningKeyConfig {
                kid: "k1".into(),
                algorithm: Algorithm::RS256,
                path: "/etc/sts/k1.pem".into()
            },
            SigningKeyConfig::from_str("k1:RS256:/etc/sts/k1.pem").unwrap()
        );
        assert!(SigningKeyConfig::from_str("k1:RS256").is_err());
        assert!(SigningKeyConfig::from_str("k1:XX999:/k").is_err());
        assert!(SigningKeyConfig::from_str(":RS256:/k").is_err());
    }
}
