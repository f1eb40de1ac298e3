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
use secrecy::SecretString;
use serde::Deserialize;

/// Issued access tokens.
#[derive(Debug, Deserialize, Clone)]
pub struct TokenSection {
    /// Issuer identity of this service. Used as the `iss` claim of the minted
    /// tokens and in the discovery document.
    #[serde(default = "default_issuer")]
    pub issuer: String,

    /// The amount of time that an access token should remain valid (in
    /// seconds). Minted tokens are bearer tokens, so a shorter duration
    /// reduces the potential impact of a leaked token.
    #[serde(default = "default_token_expiration")]
    pub expiration: u64,

    /// Global HMAC secret. Used to derive stable identifiers of the external
    /// identities.
    #[serde(default)]
    pub hmac_secret: Option<SecretString>,
}

fn default_issuer() -> String {
    "http://localhost:8080".into()
}

fn default_token_expiration() -> u64 {
    3600
}

impl Default for TokenSection {
    fn default() -> Self {
        Self {
            issuer: default_issuer(),
            expiration: default_token_expiration(),
            hmac_secret: None,
        }
    }
}
