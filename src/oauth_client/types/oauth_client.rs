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
use derive_builder::Builder;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::BuilderError;

/// Registered OAuth2 client.
#[derive(Builder, Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[builder(build_fn(error = "BuilderError"))]
#[builder(setter(strip_option, into))]
pub struct OAuthClient {
    /// Client ID.
    pub id: String,

    /// Tenant owning the client.
    pub owner_id: String,

    pub name: String,

    /// bcrypt hash of the client secret.
    #[serde(skip_serializing)]
    pub secret_hash: String,

    /// Audiences the client may request.
    #[builder(default)]
    pub audience: Vec<String>,
}

/// New OAuth2 client.
#[derive(Builder, Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[builder(build_fn(error = "BuilderError"))]
#[builder(setter(strip_option, into))]
pub struct OAuthClientCreate {
    #[builder(default)]
    pub id: Option<String>,

    pub owner_id: String,

    pub name: String,

    #[builder(default)]
    pub audience: Vec<String>,
}

/// Freshly registered client with its plaintext secret.
#[derive(Debug)]
pub struct OAuthClientCredentials {
    pub client: OAuthClient,
    /// Returned only once, never stored.
    pub secret: SecretString,
}
