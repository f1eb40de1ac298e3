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
use serde::{Deserialize, Serialize};

use crate::error::BuilderError;

/// External identity observed through an issuer.
#[derive(Builder, Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[builder(build_fn(error = "BuilderError"))]
#[builder(setter(strip_option, into))]
pub struct UserInfo {
    /// User ID.
    pub id: String,

    /// Issuer the identity comes from.
    pub issuer_id: String,

    /// The `sub` claim of the identity at the issuer.
    pub subject: String,

    #[builder(default)]
    pub name: Option<String>,

    #[builder(default)]
    pub email: Option<String>,
}

/// User information to store.
#[derive(Builder, Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[builder(build_fn(error = "BuilderError"))]
#[builder(setter(strip_option, into))]
pub struct UserInfoCreate {
    pub issuer_id: String,

    pub subject: String,

    #[builder(default)]
    pub name: Option<String>,

    #[builder(default)]
    pub email: Option<String>,
}
