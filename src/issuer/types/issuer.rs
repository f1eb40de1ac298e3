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
use std::collections::BTreeMap;

use crate::error::BuilderError;
use crate::expression::CompiledExpr;

/// Output claim name to the expression computing its value.
pub type ClaimMappings = BTreeMap<String, CompiledExpr>;

/// Claims of the JWT.
pub type JsonClaims = serde_json::Map<String, serde_json::Value>;

/// Trusted external token issuer.
#[derive(Builder, Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[builder(build_fn(error = "BuilderError"))]
#[builder(setter(strip_option, into))]
pub struct Issuer {
    /// Issuer ID.
    pub id: String,

    /// Tenant owning the issuer.
    pub owner_id: String,

    /// Issuer name.
    pub name: String,

    /// The `iss` claim of the tokens issued by it.
    pub uri: String,

    /// Location of the key set used to verify the issued tokens.
    pub jwks_uri: String,

    /// Claims of the exchanged token.
    #[builder(default)]
    pub claim_mappings: ClaimMappings,

    /// Condition the subject token claims must satisfy. Absent condition
    /// admits every token.
    #[builder(default)]
    pub claim_conditions: Option<CompiledExpr>,
}

impl Issuer {
    /// Source text of the configured mappings.
    pub fn claim_mapping_sources(&self) -> BTreeMap<String, String> {
        self.claim_mappings
            .iter()
            .map(|(k, v)| (k.clone(), v.source.clone()))
            .collect()
    }
}

/// New issuer.
#[derive(Builder, Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[builder(build_fn(error = "BuilderError"))]
#[builder(setter(strip_option, into))]
pub struct IssuerCreate {
    /// Optional ID of the issuer.
    #[builder(default)]
    pub id: Option<String>,

    pub owner_id: String,

    pub name: String,

    pub uri: String,

    pub jwks_uri: String,

    /// Claim name to expression source.
    #[builder(default)]
    pub claim_mappings: BTreeMap<String, String>,

    /// Condition expression source.
    #[builder(default)]
    pub claim_conditions: Option<String>,
}

/// Issuer update. Only the present fields are changed; the mappings and the
/// condition are each replaced as a whole.
#[derive(Builder, Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[builder(build_fn(error = "BuilderError"))]
#[builder(setter(strip_option, into))]
pub struct IssuerUpdate {
    #[builder(default)]
    pub name: Option<String>,

    #[builder(default)]
    pub uri: Option<String>,

    #[builder(default)]
    pub jwks_uri: Option<String>,

    #[builder(default)]
    pub claim_mappings: Option<BTreeMap<String, String>>,

    /// `Some(None)` removes the condition.
    #[builder(default)]
    pub claim_conditions: Option<Option<String>>,
}

/// Compiled issuer update as applied by the storage.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IssuerPatch {
    pub name: Option<String>,
    pub uri: Option<String>,
    pub jwks_uri: Option<String>,
    pub claim_mappings: Option<ClaimMappings>,
    pub claim_conditions: Option<Option<CompiledExpr>>,
}

impl IssuerPatch {
    /// Apply the patch to the issuer.
    pub fn apply_to(&self, issuer: &mut Issuer) {
        if let Some(val) = &self.name {
            issuer.name.clone_from(val);
        }
        if let Some(val) = &self.uri {
            issuer.uri.clone_from(val);
        }
        if let Some(val) = &self.jwks_uri {
            issuer.jwks_uri.clone_from(val);
        }
        if let Some(val) = &self.claim_mappings {
            issuer.claim_mappings.clone_from(val);
        }
        if let Some(val) = &self.claim_conditions {
            issuer.claim_conditions.clone_from(val);
        }
    }
}
