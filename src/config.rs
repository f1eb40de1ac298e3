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
//! # Configuration
//!
//! Parsing of the INI configuration file.
use config::{File, FileFormat};
use eyre::{Report, WrapErr};
use serde::Deserialize;
use std::path::PathBuf;

mod common;
mod database;
mod discovery;
mod jwks;
mod policy;
mod relationship;
mod signing;
mod storage;
mod token;

pub use common::{DefaultSection, csv};
pub use database::DatabaseSection;
pub use discovery::DiscoverySection;
pub use jwks::JwksSection;
pub use policy::PolicySection;
pub use relationship::RelationshipSection;
pub use signing::{SigningKeyConfig, SigningSection};
pub use storage::StorageSection;
pub use token::TokenSection;

#[derive(Debug, Default, Deserialize, Clone)]
pub struct Config {
    /// Global configuration options
    #[serde(rename = "DEFAULT")]
    pub default: Option<DefaultSection>,

    /// Database configuration
    pub database: DatabaseSection,

    /// Discovery document configuration.
    #[serde(default)]
    pub discovery: DiscoverySection,

    /// Remote key set fetching.
    #[serde(default)]
    pub jwks: JwksSection,

    /// API policy enforcement
    #[serde(default)]
    pub api_policy: PolicySection,

    /// Authorization relationship service.
    #[serde(default)]
    pub relationship: RelationshipSection,

    /// Local signing keys.
    #[serde(default)]
    pub signing: SigningSection,

    /// Storage engine options.
    #[serde(default)]
    pub storage: StorageSection,

    /// Token
    #[serde(default)]
    pub token: TokenSection,
}

impl Config {
    pub fn new(path: PathBuf) -> Result<Self, Report> {
        let mut builder = config::Config::builder();

        if std::path::Path::new(&path).is_file() {
            builder = builder.add_source(File::from(path).format(FileFormat::Ini));
        }

        builder.try_into()
    }

    /// Externally visible base url of the service, when configured.
    pub fn public_endpoint(&self) -> Option<String> {
        self.default
            .as_ref()
            .and_then(|dflt| dflt.public_endpoint.clone())
            .map(|val| val.trim_end_matches('/').to_string())
    }
}

impl TryFrom<config::ConfigBuilder<config::builder::DefaultState>> for Config {
    type Error = Report;
    fn try_from(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, Self::Error> {
        let mut builder = builder;
        builder = builder
            .set_default("api_policy.enable", "true")?
            .set_default("api_policy.opa_base_url", "http://localhost:8181")?
            .set_default("jwks.cache_ttl", "300")?
            .set_default("jwks.timeout", "10")?
            .set_default("jwks.refetch_interval", "30")?
            .set_default("relationship.timeout", "5")?
            .set_default("token.expiration", "3600")?
            .set_default("token.issuer", "http://localhost:8080")?;

        builder
            .build()
            .wrap_err("Failed to read configuration file")?
            .try_deserialize()
            .wrap_err("Failed to parse configuration file")
    }
}
