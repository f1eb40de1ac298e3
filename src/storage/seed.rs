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
//! # Issuer seeding
//!
//! Declarative list of issuers applied at startup. Issuers are matched by the
//! `uri`: absent ones are created and present ones converge to the seeded
//! values. The expressions go through the same compilation as the issuers
//! created over the API.
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

use crate::issuer::IssuerProviderError;
use crate::issuer::mapping;
use crate::issuer::types::{IssuerCreate, IssuerUpdate};
use crate::storage::{StorageBackend, StorageError, Transaction};

/// Seeded issuer.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct IssuerSeed {
    pub owner_id: String,
    pub name: String,
    pub uri: String,
    pub jwks_uri: String,
    #[serde(default)]
    pub claim_mappings: BTreeMap<String, String>,
    #[serde(default)]
    pub claim_conditions: Option<String>,
}

/// Outcome of the seeding.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SeedSummary {
    pub created: usize,
    pub updated: usize,
}

/// Effect the seed would have on a single issuer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeedAction {
    /// No issuer with the URI exists.
    Create,
    /// The issuer exists with different values.
    Update,
    /// The issuer matches the seed.
    Unchanged,
    /// The URI is registered by another owner. Seeding fails.
    Conflict,
}

impl std::fmt::Display for SeedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            SeedAction::Create => "missing",
            SeedAction::Update => "drifted",
            SeedAction::Unchanged => "in sync",
            SeedAction::Conflict => "owned by another tenant",
        })
    }
}

/// Read the JSON list of the issuers.
pub async fn load_seed_file<P: AsRef<Path>>(path: P) -> Result<Vec<IssuerSeed>, StorageError> {
    let path = path.as_ref();
    let data = tokio::fs::read(path)
        .await
        .map_err(|err| StorageError::Seed(format!("reading {}: {err}", path.display())))?;
    serde_json::from_slice(&data)
        .map_err(|err| StorageError::Seed(format!("parsing {}: {err}", path.display())))
}

/// Compare the seed with the stored issuers without changing anything.
pub async fn plan_seed(
    storage: &dyn StorageBackend,
    seeds: &[IssuerSeed],
) -> Result<Vec<(String, SeedAction)>, StorageError> {
    let mut plan = Vec::with_capacity(seeds.len());
    for seed in seeds {
        let action = match storage.get_issuer_by_uri(None, &seed.uri).await? {
            None => SeedAction::Create,
            Some(current) if current.owner_id != seed.owner_id => SeedAction::Conflict,
            Some(current) => {
                let condition = seed
                    .claim_conditions
                    .as_deref()
                    .map(str::trim)
                    .filter(|x| !x.is_empty());
                if current.name == seed.name
                    && current.jwks_uri == seed.jwks_uri
                    && current.claim_mapping_sources() == seed.claim_mappings
                    && current.claim_conditions.as_ref().map(|x| x.source()) == condition
                {
                    SeedAction::Unchanged
                } else {
                    SeedAction::Update
                }
            }
        };
        plan.push((seed.uri.clone(), action));
    }
    Ok(plan)
}

/// Create or converge the single issuer. Returns whether it was created.
async fn seed_issuer(
    storage: &dyn StorageBackend,
    txn: &mut Transaction,
    seed: IssuerSeed,
) -> Result<bool, StorageError> {
    let invalid = |err: IssuerProviderError| StorageError::Seed(format!("{}: {err}", seed.uri));
    let current = storage.get_issuer_by_uri(Some(txn), &seed.uri).await?;
    match current {
        Some(current) => {
            if current.owner_id != seed.owner_id {
                return Err(StorageError::Seed(format!(
                    "{}: issuer belongs to another owner",
                    seed.uri
                )));
            }
            let patch = mapping::build_patch(IssuerUpdate {
                name: Some(seed.name.clone()),
                uri: None,
                jwks_uri: Some(seed.jwks_uri.clone()),
                claim_mappings: Some(seed.claim_mappings.clone()),
                claim_conditions: Some(seed.claim_conditions.clone()),
            })
            .map_err(invalid)?;
            storage.update_issuer(txn, &current.id, &patch).await?;
            Ok(false)
        }
        None => {
            let issuer = mapping::build_issuer(
                Uuid::new_v4().simple().to_string(),
                IssuerCreate {
                    id: None,
                    owner_id: seed.owner_id.clone(),
                    name: seed.name.clone(),
                    uri: seed.uri.clone(),
                    jwks_uri: seed.jwks_uri.clone(),
                    claim_mappings: seed.claim_mappings.clone(),
                    claim_conditions: seed.claim_conditions.clone(),
                },
            )
            .map_err(invalid)?;
            storage.create_issuer(txn, issuer).await?;
            Ok(true)
        }
    }
}

/// Apply the seed in a single transaction. A single invalid issuer rejects
/// the whole seed.
#[tracing::instrument(level = "info", skip(storage, seeds))]
pub async fn apply_seed(
    storage: &dyn StorageBackend,
    seeds: Vec<IssuerSeed>,
) -> Result<SeedSummary, StorageError> {
    let mut txn = storage.begin().await?;
    let mut summary = SeedSummary::default();
    let mut res = Ok(());
    for seed in seeds {
        match seed_issuer(storage, &mut txn, seed).await {
            Ok(true) => summary.created += 1,
            Ok(false) => summary.updated += 1,
            Err(err) => {
                res = Err(err);
                break;
            }
        }
    }
    txn.finish(res).await?;
    info!(
        created = summary.created,
        updated = summary.updated,
        "issuers seeded"
    );
    Ok(summary)
}
