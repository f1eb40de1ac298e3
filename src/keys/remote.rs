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
//! Remote key sets of the issuers.
use jsonwebtoken::{Algorithm, DecodingKey};
use reqwest::Client;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::JwksSection;
use crate::keys::error::KeyProviderError;
use crate::keys::types::{Jwk, JwkSet};

#[derive(Clone)]
struct CachedJwks {
    jwks: Arc<JwkSet>,
    fetched_at: Instant,
}

/// Key sets fetched from the issuers, cached per URI.
pub struct JwksCache {
    client: Client,
    ttl: Duration,
    refetch_interval: Duration,
    entries: RwLock<HashMap<String, CachedJwks>>,
}

impl JwksCache {
    pub fn new(cfg: &JwksSection) -> Result<Self, KeyProviderError> {
        let client = Client::builder()
            .tcp_keepalive(Duration::from_secs(60))
            .timeout(Duration::from_secs(cfg.timeout))
            .gzip(true)
            .deflate(true)
            .build()?;
        Ok(Self {
            client,
            ttl: Duration::from_secs(cfg.cache_ttl),
            refetch_interval: Duration::from_secs(cfg.refetch_interval),
            entries: RwLock::new(HashMap::new()),
        })
    }

    async fn cached(&self, uri: &str) -> Option<CachedJwks> {
        self.entries
            .read()
            .await
            .get(uri)
            .filter(|entry| entry.fetched_at.elapsed() < self.ttl)
            .cloned()
    }

    #[tracing::instrument(level = "debug", skip(self), err)]
    async fn fetch(&self, uri: &str) -> Result<Arc<JwkSet>, KeyProviderError> {
        let fetch_err = |source| KeyProviderError::JwksFetch {
            uri: uri.into(),
            source,
        };
        let rsp = self
            .client
            .get(uri)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(fetch_err)?;
        if !rsp.status().is_success() {
            return Err(KeyProviderError::JwksStatus {
                uri: uri.into(),
                status: rsp.status(),
            });
        }
        let jwks: Arc<JwkSet> = Arc::new(rsp.json().await.map_err(fetch_err)?);
        debug!(keys = jwks.keys.len(), "key set fetched");
        self.entries.write().await.insert(
            uri.into(),
            CachedJwks {
                jwks: jwks.clone(),
                fetched_at: Instant::now(),
            },
        );
        Ok(jwks)
    }

    /// Drop the expired key sets. Returns the number of evicted entries.
    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.fetched_at.elapsed() < self.ttl);
        before - entries.len()
    }

    /// Signature key of the issuer key set. A `kid` missing from the cached
    /// set forces a single refetch, unless the set is younger than the
    /// refetch interval.
    pub async fn find_key(&self, uri: &str, kid: &str) -> Result<Jwk, KeyProviderError> {
        let not_found = || KeyProviderError::SignatureKeyNotFound { kid: kid.into() };
        if let Some(entry) = self.cached(uri).await {
            if let Some(key) = entry.jwks.find_signing_key(kid) {
                return Ok(key.clone());
            }
            if entry.fetched_at.elapsed() < self.refetch_interval {
                debug!(kid, "key not in the recently fetched set");
                return Err(not_found());
            }
            debug!(kid, "key not in the cached set, refetching");
        }
        self.fetch(uri)
            .await?
            .find_signing_key(kid)
            .cloned()
            .ok_or_else(not_found)
    }
}

/// Verification key of the token signed with `alg`.
pub fn decoding_key(jwk: &Jwk, alg: Algorithm) -> Result<DecodingKey, KeyProviderError> {
    if let Some(key_alg) = &jwk.alg {
        if Algorithm::from_str(key_alg).ok() != Some(alg) {
            return Err(KeyProviderError::KeyAlgorithmMismatch);
        }
    }
    let missing = |attr: &str| {
        KeyProviderError::MalformedToken(format!("key {:?} has no {attr}", jwk.kid))
    };
    Ok(match jwk.kty.as_str() {
        "RSA" => DecodingKey::from_rsa_components(
            jwk.n.as_deref().ok_or_else(|| missing("n"))?,
            jwk.e.as_deref().ok_or_else(|| missing("e"))?,
        )?,
        "EC" => DecodingKey::from_ec_components(
            jwk.x.as_deref().ok_or_else(|| missing("x"))?,
            jwk.y.as_deref().ok_or_else(|| missing("y"))?,
        )?,
        "OKP" => DecodingKey::from_ed_components(jwk.x.as_deref().ok_or_else(|| missing("x"))?)?,
        other => return Err(KeyProviderError::UnsupportedKeyType(other.into())),
    })
}
