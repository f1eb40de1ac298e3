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
//! # Key provider
//!
//! Verification of the subject tokens with the key sets published by their
//! issuers, and the local keys signing the exchanged tokens.
//!
//! ## Remote key sets
//!
//! The key set location of an issuer is looked up by the `iss` claim of the
//! presented token. The set is fetched and cached per location for the
//! configured lifetime. The key is selected by the `kid` of the token header
//! among the keys intended for signatures. Symmetric algorithms are never
//! accepted.
//!
//! ## Local keys
//!
//! The first configured private key signs the minted tokens. The public
//! parameters of all the configured keys are published as the service JWKS.
//! Keys are loaded once on startup.
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::{Algorithm, Header, Validation};
use std::sync::Arc;
use tracing::debug;

pub mod error;
pub mod local;
#[cfg(test)]
mod mock;
pub mod remote;
pub mod types;

use crate::config::Config;
use crate::issuer::IssuerApi;
use crate::issuer::types::JsonClaims;
use crate::service::ServiceState;

pub use error::KeyProviderError;
use local::LocalKeySet;
#[cfg(test)]
pub use mock::MockKeyProvider;
use remote::JwksCache;
pub use types::{Jwk, JwkSet, KeyApi, SigningKeyProvider};

#[derive(Clone)]
pub struct KeyProvider {
    local: Arc<LocalKeySet>,
    remote: Arc<JwksCache>,
}

impl KeyProvider {
    pub fn new(config: &Config) -> Result<Self, KeyProviderError> {
        Ok(Self {
            local: Arc::new(LocalKeySet::load(&config.signing)?),
            remote: Arc::new(JwksCache::new(&config.jwks)?),
        })
    }
}

fn reject_symmetric(alg: Algorithm) -> Result<(), KeyProviderError> {
    match alg {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
            Err(KeyProviderError::UnsupportedAlgorithm(format!("{alg:?}")))
        }
        _ => Ok(()),
    }
}

/// Claims of the token without verifying it. Only used to find the issuer.
fn unverified_claims(token: &str) -> Result<JsonClaims, KeyProviderError> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| KeyProviderError::MalformedToken("not a compact JWS".into()))?;
    let raw = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|err| KeyProviderError::MalformedToken(err.to_string()))?;
    serde_json::from_slice(&raw).map_err(|err| KeyProviderError::MalformedToken(err.to_string()))
}

fn validation(alg: Algorithm, issuer: &str) -> Validation {
    let mut validation = Validation::new(alg);
    validation.set_issuer(&[issuer]);
    validation.validate_aud = false;
    validation
}

impl SigningKeyProvider for KeyProvider {
    fn sign(&self, claims: &JsonClaims) -> Result<String, KeyProviderError> {
        let key = self.local.active().ok_or(KeyProviderError::NoSigningKey)?;
        let mut header = Header::new(key.algorithm);
        header.kid = Some(key.kid.clone());
        Ok(jsonwebtoken::encode(&header, claims, &key.encoding)?)
    }

    fn public_jwks(&self) -> JwkSet {
        self.local.jwks()
    }

    fn verify_access_token(
        &self,
        token: &str,
        issuer: &str,
    ) -> Result<JsonClaims, KeyProviderError> {
        let header = jsonwebtoken::decode_header(token)?;
        let kid = header.kid.ok_or(KeyProviderError::MissingKid)?;
        let key = self
            .local
            .find(&kid)
            .ok_or(KeyProviderError::SignatureKeyNotFound { kid })?;
        if header.alg != key.algorithm {
            return Err(KeyProviderError::KeyAlgorithmMismatch);
        }
        Ok(jsonwebtoken::decode::<JsonClaims>(
            token,
            &key.decoding,
            &validation(key.algorithm, issuer),
        )?
        .claims)
    }
}

#[async_trait]
impl KeyApi for KeyProvider {
    #[tracing::instrument(level = "info", skip(self, state, token))]
    async fn verify_subject_token<'a>(
        &self,
        state: &ServiceState,
        token: &'a str,
    ) -> Result<JsonClaims, KeyProviderError> {
        let header = jsonwebtoken::decode_header(token)
            .map_err(|err| KeyProviderError::MalformedToken(err.to_string()))?;
        reject_symmetric(header.alg)?;
        let kid = header.kid.ok_or(KeyProviderError::MissingKid)?;
        let unverified = unverified_claims(token)?;
        let iss = unverified
            .get("iss")
            .and_then(serde_json::Value::as_str)
            .filter(|x| !x.is_empty())
            .ok_or_else(|| KeyProviderError::MalformedToken("no iss claim".into()))?;

        let jwks_uri = state
            .provider
            .get_issuer_provider()
            .get_issuer_jwks_uri(state, iss)
            .await?;
        let jwk = self.remote.find_key(&jwks_uri, &kid).await?;
        let key = remote::decoding_key(&jwk, header.alg)?;
        Ok(jsonwebtoken::decode::<JsonClaims>(token, &key, &validation(header.alg, iss))?.claims)
    }

    async fn cleanup(&self) -> Result<(), KeyProviderError> {
        let evicted = self.remote.purge_expired().await;
        if evicted > 0 {
            debug!(evicted, "expired key sets evicted");
        }
        Ok(())
    }
}
