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
//! Local signing keys.
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey};
use rsa::RsaPrivateKey;
use rsa::pkcs1::{DecodeRsaPrivateKey, EncodeRsaPrivateKey};
use rsa::pkcs8::DecodePrivateKey;
use rsa::traits::PublicKeyParts;
use tracing::info;

use crate::config::{SigningKeyConfig, SigningSection};
use crate::keys::error::KeyProviderError;
use crate::keys::types::{Jwk, JwkSet};

/// Algorithms accepted for the local keys.
pub const SUPPORTED_ALGORITHMS: &[Algorithm] = &[
    Algorithm::RS256,
    Algorithm::RS384,
    Algorithm::RS512,
    Algorithm::PS256,
    Algorithm::PS384,
    Algorithm::PS512,
];

/// Loaded private key.
#[derive(Clone)]
pub struct LocalKey {
    pub kid: String,
    pub algorithm: Algorithm,
    pub(super) encoding: EncodingKey,
    pub(super) decoding: DecodingKey,
    public: Jwk,
}

impl std::fmt::Debug for LocalKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalKey")
            .field("kid", &self.kid)
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

impl LocalKey {
    /// Parse the PKCS#8 or PKCS#1 PEM encoded RSA key.
    pub fn from_pem(kid: &str, algorithm: Algorithm, pem: &str) -> Result<Self, KeyProviderError> {
        let invalid = |reason: String| KeyProviderError::InvalidKey {
            kid: kid.into(),
            reason,
        };
        if !SUPPORTED_ALGORITHMS.contains(&algorithm) {
            return Err(KeyProviderError::UnsupportedAlgorithm(format!("{algorithm:?}")));
        }
        let key = RsaPrivateKey::from_pkcs8_pem(pem)
            .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
            .map_err(|err| invalid(err.to_string()))?;
        let der = key.to_pkcs1_der().map_err(|err| invalid(err.to_string()))?;
        let n = key.n().to_bytes_be();
        let e = key.e().to_bytes_be();

        Ok(Self {
            kid: kid.into(),
            algorithm,
            encoding: EncodingKey::from_rsa_der(der.as_bytes()),
            decoding: DecodingKey::from_rsa_raw_components(&n, &e),
            public: Jwk {
                kty: "RSA".into(),
                key_use: Some("sig".into()),
                alg: Some(format!("{algorithm:?}")),
                kid: Some(kid.into()),
                n: Some(URL_SAFE_NO_PAD.encode(&n)),
                e: Some(URL_SAFE_NO_PAD.encode(&e)),
                ..Default::default()
            },
        })
    }

    fn load(cfg: &SigningKeyConfig) -> Result<Self, KeyProviderError> {
        let pem = std::fs::read_to_string(&cfg.path).map_err(|source| KeyProviderError::Io {
            path: cfg.path.clone(),
            source,
        })?;
        Self::from_pem(&cfg.kid, cfg.algorithm, &pem)
    }

    /// Public parameters of the key.
    pub fn public(&self) -> &Jwk {
        &self.public
    }
}

/// Configured keys. The first one signs, all of them are published.
#[derive(Clone, Debug, Default)]
pub struct LocalKeySet {
    keys: Vec<LocalKey>,
}

impl LocalKeySet {
    pub fn new(keys: Vec<LocalKey>) -> Self {
        Self { keys }
    }

    /// Load every configured key.
    pub fn load(cfg: &SigningSection) -> Result<Self, KeyProviderError> {
        let keys = cfg
            .keys
            .iter()
            .map(LocalKey::load)
            .collect::<Result<Vec<_>, _>>()?;
        if let Some(active) = keys.first() {
            info!(kid = %active.kid, total = keys.len(), "signing keys loaded");
        }
        Ok(Self { keys })
    }

    /// Active signing key.
    pub fn active(&self) -> Option<&LocalKey> {
        self.keys.first()
    }

    pub fn find(&self, kid: &str) -> Option<&LocalKey> {
        self.keys.iter().find(|x| x.kid == kid)
    }

    /// Key set for the publication.
    pub fn jwks(&self) -> JwkSet {
        JwkSet {
            keys: self.keys.iter().map(|x| x.public.clone()).collect(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::path::PathBuf;

    use super::*;

    pub fn fixture(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join(name)
    }

    pub fn signing_key_config(kid: &str, name: &str) -> SigningKeyConfig {
        SigningKeyConfig {
            kid: kid.into(),
            algorithm: Algorithm::RS256,
            path: fixture(name),
        }
    }

    #[test]
    fn test_load() {
        let set = LocalKeySet::load(&SigningSection {
            keys: vec![
                signing_key_config("k1", "signing_key.pem"),
                signing_key_config("k2", "idp_key_pkcs1.pem"),
            ],
        })
        .unwrap();
        assert_eq!("k1", set.active().unwrap().kid);
        assert!(set.find("k2").is_some());

        let jwks = serde_json::to_value(set.jwks()).unwrap();
        let keys = jwks["keys"].as_array().unwrap();
        assert_eq!(2, keys.len());
        for key in keys {
            let mut members: Vec<&str> = key
                .as_object()
                .unwrap()
                .keys()
                .map(String::as_str)
                .collect();
            members.sort_unstable();
            assert_eq!(vec!["alg", "e", "kid", "kty", "n", "use"], members);
        }
        assert_eq!("AQAB", keys[0]["e"]);
    }

    #[test]
    fn test_pkcs1_and_pkcs8_match() {
        let pkcs8 = std::fs::read_to_string(fixture("idp_key.pem")).unwrap();
        let pkcs1 = std::fs::read_to_string(fixture("idp_key_pkcs1.pem")).unwrap();
        assert_eq!(
            LocalKey::from_pem("k", Algorithm::RS256, &pkcs8)
                .unwrap()
                .public(),
            LocalKey::from_pem("k", Algorithm::RS256, &pkcs1)
                .unwrap()
                .public()
        );
    }

    #[test]
    fn test_rejected() {
        let pem = std::fs::read_to_string(fixture("signing_key.pem")).unwrap();
        assert!(matches!(
            LocalKey::from_pem("k", Algorithm::HS256, &pem),
            Err(KeyProviderError::UnsupportedAlgorithm(_))
        ));
        assert!(matches!(
            LocalKey::from_pem("k", Algorithm::RS256, "garbage"),
            Err(KeyProviderError::InvalidKey { .. })
        ));
        assert!(matches!(
            LocalKeySet::load(&SigningSection {
                keys: vec![signing_key_config("k1", "missing.pem")],
            }),
            Err(KeyProviderError::Io { .. })
        ));
    }
}
