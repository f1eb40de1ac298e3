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
//! # Key provider error
use std::path::PathBuf;
use thiserror::Error;

use crate::issuer::IssuerProviderError;

/// Key provider error.
#[derive(Error, Debug)]
pub enum KeyProviderError {
    /// The token header names an algorithm the key does not declare.
    #[error("token algorithm does not match the key algorithm")]
    KeyAlgorithmMismatch,

    /// Invalid local signing key.
    #[error("invalid signing key {kid}: {reason}")]
    InvalidKey { kid: String, reason: String },

    /// Token failed the validation.
    #[error("token validation failed: {source}")]
    InvalidToken {
        /// The source of the error.
        #[from]
        source: jsonwebtoken::errors::Error,
    },

    /// Issuer lookup failed.
    #[error(transparent)]
    Issuer {
        /// The source of the error.
        source: IssuerProviderError,
    },

    /// Reading the key file failed.
    #[error("cannot read the signing key {path}: {source}")]
    Io {
        path: PathBuf,
        /// The source of the error.
        source: std::io::Error,
    },

    /// Fetching the remote key set failed.
    #[error("fetching the key set from {uri} failed: {source}")]
    JwksFetch {
        uri: String,
        /// The source of the error.
        source: reqwest::Error,
    },

    /// The remote key set responded with an error status.
    #[error("key set {uri} responded with {status}")]
    JwksStatus {
        uri: String,
        status: reqwest::StatusCode,
    },

    /// Malformed token.
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// The token header has no `kid`.
    #[error("token header has no key id")]
    MissingKid,

    /// No active signing key is configured.
    #[error("no signing key is configured")]
    NoSigningKey,

    /// HTTP client error.
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    /// No key matches the `kid` of the token.
    #[error("signature key {kid} not found")]
    SignatureKeyNotFound { kid: String },

    /// The issuer of the token is not registered.
    #[error("unknown issuer {0}")]
    UnknownIssuer(String),

    /// Algorithm is not accepted.
    #[error("unsupported algorithm {0}")]
    UnsupportedAlgorithm(String),

    /// Key type is not supported.
    #[error("unsupported key type {0}")]
    UnsupportedKeyType(String),
}

impl KeyProviderError {
    /// Whether the failure is caused by the infrastructure rather than by the
    /// presented token.
    pub fn is_server_error(&self) -> bool {
        match self {
            Self::JwksFetch { .. } | Self::JwksStatus { .. } | Self::Reqwest(_) => true,
            Self::Issuer { source } => !matches!(
                source,
                IssuerProviderError::IssuerNotFound(_) | IssuerProviderError::MissingClaim { .. }
            ),
            Self::Io { .. } | Self::InvalidKey { .. } | Self::NoSigningKey => true,
            _ => false,
        }
    }
}

impl From<IssuerProviderError> for KeyProviderError {
    fn from(source: IssuerProviderError) -> Self {
        match source {
            IssuerProviderError::IssuerNotFound(uri) => Self::UnknownIssuer(uri),
            other => Self::Issuer { source: other },
        }
    }
}
