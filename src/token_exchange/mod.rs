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
//! # Token exchange provider
//!
//! RFC 8693 token exchange limited to impersonation. The subject token is
//! verified with the keys of its issuer, its claims are mapped with the issuer
//! expressions and admitted by the issuer condition. The issued token asserts
//! the subject of the subject token together with the mapped claims and is
//! signed with the active local key.
//!
//! The exchange is read only. Nothing is persisted.
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

pub mod error;
pub mod grant;
#[cfg(test)]
mod mock;
pub mod types;

use crate::config::Config;
use crate::issuer::ClaimsMapper;
use crate::issuer::IssuerProviderError;
use crate::issuer::types::JsonClaims;
use crate::keys::{KeyApi, SigningKeyProvider};
use crate::oauth_client::types::OAuthClient;
use crate::oauth2::{TOKEN_TYPE_JWT, TokenResponse};
use crate::service::ServiceState;

pub use error::TokenExchangeError;
#[cfg(test)]
pub use mock::MockTokenExchangeProvider;
pub use types::{TokenExchangeApi, TokenExchangeRequest};

/// Claims of the issued token which are never taken from the mapping.
pub const RESERVED_CLAIMS: &[&str] = &["iss", "sub", "aud", "exp", "iat", "nbf", "jti", "client_id"];

#[derive(Clone, Debug, Default)]
pub struct TokenExchangeProvider {}

impl TokenExchangeProvider {
    pub fn new(_config: &Config) -> Result<Self, TokenExchangeError> {
        Ok(Self {})
    }
}

/// Audiences of the issued token. Every requested audience must be allowed
/// for the client.
fn check_audience(
    client: &OAuthClient,
    requested: &[String],
) -> Result<Option<Value>, TokenExchangeError> {
    if let Some(denied) = requested.iter().find(|x| !client.audience.contains(x)) {
        return Err(TokenExchangeError::InvalidTarget(denied.clone()));
    }
    Ok(match requested {
        [] => None,
        [single] => Some(Value::String(single.clone())),
        many => Some(Value::from(many.to_vec())),
    })
}

/// Claims of the issued token.
fn assemble_claims(
    subject_claims: &JsonClaims,
    mapped: JsonClaims,
    client: &OAuthClient,
    audience: Option<Value>,
    config: &Config,
) -> Result<JsonClaims, TokenExchangeError> {
    let sub = subject_claims
        .get("sub")
        .and_then(Value::as_str)
        .filter(|x| !x.is_empty())
        .ok_or_else(|| TokenExchangeError::ClaimMapping {
            source: IssuerProviderError::MissingClaim {
                claim: "sub".into(),
            },
        })?;
    let now = Utc::now().timestamp();
    let lifespan = i64::try_from(config.token.expiration).unwrap_or(i64::MAX);

    let mut claims = JsonClaims::new();
    for (name, val) in mapped {
        if RESERVED_CLAIMS.contains(&name.as_str()) {
            warn!(claim = %name, "mapping of the reserved claim is ignored");
            continue;
        }
        claims.insert(name, val);
    }
    claims.insert("sub".into(), sub.into());
    claims.insert("iss".into(), config.token.issuer.clone().into());
    claims.insert("client_id".into(), client.id.clone().into());
    if let Some(aud) = audience {
        claims.insert("aud".into(), aud);
    }
    claims.insert("jti".into(), Uuid::new_v4().simple().to_string().into());
    claims.insert("iat".into(), now.into());
    claims.insert("exp".into(), now.saturating_add(lifespan).into());
    Ok(claims)
}

#[async_trait]
impl TokenExchangeApi for TokenExchangeProvider {
    #[tracing::instrument(level = "info", skip(self, state, client, request), fields(client_id = %client.id))]
    async fn exchange_token(
        &self,
        state: &ServiceState,
        client: &OAuthClient,
        request: &TokenExchangeRequest,
    ) -> Result<TokenResponse, TokenExchangeError> {
        if request.subject_token_type != TOKEN_TYPE_JWT {
            return Err(TokenExchangeError::UnsupportedTokenType(
                request.subject_token_type.clone(),
            ));
        }

        let subject_claims = state
            .provider
            .get_key_provider()
            .verify_subject_token(state, &request.subject_token)
            .await
            .map_err(|source| TokenExchangeError::SubjectToken { source })?;

        let mapped = state
            .provider
            .get_issuer_provider()
            .map_admitted_claims(state, &subject_claims)
            .await
            .map_err(|source| TokenExchangeError::ClaimMapping { source })?
            .ok_or(TokenExchangeError::ConditionNotSatisfied)?;

        let audience = check_audience(client, &request.audience)?;
        let claims = assemble_claims(&subject_claims, mapped, client, audience, &state.config)?;
        let access_token = state
            .provider
            .get_key_provider()
            .sign(&claims)
            .map_err(|source| TokenExchangeError::Signing { source })?;
        debug!(sub = ?claims.get("sub"), "token issued");

        Ok(TokenResponse {
            access_token,
            issued_token_type: TOKEN_TYPE_JWT.into(),
            token_type: "bearer".into(),
            expires_in: state.config.token.expiration,
        })
    }
}
