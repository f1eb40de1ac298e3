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
//! # Policy enforcement
//!
//! Authorization of the management API is delegated to the Open Policy Agent.
//! Every operation evaluates the `sts/<resource>/<action>` policy with the
//! caller credentials and the target resource as the input.
#[cfg(test)]
use mockall::mock;
use reqwest::{Client, Url};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::SystemTime;
use thiserror::Error;
use tracing::{Level, debug, trace};

use crate::api::auth::Principal;

/// Policy related error.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// Forbidden error.
    #[error("{}", .0.violations.as_ref().map(
        |v| v.iter().cloned().map(|x| x.msg)
        .reduce(|acc, s| format!("{acc}, {s}"))
        .unwrap_or_default()
    ).unwrap_or("You are not authorized to perform the requested action.".into()))]
    Forbidden(PolicyEvaluationResult),

    /// Json serializaion error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// HTTP client error.
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    /// Url parsing error.
    #[error(transparent)]
    UrlParse(#[from] url::ParseError),
}

/// Policy factory.
#[derive(Default)]
pub struct PolicyFactory {
    /// Requests client.
    http_client: Option<Arc<Client>>,
    /// OPA url address.
    base_url: Option<Url>,
}

impl PolicyFactory {
    #[tracing::instrument(name = "policy.http", err)]
    pub async fn http(url: Url) -> Result<Self, PolicyError> {
        let client = Client::builder()
            .tcp_keepalive(std::time::Duration::from_secs(60))
            .gzip(true)
            .deflate(true)
            .build()?;
        Ok(Self {
            http_client: Some(Arc::new(client)),
            base_url: Some(url.join("/v1/data/")?),
        })
    }

    /// Factory of policies that allow everything. Used when the enforcement
    /// is disabled.
    pub fn disabled() -> Self {
        Self::default()
    }

    #[tracing::instrument(name = "policy.instantiate", level = Level::TRACE, skip_all, err)]
    pub async fn instantiate(&self) -> Result<Policy, PolicyError> {
        Ok(Policy {
            http_client: self.http_client.clone(),
            base_url: self.base_url.clone(),
        })
    }
}

#[cfg(test)]
mock! {
    pub Policy {
        pub async fn enforce(
            &mut self,
            policy_name: &str,
            credentials: &Principal,
            target: Value,
            current: Option<Value>
        ) -> Result<PolicyEvaluationResult, PolicyError>;
    }
}

#[cfg(test)]
mock! {
    pub PolicyFactory {
        pub async fn instantiate(&self) -> Result<MockPolicy, PolicyError>;
    }
}

#[derive(Default)]
pub struct Policy {
    http_client: Option<Arc<Client>>,
    base_url: Option<Url>,
}

/// OpenPolicyAgent `Credentials` object
#[derive(Serialize, Debug)]
pub struct Credentials {
    /// Subject of the presented access token.
    pub sub: String,
    /// Client the access token was minted for.
    pub client_id: Option<String>,
}

impl From<&Principal> for Credentials {
    fn from(principal: &Principal) -> Self {
        Self {
            sub: principal.sub.clone(),
            client_id: principal.client_id.clone(),
        }
    }
}

impl Policy {
    #[tracing::instrument(
        name = "policy.evaluate",
        skip_all,
        fields(
            entrypoint = policy_name.as_ref(),
            input,
            result,
            duration_ms
        ),
        err,
        level = Level::DEBUG
    )]
    pub async fn enforce<P: AsRef<str>>(
        &mut self,
        policy_name: P,
        credentials: impl Into<Credentials>,
        target: Value,
        update: Option<Value>,
    ) -> Result<PolicyEvaluationResult, PolicyError> {
        let start = SystemTime::now();
        let creds: Credentials = credentials.into();
        let input = json!({
            "credentials": creds,
            "target": target,
            "update": update,
        });
        let span = tracing::Span::current();

        let res = if let (Some(client), Some(base_url)) = (&self.http_client, &self.base_url) {
            trace!("checking policy decision with OPA using http");
            span.record("input", serde_json::to_string(&input)?);
            let url = base_url.join(policy_name.as_ref())?;
            let res: OpaResponse = client
                .post(url)
                .json(&json!({"input": input}))
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;

            res.result
        } else {
            debug!("not enforcing policy since the enforcement is disabled");
            PolicyEvaluationResult {
                allow: true,
                violations: None,
            }
        };
        let elapsed = SystemTime::now().duration_since(start).unwrap_or_default();
        span.record("result", serde_json::to_string(&res)?);
        span.record("duration_ms", elapsed.as_millis());
        debug!("authorized={}", res.allow());
        if !res.allow() {
            return Err(PolicyError::Forbidden(res));
        }
        Ok(res)
    }
}

/// A single violation of a policy.
#[derive(Clone, Deserialize, Debug, JsonSchema, Serialize)]
pub struct Violation {
    pub msg: String,
    pub field: Option<String>,
}

/// The OpenPolicyAgent response.
#[derive(Deserialize, Debug)]
pub struct OpaResponse {
    pub result: PolicyEvaluationResult,
}

/// The result of a policy evaluation.
#[derive(Clone, Deserialize, Debug, Serialize)]
pub struct PolicyEvaluationResult {
    /// Whether the caller is allowed to perform the request or not.
    pub allow: bool,
    /// List of violations.
    #[serde(rename = "violation")]
    pub violations: Option<Vec<Violation>>,
}

impl std::fmt::Display for PolicyEvaluationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        if let Some(violations) = &self.violations {
            for violation in violations {
                if first {
                    first = false;
                } else {
                    write!(f, ", ")?;
                }
                write!(f, "{}", violation.msg)?;
            }
        }
        Ok(())
    }
}

impl PolicyEvaluationResult {
    #[must_use]
    pub fn allow(&self) -> bool {
        self.allow
    }

    /// Returns true if the policy evaluation was successful.
    #[must_use]
    pub fn valid(&self) -> bool {
        self.violations
            .as_deref()
            .map(|x| x.is_empty())
            .unwrap_or(false)
    }

    #[cfg(test)]
    pub fn allowed() -> Self {
        Self {
            allow: true,
            violations: None,
        }
    }

    #[cfg(test)]
    pub fn forbidden() -> Self {
        Self {
            allow: false,
            violations: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use httpmock::MockServer;

    use super::*;

    fn principal() -> Principal {
        Principal {
            sub: "alice".into(),
            client_id: Some("cli".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_http_allow() {
        let server = MockServer::start();
        let opa = server.mock(|when, then| {
            when.method("POST")
                .path("/v1/data/sts/group/create")
                .json_body_partial(r#"{"input": {"credentials": {"sub": "alice", "client_id": "cli"}}}"#);
            then.status(200).json_body(json!({"result": {"allow": true}}));
        });

        let factory = PolicyFactory::http(Url::parse(&server.base_url()).unwrap())
            .await
            .unwrap();
        let mut policy = factory.instantiate().await.unwrap();
        let res = policy
            .enforce(
                "sts/group/create",
                &principal(),
                json!({"owner_id": "tenant"}),
                None,
            )
            .await
            .unwrap();
        assert!(res.allow());
        opa.assert();
    }

    #[tokio::test]
    async fn test_http_deny() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method("POST").path("/v1/data/sts/group/delete");
            then.status(200).json_body(
                json!({"result": {"allow": false, "violation": [{"msg": "not the owner", "field": null}]}}),
            );
        });

        let factory = PolicyFactory::http(Url::parse(&server.base_url()).unwrap())
            .await
            .unwrap();
        let mut policy = factory.instantiate().await.unwrap();
        match policy
            .enforce("sts/group/delete", &principal(), json!({}), None)
            .await
        {
            Err(err @ PolicyError::Forbidden(_)) => assert_eq!("not the owner", err.to_string()),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_disabled_allows() {
        let mut policy = PolicyFactory::disabled().instantiate().await.unwrap();
        assert!(
            policy
                .enforce("sts/issuer/delete", &principal(), json!({}), None)
                .await
                .unwrap()
                .allow()
        );
    }
}
