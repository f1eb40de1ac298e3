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
//! # Authorization relationships
//!
//! Group ownership and membership are mirrored into the external
//! authorization-relationship service as a stream of events. The events are
//! published while the storage transaction of the change is still open so
//! that a failed publication rolls the change back.
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::RelationshipSection;

static KIND_RE: LazyLock<Option<regex::Regex>> =
    LazyLock::new(|| regex::Regex::new(r"^[a-z][a-z0-9_]*$").ok());

/// Relationship error.
#[derive(Debug, Error)]
pub enum RelationshipError {
    /// Malformed `<kind>:<id>` identifier.
    #[error("invalid prefixed id '{0}': expected <kind>:<id>")]
    InvalidPrefixedId(String),

    /// HTTP client error.
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    /// The relationship service rejected the events.
    #[error("relationship service responded with {0}")]
    Rejected(StatusCode),
}

/// Identifier of a subject qualified with its kind, i.e. `user:1234`.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PrefixedId {
    pub kind: String,
    pub id: String,
}

impl FromStr for PrefixedId {
    type Err = RelationshipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RelationshipError::InvalidPrefixedId(s.into());
        let (kind, id) = s.split_once(':').ok_or_else(invalid)?;
        let kind_ok = KIND_RE.as_ref().is_some_and(|re| re.is_match(kind));
        if !kind_ok || id.is_empty() || id.chars().any(char::is_whitespace) {
            return Err(invalid());
        }
        Ok(Self {
            kind: kind.into(),
            id: id.into(),
        })
    }
}

impl fmt::Display for PrefixedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipOperation {
    Create,
    Delete,
}

/// Single relationship change.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RelationshipEvent {
    pub operation: RelationshipOperation,
    /// Resource in the `group:<id>` form.
    pub resource: String,
    /// `owner` or `member`.
    pub relation: String,
    /// Owner or member of the resource.
    pub subject: String,
}

impl RelationshipEvent {
    pub fn group_owner(
        operation: RelationshipOperation,
        group_id: &str,
        owner_id: &str,
    ) -> Self {
        Self {
            operation,
            resource: format!("group:{group_id}"),
            relation: "owner".into(),
            subject: owner_id.into(),
        }
    }

    pub fn group_member(
        operation: RelationshipOperation,
        group_id: &str,
        member_id: &str,
    ) -> Self {
        Self {
            operation,
            resource: format!("group:{group_id}"),
            relation: "member".into(),
            subject: member_id.into(),
        }
    }
}

/// Publisher of the relationship events.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RelationshipPublisher: Send + Sync {
    /// Publish the events as a single batch.
    async fn publish(&self, events: &[RelationshipEvent]) -> Result<(), RelationshipError>;
}

/// Publisher posting the events to the relationship service.
pub struct HttpRelationshipPublisher {
    client: Client,
    endpoint: Url,
}

impl HttpRelationshipPublisher {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, RelationshipError> {
        let client = Client::builder()
            .tcp_keepalive(Duration::from_secs(60))
            .timeout(timeout)
            .build()?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl RelationshipPublisher for HttpRelationshipPublisher {
    #[tracing::instrument(level = "debug", skip(self, events), fields(count = events.len()), err)]
    async fn publish(&self, events: &[RelationshipEvent]) -> Result<(), RelationshipError> {
        if events.is_empty() {
            return Ok(());
        }
        let rsp = self
            .client
            .post(self.endpoint.clone())
            .json(&json!({ "events": events }))
            .send()
            .await?;
        if !rsp.status().is_success() {
            return Err(RelationshipError::Rejected(rsp.status()));
        }
        Ok(())
    }
}

/// Publisher only logging the events.
#[derive(Default)]
pub struct LoggingRelationshipPublisher;

#[async_trait]
impl RelationshipPublisher for LoggingRelationshipPublisher {
    async fn publish(&self, events: &[RelationshipEvent]) -> Result<(), RelationshipError> {
        for event in events {
            info!(
                operation = ?event.operation,
                resource = %event.resource,
                relation = %event.relation,
                subject = %event.subject,
                "relationship event"
            );
        }
        Ok(())
    }
}

/// Publisher selected by the configuration.
pub fn from_config(
    cfg: &RelationshipSection,
) -> Result<Arc<dyn RelationshipPublisher>, RelationshipError> {
    Ok(match &cfg.endpoint {
        Some(endpoint) => Arc::new(HttpRelationshipPublisher::new(
            endpoint.clone(),
            Duration::from_secs(cfg.timeout),
        )?),
        None => Arc::new(LoggingRelationshipPublisher),
    })
}

#[cfg(test)]
mod tests {
    use httpmock::MockServer;
    use tracing_test::traced_test;

    use super::*;

    #[test]
    fn test_prefixed_id() {
        let id = PrefixedId::from_str("user:1234").unwrap();
        assert_eq!("user", id.kind);
        assert_eq!("1234", id.id);
        assert_eq!("user:1234", id.to_string());
        assert_eq!(
            "service_account",
            PrefixedId::from_str("service_account:a:b").unwrap().kind
        );
        for bad in ["user", "user:", ":1", "User:1", "1user:1", "user:a b"] {
            assert!(PrefixedId::from_str(bad).is_err(), "{bad}");
        }
    }

    #[tokio::test]
    async fn test_http_publish() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method("POST").path("/events").json_body(json!({"events": [
                {"operation": "create", "resource": "group:g1", "relation": "member", "subject": "user:a"}
            ]}));
            then.status(204);
        });
        let publisher = HttpRelationshipPublisher::new(
            Url::parse(&server.url("/events")).unwrap(),
            Duration::from_secs(5),
        )
        .unwrap();
        publisher
            .publish(&[RelationshipEvent::group_member(
                RelationshipOperation::Create,
                "g1",
                "user:a",
            )])
            .await
            .unwrap();
        publisher.publish(&[]).await.unwrap();
        mock.assert_hits(1);
    }

    #[tokio::test]
    async fn test_http_publish_rejected() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method("POST").path("/events");
            then.status(503);
        });
        let publisher = HttpRelationshipPublisher::new(
            Url::parse(&server.url("/events")).unwrap(),
            Duration::from_secs(5),
        )
        .unwrap();
        assert!(matches!(
            publisher
                .publish(&[RelationshipEvent::group_owner(
                    RelationshipOperation::Delete,
                    "g1",
                    "tenant"
                )])
                .await,
            Err(RelationshipError::Rejected(StatusCode::SERVICE_UNAVAILABLE))
        ));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_logging_publish() {
        LoggingRelationshipPublisher
            .publish(&[RelationshipEvent::group_owner(
                RelationshipOperation::Create,
                "g1",
                "tenant",
            )])
            .await
            .unwrap();
        assert!(logs_contain("group:g1"));
    }
}
