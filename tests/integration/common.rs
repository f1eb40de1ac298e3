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
//! Common functionality of the integration tests.

use eyre::{Result, WrapErr};
use jsonwebtoken::Algorithm;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use secrecy::SecretString;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

use token_exchange_sts::config::{Config, SigningKeyConfig};
use token_exchange_sts::db_migration::Migrator;
use token_exchange_sts::policy::PolicyFactory;
use token_exchange_sts::provider::Provider;
use token_exchange_sts::relationship::{LoggingRelationshipPublisher, RelationshipPublisher};
use token_exchange_sts::service::{Service, ServiceState};
use token_exchange_sts::storage::sql::SqlStorage;

/// Issuer identity of the service under test.
pub const STS_ISSUER: &str = "https://sts.example.com";

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Prepare isolated database.
///
/// Depending on the `DATABASE_URL` environment variable prepare the isolated
/// database for the test:
///
/// - `postgres` - create a unique schema
/// - other - use whatever passed.
///
/// By default (when `DATABASE_URL` var is unset) use inmemory sqlite. The
/// migrations are applied on the returned connection.
pub async fn get_isolated_database() -> Result<DatabaseConnection> {
    let db_conn = std::env::var("DATABASE_URL").unwrap_or("sqlite::memory:".to_string());
    let mut opts = ConnectOptions::new(&db_conn);
    opts.sqlx_logging(false);
    if db_conn.starts_with("sqlite") {
        // Every connection to the in-memory sqlite is a separate database.
        opts.max_connections(1);
    }
    let root_db = Database::connect(opts)
        .await
        .wrap_err_with(|| format!("Failed to connect to database at {db_conn}"))?;
    let isolated_db_url = if db_conn.starts_with("postgres") {
        let schema_name = format!("test_schema_{}", Uuid::new_v4().simple());
        root_db
            .execute_unprepared(&format!("CREATE SCHEMA \"{schema_name}\""))
            .await?;
        if db_conn.contains('?') {
            format!("{db_conn}&options=-c%20search_path%3D{schema_name}")
        } else {
            format!("{db_conn}?options=-c%20search_path%3D{schema_name}")
        }
    } else {
        db_conn
    };
    let db = if isolated_db_url.starts_with("sqlite") {
        root_db
    } else {
        Database::connect(
            ConnectOptions::new(&isolated_db_url)
                .sqlx_logging(false)
                .to_owned(),
        )
        .await?
    };
    Migrator::up(&db, None).await?;
    Ok(db)
}

/// Configuration of the service under test.
pub fn get_config() -> Config {
    let mut cfg = Config::default();
    cfg.token.issuer = STS_ISSUER.into();
    cfg.token.hmac_secret = Some(SecretString::from("integration-secret"));
    cfg.signing.keys = vec![SigningKeyConfig {
        kid: "sts-1".into(),
        algorithm: Algorithm::RS256,
        path: fixture("signing_key.pem"),
    }];
    cfg
}

/// Service state with the real providers, the SQL storage and the permissive
/// policy.
pub async fn get_state_with(
    relationship: Arc<dyn RelationshipPublisher>,
) -> Result<ServiceState> {
    let db = get_isolated_database().await?;
    let cfg = get_config();
    let provider = Provider::new(cfg.clone())?;
    Ok(Arc::new(Service::new(
        cfg,
        Arc::new(SqlStorage::new(db, None)?),
        provider,
        PolicyFactory::disabled(),
        relationship,
    )?))
}

pub async fn get_state() -> Result<ServiceState> {
    get_state_with(Arc::new(LoggingRelationshipPublisher)).await
}
