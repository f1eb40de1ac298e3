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
//! Main token exchange service executable.
//!
//! This is the entry point of the `sts` binary.

use axum::extract::DefaultBodyLimit;
use axum::http::{self, HeaderName, Request, header};
use clap::{Parser, ValueEnum};
use color_eyre::eyre::{Report, Result};
use eyre::WrapErr;
use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::MigratorTrait;
use secrecy::ExposeSecret;
use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::{net::TcpListener, signal, spawn, time};
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::{
    LatencyUnit, ServiceBuilderExt,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, error, info, info_span, trace};
use tracing_subscriber::{
    Layer,
    filter::{LevelFilter, Targets},
    prelude::*,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use token_exchange_sts::api;
use token_exchange_sts::config::Config;
use token_exchange_sts::db_migration::Migrator;
use token_exchange_sts::error::StsError;
use token_exchange_sts::keys::KeyApi;
use token_exchange_sts::policy::PolicyFactory;
use token_exchange_sts::provider::Provider;
use token_exchange_sts::relationship;
use token_exchange_sts::service::{Service, ServiceState};
use token_exchange_sts::storage::seed::{apply_seed, load_seed_file};
use token_exchange_sts::storage::sql::SqlStorage;

// Default body limit 64kB
const DEFAULT_BODY_LIMIT: usize = 1024 * 64;

/// Token exchange security token service.
///
/// Exchanges the JWTs issued by the trusted external identity providers for
/// the tokens of this service (RFC 8693).
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the config file.
    #[arg(short, long, default_value = "/etc/sts/sts.conf")]
    config: PathBuf,

    /// Verbosity level. Repeat to increase level.
    #[arg(short, long, global=true, action = clap::ArgAction::Count, display_order = 920)]
    pub verbose: u8,

    /// Print the `OpenAPI` schema instead of running the service.
    #[arg(long)]
    pub dump_openapi: Option<OpenApiFormat>,
}

#[derive(Clone, Debug, Default, PartialEq, ValueEnum)]
enum OpenApiFormat {
    /// Json.
    Json,
    #[default]
    /// Yaml.
    Yaml,
}

#[derive(Clone, Default)]
struct StsRequestId {}

impl MakeRequestId for StsRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let req_id = Uuid::new_v4().simple().to_string();

        Some(RequestId::new(
            http::HeaderValue::from_str(format!("req-{req_id}").as_str())
                .unwrap_or_else(|_| http::HeaderValue::from_static("req-unknown")),
        ))
    }
}

#[tokio::main]
async fn main() -> Result<(), Report> {
    color_eyre::install()?;
    let args = Args::parse();

    let filter = Targets::new()
        .with_default(match args.verbose {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        })
        .with_target("sqlx", Level::WARN)
        .with_target("hyper_util", Level::INFO);

    let log_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_filter(filter);

    tracing_subscriber::registry().with(log_layer).init();

    let (router, api) = OpenApiRouter::with_openapi(api::openapi_doc())
        .merge(api::openapi_router())
        .split_for_parts();

    if let Some(dump_format) = &args.dump_openapi {
        println!(
            "{}",
            match dump_format {
                OpenApiFormat::Yaml => api.to_yaml()?,
                OpenApiFormat::Json => api.to_pretty_json()?,
            }
        );
        return Ok(());
    }

    info!("Starting the token exchange service...");
    let cfg = Config::new(args.config)?;
    let opt: ConnectOptions = ConnectOptions::new(cfg.database.get_connection().expose_secret())
        // Prevent dumping the password in plaintext.
        .sqlx_logging(false)
        .to_owned();

    debug!("Establishing the database connection...");
    let conn = Database::connect(opt)
        .await
        .wrap_err("Database connection failed")?;
    Migrator::up(&conn, None)
        .await
        .wrap_err("Applying the database migrations failed")?;

    let storage = Arc::new(SqlStorage::new(
        conn,
        cfg.storage.as_of_system_time.clone(),
    )?);

    let provider = Provider::new(cfg.clone())?;

    if let Some(seed_file) = &cfg.storage.seed_file {
        let seeds = load_seed_file(seed_file).await?;
        apply_seed(storage.as_ref(), seeds).await?;
    }

    let policy = if !cfg.api_policy.enable {
        info!("API policy enforcement is disabled");
        PolicyFactory::disabled()
    } else if let Some(opa_base_url) = &cfg.api_policy.opa_base_url {
        PolicyFactory::http(opa_base_url.clone()).await?
    } else {
        return Err(StsError::PolicyEnforcementNotAvailable)?;
    };

    let publisher = relationship::from_config(&cfg.relationship)?;

    let shared_state = Arc::new(Service::new(cfg, storage, provider, policy, publisher)?);

    let token = CancellationToken::new();
    spawn(cleanup(token.clone(), shared_state.clone()));

    let x_request_id = HeaderName::from_static("x-request-id");
    let sensitive_headers: Arc<[_]> = vec![header::AUTHORIZATION, header::COOKIE].into();

    let middleware = ServiceBuilder::new()
        // make sure to set request ids before the request reaches `TraceLayer`
        .layer(SetRequestIdLayer::new(
            x_request_id.clone(),
            StsRequestId::default(),
        ))
        .sensitive_request_headers(sensitive_headers.clone())
        .layer(DefaultBodyLimit::max(DEFAULT_BODY_LIMIT))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    info_span!(
                        "request",
                        method = ?request.method(),
                        uri = ?request.uri().path(),
                        x_request_id = ?request.headers().get("x-request-id")
                    )
                })
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(LatencyUnit::Micros),
                ),
        )
        .compression()
        .sensitive_response_headers(sensitive_headers)
        // propagate the header to the response before the response reaches `TraceLayer`
        .layer(PropagateRequestIdLayer::new(x_request_id));

    let app = router
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api))
        .layer(middleware)
        .with_state(shared_state.clone());

    let address = SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8080));
    let listener = TcpListener::bind(&address).await?;
    info!("Listening on {address}");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(shared_state))
    .await?;

    token.cancel();
    Ok(())
}

/// Periodic eviction of the expired remote key sets.
async fn cleanup(cancel: CancellationToken, state: ServiceState) {
    let mut interval = time::interval(Duration::from_secs(60));
    interval.tick().await;
    info!("Start the periodic cleanup thread");
    loop {
        tokio::select! {
            _ = interval.tick() => {
                trace!("cleanup job tick");
                if let Err(e) = state.provider.get_key_provider().cleanup().await {
                    error!("Error during cleanup job: {}", e);
                }
            },
            () = cancel.cancelled() => {
                info!("Cancellation requested. Stopping cleanup task.");
                break;
            }
        }
    }
}

/// Install shutdown and interrupt signal handler
async fn shutdown_signal(state: ServiceState) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .inspect_err(|e| error!("failed to install Ctrl+C handler: {e}"))
            .ok();
    };

    #[cfg(unix)]
    let terminate = async {
        if let Ok(mut sig) = signal::unix::signal(signal::unix::SignalKind::terminate())
            .inspect_err(|e| error!("failed to install signal handler: {e}"))
        {
            sig.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {state.terminate().await.ok();},
        () = terminate => {state.terminate().await.ok();},
    }
}
