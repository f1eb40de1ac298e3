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
//! Database administration of the token exchange service.
//!
//! Besides the schema migrations this reports and applies the issuer seed
//! configured for the service, so the database can be prepared before the
//! first `sts` start.
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Report, Result, bail};
use eyre::WrapErr;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::{MigrationStatus, MigratorTrait};
use secrecy::ExposeSecret;
use std::io;
use std::path::PathBuf;
use tracing::{Level, info};
use tracing_subscriber::{
    Layer,
    filter::{LevelFilter, Targets},
    prelude::*,
};

use token_exchange_sts::config::Config;
use token_exchange_sts::db_migration::Migrator;
use token_exchange_sts::storage::seed::{SeedAction, apply_seed, load_seed_file, plan_seed};
use token_exchange_sts::storage::sql::SqlStorage;

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Path to the config file.
    #[arg(short, long, default_value = "/etc/sts/sts.conf")]
    config: PathBuf,

    /// Verbosity level. Repeat to increase level.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply the pending schema migrations.
    Up {
        /// Apply at most the given number of migrations.
        #[arg(short('n'))]
        steps: Option<u32>,
    },
    /// Revert the applied schema migrations.
    Down {
        /// Revert at most the given number of migrations.
        #[arg(short('n'))]
        steps: Option<u32>,
    },
    /// Show the schema migrations and compare the configured issuer seed with
    /// the stored issuers.
    Status,
    /// Drop every table and apply all migrations.
    Fresh,
    /// Revert and apply again all migrations.
    Refresh,
    /// Revert all migrations.
    Reset,
    /// Apply the issuer seed.
    Seed {
        /// Seed file. Defaults to `[storage] seed_file` of the config.
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Only report what would change.
        #[arg(long)]
        dry_run: bool,
    },
}

#[allow(clippy::print_stdout)]
#[tokio::main]
async fn main() -> Result<(), Report> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let filter = Targets::new()
        .with_default(match cli.verbose {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        })
        .with_target("sqlx", Level::WARN);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_filter(filter),
        )
        .init();

    let cfg = Config::new(cli.config)?;
    let conn = Database::connect(
        ConnectOptions::new(cfg.database.get_connection().expose_secret())
            // Prevent dumping the password in plaintext.
            .sqlx_logging(false)
            .to_owned(),
    )
    .await
    .wrap_err("Database connection failed")?;
    info!("Connected to the database");

    match cli.command {
        Command::Up { steps } => Migrator::up(&conn, steps).await?,
        Command::Down { steps } => Migrator::down(&conn, steps).await?,
        Command::Fresh => Migrator::fresh(&conn).await?,
        Command::Refresh => Migrator::refresh(&conn).await?,
        Command::Reset => Migrator::reset(&conn).await?,
        Command::Status => {
            let pending = print_migrations(&conn).await?;
            match &cfg.storage.seed_file {
                None => println!("\nNo issuer seed configured"),
                Some(_) if pending > 0 => {
                    println!("\nIssuer seed not checked: {pending} migrations pending")
                }
                Some(file) => {
                    println!("\nIssuer seed {}:", file.display());
                    let seeds = load_seed_file(file).await?;
                    let storage = SqlStorage::new(conn, None)?;
                    for (uri, action) in plan_seed(&storage, &seeds).await? {
                        println!("  {uri}: {action}");
                    }
                }
            }
        }
        Command::Seed { file, dry_run } => {
            let Some(file) = file.or(cfg.storage.seed_file) else {
                bail!("no seed file given and none configured");
            };
            let pending = Migrator::get_pending_migrations(&conn).await?.len();
            if pending > 0 {
                bail!("{pending} migrations pending, run `sts-db up` first");
            }
            let seeds = load_seed_file(&file).await?;
            let storage = SqlStorage::new(conn, None)?;
            let plan = plan_seed(&storage, &seeds).await?;
            for (uri, action) in &plan {
                println!("{uri}: {action}");
            }
            if plan
                .iter()
                .any(|(_, action)| *action == SeedAction::Conflict)
            {
                bail!("the seed conflicts with issuers of other tenants");
            }
            if !dry_run {
                let summary = apply_seed(&storage, seeds).await?;
                println!(
                    "Created {} and updated {} issuers",
                    summary.created, summary.updated
                );
            }
        }
    }
    Ok(())
}

/// Print the migrations with their state. Returns the number of pending ones.
#[allow(clippy::print_stdout)]
async fn print_migrations(conn: &DatabaseConnection) -> Result<usize> {
    let mut pending = 0;
    println!("Schema migrations:");
    for migration in Migrator::get_migration_with_status(conn).await? {
        let state = match migration.status() {
            MigrationStatus::Applied => "applied",
            MigrationStatus::Pending => {
                pending += 1;
                "pending"
            }
        };
        println!("  {:<40} {state}", migration.name());
    }
    Ok(pending)
}
