//! IDM Setup
//!
//! Prepares a MongoDB deployment for the identity platform:
//! - creates the unique indexes the uniqueness rules depend on
//! - optionally seeds the `admin` role and a first administrator

mod seed;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use idm_config::{AppConfig, ConfigLoader, PasswordConfig};
use idm_platform::{initialize_indexes, Argon2Config, IdentityPlatform, PasswordPolicy, PasswordService};

#[derive(Parser, Debug)]
#[command(name = "idm-setup")]
#[command(about = "Create indexes and seed the IDM platform")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(long, env = "IDM_CONFIG")]
    config: Option<PathBuf>,

    /// Do not create indexes
    #[arg(long, default_value_t = false)]
    skip_indexes: bool,

    /// Seed the admin role and the configured administrator
    #[arg(long, default_value_t = false)]
    seed: bool,

    /// Print an example configuration file and exit
    #[arg(long, default_value_t = false)]
    example_config: bool,
}

fn password_service(config: &PasswordConfig) -> Result<PasswordService> {
    let argon2 = Argon2Config {
        memory_cost: config.memory_cost,
        time_cost: config.time_cost,
        parallelism: config.parallelism,
        ..Argon2Config::default()
    };
    let policy = PasswordPolicy {
        min_length: config.min_length,
        max_length: config.max_length,
        require_uppercase: config.require_uppercase,
        require_lowercase: config.require_lowercase,
        require_digit: config.require_digit,
        require_non_alphanumeric: config.require_non_alphanumeric,
    };
    Ok(PasswordService::new(argon2, policy)?)
}

fn load_config(args: &Args) -> Result<AppConfig> {
    let loader = match &args.config {
        Some(path) => ConfigLoader::with_path(path),
        None => ConfigLoader::new(),
    };
    loader.load().context("failed to load configuration")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.example_config {
        print!("{}", AppConfig::example_toml());
        return Ok(());
    }

    idm_common::logging::init_logging("idm-setup");

    let config = load_config(&args)?;
    if config.dev_mode {
        info!("Development mode enabled");
    }

    let client = mongodb::Client::with_uri_str(&config.mongodb.uri)
        .await
        .context("failed to connect to MongoDB")?;
    let db = client.database(&config.mongodb.database);
    info!(database = %config.mongodb.database, "Connected to MongoDB");

    if args.skip_indexes {
        info!("Skipping index creation");
    } else {
        initialize_indexes(&db).await.context("failed to create indexes")?;
    }

    if args.seed || config.bootstrap.seed_admin_role {
        let hasher = Arc::new(password_service(&config.password)?);
        let platform = IdentityPlatform::mongo(client, db, hasher);
        let report = seed::seed(&platform, &config.bootstrap).await?;
        info!(
            role_created = report.role_created,
            admin_registered = report.admin_registered,
            admin_assigned = report.admin_assigned,
            "Seeding finished"
        );
    }

    info!("Setup complete");
    Ok(())
}
