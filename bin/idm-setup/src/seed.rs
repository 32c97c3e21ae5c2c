//! First-run seeding
//!
//! Creates the `admin` role and, when configured, the first administrator.
//! Conflicts mean an earlier run already did the work, so they are skipped.

use anyhow::{anyhow, Result};
use tracing::info;

use idm_config::BootstrapConfig;
use idm_platform::{ExecutionContext, IdentityPlatform, UnitOfWork, UseCaseResult, ADMIN_ROLE};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub role_created: bool,
    pub admin_registered: bool,
    pub admin_assigned: bool,
}

pub async fn seed<U: UnitOfWork>(
    platform: &IdentityPlatform<U>,
    bootstrap: &BootstrapConfig,
) -> Result<SeedReport> {
    let mut report = SeedReport::default();
    let admin_account = bootstrap.admin_account();

    // the administrator needs the role to exist
    if bootstrap.seed_admin_role || admin_account.is_some() {
        report.role_created = applied(
            "create admin role",
            platform.roles.create_role(ADMIN_ROLE, ExecutionContext::system()).await,
        )?;
    }

    if let Some((username, email, password)) = admin_account {
        report.admin_registered = applied(
            "register administrator",
            platform
                .users
                .register_user(username, email, password, ExecutionContext::system())
                .await,
        )?;
        report.admin_assigned = applied(
            "assign admin role",
            platform
                .roles
                .assign_role(username, ADMIN_ROLE, ExecutionContext::system())
                .await,
        )?;
    }

    Ok(report)
}

/// `true` when the step wrote something, `false` when it was already done.
fn applied<T>(step: &str, result: UseCaseResult<T>) -> Result<bool> {
    match result.into_result() {
        Ok(_) => {
            info!(step, "Seed step applied");
            Ok(true)
        }
        Err(err) if err.is_conflict() => {
            info!(step, reason = err.message(), "Seed step already applied, skipping");
            Ok(false)
        }
        Err(err) => Err(anyhow!("{} failed: {}", step, err)),
    }
}
