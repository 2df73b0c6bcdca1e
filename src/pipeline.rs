use std::time::Duration;
use tracing::info;

use crate::client::PlatformClient;
use crate::config::AppConfig;
use crate::email::EmailSet;
use crate::error::{AppError, AppResult};
use crate::remover::BulkRemover;
use crate::report::RunResult;
use crate::resolver::{MembershipResolver, Resolution, ResolvedEmail};
use crate::team::TeamLocator;
use crate::verifier::{verify_memberships, Verification};

#[derive(Debug, Clone)]
pub struct RemovalRequest {
    pub organization: String,
    pub team_name: String,
    pub emails: EmailSet,
}

/// Locate the team, resolve every email in order, verify membership, then
/// remove all verified members in one request.
///
/// The team is looked up first: if it does not exist no membership lookups
/// are made. Errors returned here are fatal for the run; per-email problems
/// are recorded in the `RunResult` instead.
pub async fn run<C: PlatformClient + ?Sized>(
    client: &C,
    config: &AppConfig,
    request: &RemovalRequest,
) -> AppResult<RunResult> {
    let organization = request.organization.as_str();
    info!(
        "Removing {} email(s) from team '{}' in organization '{}'",
        request.emails.len(),
        request.team_name,
        organization
    );

    let team = match TeamLocator::new(client, organization)
        .locate(&request.team_name)
        .await
    {
        Ok(team) => team,
        Err(AppError::TeamNotFound { team, organization }) => {
            info!("Team '{}' not found in '{}'; skipping lookups", team, organization);
            let skipped = request
                .emails
                .iter()
                .map(|email| ResolvedEmail {
                    email: email.clone(),
                    resolution: Resolution::Skipped,
                })
                .collect();
            return Ok(RunResult::new(
                &organization,
                &request.team_name,
                None,
                skipped,
                &Verification::default(),
                None,
            ));
        }
        Err(e) => return Err(e),
    };

    let resolved = MembershipResolver::new(client, organization)
        .resolve_all(&request.emails)
        .await;

    let verification = verify_memberships(&resolved, &team);
    info!(
        "{} verified member(s), {} not in team",
        verification.members.len(),
        verification.not_members.len()
    );

    let settle_delay = Duration::from_secs(config.removal.settle_delay_secs);
    let removal = BulkRemover::new(client, settle_delay)
        .remove(&team, &verification.members)
        .await;

    Ok(RunResult::new(
        organization,
        &request.team_name,
        Some(team),
        resolved,
        &verification,
        removal,
    ))
}
