use std::fmt;
use std::io::{self, Write};

use crate::error::AppError;
use crate::models::{EmailAddress, Team};
use crate::remover::{RemovalOutcome, RemovalReport};
use crate::resolver::{Resolution, ResolvedEmail};
use crate::verifier::{MembershipState, Verification};

/// Terminal status of a run, one per process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    EmailNotFound,
    TeamNotFound,
    NotMember,
    RemovalFailed,
}

impl ExitStatus {
    pub fn code(self) -> i32 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::EmailNotFound => 1,
            ExitStatus::TeamNotFound => 2,
            ExitStatus::NotMember => 3,
            ExitStatus::RemovalFailed => 4,
        }
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ExitStatus::Success => "success.",
            ExitStatus::EmailNotFound => "email not found.",
            ExitStatus::TeamNotFound => "team not found.",
            ExitStatus::NotMember => "no matching members.",
            ExitStatus::RemovalFailed => "removal failed.",
        };
        f.write_str(text)
    }
}

/// Precedence, first match wins: missing team, unresolved email, nobody to
/// remove because resolved users are not members, failed removal.
pub fn decide_exit_status(
    team_found: bool,
    unresolved_count: usize,
    not_member_count: usize,
    verified_count: usize,
    removal_succeeded: Option<bool>,
) -> ExitStatus {
    if !team_found {
        return ExitStatus::TeamNotFound;
    }
    if unresolved_count > 0 {
        return ExitStatus::EmailNotFound;
    }
    if verified_count == 0 {
        return if not_member_count > 0 {
            ExitStatus::NotMember
        } else {
            ExitStatus::Success
        };
    }
    match removal_succeeded {
        Some(false) => ExitStatus::RemovalFailed,
        _ => ExitStatus::Success,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmailReport {
    pub email: EmailAddress,
    pub resolution: Resolution,
    pub membership: Option<MembershipState>,
}

/// Everything a run learned, in input order
#[derive(Debug)]
pub struct RunResult {
    pub organization: String,
    pub team_name: String,
    pub team: Option<Team>,
    pub emails: Vec<EmailReport>,
    pub removal: Option<RemovalReport>,
}

impl RunResult {
    pub fn new(
        organization: &str,
        team_name: &str,
        team: Option<Team>,
        resolved: Vec<ResolvedEmail>,
        verification: &Verification,
        removal: Option<RemovalReport>,
    ) -> Self {
        let emails = resolved
            .into_iter()
            .map(|r| EmailReport {
                membership: verification.state_of(&r.email),
                email: r.email,
                resolution: r.resolution,
            })
            .collect();

        RunResult {
            organization: organization.to_string(),
            team_name: team_name.to_string(),
            team,
            emails,
            removal,
        }
    }

    pub fn unresolved_count(&self) -> usize {
        self.emails
            .iter()
            .filter(|e| e.resolution.is_unresolved())
            .count()
    }

    fn count_state(&self, state: MembershipState) -> usize {
        self.emails
            .iter()
            .filter(|e| e.membership == Some(state))
            .count()
    }

    pub fn verified_count(&self) -> usize {
        self.count_state(MembershipState::Member)
    }

    pub fn not_member_count(&self) -> usize {
        self.count_state(MembershipState::NotMember)
    }

    pub fn exit_status(&self) -> ExitStatus {
        decide_exit_status(
            self.team.is_some(),
            self.unresolved_count(),
            self.not_member_count(),
            self.verified_count(),
            self.removal.as_ref().map(RemovalReport::succeeded),
        )
    }
}

/// Writes the operator-facing report
pub struct OutcomeReporter<W: Write> {
    out: W,
}

impl<W: Write> OutcomeReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Print per-email state, removal lines and the summary; return the exit status
    pub fn report(&mut self, result: &RunResult) -> io::Result<ExitStatus> {
        for entry in &result.emails {
            self.write_email_line(result, entry)?;
        }

        if let Some(removal) = &result.removal {
            self.write_removal(result, removal)?;
        }

        let status = result.exit_status();
        writeln!(
            self.out,
            "Summary: {} email(s), {} unresolved, {} not in team, {} verified member(s)",
            result.emails.len(),
            result.unresolved_count(),
            result.not_member_count(),
            result.verified_count()
        )?;
        writeln!(self.out, "Exit status {}: {}", status.code(), status)?;
        self.out.flush()?;
        Ok(status)
    }

    fn write_email_line(&mut self, result: &RunResult, entry: &EmailReport) -> io::Result<()> {
        let email = &entry.email;
        match &entry.resolution {
            Resolution::Skipped => {
                let reason = AppError::TeamNotFound {
                    team: result.team_name.clone(),
                    organization: result.organization.clone(),
                };
                writeln!(self.out, "{}: not checked ({})", email, reason)
            }
            Resolution::NotFound => {
                let reason = AppError::NotFound {
                    email: email.to_string(),
                };
                writeln!(
                    self.out,
                    "{}: {} in organization '{}'{}",
                    email,
                    reason,
                    result.organization,
                    team_suffix(result)
                )
            }
            Resolution::LookupFailed(reason) => writeln!(
                self.out,
                "{}: lookup failed: {}{}",
                email,
                reason,
                team_suffix(result)
            ),
            Resolution::Found(membership) => {
                let team_state = match (&result.team, entry.membership) {
                    (Some(team), Some(MembershipState::Member)) => format!(
                        "member of team '{}' (users_count={}, visibility={})",
                        team.name, team.users_count, team.visibility
                    ),
                    (Some(team), _) => format!(
                        "{} (users_count={}, visibility={})",
                        AppError::NotMember {
                            email: email.to_string(),
                            team: team.name.clone(),
                        },
                        team.users_count,
                        team.visibility
                    ),
                    (None, _) => format!("team '{}' unavailable", result.team_name),
                };
                writeln!(
                    self.out,
                    "{}: found user_id={} org_membership_id={}; {}",
                    email,
                    membership.user_id.as_deref().unwrap_or("-"),
                    membership.membership_id,
                    team_state
                )
            }
        }
    }

    fn write_removal(&mut self, result: &RunResult, removal: &RemovalReport) -> io::Result<()> {
        if let Some(err) = &removal.error {
            return writeln!(self.out, "{}", err);
        }

        for entry in &removal.entries {
            if entry.outcome == RemovalOutcome::Removed {
                writeln!(
                    self.out,
                    "Removed {} (org_membership_id={}) from team '{}'",
                    entry.email, entry.membership_id, result.team_name
                )?;
            }
        }
        Ok(())
    }
}

/// Team details appended to lines of emails that never reached verification
fn team_suffix(result: &RunResult) -> String {
    match &result.team {
        Some(team) => format!(
            " (team '{}' users_count={}, visibility={})",
            team.name, team.users_count, team.visibility
        ),
        None => String::new(),
    }
}
