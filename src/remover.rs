use std::time::Duration;
use tracing::{error, info};

use crate::client::PlatformClient;
use crate::error::AppError;
use crate::models::{EmailAddress, RelationshipPayload, Team, VerifiedMember};

/// Status the platform returns when the relationship update is applied
pub const REMOVAL_SUCCESS_STATUS: u16 = 204;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalOutcome {
    Removed,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemovalEntry {
    pub email: EmailAddress,
    pub membership_id: String,
    pub outcome: RemovalOutcome,
}

/// One entry per submitted membership id, in submission order
#[derive(Debug)]
pub struct RemovalReport {
    pub entries: Vec<RemovalEntry>,
    /// Set when the platform rejected the batch
    pub error: Option<AppError>,
}

impl RemovalReport {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }

    fn with_outcome(
        members: &[VerifiedMember],
        outcome: RemovalOutcome,
        error: Option<AppError>,
    ) -> Self {
        RemovalReport {
            entries: members
                .iter()
                .map(|m| RemovalEntry {
                    email: m.email.clone(),
                    membership_id: m.membership.membership_id.clone(),
                    outcome,
                })
                .collect(),
            error,
        }
    }
}

/// Issues the single bulk DELETE for all verified members
pub struct BulkRemover<'a, C: PlatformClient + ?Sized> {
    client: &'a C,
    settle_delay: Duration,
}

impl<'a, C: PlatformClient + ?Sized> BulkRemover<'a, C> {
    pub fn new(client: &'a C, settle_delay: Duration) -> Self {
        Self {
            client,
            settle_delay,
        }
    }

    pub fn build_payload(members: &[VerifiedMember]) -> RelationshipPayload {
        RelationshipPayload::organization_memberships(
            members.iter().map(|m| m.membership.membership_id.as_str()),
        )
    }

    /// Returns `None` without calling the platform when there is nothing to remove.
    /// A non-204 answer fails the whole batch.
    pub async fn remove(&self, team: &Team, members: &[VerifiedMember]) -> Option<RemovalReport> {
        if members.is_empty() {
            return None;
        }

        let payload = Self::build_payload(members);
        info!(
            "Removing {} membership(s) from team '{}' ({})",
            payload.data.len(),
            team.name,
            team.team_id
        );

        let response = match self
            .client
            .remove_team_memberships(&team.team_id, &payload)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!("Bulk removal request failed: {}", e);
                let err = AppError::BulkRemoval {
                    status: None,
                    detail: e.to_string(),
                };
                return Some(RemovalReport::with_outcome(
                    members,
                    RemovalOutcome::Failed,
                    Some(err),
                ));
            }
        };

        if response.status != REMOVAL_SUCCESS_STATUS {
            error!("Bulk removal rejected with HTTP {}", response.status);
            let err = AppError::BulkRemoval {
                status: Some(response.status),
                detail: response.body,
            };
            return Some(RemovalReport::with_outcome(
                members,
                RemovalOutcome::Failed,
                Some(err),
            ));
        }

        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }

        Some(RemovalReport::with_outcome(
            members,
            RemovalOutcome::Removed,
            None,
        ))
    }
}
