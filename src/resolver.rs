use tracing::{debug, warn};

use crate::client::PlatformClient;
use crate::email::EmailSet;
use crate::models::{EmailAddress, MembershipResource, OrganizationMembership};

/// Membership status of a user who accepted the organization invite
pub const ACTIVE_STATUS: &str = "active";

/// Result of looking up one email in the organization
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Found(OrganizationMembership),
    NotFound,
    /// The lookup request itself failed; counted as unresolved
    LookupFailed(String),
    /// Lookup never ran because the run stopped earlier
    Skipped,
}

impl Resolution {
    pub fn membership(&self) -> Option<&OrganizationMembership> {
        match self {
            Resolution::Found(m) => Some(m),
            _ => None,
        }
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, Resolution::NotFound | Resolution::LookupFailed(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedEmail {
    pub email: EmailAddress,
    pub resolution: Resolution,
}

pub struct MembershipResolver<'a, C: PlatformClient + ?Sized> {
    client: &'a C,
    organization: &'a str,
}

impl<'a, C: PlatformClient + ?Sized> MembershipResolver<'a, C> {
    pub fn new(client: &'a C, organization: &'a str) -> Self {
        Self {
            client,
            organization,
        }
    }

    /// Resolve every email one after another, in input order
    pub async fn resolve_all(&self, emails: &EmailSet) -> Vec<ResolvedEmail> {
        let mut resolved = Vec::with_capacity(emails.len());
        for email in emails {
            let resolution = self.resolve(email).await;
            resolved.push(ResolvedEmail {
                email: email.clone(),
                resolution,
            });
        }
        resolved
    }

    pub async fn resolve(&self, email: &EmailAddress) -> Resolution {
        let matches = match self
            .client
            .find_memberships(self.organization, email.as_str())
            .await
        {
            Ok(matches) => matches,
            Err(e) => {
                warn!("Membership lookup for {} failed: {}", email, e);
                return Resolution::LookupFailed(e.to_string());
            }
        };

        match select_match(email, &matches) {
            Some(resource) => {
                if let Some(status) = resource.attributes.status.as_deref() {
                    if status != ACTIVE_STATUS {
                        warn!(
                            "Membership {} for {} has status '{}'",
                            resource.id, email, status
                        );
                    }
                }
                let membership = OrganizationMembership::from(resource);
                debug!(
                    "Resolved {} to membership {} ({} teams)",
                    email,
                    membership.membership_id,
                    membership.team_ids.len()
                );
                Resolution::Found(membership)
            }
            None => {
                debug!("No membership for {} in {}", email, self.organization);
                Resolution::NotFound
            }
        }
    }
}

/// The query is a substring search, so the platform may return memberships
/// for other addresses. An exact email match wins; a membership whose email
/// differs is never used. Entries without an email attribute are accepted,
/// first one first.
fn select_match<'r>(
    email: &EmailAddress,
    matches: &'r [MembershipResource],
) -> Option<&'r MembershipResource> {
    if let Some(exact) = matches
        .iter()
        .find(|m| m.attributes.email.as_deref() == Some(email.as_str()))
    {
        return Some(exact);
    }

    for other in matches.iter().filter(|m| m.attributes.email.is_some()) {
        warn!(
            "Ignoring membership {} for {}: it belongs to {}",
            other.id,
            email,
            other.attributes.email.as_deref().unwrap_or("-")
        );
    }

    let mut unlabeled = matches.iter().filter(|m| m.attributes.email.is_none());
    let first = unlabeled.next();
    if let Some(first) = first {
        if unlabeled.next().is_some() {
            warn!(
                "Several memberships matched {} without an email attribute; using {}",
                email, first.id
            );
        }
    }
    first
}
