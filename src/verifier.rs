use crate::models::{EmailAddress, Team, VerifiedMember};
use crate::resolver::ResolvedEmail;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipState {
    Member,
    NotMember,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Verification {
    /// In input order
    pub members: Vec<VerifiedMember>,
    pub not_members: Vec<EmailAddress>,
}

impl Verification {
    pub fn state_of(&self, email: &EmailAddress) -> Option<MembershipState> {
        if self.members.iter().any(|m| &m.email == email) {
            Some(MembershipState::Member)
        } else if self.not_members.contains(email) {
            Some(MembershipState::NotMember)
        } else {
            None
        }
    }
}

/// Split resolved emails into team members and non-members. Unresolved
/// emails appear in neither list.
pub fn verify_memberships(resolved: &[ResolvedEmail], team: &Team) -> Verification {
    let mut verification = Verification::default();

    for entry in resolved {
        let Some(membership) = entry.resolution.membership() else {
            continue;
        };

        if membership.team_ids.contains(&team.team_id) {
            verification.members.push(VerifiedMember {
                email: entry.email.clone(),
                membership: membership.clone(),
            });
        } else {
            verification.not_members.push(entry.email.clone());
        }
    }

    verification
}
