use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

pub const ORGANIZATION_MEMBERSHIPS_TYPE: &str = "organization-memberships";

/// Reference to another resource, `{"type": ..., "id": ...}`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ResourceIdentifier {
    #[serde(rename = "type", default)]
    pub resource_type: String,
    pub id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ToOneRelationship {
    #[serde(default)]
    pub data: Option<ResourceIdentifier>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ToManyRelationship {
    #[serde(default)]
    pub data: Option<Vec<ResourceIdentifier>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct MembershipRelationships {
    #[serde(default)]
    pub user: Option<ToOneRelationship>,
    #[serde(default)]
    pub teams: Option<ToManyRelationship>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct MembershipAttributes {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// One entry of `GET /organizations/{org}/organization-memberships`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MembershipResource {
    pub id: String,
    #[serde(default)]
    pub attributes: MembershipAttributes,
    #[serde(default)]
    pub relationships: MembershipRelationships,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MembershipListDocument {
    #[serde(default)]
    pub data: Vec<MembershipResource>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Organization,
    #[default]
    Secret,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Organization => write!(f, "organization"),
            Visibility::Secret => write!(f, "secret"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TeamAttributes {
    pub name: String,
    #[serde(rename = "users-count", default)]
    pub users_count: u64,
    #[serde(default)]
    pub visibility: Visibility,
}

/// One entry of `GET /organizations/{org}/teams`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TeamResource {
    pub id: String,
    pub attributes: TeamAttributes,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TeamListDocument {
    #[serde(default)]
    pub data: Vec<TeamResource>,
}

/// Body of `DELETE /teams/{id}/relationships/organization-memberships`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RelationshipPayload {
    pub data: Vec<ResourceIdentifier>,
}

impl RelationshipPayload {
    pub fn organization_memberships<'a, I>(membership_ids: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        RelationshipPayload {
            data: membership_ids
                .into_iter()
                .map(|id| ResourceIdentifier {
                    resource_type: ORGANIZATION_MEMBERSHIPS_TYPE.to_string(),
                    id: id.to_string(),
                })
                .collect(),
        }
    }
}

/// Raw outcome of the bulk DELETE; classification happens in the remover
#[derive(Debug, Clone, PartialEq)]
pub struct RemovalResponse {
    pub status: u16,
    pub body: String,
}

/// Trimmed, case-preserved email address
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Returns `None` for input that is empty after trimming
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(EmailAddress(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrganizationMembership {
    pub membership_id: String,
    pub user_id: Option<String>,
    pub team_ids: BTreeSet<String>,
}

impl From<&MembershipResource> for OrganizationMembership {
    fn from(resource: &MembershipResource) -> Self {
        let user_id = resource
            .relationships
            .user
            .as_ref()
            .and_then(|u| u.data.as_ref())
            .map(|d| d.id.clone());

        let team_ids = resource
            .relationships
            .teams
            .as_ref()
            .and_then(|t| t.data.as_ref())
            .map(|teams| {
                teams
                    .iter()
                    .filter(|t| !t.id.is_empty())
                    .map(|t| t.id.clone())
                    .collect()
            })
            .unwrap_or_default();

        OrganizationMembership {
            membership_id: resource.id.clone(),
            user_id,
            team_ids,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Team {
    pub team_id: String,
    pub name: String,
    pub users_count: u64,
    pub visibility: Visibility,
}

impl From<&TeamResource> for Team {
    fn from(resource: &TeamResource) -> Self {
        Team {
            team_id: resource.id.clone(),
            name: resource.attributes.name.clone(),
            users_count: resource.attributes.users_count,
            visibility: resource.attributes.visibility,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedMember {
    pub email: EmailAddress,
    pub membership: OrganizationMembership,
}
