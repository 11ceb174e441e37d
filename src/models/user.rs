//! User, role and assignment models

use serde::Deserialize;
use std::fmt;

/// Team name shown for assignments that do not involve a team
pub const NO_TEAM: &str = "N/A";

/// Team name used when a team-path row does not carry one
pub const UNKNOWN_TEAM: &str = "Unknown";

/// How a role reaches a user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Directly assigned to the user
    Direct,
    /// Inherited from a team
    Team,
    /// Held both directly and through a team
    DirectAndTeam,
}

impl SourceKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Direct => "Direct",
            Self::Team => "Team",
            Self::DirectAndTeam => "Direct & Team",
        }
    }

    /// Source after the same key was also found through a team
    pub fn with_team(self) -> Self {
        match self {
            Self::Direct | Self::DirectAndTeam => Self::DirectAndTeam,
            Self::Team => Self::Team,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A role held by a user, keyed by role name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleAssignment {
    pub role_name: String,
    pub team_name: String,
    pub source: SourceKind,
}

/// A user holding a role, keyed by user id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAssignment {
    pub full_name: String,
    pub user_id: String,
    pub team_name: String,
    pub source: SourceKind,
}

/// Raw role row from a user-to-roles query
#[derive(Debug, Clone, Deserialize)]
pub struct RoleRow {
    #[serde(rename = "name")]
    pub name: Option<String>,

    #[serde(rename = "team.name")]
    pub team_name: Option<String>,
}

/// Raw user row from a role-to-users query
#[derive(Debug, Clone, Deserialize)]
pub struct UserRow {
    #[serde(rename = "systemuserid")]
    pub id: Option<String>,

    #[serde(rename = "fullname")]
    pub full_name: Option<String>,

    #[serde(rename = "team.name")]
    pub team_name: Option<String>,
}

impl RoleAssignment {
    /// Build from a row; rows without a role name are dropped
    pub fn from_row(row: RoleRow, source: SourceKind) -> Option<Self> {
        let Some(role_name) = row.name else {
            tracing::debug!("Skipping role row without a name");
            return None;
        };
        Some(Self {
            role_name,
            team_name: team_name_for(row.team_name, source),
            source,
        })
    }
}

impl UserAssignment {
    /// Build from a row; rows without a user id are dropped
    pub fn from_row(row: UserRow, source: SourceKind) -> Option<Self> {
        let Some(user_id) = row.id else {
            tracing::debug!("Skipping user row without an id");
            return None;
        };
        Some(Self {
            full_name: row.full_name.unwrap_or_else(|| "Unknown".to_string()),
            user_id,
            team_name: team_name_for(row.team_name, source),
            source,
        })
    }
}

fn team_name_for(team_name: Option<String>, source: SourceKind) -> String {
    match source {
        SourceKind::Direct => NO_TEAM.to_string(),
        _ => team_name.unwrap_or_else(|| UNKNOWN_TEAM.to_string()),
    }
}

/// Security role entry from the role list
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RoleSummary {
    #[serde(rename = "roleid")]
    pub id: String,

    #[serde(rename = "name")]
    pub name: String,
}

/// System user entry from a user search
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserSummary {
    #[serde(rename = "systemuserid")]
    pub id: String,

    #[serde(rename = "fullname")]
    pub full_name: Option<String>,

    #[serde(rename = "domainname")]
    pub domain_name: Option<String>,
}

impl UserSummary {
    pub fn get_display_name(&self) -> String {
        self.full_name.clone().unwrap_or_else(||
            self.domain_name.clone().unwrap_or_else(|| "Unknown".to_string())
        )
    }
}
