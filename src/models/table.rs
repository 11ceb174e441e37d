//! Tabular view of lookup results

use super::user::{RoleAssignment, SourceKind, UserAssignment, UserSummary};

/// Rows ready for display or export
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    /// Column headers
    pub columns: Vec<String>,
    /// Rows of data (each row is a vec of string values)
    pub rows: Vec<Vec<String>>,
    /// Source of each row, for tables of merged assignments
    pub sources: Vec<SourceKind>,
}

impl ResultTable {
    fn with_columns(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl From<&[RoleAssignment]> for ResultTable {
    fn from(roles: &[RoleAssignment]) -> Self {
        let mut table = Self::with_columns(&["Role Name", "Team Name", "Source"]);
        for role in roles {
            table.rows.push(vec![
                role.role_name.clone(),
                role.team_name.clone(),
                role.source.to_string(),
            ]);
            table.sources.push(role.source);
        }
        table
    }
}

impl From<&[UserAssignment]> for ResultTable {
    fn from(users: &[UserAssignment]) -> Self {
        let mut table = Self::with_columns(&["Full Name", "User Id", "Team Name", "Source"]);
        for user in users {
            table.rows.push(vec![
                user.full_name.clone(),
                user.user_id.clone(),
                user.team_name.clone(),
                user.source.to_string(),
            ]);
            table.sources.push(user.source);
        }
        table
    }
}

impl From<&[UserSummary]> for ResultTable {
    fn from(users: &[UserSummary]) -> Self {
        let mut table = Self::with_columns(&["Full Name", "Domain Name", "User Id"]);
        for user in users {
            table.rows.push(vec![
                user.get_display_name(),
                user.domain_name.clone().unwrap_or_else(|| "-".to_string()),
                user.id.clone(),
            ]);
        }
        table
    }
}
