//! Role and user lookup flows
//!
//! Every flow resolves the environment origin first, then issues its queries
//! and merges the results. A fetch that fails counts as zero rows.

use super::client::{EntitySet, FetchXmlSource};
use crate::error::{LookupError, LookupResult};
use crate::models::{
    merge, queries, ODataResponse, RoleAssignment, RoleRow, RoleSummary, SourceKind,
    UserAssignment, UserRow, UserSummary,
};
use crate::origin::{resolve_origin, Origin, OriginProvider};
use std::sync::Arc;

/// Rows produced by a lookup plus the status line to show with them
#[derive(Debug, Clone, PartialEq)]
pub struct LookupOutcome<T> {
    pub rows: Vec<T>,
    pub message: String,
}

/// Runs the lookups against the active environment
pub struct RoleLookup {
    source: Arc<dyn FetchXmlSource>,
    origin_provider: Arc<dyn OriginProvider>,
    trusted_suffix: String,
}

impl RoleLookup {
    pub fn new(
        source: Arc<dyn FetchXmlSource>,
        origin_provider: Arc<dyn OriginProvider>,
        trusted_suffix: impl Into<String>,
    ) -> Self {
        Self {
            source,
            origin_provider,
            trusted_suffix: trusted_suffix.into(),
        }
    }

    /// Resolve and validate the active environment
    pub async fn origin(&self) -> LookupResult<Origin> {
        let url = self.origin_provider.current_url().await?;
        resolve_origin(&url, &self.trusted_suffix)
    }

    /// Security roles held by the user with this full name
    pub async fn user_roles(&self, full_name: &str) -> LookupResult<LookupOutcome<RoleAssignment>> {
        let full_name = non_empty(full_name, "the full name")?;
        let origin = self.origin().await?;

        let direct_query = queries::user_roles_direct(full_name);
        let team_query = queries::user_roles_team(full_name);
        let (direct, team) = tokio::join!(
            self.source.fetch(&origin, EntitySet::Roles, &direct_query),
            self.source.fetch(&origin, EntitySet::Roles, &team_query),
        );

        let direct = role_assignments(direct, SourceKind::Direct);
        let team = role_assignments(team, SourceKind::Team);
        let merged = merge(direct, team);

        tracing::info!("Resolved {} role(s) for '{}'", merged.len(), full_name);
        let message = if merged.is_empty() {
            format!("No roles found for '{}'.", full_name)
        } else {
            format!("Found {} role(s) for '{}'.", merged.len(), full_name)
        };
        Ok(LookupOutcome {
            rows: merged.into_vec(),
            message,
        })
    }

    /// Users holding the given role, directly or through a team
    pub async fn role_users(&self, role: &RoleSummary) -> LookupResult<LookupOutcome<UserAssignment>> {
        let role_id = non_empty(&role.id, "a role")?;
        let origin = self.origin().await?;

        let direct_query = queries::role_users_direct(role_id);
        let team_query = queries::role_users_team(role_id);
        let (direct, team) = tokio::join!(
            self.source.fetch(&origin, EntitySet::SystemUsers, &direct_query),
            self.source.fetch(&origin, EntitySet::SystemUsers, &team_query),
        );

        let direct = user_assignments(direct, SourceKind::Direct);
        let team = user_assignments(team, SourceKind::Team);
        let merged = merge(direct, team);

        tracing::info!("Resolved {} user(s) for role '{}'", merged.len(), role.name);
        let message = if merged.is_empty() {
            format!("No users found for role '{}'.", role.name)
        } else {
            format!("Found {} user(s) for role '{}'.", merged.len(), role.name)
        };
        Ok(LookupOutcome {
            rows: merged.into_vec(),
            message,
        })
    }

    /// Users whose full name contains `term`
    pub async fn search_users(&self, term: &str) -> LookupResult<LookupOutcome<UserSummary>> {
        let term = non_empty(term, "a search term")?;
        let origin = self.origin().await?;

        let json = self
            .source
            .fetch(&origin, EntitySet::SystemUsers, &queries::user_search(term))
            .await;
        let rows: Vec<UserSummary> = ODataResponse::rows(json);

        let message = if rows.is_empty() {
            format!("No users found matching '{}'.", term)
        } else {
            format!("Found {} user(s) matching '{}'.", rows.len(), term)
        };
        Ok(LookupOutcome { rows, message })
    }

    /// All security roles, sorted by name
    pub async fn list_roles(&self) -> LookupResult<Vec<RoleSummary>> {
        let origin = self.origin().await?;
        let json = self
            .source
            .fetch(&origin, EntitySet::Roles, &queries::role_list())
            .await;
        Ok(ODataResponse::rows(json))
    }
}

fn non_empty<'a>(value: &'a str, what: &'static str) -> LookupResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(LookupError::EmptyInput(what));
    }
    Ok(value)
}

fn role_assignments(json: Option<serde_json::Value>, source: SourceKind) -> Vec<RoleAssignment> {
    ODataResponse::<RoleRow>::rows(json)
        .into_iter()
        .filter_map(|row| RoleAssignment::from_row(row, source))
        .collect()
}

fn user_assignments(json: Option<serde_json::Value>, source: SourceKind) -> Vec<UserAssignment> {
    ODataResponse::<UserRow>::rows(json)
        .into_iter()
        .filter_map(|row| UserAssignment::from_row(row, source))
        .collect()
}
