//! Merging of direct and team-path results

use super::user::{RoleAssignment, UserAssignment};
use indexmap::IndexMap;

/// A record that can be merged by key
pub trait Assignment {
    /// Identity key; two records with the same key describe the same row
    fn key(&self) -> &str;

    /// Fold a team-path record with the same key into this one
    fn absorb_team(&mut self, team_name: &str);

    fn team_name(&self) -> &str;
}

impl Assignment for RoleAssignment {
    fn key(&self) -> &str {
        &self.role_name
    }

    fn absorb_team(&mut self, team_name: &str) {
        self.source = self.source.with_team();
        self.team_name = team_name.to_string();
    }

    fn team_name(&self) -> &str {
        &self.team_name
    }
}

impl Assignment for UserAssignment {
    fn key(&self) -> &str {
        &self.user_id
    }

    fn absorb_team(&mut self, team_name: &str) {
        self.source = self.source.with_team();
        self.team_name = team_name.to_string();
    }

    fn team_name(&self) -> &str {
        &self.team_name
    }
}

/// Merged rows in first-insertion order, unique by key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedCollection<T> {
    entries: IndexMap<String, T>,
}

impl<T> Default for MergedCollection<T> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }
}

impl<T: Assignment> MergedCollection<T> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries.get(key)
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.values()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.entries.into_values().collect()
    }

    fn insert_direct(&mut self, record: T) {
        // Duplicate direct rows collapse onto the first one
        self.entries.entry(record.key().to_string()).or_insert(record);
    }

    fn insert_team(&mut self, record: T) {
        match self.entries.get_mut(record.key()) {
            Some(existing) => existing.absorb_team(record.team_name()),
            None => {
                self.entries.insert(record.key().to_string(), record);
            }
        }
    }
}

/// Merge direct-path and team-path records.
///
/// Direct records are inserted first. A team record whose key is already
/// present promotes a direct entry to `Direct & Team`, and its team name
/// replaces the stored one, so when a key arrives through several teams the
/// last team name wins.
pub fn merge<T: Assignment>(direct: Vec<T>, team: Vec<T>) -> MergedCollection<T> {
    let mut merged = MergedCollection::default();
    for record in direct {
        merged.insert_direct(record);
    }
    for record in team {
        merged.insert_team(record);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::{SourceKind, NO_TEAM};
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    fn role(name: &str, team: &str, source: SourceKind) -> RoleAssignment {
        RoleAssignment {
            role_name: name.to_string(),
            team_name: team.to_string(),
            source,
        }
    }

    fn direct(name: &str) -> RoleAssignment {
        role(name, NO_TEAM, SourceKind::Direct)
    }

    fn via_team(name: &str, team: &str) -> RoleAssignment {
        role(name, team, SourceKind::Team)
    }

    #[test]
    fn test_empty_inputs_merge_to_empty() {
        let merged = merge::<RoleAssignment>(vec![], vec![]);
        assert!(merged.is_empty());
        assert!(merged.into_vec().is_empty());
    }

    #[test]
    fn test_collision_becomes_direct_and_team() {
        let merged = merge(
            vec![direct("Sales Manager")],
            vec![via_team("Sales Manager", "EMEA")],
        );
        assert_eq!(
            merged.into_vec(),
            vec![role("Sales Manager", "EMEA", SourceKind::DirectAndTeam)]
        );
    }

    #[test]
    fn test_team_only_row_keeps_team_source() {
        let merged = merge(vec![], vec![via_team("Support Rep", "Helpdesk")]);
        assert_eq!(
            merged.into_vec(),
            vec![role("Support Rep", "Helpdesk", SourceKind::Team)]
        );
    }

    #[test]
    fn test_labels_and_totality_over_mixed_sets() {
        let merged = merge(
            vec![direct("A"), direct("B"), direct("C")],
            vec![via_team("B", "T1"), via_team("D", "T2"), via_team("E", "T3")],
        );

        let keys: HashSet<&str> = ["A", "B", "C", "D", "E"].into_iter().collect();
        assert_eq!(merged.len(), keys.len());
        for key in &keys {
            assert!(merged.get(key).is_some(), "missing {}", key);
        }

        assert_eq!(merged.get("A").unwrap().source, SourceKind::Direct);
        assert_eq!(merged.get("C").unwrap().source, SourceKind::Direct);
        assert_eq!(merged.get("B").unwrap().source, SourceKind::DirectAndTeam);
        assert_eq!(merged.get("D").unwrap().source, SourceKind::Team);
        assert_eq!(merged.get("E").unwrap().source, SourceKind::Team);
    }

    #[test]
    fn test_order_is_first_insertion() {
        let merged = merge(
            vec![direct("Z"), direct("A")],
            vec![via_team("M", "T"), via_team("Z", "T")],
        );
        let names: Vec<&str> = merged.iter().map(|r| r.role_name.as_str()).collect();
        assert_eq!(names, vec!["Z", "A", "M"]);
    }

    #[test]
    fn test_last_team_name_wins() {
        let merged = merge(
            vec![direct("Sales Manager")],
            vec![
                via_team("Sales Manager", "EMEA"),
                via_team("Sales Manager", "APAC"),
            ],
        );
        let entry = merged.get("Sales Manager").unwrap();
        assert_eq!(entry.team_name, "APAC");
        assert_eq!(entry.source, SourceKind::DirectAndTeam);
    }

    #[test]
    fn test_role_held_through_two_teams_only() {
        let merged = merge(vec![], vec![via_team("X", "T1"), via_team("X", "T2")]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged.get("X").unwrap().team_name, "T2");
        assert_eq!(merged.get("X").unwrap().source, SourceKind::Team);
    }

    #[test]
    fn test_users_merge_by_id_not_name() {
        let user = |id: &str, name: &str, team: &str, source| UserAssignment {
            full_name: name.to_string(),
            user_id: id.to_string(),
            team_name: team.to_string(),
            source,
        };
        let merged = merge(
            vec![user("u1", "Jane Doe", NO_TEAM, SourceKind::Direct)],
            vec![
                user("u1", "Jane Doe", "Helpdesk", SourceKind::Team),
                user("u2", "Jane Doe", "Helpdesk", SourceKind::Team),
            ],
        );
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.get("u1").unwrap().source, SourceKind::DirectAndTeam);
        assert_eq!(merged.get("u1").unwrap().team_name, "Helpdesk");
        assert_eq!(merged.get("u2").unwrap().source, SourceKind::Team);
    }
}
