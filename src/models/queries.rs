//! FetchXML queries for role and user lookups
//!
//! Role lookups come in pairs: one query follows the direct user-role link,
//! the other goes through team membership and the team-role link.

use super::fetch_xml::{Condition, FetchQuery, LinkEntity};

/// Alias of the joined team in team-path queries; its name surfaces as `team.name`
pub const TEAM_ALIAS: &str = "team";

/// Roles assigned directly to the user with this full name
pub fn user_roles_direct(full_name: &str) -> FetchQuery {
    FetchQuery::new("role").attribute("name").link(
        LinkEntity::new("systemuserroles", "roleid", "roleid")
            .alias("role")
            .intersect()
            .link(
                LinkEntity::new("systemuser", "systemuserid", "systemuserid")
                    .alias("user")
                    .intersect()
                    .filter(Condition::equals("fullname", full_name)),
            ),
    )
}

/// Roles the user with this full name holds through a team
pub fn user_roles_team(full_name: &str) -> FetchQuery {
    FetchQuery::new("role").attribute("name").link(
        LinkEntity::new("teamroles", "roleid", "roleid")
            .alias("teamrole")
            .intersect()
            .link(
                LinkEntity::new("team", "teamid", "teamid")
                    .alias(TEAM_ALIAS)
                    .intersect()
                    .attribute("name")
                    .link(
                        LinkEntity::new("teammembership", "teamid", "teamid")
                            .intersect()
                            .link(
                                LinkEntity::new("systemuser", "systemuserid", "systemuserid")
                                    .alias("teammember")
                                    .intersect()
                                    .filter(Condition::equals("fullname", full_name)),
                            ),
                    ),
            ),
    )
}

/// Users holding the role directly
pub fn role_users_direct(role_id: &str) -> FetchQuery {
    FetchQuery::new("systemuser")
        .attribute("fullname")
        .attribute("systemuserid")
        .link(
            LinkEntity::new("systemuserroles", "systemuserid", "systemuserid")
                .alias("userrole")
                .intersect()
                .filter(Condition::equals("roleid", role_id)),
        )
}

/// Users holding the role through a team they belong to
pub fn role_users_team(role_id: &str) -> FetchQuery {
    FetchQuery::new("systemuser")
        .attribute("fullname")
        .attribute("systemuserid")
        .link(
            LinkEntity::new("teammembership", "systemuserid", "systemuserid")
                .intersect()
                .link(
                    LinkEntity::new("team", "teamid", "teamid")
                        .alias(TEAM_ALIAS)
                        .intersect()
                        .attribute("name")
                        .link(
                            LinkEntity::new("teamroles", "teamid", "teamid")
                                .alias("teamrole")
                                .intersect()
                                .filter(Condition::equals("roleid", role_id)),
                        ),
                ),
        )
}

/// Users whose full name contains the search term
pub fn user_search(term: &str) -> FetchQuery {
    FetchQuery::new("systemuser")
        .attribute("fullname")
        .attribute("systemuserid")
        .attribute("domainname")
        .order_ascending("fullname")
        .filter(Condition::contains("fullname", term))
}

/// All security roles, sorted by name
pub fn role_list() -> FetchQuery {
    FetchQuery::new("role")
        .attribute("name")
        .attribute("roleid")
        .order_ascending("name")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fetch_xml::ConditionOperator;

    #[test]
    fn test_user_role_pair_shares_filter_value() {
        let direct = user_roles_direct("Jane Doe").to_xml();
        let team = user_roles_team("Jane Doe").to_xml();

        assert!(direct.contains("name=\"systemuserroles\""));
        assert!(!direct.contains("teammembership"));
        assert!(team.contains("name=\"teamroles\""));
        assert!(team.contains("name=\"teammembership\""));
        assert!(team.contains("alias=\"team\""));
        for xml in [&direct, &team] {
            assert!(xml.starts_with("<fetch distinct=\"true\"><entity name=\"role\">"));
            assert!(xml.contains("<condition attribute=\"fullname\" operator=\"eq\" value=\"Jane Doe\" />"));
        }
    }

    #[test]
    fn test_team_path_projects_team_name() {
        let query = user_roles_team("x");
        let team_link = &query.entity.links[0].links[0];
        assert_eq!(team_link.name, "team");
        assert_eq!(team_link.alias.as_deref(), Some(TEAM_ALIAS));
        assert_eq!(team_link.attributes, vec!["name".to_string()]);
    }

    #[test]
    fn test_role_user_pair_filters_on_role_id() {
        let id = "11111111-2222-3333-4444-555555555555";
        let direct = role_users_direct(id);
        let team = role_users_team(id);

        assert_eq!(direct.entity.name, "systemuser");
        assert_eq!(team.entity.name, "systemuser");
        let condition = &direct.entity.links[0].filter.as_ref().unwrap().conditions[0];
        assert_eq!(condition.attribute, "roleid");
        assert_eq!(condition.value, id);
        assert!(team.to_xml().contains(&format!("value=\"{}\"", id)));
    }

    #[test]
    fn test_user_search_is_ordered_substring_match() {
        let query = user_search("ann");
        let condition = &query.entity.filter.as_ref().unwrap().conditions[0];
        assert_eq!(condition.operator, ConditionOperator::Like);
        assert_eq!(condition.value, "%ann%");
        assert_eq!(query.entity.orders[0].attribute, "fullname");
        assert!(!query.entity.orders[0].descending);
    }

    #[test]
    fn test_role_list_is_sorted_by_name() {
        let xml = role_list().to_xml();
        assert!(xml.contains("<order attribute=\"name\" />"));
        assert!(!xml.contains("<filter>"));
    }
}
