//! Application state and main TUI logic

use super::input::{InputMode, KeyBindings};
use super::requests::{LookupTarget, RequestToken, RequestTracker};
use crate::api::{LookupOutcome, RoleLookup};
use crate::error::{LookupError, LookupResult};
use crate::export::{self, ExportFormat};
use crate::models::{ResultTable, RoleAssignment, RoleSummary, UserAssignment, UserSummary};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Shown when a lookup task dies without producing a result
const FETCH_FAILED: &str = "Failed to fetch data. Please try again.";

/// Top-level tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    UserRoles,
    RoleUsers,
    UserSearch,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::UserRoles, Tab::RoleUsers, Tab::UserSearch];

    pub fn title(&self) -> &'static str {
        match self {
            Self::UserRoles => "User Roles [1]",
            Self::RoleUsers => "Role Users [2]",
            Self::UserSearch => "User Search [3]",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Self::UserRoles => 0,
            Self::RoleUsers => 1,
            Self::UserSearch => 2,
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Self::UserRoles => Self::RoleUsers,
            Self::RoleUsers => Self::UserSearch,
            Self::UserSearch => Self::UserRoles,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            Self::UserRoles => Self::UserSearch,
            Self::RoleUsers => Self::UserRoles,
            Self::UserSearch => Self::RoleUsers,
        }
    }

    /// Whether the tab has a free-text input field
    pub fn has_input(&self) -> bool {
        !matches!(self, Self::RoleUsers)
    }

    fn target(&self) -> LookupTarget {
        match self {
            Self::UserRoles => LookupTarget::UserRoles,
            Self::RoleUsers => LookupTarget::RoleUsers,
            Self::UserSearch => LookupTarget::UserSearch,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Error,
}

/// Transient status line
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub kind: MessageKind,
    shown_at: Instant,
}

/// Result of a background lookup
#[derive(Debug)]
pub enum LookupEvent {
    RoleList(LookupResult<Vec<RoleSummary>>),
    UserRoles(String, LookupResult<LookupOutcome<RoleAssignment>>),
    RoleUsers(String, LookupResult<LookupOutcome<UserAssignment>>),
    UserSearch(LookupResult<LookupOutcome<UserSummary>>),
    /// The lookup task died before producing a result
    Failed(LookupTarget),
}

impl LookupEvent {
    fn target(&self) -> LookupTarget {
        match self {
            Self::RoleList(_) => LookupTarget::RoleList,
            Self::UserRoles(..) => LookupTarget::UserRoles,
            Self::RoleUsers(..) => LookupTarget::RoleUsers,
            Self::UserSearch(_) => LookupTarget::UserSearch,
            Self::Failed(target) => *target,
        }
    }
}

/// Main application struct
pub struct App {
    lookup: Arc<RoleLookup>,

    /// Environment URL shown in the status bar
    pub environment: String,

    /// Key binding style
    pub key_bindings: KeyBindings,

    /// Input mode
    pub input_mode: InputMode,

    /// Current tab
    pub tab: Tab,

    // User Roles tab
    pub full_name_input: String,
    pub user_roles: ResultTable,
    pub user_roles_subject: Option<String>,

    // Role Users tab
    pub roles: Vec<RoleSummary>,
    pub role_index: usize,
    pub role_users: ResultTable,
    pub role_users_subject: Option<String>,

    // User Search tab
    pub search_input: String,
    pub search_results: Vec<UserSummary>,
    pub search_table: ResultTable,

    /// Cursor in the active result table
    pub result_index: usize,

    // Feedback message
    pub message: Option<StatusMessage>,
    message_timeout: Duration,

    requests: RequestTracker,
    events_tx: mpsc::UnboundedSender<(RequestToken, LookupEvent)>,
    events_rx: mpsc::UnboundedReceiver<(RequestToken, LookupEvent)>,

    /// Should quit
    pub should_quit: bool,
}

impl App {
    /// Create a new app instance
    pub fn new(
        lookup: Arc<RoleLookup>,
        environment: String,
        key_bindings: KeyBindings,
        message_timeout: Duration,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            lookup,
            environment,
            key_bindings,
            input_mode: InputMode::Normal,
            tab: Tab::UserRoles,
            full_name_input: String::new(),
            user_roles: ResultTable::default(),
            user_roles_subject: None,
            roles: Vec::new(),
            role_index: 0,
            role_users: ResultTable::default(),
            role_users_subject: None,
            search_input: String::new(),
            search_results: Vec::new(),
            search_table: ResultTable::default(),
            result_index: 0,
            message: None,
            message_timeout,
            requests: RequestTracker::default(),
            events_tx,
            events_rx,
            should_quit: false,
        }
    }

    /// Whether any lookup is in flight
    pub fn is_busy(&self) -> bool {
        self.requests.any_pending()
    }

    /// Whether the lookup behind `tab` is in flight
    pub fn is_tab_busy(&self, tab: Tab) -> bool {
        self.requests.is_pending(tab.target())
    }

    pub fn is_loading_roles(&self) -> bool {
        self.requests.is_pending(LookupTarget::RoleList)
    }

    /// Result table for the active tab
    pub fn current_table(&self) -> &ResultTable {
        match self.tab {
            Tab::UserRoles => &self.user_roles,
            Tab::RoleUsers => &self.role_users,
            Tab::UserSearch => &self.search_table,
        }
    }

    /// Input field for the active tab, if it has one
    pub fn current_input(&self) -> Option<&str> {
        match self.tab {
            Tab::UserRoles => Some(&self.full_name_input),
            Tab::UserSearch => Some(&self.search_input),
            Tab::RoleUsers => None,
        }
    }

    fn current_input_mut(&mut self) -> Option<&mut String> {
        match self.tab {
            Tab::UserRoles => Some(&mut self.full_name_input),
            Tab::UserSearch => Some(&mut self.search_input),
            Tab::RoleUsers => None,
        }
    }

    pub fn selected_role(&self) -> Option<&RoleSummary> {
        self.roles.get(self.role_index)
    }

    pub fn set_info(&mut self, text: impl Into<String>) {
        self.set_message(text.into(), MessageKind::Info);
    }

    pub fn set_error(&mut self, text: impl Into<String>) {
        self.set_message(text.into(), MessageKind::Error);
    }

    fn set_message(&mut self, text: String, kind: MessageKind) {
        self.message = Some(StatusMessage {
            text,
            kind,
            shown_at: Instant::now(),
        });
    }

    /// Drop the status message once it has been shown long enough
    pub fn clear_expired_message(&mut self, now: Instant) {
        let expired = self
            .message
            .as_ref()
            .is_some_and(|m| now.duration_since(m.shown_at) >= self.message_timeout);
        if expired {
            self.message = None;
        }
    }

    /// Run `work` on a background task; its event comes back through the channel
    fn dispatch<F>(&mut self, target: LookupTarget, work: F)
    where
        F: Future<Output = LookupEvent> + Send + 'static,
    {
        let token = self.requests.issue(target);
        let tx = self.events_tx.clone();
        tracing::debug!("Dispatching {:?} lookup as {:?}", target, token);

        tokio::spawn(async move {
            let event = match tokio::spawn(work).await {
                Ok(event) => event,
                Err(e) => {
                    tracing::error!("Lookup task for {:?} failed: {}", target, e);
                    LookupEvent::Failed(target)
                }
            };
            // The receiver only goes away when the app shuts down
            let _ = tx.send((token, event));
        });
    }

    /// Load the role list for the Role Users tab
    pub fn load_roles(&mut self) {
        let lookup = self.lookup.clone();
        self.dispatch(LookupTarget::RoleList, async move {
            LookupEvent::RoleList(lookup.list_roles().await)
        });
    }

    /// Look up roles for the name in the User Roles input
    pub fn submit_user_roles(&mut self) {
        if self.is_tab_busy(Tab::UserRoles) {
            return;
        }
        let full_name = self.full_name_input.trim().to_string();
        if full_name.is_empty() {
            self.set_error(LookupError::EmptyInput("the full name").to_string());
            return;
        }
        self.dispatch_user_roles(full_name);
    }

    fn dispatch_user_roles(&mut self, full_name: String) {
        let lookup = self.lookup.clone();
        self.dispatch(LookupTarget::UserRoles, async move {
            let result = lookup.user_roles(&full_name).await;
            LookupEvent::UserRoles(full_name, result)
        });
    }

    /// Look up users holding the selected role
    pub fn apply_selected_role(&mut self) {
        if self.is_tab_busy(Tab::RoleUsers) {
            return;
        }
        let Some(role) = self.selected_role().cloned() else {
            self.set_error("Please select a role.");
            return;
        };

        let lookup = self.lookup.clone();
        self.dispatch(LookupTarget::RoleUsers, async move {
            let result = lookup.role_users(&role).await;
            LookupEvent::RoleUsers(role.name, result)
        });
    }

    /// Search users by the substring in the User Search input
    pub fn submit_search(&mut self) {
        if self.is_tab_busy(Tab::UserSearch) {
            return;
        }
        let term = self.search_input.trim().to_string();
        if term.is_empty() {
            self.set_error(LookupError::EmptyInput("a search term").to_string());
            return;
        }

        let lookup = self.lookup.clone();
        self.dispatch(LookupTarget::UserSearch, async move {
            LookupEvent::UserSearch(lookup.search_users(&term).await)
        });
    }

    /// Jump from the highlighted search result to that user's roles.
    ///
    /// This supersedes any User Roles lookup still in flight.
    pub fn open_selected_search_result(&mut self) {
        let Some(user) = self.search_results.get(self.result_index) else {
            return;
        };
        let full_name = user.get_display_name();

        self.full_name_input = full_name.clone();
        self.tab = Tab::UserRoles;
        self.result_index = 0;
        self.dispatch_user_roles(full_name);
    }

    /// Apply every event that has arrived so far
    pub fn drain_events(&mut self) {
        while let Ok((token, event)) = self.events_rx.try_recv() {
            self.handle_event(token, event);
        }
    }

    /// Apply a finished lookup unless a newer one replaced it
    pub fn handle_event(&mut self, token: RequestToken, event: LookupEvent) {
        let target = event.target();
        if !self.requests.complete(target, token) {
            tracing::debug!("Discarding stale {:?} result {:?}", target, token);
            return;
        }

        match event {
            LookupEvent::RoleList(Ok(roles)) => {
                if roles.is_empty() {
                    self.set_info("No roles found.");
                }
                self.roles = roles;
                self.role_index = 0;
            }
            LookupEvent::UserRoles(full_name, Ok(outcome)) => {
                self.user_roles = ResultTable::from(outcome.rows.as_slice());
                self.user_roles_subject = Some(full_name);
                self.reset_cursor_for(Tab::UserRoles);
                self.set_info(outcome.message);
            }
            LookupEvent::RoleUsers(role_name, Ok(outcome)) => {
                self.role_users = ResultTable::from(outcome.rows.as_slice());
                self.role_users_subject = Some(role_name);
                self.reset_cursor_for(Tab::RoleUsers);
                self.set_info(outcome.message);
            }
            LookupEvent::UserSearch(Ok(outcome)) => {
                self.search_table = ResultTable::from(outcome.rows.as_slice());
                self.search_results = outcome.rows;
                self.reset_cursor_for(Tab::UserSearch);
                self.set_info(outcome.message);
            }
            LookupEvent::RoleList(Err(e))
            | LookupEvent::UserRoles(_, Err(e))
            | LookupEvent::RoleUsers(_, Err(e))
            | LookupEvent::UserSearch(Err(e)) => {
                tracing::warn!("{:?} lookup failed: {}", target, e);
                self.set_error(e.to_string());
            }
            LookupEvent::Failed(_) => self.set_error(FETCH_FAILED),
        }
    }

    #[cfg(test)]
    async fn wait_for_event(&mut self) {
        if let Some((token, event)) = self.events_rx.recv().await {
            self.handle_event(token, event);
        }
    }

    fn reset_cursor_for(&mut self, tab: Tab) {
        if self.tab == tab {
            self.result_index = 0;
        }
    }

    /// Start typing into the active tab's input
    pub fn start_editing(&mut self) {
        if self.tab.has_input() {
            self.input_mode = InputMode::Editing;
        }
    }

    pub fn input_push(&mut self, c: char) {
        if let Some(input) = self.current_input_mut() {
            input.push(c);
        }
    }

    pub fn input_pop(&mut self) {
        if let Some(input) = self.current_input_mut() {
            input.pop();
        }
    }

    /// Submit the active tab's input or selection
    pub fn submit(&mut self) {
        match self.tab {
            Tab::UserRoles => self.submit_user_roles(),
            Tab::RoleUsers => self.apply_selected_role(),
            Tab::UserSearch => self.submit_search(),
        }
    }

    pub fn navigate_up(&mut self) {
        match self.tab {
            Tab::RoleUsers => {
                if self.role_index > 0 {
                    self.role_index -= 1;
                }
            }
            _ => {
                if self.result_index > 0 {
                    self.result_index -= 1;
                }
            }
        }
    }

    pub fn navigate_down(&mut self) {
        match self.tab {
            Tab::RoleUsers => {
                if !self.roles.is_empty() && self.role_index < self.roles.len() - 1 {
                    self.role_index += 1;
                }
            }
            _ => {
                let len = self.current_table().rows.len();
                if len > 0 && self.result_index < len - 1 {
                    self.result_index += 1;
                }
            }
        }
    }

    pub fn next_tab(&mut self) {
        self.tab = self.tab.next();
        self.result_index = 0;
    }

    pub fn prev_tab(&mut self) {
        self.tab = self.tab.prev();
        self.result_index = 0;
    }

    pub fn select_tab(&mut self, tab: Tab) {
        if self.tab != tab {
            self.tab = tab;
            self.result_index = 0;
        }
    }

    /// Export the active table under `exports/`
    pub fn export_current(&mut self, format: ExportFormat) {
        let table = self.current_table();
        if table.is_empty() {
            self.set_error("No results to export");
            return;
        }

        let name = match self.tab {
            Tab::UserRoles => "user_roles",
            Tab::RoleUsers => "role_users",
            Tab::UserSearch => "user_search",
        };
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let path_str = format!("exports/{}_{}.{}", name, timestamp, format.extension());
        let path = std::path::Path::new(&path_str);

        match export::export_results(table, format, path) {
            Ok(p) => self.set_info(format!("Exported to {}", p)),
            Err(e) => self.set_error(format!("Export failed: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{EntitySet, FetchXmlSource};
    use crate::models::{FetchQuery, SourceKind};
    use crate::origin::{EnvironmentOrigin, Origin};
    use async_trait::async_trait;
    use serde_json::{json, Value as JsonValue};

    /// Serves fixed responses keyed on the queried entity set and path
    struct FixtureSource;

    #[async_trait]
    impl FetchXmlSource for FixtureSource {
        async fn fetch(
            &self,
            _origin: &Origin,
            entity_set: EntitySet,
            query: &FetchQuery,
        ) -> Option<JsonValue> {
            let xml = query.to_xml();
            match entity_set {
                EntitySet::Roles if xml.contains("<order") => Some(json!({ "value": [
                    { "roleid": "r1", "name": "Basic User" },
                    { "roleid": "r2", "name": "Sales Manager" }
                ] })),
                EntitySet::Roles if xml.contains("teammembership") => Some(json!({ "value": [
                    { "name": "Sales Manager", "team.name": "EMEA" }
                ] })),
                EntitySet::Roles => Some(json!({ "value": [{ "name": "Sales Manager" }] })),
                EntitySet::SystemUsers if xml.contains("like") => Some(json!({ "value": [
                    { "systemuserid": "u1", "fullname": "Jane Doe" }
                ] })),
                EntitySet::SystemUsers => None,
            }
        }
    }

    fn app_for(url: &str) -> App {
        let lookup = RoleLookup::new(
            Arc::new(FixtureSource),
            Arc::new(EnvironmentOrigin::new(url)),
            ".dynamics.com",
        );
        App::new(
            Arc::new(lookup),
            url.to_string(),
            KeyBindings::Arrows,
            Duration::from_secs(5),
        )
    }

    fn app() -> App {
        app_for("https://org1.dynamics.com")
    }

    #[tokio::test]
    async fn test_user_roles_flow_fills_table() {
        let mut app = app();
        app.full_name_input = "Jane Doe".to_string();
        app.submit();
        assert!(app.is_tab_busy(Tab::UserRoles));

        app.wait_for_event().await;
        assert!(!app.is_busy());
        assert_eq!(app.user_roles.rows, vec![vec!["Sales Manager", "EMEA", "Direct & Team"]]);
        assert_eq!(app.user_roles.sources, vec![SourceKind::DirectAndTeam]);
        assert_eq!(app.user_roles_subject.as_deref(), Some("Jane Doe"));
        let message = app.message.as_ref().unwrap();
        assert_eq!(message.kind, MessageKind::Info);
        assert_eq!(message.text, "Found 1 role(s) for 'Jane Doe'.");
    }

    /// Fails if another lookup event shows up on the channel
    async fn assert_no_more_events(app: &mut App) {
        let next = tokio::time::timeout(Duration::from_millis(200), app.events_rx.recv()).await;
        assert!(next.is_err(), "unexpected extra lookup event");
    }

    #[tokio::test]
    async fn test_user_roles_resubmit_while_pending_is_ignored() {
        let mut app = app();
        app.full_name_input = "Jane Doe".to_string();
        app.submit();
        app.full_name_input = "John Doe".to_string();
        app.submit();
        assert!(app.is_tab_busy(Tab::UserRoles));

        app.wait_for_event().await;
        assert!(!app.is_tab_busy(Tab::UserRoles));
        assert_eq!(app.user_roles_subject.as_deref(), Some("Jane Doe"));
        assert_no_more_events(&mut app).await;
    }

    #[tokio::test]
    async fn test_role_users_and_search_resubmit_while_pending_is_ignored() {
        let mut app = app();
        app.load_roles();
        app.wait_for_event().await;

        app.select_tab(Tab::RoleUsers);
        app.submit();
        app.navigate_down();
        app.submit();
        assert!(app.is_tab_busy(Tab::RoleUsers));
        app.wait_for_event().await;
        assert_eq!(app.role_users_subject.as_deref(), Some("Basic User"));
        assert_no_more_events(&mut app).await;

        app.select_tab(Tab::UserSearch);
        app.search_input = "jan".to_string();
        app.submit();
        app.submit_search();
        app.wait_for_event().await;
        assert!(!app.is_busy());
        assert_eq!(app.search_results.len(), 1);
        assert_no_more_events(&mut app).await;
    }

    #[tokio::test]
    async fn test_pending_tab_does_not_block_other_tabs() {
        let mut app = app();
        app.full_name_input = "Jane Doe".to_string();
        app.submit_user_roles();

        app.select_tab(Tab::UserSearch);
        app.search_input = "jan".to_string();
        app.submit();
        assert!(app.is_tab_busy(Tab::UserRoles));
        assert!(app.is_tab_busy(Tab::UserSearch));

        app.wait_for_event().await;
        app.wait_for_event().await;
        assert!(!app.is_busy());
        assert_eq!(app.user_roles_subject.as_deref(), Some("Jane Doe"));
        assert_eq!(app.search_results.len(), 1);
        assert_no_more_events(&mut app).await;
    }

    #[tokio::test]
    async fn test_blank_name_is_rejected_without_request() {
        let mut app = app();
        app.full_name_input = "   ".to_string();
        app.submit_user_roles();

        assert!(!app.is_busy());
        let message = app.message.as_ref().unwrap();
        assert_eq!(message.kind, MessageKind::Error);
        assert_eq!(message.text, "Please enter the full name.");
    }

    #[tokio::test]
    async fn test_wrong_origin_is_reported_as_error() {
        let mut app = app_for("https://example.com");
        app.load_roles();
        app.wait_for_event().await;

        assert!(app.roles.is_empty());
        let message = app.message.as_ref().unwrap();
        assert_eq!(message.kind, MessageKind::Error);
        assert!(message.text.starts_with("Not on a Dataverse page."));
    }

    #[tokio::test]
    async fn test_role_users_with_failed_fetches_is_empty_not_error() {
        let mut app = app();
        app.load_roles();
        app.wait_for_event().await;
        assert_eq!(app.roles.len(), 2);

        app.select_tab(Tab::RoleUsers);
        app.navigate_down();
        assert_eq!(app.selected_role().unwrap().name, "Sales Manager");
        app.submit();
        app.wait_for_event().await;

        assert!(app.role_users.is_empty());
        let message = app.message.as_ref().unwrap();
        assert_eq!(message.kind, MessageKind::Info);
        assert_eq!(message.text, "No users found for role 'Sales Manager'.");
    }

    #[tokio::test]
    async fn test_search_then_jump_to_user_roles() {
        let mut app = app();
        app.select_tab(Tab::UserSearch);
        app.search_input = "jan".to_string();
        app.submit();
        app.wait_for_event().await;
        assert_eq!(app.search_results.len(), 1);

        app.open_selected_search_result();
        assert_eq!(app.tab, Tab::UserRoles);
        assert_eq!(app.full_name_input, "Jane Doe");
        app.wait_for_event().await;
        assert_eq!(app.user_roles.rows.len(), 1);
    }

    #[tokio::test]
    async fn test_stale_result_is_discarded() {
        let mut app = app();
        let stale = app.requests.issue(LookupTarget::UserRoles);
        let current = app.requests.issue(LookupTarget::UserRoles);

        let outcome = |name: &str| LookupOutcome {
            rows: vec![RoleAssignment {
                role_name: name.to_string(),
                team_name: "N/A".to_string(),
                source: SourceKind::Direct,
            }],
            message: format!("Found 1 role(s) for '{}'.", name),
        };

        app.handle_event(current, LookupEvent::UserRoles("B".to_string(), Ok(outcome("Role B"))));
        app.handle_event(stale, LookupEvent::UserRoles("A".to_string(), Ok(outcome("Role A"))));

        assert_eq!(app.user_roles_subject.as_deref(), Some("B"));
        assert_eq!(app.user_roles.rows[0][0], "Role B");
    }

    #[tokio::test]
    async fn test_failed_task_reports_generic_error() {
        let mut app = app();
        let token = app.requests.issue(LookupTarget::UserSearch);
        app.handle_event(token, LookupEvent::Failed(LookupTarget::UserSearch));

        let message = app.message.as_ref().unwrap();
        assert_eq!(message.kind, MessageKind::Error);
        assert_eq!(message.text, FETCH_FAILED);
    }

    #[tokio::test]
    async fn test_message_expires_after_timeout() {
        let mut app = app();
        app.set_info("hello");
        let shown_at = app.message.as_ref().unwrap().shown_at;

        app.clear_expired_message(shown_at + Duration::from_secs(4));
        assert!(app.message.is_some());
        app.clear_expired_message(shown_at + Duration::from_secs(5));
        assert!(app.message.is_none());
    }

    #[tokio::test]
    async fn test_editing_only_on_tabs_with_input() {
        let mut app = app();
        app.select_tab(Tab::RoleUsers);
        app.start_editing();
        assert_eq!(app.input_mode, InputMode::Normal);

        app.select_tab(Tab::UserSearch);
        app.start_editing();
        assert_eq!(app.input_mode, InputMode::Editing);
        app.input_push('a');
        app.input_push('b');
        app.input_pop();
        assert_eq!(app.search_input, "a");
        assert_eq!(app.full_name_input, "");
    }
}
