//! Data models for role and user lookups

pub mod fetch_xml;
mod merge;
mod odata;
pub mod queries;
mod table;
mod user;

pub use fetch_xml::FetchQuery;
pub use merge::merge;
pub use odata::ODataResponse;
pub use table::ResultTable;
pub use user::{
    RoleAssignment, RoleRow, RoleSummary, SourceKind, UserAssignment, UserRow, UserSummary,
};
