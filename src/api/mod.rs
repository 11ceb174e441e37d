//! API module for Dataverse Web API interactions

mod client;
mod lookup;

pub use client::{DataverseClient, EntitySet, FetchXmlSource, DEFAULT_API_VERSION};
pub use lookup::{LookupOutcome, RoleLookup};
