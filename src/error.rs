//! Error types for role lookups

use thiserror::Error;

/// Result alias for lookup flows.
pub type LookupResult<T> = Result<T, LookupError>;

/// Failures a lookup flow reports to the user.
///
/// Transport and HTTP status failures are not part of this taxonomy: the
/// fetcher logs them and degrades to an empty result.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The active environment is not a trusted Dataverse host.
    #[error("Not on a Dataverse page. Please open your Dataverse instance. (host: {host})")]
    WrongOrigin { host: String },

    /// The environment URL could not be parsed at all.
    #[error("Invalid environment URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The user submitted a blank value.
    #[error("Please enter {0}.")]
    EmptyInput(&'static str),
}
