use thiserror::Error;

/// Recoverable engine failures. None of these are fatal; callers retry with
/// corrected input.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("unknown destination: {0}")]
    InvalidSelection(String),
    #[error("search text must not be blank")]
    EmptyQuery,
    #[error("please log in first")]
    UnauthenticatedAction,
    #[error("name and email are required")]
    InvalidCredentials,
    #[error("invalid catalog data: {0}")]
    InvalidCatalog(String),
}
