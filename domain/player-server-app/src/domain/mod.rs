pub mod player;
pub mod progression;
pub mod query;
pub mod validation;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(pub i64);

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug)]
pub enum RepoError {
    StorageError(String),
}

impl std::fmt::Display for RepoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepoError::StorageError(e) => write!(f, "Storage error: {}", e),
        }
    }
}

#[derive(Debug)]
pub enum RepoRetrieveError {
    NotFound,
    StorageError(String),
}

impl std::fmt::Display for RepoRetrieveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepoRetrieveError::NotFound => write!(f, "Resource not found"),
            RepoRetrieveError::StorageError(e) => write!(f, "Storage error: {}", e),
        }
    }
}

/// Outcome of a read-modify-write. `Rejected` carries the error returned by the
/// update closure; nothing is written in that case.
#[derive(Debug)]
pub enum RepoUpdateError<R> {
    NotFound,
    Rejected(R),
    StorageError(String),
}

impl<R: std::fmt::Display> std::fmt::Display for RepoUpdateError<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepoUpdateError::NotFound => write!(f, "Resource not found"),
            RepoUpdateError::Rejected(e) => write!(f, "Update rejected: {}", e),
            RepoUpdateError::StorageError(e) => write!(f, "Storage error: {}", e),
        }
    }
}

#[derive(Debug)]
pub enum RepoDeleteError {
    NotFound,
    StorageError(String),
}

impl std::fmt::Display for RepoDeleteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepoDeleteError::NotFound => write!(f, "Resource not found"),
            RepoDeleteError::StorageError(e) => write!(f, "Storage error: {}", e),
        }
    }
}
