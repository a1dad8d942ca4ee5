//! Library store contracts and implementations.
//!
//! # Responsibility
//! - Define the `ScrapbookRepository` contract the editor works against.
//! - Provide an in-memory `Library` and a SQLite-backed store.
//!
//! # Invariants
//! - Writes must pass `Scrapbook::validate()` before they are stored.
//! - A save replaces the stored scrapbook as a whole.
//! - Listing order is creation order.

use crate::db::DbError;
use crate::model::scrapbook::{Scrapbook, ScrapbookId, ScrapbookValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod library;
pub mod scrapbook_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Store error shared by every repository implementation.
#[derive(Debug)]
pub enum RepoError {
    Validation(ScrapbookValidationError),
    Db(DbError),
    NotFound(ScrapbookId),
    /// `create_scrapbook` was called with an id already stored.
    AlreadyExists(ScrapbookId),
    /// Connection schema is not at the version this binary expects.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "scrapbook not found: {id}"),
            Self::AlreadyExists(id) => write!(f, "scrapbook already exists: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "scrapbook repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted scrapbook data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ScrapbookValidationError> for RepoError {
    fn from(value: ScrapbookValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for the scrapbook library.
pub trait ScrapbookRepository {
    /// Appends a new scrapbook to the library.
    fn create_scrapbook(&self, scrapbook: &Scrapbook) -> RepoResult<ScrapbookId>;
    /// Replaces a stored scrapbook with `scrapbook`.
    fn save_scrapbook(&self, scrapbook: &Scrapbook) -> RepoResult<()>;
    /// Loads one scrapbook with all pages and items.
    fn get_scrapbook(&self, id: ScrapbookId) -> RepoResult<Option<Scrapbook>>;
    /// Lists every scrapbook in creation order.
    fn list_scrapbooks(&self) -> RepoResult<Vec<Scrapbook>>;
}

impl<R: ScrapbookRepository + ?Sized> ScrapbookRepository for &R {
    fn create_scrapbook(&self, scrapbook: &Scrapbook) -> RepoResult<ScrapbookId> {
        (**self).create_scrapbook(scrapbook)
    }

    fn save_scrapbook(&self, scrapbook: &Scrapbook) -> RepoResult<()> {
        (**self).save_scrapbook(scrapbook)
    }

    fn get_scrapbook(&self, id: ScrapbookId) -> RepoResult<Option<Scrapbook>> {
        (**self).get_scrapbook(id)
    }

    fn list_scrapbooks(&self) -> RepoResult<Vec<Scrapbook>> {
        (**self).list_scrapbooks()
    }
}
