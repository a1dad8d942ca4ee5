//! Core domain logic for Mementoria.
//! This crate is the single source of truth for scrapbook invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{
    default_log_level, init_logging, init_stderr_logging, logging_status, LogSink,
};
pub use model::scrapbook::{
    Item, ItemId, ItemKind, Page, PageId, Position, Scrapbook, ScrapbookId,
    ScrapbookValidationError, DEFAULT_ITEM_POSITION, MAX_PAGES,
};
pub use repo::library::Library;
pub use repo::scrapbook_repo::SqliteScrapbookRepository;
pub use repo::{RepoError, RepoResult, ScrapbookRepository};
pub use service::editor_service::{
    EditorError, EditorResult, EditorService, FlipDirection, LibraryEntry, PageFlip, PageSummary,
    PAGE_FLIP_DURATION,
};
pub use service::media_registry::{is_media_locator, FileUpload, MediaRegistry};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
