//! Scrapbook editor use-case service.
//!
//! # Responsibility
//! - Create scrapbooks, pages and items on behalf of one editing session.
//! - Track the open scrapbook, the current page and the page-flip transition.
//! - Write every mutation back to the library store as a whole scrapbook.
//!
//! # Invariants
//! - Invalid input (blank title/text, no open book, unknown item, unsupported
//!   media type, flip in progress) is a silent no-op: `Ok(None)`/`Ok(false)`.
//! - Store failures leave the open working copy untouched.
//! - At most one page flip is in flight; navigation is rejected meanwhile.
//! - `current_page_index()` always addresses an existing page of the open book.

use crate::model::scrapbook::{
    Item, ItemId, ItemKind, Page, Position, Scrapbook, ScrapbookId, MAX_PAGES,
};
use crate::repo::{RepoError, ScrapbookRepository};
use crate::service::media_registry::{FileUpload, MediaRegistry};
use log::{debug, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{Duration, Instant};

/// How long one page flip blocks further navigation.
pub const PAGE_FLIP_DURATION: Duration = Duration::from_millis(300);

pub type EditorResult<T> = Result<T, EditorError>;

/// Errors from editor operations.
///
/// Only store-level problems surface here; user input never fails hard.
#[derive(Debug)]
pub enum EditorError {
    Repo(RepoError),
    /// Working copy and cursor disagree (should be unreachable).
    InconsistentState(&'static str),
}

impl Display for EditorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent editor state: {details}"),
        }
    }
}

impl Error for EditorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::InconsistentState(_) => None,
        }
    }
}

impl From<RepoError> for EditorError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Which way a page flip turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipDirection {
    Forward,
    Backward,
}

impl FlipDirection {
    /// `+1` forward, `-1` backward; renderers use it to pick the flip side.
    pub fn sign(self) -> i8 {
        match self {
            Self::Forward => 1,
            Self::Backward => -1,
        }
    }
}

/// An in-flight page transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageFlip {
    pub from: usize,
    pub target: usize,
    pub direction: FlipDirection,
    /// The flip commits once the clock reaches this instant.
    pub deadline: Instant,
}

/// Thumbnail data for one page of the open scrapbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSummary {
    pub index: usize,
    pub title: String,
    pub item_count: usize,
    pub is_current: bool,
}

/// Listing data for one scrapbook in the library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryEntry {
    pub id: ScrapbookId,
    pub title: String,
    pub page_count: usize,
    /// `1 page` / `N pages`.
    pub page_label: String,
}

/// Editing session over one library store.
pub struct EditorService<R: ScrapbookRepository> {
    repo: R,
    media: MediaRegistry,
    open_book: Option<Scrapbook>,
    current_page: usize,
    page_input: usize,
    flip: Option<PageFlip>,
    last_direction: Option<FlipDirection>,
    title_draft: String,
    text_draft: String,
}

impl<R: ScrapbookRepository> EditorService<R> {
    /// Creates a session with nothing open.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            media: MediaRegistry::new(),
            open_book: None,
            current_page: 0,
            page_input: 1,
            flip: None,
            last_direction: None,
            title_draft: String::new(),
            text_draft: String::new(),
        }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn media(&self) -> &MediaRegistry {
        &self.media
    }

    // ----- drafts -------------------------------------------------------

    pub fn title_draft(&self) -> &str {
        &self.title_draft
    }

    pub fn set_title_draft(&mut self, value: impl Into<String>) {
        self.title_draft = value.into();
    }

    pub fn text_draft(&self) -> &str {
        &self.text_draft
    }

    pub fn set_text_draft(&mut self, value: impl Into<String>) {
        self.text_draft = value.into();
    }

    /// Creates a scrapbook from the pending title draft.
    pub fn submit_title_draft(&mut self) -> EditorResult<Option<ScrapbookId>> {
        let title = self.title_draft.clone();
        self.create_scrapbook(title)
    }

    /// Adds a text item from the pending text draft.
    pub fn submit_text_draft(&mut self) -> EditorResult<Option<ItemId>> {
        let text = self.text_draft.clone();
        self.add_text_item(text)
    }

    // ----- library ------------------------------------------------------

    /// Appends a new scrapbook holding one empty page.
    ///
    /// Blank titles are ignored. On success the title draft is cleared.
    pub fn create_scrapbook(&mut self, title: impl Into<String>) -> EditorResult<Option<ScrapbookId>> {
        let title = title.into();
        let trimmed = title.trim();
        if trimmed.is_empty() {
            debug!("event=scrapbook_create module=editor status=skipped reason=blank_title");
            return Ok(None);
        }

        let scrapbook = Scrapbook::new(trimmed);
        let id = self.repo.create_scrapbook(&scrapbook)?;
        self.title_draft.clear();
        info!("event=scrapbook_create module=editor status=ok scrapbook_id={id}");
        Ok(Some(id))
    }

    /// Lists the library for the shelf view.
    pub fn library_entries(&self) -> EditorResult<Vec<LibraryEntry>> {
        Ok(self
            .repo
            .list_scrapbooks()?
            .into_iter()
            .map(|book| LibraryEntry {
                id: book.id,
                page_count: book.page_count(),
                page_label: book.page_count_label(),
                title: book.title,
            })
            .collect())
    }

    /// Opens a scrapbook at its first page.
    ///
    /// Returns `false` when `id` is not in the library.
    pub fn open_scrapbook(&mut self, id: ScrapbookId) -> EditorResult<bool> {
        let Some(book) = self.repo.get_scrapbook(id)? else {
            debug!("event=scrapbook_open module=editor status=skipped reason=not_found scrapbook_id={id}");
            return Ok(false);
        };

        self.open_book = Some(book);
        self.current_page = 0;
        self.page_input = 1;
        self.flip = None;
        self.last_direction = None;
        info!("event=scrapbook_open module=editor status=ok scrapbook_id={id}");
        Ok(true)
    }

    pub fn close_scrapbook(&mut self) {
        if let Some(book) = self.open_book.take() {
            info!("event=scrapbook_close module=editor status=ok scrapbook_id={}", book.id);
        }
        self.current_page = 0;
        self.page_input = 1;
        self.flip = None;
        self.last_direction = None;
    }

    // ----- items --------------------------------------------------------

    /// Places a text item on the current page.
    ///
    /// Requires an open scrapbook and non-blank text. The content is kept as
    /// entered. On success the text draft is cleared.
    pub fn add_text_item(&mut self, text: impl Into<String>) -> EditorResult<Option<ItemId>> {
        let text = text.into();
        if self.open_book.is_none() {
            debug!("event=item_add module=editor status=skipped reason=no_open_book kind=text");
            return Ok(None);
        }
        if text.trim().is_empty() {
            debug!("event=item_add module=editor status=skipped reason=blank_text kind=text");
            return Ok(None);
        }

        let id = self.place_item(Item::text(text))?;
        self.text_draft.clear();
        Ok(Some(id))
    }

    /// Places an image or audio item on the current page.
    ///
    /// The file is classified by its media type prefix; anything other than
    /// `image/*` or `audio/*` is ignored.
    pub fn add_file_item(&mut self, upload: &FileUpload) -> EditorResult<Option<ItemId>> {
        if self.open_book.is_none() {
            debug!("event=item_add module=editor status=skipped reason=no_open_book kind=file");
            return Ok(None);
        }
        let Some(kind) = ItemKind::from_media_type(&upload.media_type) else {
            debug!("event=item_add module=editor status=skipped reason=unsupported_media_type");
            return Ok(None);
        };

        let locator = self.media.register(upload);
        match self.place_item(Item::new(kind, locator.clone())) {
            Ok(id) => Ok(Some(id)),
            Err(err) => {
                self.media.revoke(&locator);
                Err(err)
            }
        }
    }

    /// Moves an item of the current page to `(x, y)`.
    ///
    /// Returns `false` when nothing is open, the item is not on the current
    /// page, or a coordinate is not finite.
    pub fn update_item_position(&mut self, item_id: ItemId, x: f64, y: f64) -> EditorResult<bool> {
        let position = Position::new(x, y);
        if !position.is_finite() {
            debug!("event=item_move module=editor status=skipped reason=non_finite item_id={item_id}");
            return Ok(false);
        }
        let Some(open) = self.open_book.as_ref() else {
            return Ok(false);
        };

        let mut updated = open.clone();
        let page = updated
            .page_mut(self.current_page)
            .ok_or(EditorError::InconsistentState("current page out of range"))?;
        if !page.move_item(item_id, position) {
            debug!("event=item_move module=editor status=skipped reason=not_found item_id={item_id}");
            return Ok(false);
        }

        self.write_back(updated)?;
        Ok(true)
    }

    // ----- navigation ---------------------------------------------------

    /// Starts a flip to page `target`, growing the book when needed.
    ///
    /// Ignored while a flip is in flight, when `target` is already current
    /// or when `target` is not below `MAX_PAGES`.
    /// The new index becomes current once the flip completes.
    pub fn navigate_to_page(&mut self, target: usize) -> EditorResult<bool> {
        if self.flip.is_some() || target == self.current_page {
            return Ok(false);
        }
        if target >= MAX_PAGES {
            debug!("event=page_navigate module=editor status=skipped reason=page_limit target={target}");
            return Ok(false);
        }
        let Some(open) = self.open_book.as_ref() else {
            return Ok(false);
        };

        if target >= open.page_count() {
            let mut updated = open.clone();
            let created = updated.extend_to(target);
            self.write_back(updated)?;
            debug!("event=page_extend module=editor status=ok created={created} target={target}");
        }

        let direction = if target > self.current_page {
            FlipDirection::Forward
        } else {
            FlipDirection::Backward
        };
        self.flip = Some(PageFlip {
            from: self.current_page,
            target,
            direction,
            deadline: Instant::now() + PAGE_FLIP_DURATION,
        });
        self.last_direction = Some(direction);
        Ok(true)
    }

    /// Flips forward, appending a page when already on the last one.
    pub fn next_page(&mut self) -> EditorResult<bool> {
        if self.flip.is_some() || self.current_page + 1 >= MAX_PAGES {
            return Ok(false);
        }
        let Some(open) = self.open_book.as_ref() else {
            return Ok(false);
        };

        if self.current_page + 1 >= open.page_count() {
            let mut updated = open.clone();
            updated.push_page();
            self.write_back(updated)?;
        }
        self.navigate_to_page(self.current_page + 1)
    }

    /// Flips backward; does nothing on the first page.
    pub fn previous_page(&mut self) -> EditorResult<bool> {
        if self.flip.is_some() {
            return Ok(false);
        }
        self.navigate_to_page(self.current_page.saturating_sub(1))
    }

    /// Jumps to a 1-based page number, clamped into the existing pages.
    pub fn go_to_page_number(&mut self, number: usize) -> EditorResult<bool> {
        let Some(open) = self.open_book.as_ref() else {
            return Ok(false);
        };
        let clamped = number.clamp(1, open.page_count());
        self.navigate_to_page(clamped - 1)
    }

    /// Appends one empty page and flips to it.
    pub fn add_page(&mut self) -> EditorResult<bool> {
        if self.flip.is_some() {
            return Ok(false);
        }
        let Some(open) = self.open_book.as_ref() else {
            return Ok(false);
        };
        if open.page_count() >= MAX_PAGES {
            debug!("event=page_add module=editor status=skipped reason=page_limit");
            return Ok(false);
        }

        let mut updated = open.clone();
        let index = updated.push_page();
        self.write_back(updated)?;
        self.navigate_to_page(index)
    }

    /// Commits the in-flight flip if its deadline has passed at `now`.
    ///
    /// Returns the newly current page index when a flip was committed.
    pub fn poll_transition(&mut self, now: Instant) -> Option<usize> {
        match self.flip {
            Some(flip) if now >= flip.deadline => self.commit_flip(),
            _ => None,
        }
    }

    /// Commits the in-flight flip regardless of its deadline.
    pub fn finish_transition(&mut self) -> Option<usize> {
        self.commit_flip()
    }

    // ----- read model ---------------------------------------------------

    pub fn open_scrapbook_view(&self) -> Option<&Scrapbook> {
        self.open_book.as_ref()
    }

    pub fn current_page(&self) -> Option<&Page> {
        self.open_book
            .as_ref()
            .and_then(|book| book.page(self.current_page))
    }

    pub fn current_page_index(&self) -> usize {
        self.current_page
    }

    /// Value shown in the 1-based page-number box.
    pub fn page_input(&self) -> usize {
        self.page_input
    }

    pub fn set_page_input(&mut self, value: usize) {
        self.page_input = value;
    }

    pub fn is_flipping(&self) -> bool {
        self.flip.is_some()
    }

    pub fn page_flip(&self) -> Option<&PageFlip> {
        self.flip.as_ref()
    }

    /// Direction of the most recent flip since the book was opened.
    pub fn flip_direction(&self) -> Option<FlipDirection> {
        self.last_direction
    }

    /// Thumbnail strip for the open scrapbook; empty when nothing is open.
    pub fn page_summaries(&self) -> Vec<PageSummary> {
        let Some(book) = self.open_book.as_ref() else {
            return Vec::new();
        };
        book.pages
            .iter()
            .enumerate()
            .map(|(index, page)| PageSummary {
                index,
                title: page.title.clone(),
                item_count: page.items.len(),
                is_current: index == self.current_page,
            })
            .collect()
    }

    // ----- internals ----------------------------------------------------

    fn place_item(&mut self, item: Item) -> EditorResult<ItemId> {
        let open = self
            .open_book
            .as_ref()
            .ok_or(EditorError::InconsistentState("no open scrapbook"))?;
        let mut updated = open.clone();
        let page = updated
            .page_mut(self.current_page)
            .ok_or(EditorError::InconsistentState("current page out of range"))?;

        let (id, kind) = (item.id, item.kind);
        page.items.push(item);
        let item_count = page.items.len();
        self.write_back(updated)?;

        info!(
            "event=item_add module=editor status=ok kind={} item_id={} page_index={} page_items={}",
            kind, id, self.current_page, item_count
        );
        Ok(id)
    }

    /// Stores `updated` and makes it the open working copy.
    fn write_back(&mut self, updated: Scrapbook) -> EditorResult<()> {
        self.repo.save_scrapbook(&updated)?;
        self.open_book = Some(updated);
        Ok(())
    }

    fn commit_flip(&mut self) -> Option<usize> {
        let flip = self.flip.take()?;
        self.current_page = flip.target;
        self.page_input = flip.target + 1;
        debug!(
            "event=page_flip module=editor status=ok from={} to={} direction={}",
            flip.from,
            flip.target,
            flip.direction.sign()
        );
        Some(flip.target)
    }
}
