//! Scrapbook, page and item records.
//!
//! # Responsibility
//! - Define the owned tree `Scrapbook -> Page -> Item`.
//! - Provide the growth helpers used by the editor (append page/item,
//!   extend to index, move item).
//!
//! # Invariants
//! - `Scrapbook::pages` is never empty.
//! - Item order inside a page is insertion order and doubles as z-order.
//! - Titles of new pages follow `Page N` with N the 1-based position.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type ScrapbookId = Uuid;
pub type PageId = Uuid;
pub type ItemId = Uuid;

/// Position assigned to freshly placed items.
pub const DEFAULT_ITEM_POSITION: Position = Position { x: 50.0, y: 50.0 };

/// Upper bound on pages per scrapbook; navigation never grows a book past it.
pub const MAX_PAGES: usize = 10_000;

/// Content category of a placed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Text,
    Image,
    Audio,
}

impl ItemKind {
    /// Stable lowercase name, shared by storage and wire formats.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Audio => "audio",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "text" => Some(Self::Text),
            "image" => Some(Self::Image),
            "audio" => Some(Self::Audio),
            _ => None,
        }
    }

    /// Classifies an uploaded file by its declared media type prefix.
    ///
    /// Returns `None` for anything that is neither `image/*` nor `audio/*`.
    /// The slash is required, so a bare `image` is not a media type.
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        let normalized = media_type.trim().to_ascii_lowercase();
        if normalized.starts_with("image/") {
            Some(Self::Image)
        } else if normalized.starts_with("audio/") {
            Some(Self::Audio)
        } else {
            None
        }
    }
}

impl Display for ItemKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-left offset of an item on its page, in page pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// One placed unit of content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    /// Serialized as `type` to match the client wire shape.
    #[serde(rename = "type")]
    pub kind: ItemKind,
    /// Text body for text items, resource locator for media items.
    pub content: String,
    #[serde(flatten)]
    pub position: Position,
}

impl Item {
    /// Creates an item with a generated id at the default position.
    pub fn new(kind: ItemKind, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            content: content.into(),
            position: DEFAULT_ITEM_POSITION,
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::new(ItemKind::Text, content)
    }
}

/// Ordered container of items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: PageId,
    pub title: String,
    pub items: Vec<Item>,
}

impl Page {
    /// Creates an empty page titled after its 1-based position.
    pub fn numbered(number: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: format!("Page {number}"),
            items: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Overwrites the position of one item.
    ///
    /// Returns `false` when no item has `id`.
    pub fn move_item(&mut self, id: ItemId, position: Position) -> bool {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.position = position;
                true
            }
            None => false,
        }
    }
}

/// Ordered collection of pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scrapbook {
    pub id: ScrapbookId,
    pub title: String,
    pub pages: Vec<Page>,
}

impl Scrapbook {
    /// Creates a scrapbook holding one empty `Page 1`.
    ///
    /// The caller is responsible for trimming/validating `title`.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            pages: vec![Page::numbered(1)],
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    pub fn page_mut(&mut self, index: usize) -> Option<&mut Page> {
        self.pages.get_mut(index)
    }

    /// Appends one empty page and returns its index.
    pub fn push_page(&mut self) -> usize {
        self.pages.push(Page::numbered(self.pages.len() + 1));
        self.pages.len() - 1
    }

    /// Appends empty pages until `index` is addressable.
    ///
    /// Returns the number of pages created. Callers bound `index` by
    /// `MAX_PAGES`; this method allocates whatever it is asked for.
    pub fn extend_to(&mut self, index: usize) -> usize {
        let before = self.pages.len();
        while self.pages.len() <= index {
            self.push_page();
        }
        self.pages.len() - before
    }

    /// Human label used by library listings: `1 page` / `N pages`.
    pub fn page_count_label(&self) -> String {
        match self.pages.len() {
            1 => "1 page".to_string(),
            count => format!("{count} pages"),
        }
    }

    /// Checks structural invariants before persistence.
    pub fn validate(&self) -> Result<(), ScrapbookValidationError> {
        if self.id.is_nil() {
            return Err(ScrapbookValidationError::NilId("scrapbook"));
        }
        if self.title.trim().is_empty() {
            return Err(ScrapbookValidationError::BlankTitle(self.id));
        }
        if self.pages.is_empty() {
            return Err(ScrapbookValidationError::NoPages(self.id));
        }
        for page in &self.pages {
            if page.id.is_nil() {
                return Err(ScrapbookValidationError::NilId("page"));
            }
            for item in &page.items {
                if item.id.is_nil() {
                    return Err(ScrapbookValidationError::NilId("item"));
                }
                if !item.position.is_finite() {
                    return Err(ScrapbookValidationError::NonFinitePosition(item.id));
                }
            }
        }
        Ok(())
    }
}

/// Structural validation failures for scrapbook trees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapbookValidationError {
    /// Entity (named by kind) carries the nil UUID.
    NilId(&'static str),
    BlankTitle(ScrapbookId),
    NoPages(ScrapbookId),
    NonFinitePosition(ItemId),
}

impl Display for ScrapbookValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId(entity) => write!(f, "{entity} id must not be nil"),
            Self::BlankTitle(id) => write!(f, "scrapbook title must not be blank: {id}"),
            Self::NoPages(id) => write!(f, "scrapbook must have at least one page: {id}"),
            Self::NonFinitePosition(id) => write!(f, "item position must be finite: {id}"),
        }
    }
}

impl Error for ScrapbookValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_scrapbook_has_one_empty_page() {
        let book = Scrapbook::new("Trip");
        assert_eq!(book.page_count(), 1);
        assert_eq!(book.pages[0].title, "Page 1");
        assert!(book.pages[0].is_empty());
        assert!(book.validate().is_ok());
    }

    #[test]
    fn extend_to_creates_numbered_pages_up_to_index() {
        let mut book = Scrapbook::new("Trip");
        assert_eq!(book.extend_to(2), 2);
        assert_eq!(book.page_count(), 3);
        assert_eq!(book.pages[2].title, "Page 3");
        assert_eq!(book.extend_to(1), 0);
    }

    #[test]
    fn media_type_classification() {
        assert_eq!(ItemKind::from_media_type("image/png"), Some(ItemKind::Image));
        assert_eq!(ItemKind::from_media_type("Audio/MPEG"), Some(ItemKind::Audio));
        assert_eq!(ItemKind::from_media_type("text/plain"), None);
        assert_eq!(ItemKind::from_media_type("imagery"), None);
        assert_eq!(ItemKind::from_media_type("image"), None);
    }

    #[test]
    fn page_count_label_pluralizes() {
        let mut book = Scrapbook::new("Trip");
        assert_eq!(book.page_count_label(), "1 page");
        book.push_page();
        assert_eq!(book.page_count_label(), "2 pages");
    }

    #[test]
    fn validate_rejects_empty_page_list() {
        let mut book = Scrapbook::new("Trip");
        book.pages.clear();
        assert_eq!(
            book.validate(),
            Err(ScrapbookValidationError::NoPages(book.id))
        );
    }
}
