//! Ephemeral media references for uploaded files.
//!
//! # Responsibility
//! - Keep uploaded image/audio bytes for the lifetime of one session.
//! - Hand out opaque `blob:` locators that items store as content.
//!
//! # Invariants
//! - Locators are never reused, even after revocation.
//! - Nothing here is persisted; a locator stored in a durable library
//!   dangles once the owning process exits.

use std::collections::HashMap;
use uuid::Uuid;

const LOCATOR_PREFIX: &str = "blob:mementoria/";

/// A file picked by the user for embedding on a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    /// Original file name, kept for display only.
    pub name: String,
    /// Declared media type, e.g. `image/png`.
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }
}

/// Session-local store backing `blob:` locators.
#[derive(Debug, Default)]
pub struct MediaRegistry {
    entries: HashMap<String, FileUpload>,
}

impl MediaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a copy of `upload` and returns its locator.
    pub fn register(&mut self, upload: &FileUpload) -> String {
        let locator = format!("{LOCATOR_PREFIX}{}", Uuid::new_v4());
        self.entries.insert(locator.clone(), upload.clone());
        locator
    }

    pub fn resolve(&self, locator: &str) -> Option<&FileUpload> {
        self.entries.get(locator)
    }

    /// Drops the bytes behind `locator`. Returns whether it was registered.
    pub fn revoke(&mut self, locator: &str) -> bool {
        self.entries.remove(locator).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Whether `content` looks like a locator issued by a `MediaRegistry`.
pub fn is_media_locator(content: &str) -> bool {
    content.starts_with(LOCATOR_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::{is_media_locator, FileUpload, MediaRegistry};

    #[test]
    fn register_resolve_and_revoke() {
        let mut registry = MediaRegistry::new();
        let upload = FileUpload::new("beach.png", "image/png", vec![1, 2, 3]);

        let locator = registry.register(&upload);
        assert!(is_media_locator(&locator));
        assert_eq!(registry.resolve(&locator), Some(&upload));

        assert!(registry.revoke(&locator));
        assert!(registry.resolve(&locator).is_none());
        assert!(!registry.revoke(&locator));
    }

    #[test]
    fn locators_are_unique_per_registration() {
        let mut registry = MediaRegistry::new();
        let upload = FileUpload::new("song.mp3", "audio/mpeg", Vec::new());
        let first = registry.register(&upload);
        let second = registry.register(&upload);
        assert_ne!(first, second);
        assert_eq!(registry.len(), 2);
    }
}
