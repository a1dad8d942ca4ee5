//! Process-lifetime scrapbook library.
//!
//! Holds scrapbooks in memory only; contents are lost when the value is
//! dropped. Used by sessions that do not need durability and by tests.

use crate::model::scrapbook::{Scrapbook, ScrapbookId};
use crate::repo::{RepoError, RepoResult, ScrapbookRepository};
use std::cell::RefCell;

/// In-memory library keeping scrapbooks in creation order.
#[derive(Debug, Default)]
pub struct Library {
    books: RefCell<Vec<Scrapbook>>,
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.books.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.borrow().is_empty()
    }
}

impl ScrapbookRepository for Library {
    fn create_scrapbook(&self, scrapbook: &Scrapbook) -> RepoResult<ScrapbookId> {
        scrapbook.validate()?;
        let mut books = self.books.borrow_mut();
        if books.iter().any(|book| book.id == scrapbook.id) {
            return Err(RepoError::AlreadyExists(scrapbook.id));
        }
        books.push(scrapbook.clone());
        Ok(scrapbook.id)
    }

    fn save_scrapbook(&self, scrapbook: &Scrapbook) -> RepoResult<()> {
        scrapbook.validate()?;
        let mut books = self.books.borrow_mut();
        let slot = books
            .iter_mut()
            .find(|book| book.id == scrapbook.id)
            .ok_or(RepoError::NotFound(scrapbook.id))?;
        *slot = scrapbook.clone();
        Ok(())
    }

    fn get_scrapbook(&self, id: ScrapbookId) -> RepoResult<Option<Scrapbook>> {
        Ok(self.books.borrow().iter().find(|book| book.id == id).cloned())
    }

    fn list_scrapbooks(&self) -> RepoResult<Vec<Scrapbook>> {
        Ok(self.books.borrow().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::Library;
    use crate::model::scrapbook::Scrapbook;
    use crate::repo::{RepoError, ScrapbookRepository};

    #[test]
    fn save_replaces_whole_scrapbook() {
        let library = Library::new();
        let mut book = Scrapbook::new("Trip");
        library.create_scrapbook(&book).unwrap();

        book.push_page();
        library.save_scrapbook(&book).unwrap();

        let stored = library.get_scrapbook(book.id).unwrap().unwrap();
        assert_eq!(stored.page_count(), 2);
    }

    #[test]
    fn save_unknown_scrapbook_is_not_found() {
        let library = Library::new();
        let book = Scrapbook::new("Ghost");
        let err = library.save_scrapbook(&book).unwrap_err();
        assert!(matches!(err, RepoError::NotFound(id) if id == book.id));
    }

    #[test]
    fn duplicate_create_is_rejected() {
        let library = Library::new();
        let book = Scrapbook::new("Trip");
        library.create_scrapbook(&book).unwrap();
        assert!(matches!(
            library.create_scrapbook(&book),
            Err(RepoError::AlreadyExists(_))
        ));
        assert_eq!(library.len(), 1);
    }
}
