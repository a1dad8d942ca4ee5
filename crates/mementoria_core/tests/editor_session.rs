use mementoria_core::{
    EditorService, FileUpload, ItemKind, Library, Position, ScrapbookRepository,
    DEFAULT_ITEM_POSITION, MAX_PAGES, PAGE_FLIP_DURATION,
};
use std::time::Duration;
use uuid::Uuid;

fn open_session<'a>(library: &'a Library, title: &str) -> EditorService<&'a Library> {
    let mut editor = EditorService::new(library);
    let id = editor.create_scrapbook(title).unwrap().unwrap();
    assert!(editor.open_scrapbook(id).unwrap());
    editor
}

#[test]
fn blank_title_leaves_library_unchanged() {
    let library = Library::new();
    let mut editor = EditorService::new(&library);
    editor.set_title_draft("   ");

    assert_eq!(editor.create_scrapbook("").unwrap(), None);
    assert_eq!(editor.create_scrapbook(" \t\n").unwrap(), None);
    assert_eq!(editor.submit_title_draft().unwrap(), None);
    assert!(library.is_empty());
}

#[test]
fn created_scrapbook_has_one_empty_page_and_clears_draft() {
    let library = Library::new();
    let mut editor = EditorService::new(&library);
    editor.set_title_draft("  Trip  ");

    let id = editor.submit_title_draft().unwrap().unwrap();
    assert_eq!(editor.title_draft(), "");

    let stored = library.get_scrapbook(id).unwrap().unwrap();
    assert_eq!(stored.title, "Trip");
    assert_eq!(stored.page_count(), 1);
    assert!(stored.pages[0].items.is_empty());
}

#[test]
fn add_text_item_appends_exactly_one_item() {
    let library = Library::new();
    let mut editor = open_session(&library, "Trip");
    editor.set_text_draft("Hello");

    let item_id = editor.submit_text_draft().unwrap().unwrap();
    assert_eq!(editor.text_draft(), "");

    let page = editor.current_page().unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, item_id);
    assert_eq!(page.items[0].kind, ItemKind::Text);
    assert_eq!(page.items[0].content, "Hello");
    assert_eq!(page.items[0].position, DEFAULT_ITEM_POSITION);

    let stored = library.list_scrapbooks().unwrap();
    assert_eq!(stored[0].pages[0].items.len(), 1);
}

#[test]
fn text_item_requires_open_book_and_text() {
    let library = Library::new();
    let mut editor = EditorService::new(&library);
    editor.create_scrapbook("Trip").unwrap();
    assert_eq!(editor.add_text_item("Hello").unwrap(), None);

    let library = Library::new();
    let mut editor = open_session(&library, "Trip");
    editor.set_text_draft("  ");
    assert_eq!(editor.submit_text_draft().unwrap(), None);
    assert_eq!(editor.text_draft(), "  ");
    assert!(editor.current_page().unwrap().items.is_empty());
}

#[test]
fn file_items_are_classified_by_media_type() {
    let library = Library::new();
    let mut editor = open_session(&library, "Trip");

    let image = FileUpload::new("beach.png", "image/png", vec![0x89, 0x50]);
    let audio = FileUpload::new("waves.mp3", "audio/mpeg", vec![0xff, 0xfb]);
    let notes = FileUpload::new("notes.txt", "text/plain", b"hi".to_vec());

    let image_id = editor.add_file_item(&image).unwrap().unwrap();
    let audio_id = editor.add_file_item(&audio).unwrap().unwrap();
    assert_eq!(editor.add_file_item(&notes).unwrap(), None);

    let page = editor.current_page().unwrap();
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.item(image_id).unwrap().kind, ItemKind::Image);
    assert_eq!(page.item(audio_id).unwrap().kind, ItemKind::Audio);

    let locator = &page.item(image_id).unwrap().content;
    assert_eq!(editor.media().resolve(locator), Some(&image));
    assert_eq!(editor.media().len(), 2);
}

#[test]
fn update_item_position_moves_only_known_items() {
    let library = Library::new();
    let mut editor = open_session(&library, "Trip");
    let item_id = editor.add_text_item("Hello").unwrap().unwrap();

    assert!(!editor.update_item_position(Uuid::new_v4(), 10.0, 20.0).unwrap());
    assert_eq!(
        editor.current_page().unwrap().items[0].position,
        DEFAULT_ITEM_POSITION
    );

    assert!(!editor.update_item_position(item_id, f64::NAN, 1.0).unwrap());

    assert!(editor.update_item_position(item_id, 120.5, 80.0).unwrap());
    let stored = library.list_scrapbooks().unwrap();
    assert_eq!(
        stored[0].pages[0].items[0].position,
        Position::new(120.5, 80.0)
    );
}

#[test]
fn trip_scenario_extends_pages_on_forward_navigation() {
    let library = Library::new();
    let mut editor = EditorService::new(&library);
    let id = editor.create_scrapbook("Trip").unwrap().unwrap();

    let books = library.list_scrapbooks().unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].title, "Trip");
    assert_eq!(books[0].page_count(), 1);

    editor.open_scrapbook(id).unwrap();
    editor.add_text_item("Hello").unwrap();

    assert!(editor.navigate_to_page(2).unwrap());
    let book = library.get_scrapbook(id).unwrap().unwrap();
    assert_eq!(book.page_count(), 3);
    assert!(book.pages[1].items.is_empty());
    assert!(book.pages[2].items.is_empty());
    assert_eq!(book.pages[0].items[0].content, "Hello");

    assert_eq!(editor.current_page_index(), 0);
    assert_eq!(editor.finish_transition(), Some(2));
    assert_eq!(editor.current_page_index(), 2);
    assert_eq!(editor.page_input(), 3);
    assert!(editor.current_page().unwrap().items.is_empty());
}

#[test]
fn navigation_is_blocked_until_flip_deadline() {
    let library = Library::new();
    let mut editor = open_session(&library, "Trip");

    assert!(editor.navigate_to_page(1).unwrap());
    assert!(editor.is_flipping());
    assert!(!editor.navigate_to_page(3).unwrap());
    assert!(!editor.add_page().unwrap());
    assert!(!editor.next_page().unwrap());
    assert_eq!(editor.open_scrapbook_view().unwrap().page_count(), 2);

    let deadline = editor.page_flip().unwrap().deadline;
    assert_eq!(
        editor.poll_transition(deadline - Duration::from_millis(1)),
        None
    );
    assert!(editor.is_flipping());

    assert_eq!(editor.poll_transition(deadline), Some(1));
    assert!(!editor.is_flipping());
    assert_eq!(editor.current_page_index(), 1);
}

#[test]
fn navigation_past_page_limit_is_ignored() {
    let library = Library::new();
    let mut editor = open_session(&library, "Trip");

    assert!(!editor.navigate_to_page(usize::MAX).unwrap());
    assert!(!editor.navigate_to_page(MAX_PAGES).unwrap());
    assert!(!editor.go_to_page_number(usize::MAX).unwrap());
    assert!(!editor.is_flipping());
    assert_eq!(editor.open_scrapbook_view().unwrap().page_count(), 1);
    assert_eq!(editor.current_page_index(), 0);
    assert_eq!(editor.page_input(), 1);
}

#[test]
fn navigate_to_current_page_is_ignored() {
    let library = Library::new();
    let mut editor = open_session(&library, "Trip");
    assert!(!editor.navigate_to_page(0).unwrap());
    assert!(!editor.previous_page().unwrap());
    assert!(!editor.is_flipping());
}

#[test]
fn add_page_appends_and_flips_to_it() {
    let library = Library::new();
    let mut editor = open_session(&library, "Trip");

    assert!(editor.add_page().unwrap());
    let flip = *editor.page_flip().unwrap();
    assert_eq!(flip.target, 1);
    assert!(flip.deadline <= std::time::Instant::now() + PAGE_FLIP_DURATION);
    editor.finish_transition();

    let summaries = editor.page_summaries();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[1].title, "Page 2");
    assert!(summaries[1].is_current);
    assert_eq!(summaries[0].item_count, 0);
}

#[test]
fn next_and_previous_page() {
    let library = Library::new();
    let mut editor = open_session(&library, "Trip");

    assert!(editor.next_page().unwrap());
    editor.finish_transition();
    assert_eq!(editor.current_page_index(), 1);
    assert_eq!(editor.open_scrapbook_view().unwrap().page_count(), 2);

    assert!(editor.previous_page().unwrap());
    editor.finish_transition();
    assert_eq!(editor.current_page_index(), 0);
    assert_eq!(editor.open_scrapbook_view().unwrap().page_count(), 2);
}

#[test]
fn page_number_jump_is_clamped() {
    let library = Library::new();
    let mut editor = open_session(&library, "Trip");
    editor.add_page().unwrap();
    editor.finish_transition();
    editor.add_page().unwrap();
    editor.finish_transition();
    assert_eq!(editor.current_page_index(), 2);

    assert!(editor.go_to_page_number(0).unwrap());
    editor.finish_transition();
    assert_eq!(editor.current_page_index(), 0);

    assert!(editor.go_to_page_number(99).unwrap());
    editor.finish_transition();
    assert_eq!(editor.current_page_index(), 2);
    assert_eq!(editor.open_scrapbook_view().unwrap().page_count(), 3);
}

#[test]
fn items_are_added_to_the_current_page_only() {
    let library = Library::new();
    let mut editor = open_session(&library, "Trip");
    editor.add_page().unwrap();
    editor.finish_transition();

    let item_id = editor.add_text_item("second page").unwrap().unwrap();
    let book = editor.open_scrapbook_view().unwrap();
    assert!(book.pages[0].items.is_empty());
    assert_eq!(book.pages[1].items.len(), 1);

    editor.previous_page().unwrap();
    editor.finish_transition();
    assert!(!editor.update_item_position(item_id, 1.0, 1.0).unwrap());
}

#[test]
fn library_entries_and_reopen() {
    let library = Library::new();
    let mut editor = EditorService::new(&library);
    let first = editor.create_scrapbook("Trip").unwrap().unwrap();
    let second = editor.create_scrapbook("Birthday").unwrap().unwrap();

    editor.open_scrapbook(second).unwrap();
    editor.add_page().unwrap();
    editor.finish_transition();
    editor.close_scrapbook();
    assert!(editor.open_scrapbook_view().is_none());
    assert!(editor.page_summaries().is_empty());

    let entries = editor.library_entries().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].id, first);
    assert_eq!(entries[0].page_label, "1 page");
    assert_eq!(entries[1].title, "Birthday");
    assert_eq!(entries[1].page_label, "2 pages");

    assert!(editor.open_scrapbook(second).unwrap());
    assert_eq!(editor.current_page_index(), 0);
    assert_eq!(editor.page_input(), 1);
    assert!(!editor.open_scrapbook(Uuid::new_v4()).unwrap());
}
