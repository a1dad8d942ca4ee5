//! Terminal client for a Mementoria library.
//!
//! # Responsibility
//! - Open (and migrate) a SQLite library file.
//! - Drive `EditorService` from one command per input line.
//! - Print the library or the open page after each command.

mod command;

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::time::Instant;

use command::{media_type_for, Command, HELP};
use log::{debug, error, info};
use mementoria_core::db::open_db;
use mementoria_core::{
    EditorService, FileUpload, ItemKind, ScrapbookRepository, SqliteScrapbookRepository,
    PAGE_FLIP_DURATION,
};

const DEFAULT_DB_PATH: &str = "mementoria.sqlite3";

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn main() {
    if let Err(err) = run() {
        eprintln!("mementoria: {err}");
        std::process::exit(1);
    }
}

fn run() -> CliResult<()> {
    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "warn".to_string());
    if let Err(err) = mementoria_core::init_stderr_logging(&level) {
        eprintln!("mementoria: logging disabled: {err}");
    }

    let db_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("MEMENTORIA_DB").ok())
        .unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
    let conn = open_db(&db_path)?;
    let repo = SqliteScrapbookRepository::try_new(&conn)?;
    let mut editor = EditorService::new(repo);
    info!("event=cli_start module=cli status=ok db_path={db_path}");

    println!("mementoria {} library={db_path}", mementoria_core::core_version());
    println!("type `help` for commands");
    print_library(&editor)?;

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("{}> ", prompt(&editor));
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;

        let command = match Command::parse(&line) {
            Ok(Command::Quit) => break,
            Ok(command) => command,
            Err(command::CommandError::Empty) => continue,
            Err(err) => {
                debug!("event=cli_parse module=cli status=rejected error={err}");
                println!("{err}");
                continue;
            }
        };

        // Storage failures end the command, not the session.
        if let Err(err) = execute(&mut editor, command) {
            println!("{}", report_failure(err.as_ref()));
        }
    }
    info!("event=cli_exit module=cli status=ok");
    Ok(())
}

/// Logs a failed command and returns the line shown to the user.
fn report_failure(err: &dyn std::error::Error) -> String {
    error!("event=cli_command module=cli status=error error={err}");
    format!("error: {err}")
}

fn prompt<R: ScrapbookRepository>(editor: &EditorService<R>) -> String {
    match editor.open_scrapbook_view() {
        Some(book) => format!(
            "{} [{}/{}]",
            book.title,
            editor.current_page_index() + 1,
            book.page_count()
        ),
        None => "library".to_string(),
    }
}

fn execute<R: ScrapbookRepository>(editor: &mut EditorService<R>, command: Command) -> CliResult<()> {
    match command {
        Command::New(title) => match editor.create_scrapbook(title)? {
            Some(_) => print_library(editor)?,
            None => println!("a scrapbook needs a title"),
        },
        Command::List => print_library(editor)?,
        Command::Open(n) => {
            let entries = editor.library_entries()?;
            let opened = match n.checked_sub(1).and_then(|index| entries.get(index)) {
                Some(entry) => editor.open_scrapbook(entry.id)?,
                None => false,
            };
            if opened {
                print_page(editor);
            } else {
                println!("no scrapbook #{n}");
            }
        }
        Command::Close => {
            editor.close_scrapbook();
            print_library(editor)?;
        }
        Command::Text(text) => {
            if editor.add_text_item(text)?.is_some() {
                print_page(editor);
            }
        }
        Command::File(path) => add_file(editor, &path)?,
        Command::Move { item, x, y } => {
            let item_id = editor
                .current_page()
                .and_then(|page| item.checked_sub(1).and_then(|i| page.items.get(i)))
                .map(|item| item.id);
            let moved = match item_id {
                Some(id) => editor.update_item_position(id, x, y)?,
                None => false,
            };
            if moved {
                print_page(editor);
            } else {
                println!("nothing moved");
            }
        }
        Command::Goto(number) => {
            editor.set_page_input(number);
            let flipped = editor.go_to_page_number(number)?;
            settle(editor, flipped);
        }
        Command::Next => {
            let flipped = editor.next_page()?;
            settle(editor, flipped);
        }
        Command::Prev => {
            let flipped = editor.previous_page()?;
            settle(editor, flipped);
        }
        Command::AddPage => {
            let flipped = editor.add_page()?;
            settle(editor, flipped);
        }
        Command::Pages => print_pages(editor),
        Command::Show => print_page(editor),
        Command::Help => println!("{HELP}"),
        Command::Quit => {}
    }
    Ok(())
}

fn add_file<R: ScrapbookRepository>(editor: &mut EditorService<R>, path: &Path) -> CliResult<()> {
    let bytes = std::fs::read(path)?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let upload = FileUpload::new(name, media_type_for(path), bytes);
    match editor.add_file_item(&upload)? {
        Some(_) => print_page(editor),
        None => println!("only image and audio files can be added to an open scrapbook"),
    }
    Ok(())
}

/// Waits out the flip animation, then commits it.
fn settle<R: ScrapbookRepository>(editor: &mut EditorService<R>, flipped: bool) {
    if !flipped {
        if editor.open_scrapbook_view().is_none() {
            println!("open a scrapbook first");
        }
        return;
    }
    std::thread::sleep(PAGE_FLIP_DURATION);
    if editor.poll_transition(Instant::now()).is_none() {
        editor.finish_transition();
    }
    print_page(editor);
}

fn print_library<R: ScrapbookRepository>(editor: &EditorService<R>) -> CliResult<()> {
    let entries = editor.library_entries()?;
    if entries.is_empty() {
        println!("library is empty; create a scrapbook with `new <title>`");
        return Ok(());
    }
    for (n, entry) in entries.iter().enumerate() {
        println!("{:>3}. {}  ({})", n + 1, entry.title, entry.page_label);
    }
    Ok(())
}

fn print_pages<R: ScrapbookRepository>(editor: &EditorService<R>) {
    let summaries = editor.page_summaries();
    if summaries.is_empty() {
        println!("open a scrapbook first");
        return;
    }
    for summary in summaries {
        let marker = if summary.is_current { '*' } else { ' ' };
        println!(
            "{marker}{:>3}. {}  [{} items]",
            summary.index + 1,
            summary.title,
            summary.item_count
        );
    }
}

fn print_page<R: ScrapbookRepository>(editor: &EditorService<R>) {
    let Some(page) = editor.current_page() else {
        println!("open a scrapbook first");
        return;
    };
    println!("-- {} --", page.title);
    if page.items.is_empty() {
        println!("   (empty page)");
    }
    for (n, item) in page.items.iter().enumerate() {
        let label = match item.kind {
            ItemKind::Text => format!("\"{}\"", item.content),
            ItemKind::Image | ItemKind::Audio => {
                let name = editor
                    .media()
                    .resolve(&item.content)
                    .map(|upload| upload.name.as_str())
                    .unwrap_or("unavailable");
                format!("{} {name}", item.kind)
            }
        };
        println!(
            "{:>3}. {label} @ ({}, {})",
            n + 1,
            item.position.x,
            item.position.y
        );
    }
}

#[cfg(test)]
mod tests {
    use super::report_failure;
    use log::{Level, LevelFilter, Log, Metadata, Record};
    use std::sync::Mutex;

    struct CaptureLogger {
        lines: Mutex<Vec<String>>,
    }

    impl Log for CaptureLogger {
        fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
            true
        }

        fn log(&self, record: &Record<'_>) {
            if record.level() == Level::Error {
                self.lines.lock().unwrap().push(record.args().to_string());
            }
        }

        fn flush(&self) {}
    }

    static CAPTURE: CaptureLogger = CaptureLogger {
        lines: Mutex::new(Vec::new()),
    };

    #[test]
    fn command_failures_are_logged_and_reported() {
        log::set_logger(&CAPTURE).unwrap();
        log::set_max_level(LevelFilter::Debug);

        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "beach.png missing");
        assert_eq!(report_failure(&err), "error: beach.png missing");

        let lines = CAPTURE.lines.lock().unwrap();
        assert_eq!(
            lines.as_slice(),
            ["event=cli_command module=cli status=error error=beach.png missing"]
        );
    }
}
