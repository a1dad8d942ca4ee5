//! Command-line grammar for the editor loop.
//!
//! One command per line; the first word selects the command and the rest
//! of the line is its argument text.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const HELP: &str = "\
commands:
  new <title>          create a scrapbook
  list                 show the library
  open <n>             open the n-th scrapbook from `list`
  close                return to the library
  text <content>       add a text item to the current page
  file <path>          add an image or audio file to the current page
  move <n> <x> <y>     move the n-th item of the current page
  goto <page>          flip to a 1-based page number
  next | prev          flip one page forward or back
  addpage              append a page and flip to it
  pages                list pages of the open scrapbook
  show                 print the current page
  help                 this text
  quit                 leave";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    New(String),
    List,
    Open(usize),
    Close,
    Text(String),
    File(PathBuf),
    Move { item: usize, x: f64, y: f64 },
    Goto(usize),
    Next,
    Prev,
    AddPage,
    Pages,
    Show,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    Empty,
    Unknown(String),
    Usage(&'static str),
}

impl Display for CommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty command"),
            Self::Unknown(word) => write!(f, "unknown command `{word}`; try `help`"),
            Self::Usage(usage) => write!(f, "usage: {usage}"),
        }
    }
}

impl Error for CommandError {}

impl Command {
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word.to_ascii_lowercase().as_str() {
            "" => Err(CommandError::Empty),
            // Blank text is passed through; the editor ignores it.
            "new" => Ok(Self::New(rest.to_string())),
            "list" | "ls" => Ok(Self::List),
            "open" => number(rest, "open <n>").map(Self::Open),
            "close" => Ok(Self::Close),
            "text" => Ok(Self::Text(rest.to_string())),
            "file" if !rest.is_empty() => Ok(Self::File(PathBuf::from(rest))),
            "file" => Err(CommandError::Usage("file <path>")),
            "move" => parse_move(rest),
            "goto" => number(rest, "goto <page>").map(Self::Goto),
            "next" | "n" => Ok(Self::Next),
            "prev" | "p" => Ok(Self::Prev),
            "addpage" => Ok(Self::AddPage),
            "pages" => Ok(Self::Pages),
            "show" => Ok(Self::Show),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

fn number(raw: &str, usage: &'static str) -> Result<usize, CommandError> {
    raw.parse::<usize>().map_err(|_| CommandError::Usage(usage))
}

fn parse_move(rest: &str) -> Result<Command, CommandError> {
    const USAGE: &str = "move <n> <x> <y>";
    let parts: Vec<&str> = rest.split_whitespace().collect();
    let [item, x, y] = parts.as_slice() else {
        return Err(CommandError::Usage(USAGE));
    };
    let item = number(item, USAGE)?;
    let x = x.parse::<f64>().map_err(|_| CommandError::Usage(USAGE))?;
    let y = y.parse::<f64>().map_err(|_| CommandError::Usage(USAGE))?;
    Ok(Command::Move { item, x, y })
}

/// Guesses a media type from a file extension.
///
/// Unknown extensions map to `application/octet-stream`, which the editor
/// refuses to embed.
pub fn media_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("ogg" | "oga") => "audio/ogg",
        Some("m4a") => "audio/mp4",
        Some("flac") => "audio/flac",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_argument_text_verbatim() {
        assert_eq!(
            Command::parse("new   Summer Trip 2024 ").unwrap(),
            Command::New("Summer Trip 2024".to_string())
        );
        assert_eq!(
            Command::parse("text Hello, world").unwrap(),
            Command::Text("Hello, world".to_string())
        );
        assert_eq!(Command::parse("new").unwrap(), Command::New(String::new()));
    }

    #[test]
    fn parses_numeric_arguments() {
        assert_eq!(Command::parse("open 2").unwrap(), Command::Open(2));
        assert_eq!(Command::parse("GOTO 5").unwrap(), Command::Goto(5));
        assert_eq!(
            Command::parse("move 1 120.5 -4").unwrap(),
            Command::Move {
                item: 1,
                x: 120.5,
                y: -4.0
            }
        );
    }

    #[test]
    fn rejects_malformed_lines() {
        assert_eq!(Command::parse("   "), Err(CommandError::Empty));
        assert_eq!(
            Command::parse("goto two"),
            Err(CommandError::Usage("goto <page>"))
        );
        assert_eq!(
            Command::parse("move 1 2"),
            Err(CommandError::Usage("move <n> <x> <y>"))
        );
        assert_eq!(Command::parse("file"), Err(CommandError::Usage("file <path>")));
        assert!(matches!(
            Command::parse("delete 1"),
            Err(CommandError::Unknown(word)) if word == "delete"
        ));
    }

    #[test]
    fn media_type_follows_extension() {
        assert_eq!(media_type_for(Path::new("beach.JPG")), "image/jpeg");
        assert_eq!(media_type_for(Path::new("waves.mp3")), "audio/mpeg");
        assert_eq!(
            media_type_for(Path::new("notes.txt")),
            "application/octet-stream"
        );
        assert_eq!(media_type_for(Path::new("README")), "application/octet-stream");
    }
}
