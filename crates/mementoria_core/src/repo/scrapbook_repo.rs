//! SQLite-backed scrapbook library.
//!
//! # Responsibility
//! - Persist the `scrapbooks -> pages -> items` tree.
//! - Keep SQL details inside the storage boundary.
//!
//! # Invariants
//! - Writes call `Scrapbook::validate()` before any SQL mutation.
//! - A save runs in one immediate transaction.
//! - Reads reject invalid persisted state instead of masking it.
//! - Pages and items are returned in `position ASC` order.

use crate::db::migrations::{current_user_version, latest_version};
use crate::model::scrapbook::{
    Item, ItemKind, Page, PageId, Position, Scrapbook, ScrapbookId,
};
use crate::repo::{RepoError, RepoResult, ScrapbookRepository};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use uuid::Uuid;

/// SQLite-backed scrapbook repository.
pub struct SqliteScrapbookRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteScrapbookRepository<'conn> {
    /// Creates a repository over a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let expected_version = latest_version();
        let actual_version = current_user_version(conn)?;
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }
}

impl ScrapbookRepository for SqliteScrapbookRepository<'_> {
    fn create_scrapbook(&self, scrapbook: &Scrapbook) -> RepoResult<ScrapbookId> {
        scrapbook.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let exists: i64 = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM scrapbooks WHERE scrapbook_uuid = ?1);",
            [scrapbook.id.to_string()],
            |row| row.get(0),
        )?;
        if exists == 1 {
            return Err(RepoError::AlreadyExists(scrapbook.id));
        }

        tx.execute(
            "INSERT INTO scrapbooks (scrapbook_uuid, title, library_order)
             VALUES (
                ?1,
                ?2,
                (SELECT COALESCE(MAX(library_order), -1) + 1 FROM scrapbooks)
             );",
            params![scrapbook.id.to_string(), scrapbook.title.as_str()],
        )?;
        write_pages(&tx, scrapbook)?;
        tx.commit()?;

        debug!(
            "event=scrapbook_create module=repo status=ok scrapbook_id={} pages={}",
            scrapbook.id,
            scrapbook.page_count()
        );
        Ok(scrapbook.id)
    }

    fn save_scrapbook(&self, scrapbook: &Scrapbook) -> RepoResult<()> {
        scrapbook.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE scrapbooks
             SET title = ?2,
                 updated_at = (CAST((julianday('now') - 2440587.5) * 86400000 AS INTEGER))
             WHERE scrapbook_uuid = ?1;",
            params![scrapbook.id.to_string(), scrapbook.title.as_str()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(scrapbook.id));
        }
        write_pages(&tx, scrapbook)?;
        tx.commit()?;
        Ok(())
    }

    fn get_scrapbook(&self, id: ScrapbookId) -> RepoResult<Option<Scrapbook>> {
        let title: Option<String> = self
            .conn
            .query_row(
                "SELECT title FROM scrapbooks WHERE scrapbook_uuid = ?1;",
                [id.to_string()],
                |row| row.get(0),
            )
            .optional()?;

        match title {
            Some(title) => Ok(Some(load_scrapbook(self.conn, id, title)?)),
            None => Ok(None),
        }
    }

    fn list_scrapbooks(&self) -> RepoResult<Vec<Scrapbook>> {
        let mut stmt = self.conn.prepare(
            "SELECT scrapbook_uuid, title
             FROM scrapbooks
             ORDER BY library_order ASC, created_at ASC, scrapbook_uuid ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut heads = Vec::new();
        while let Some(row) = rows.next()? {
            let id_text: String = row.get(0)?;
            heads.push((parse_uuid(&id_text, "scrapbooks.scrapbook_uuid")?, row.get(1)?));
        }

        heads
            .into_iter()
            .map(|(id, title)| load_scrapbook(self.conn, id, title))
            .collect()
    }
}

fn write_pages(conn: &Connection, scrapbook: &Scrapbook) -> RepoResult<()> {
    for (page_position, page) in scrapbook.pages.iter().enumerate() {
        conn.execute(
            "INSERT INTO pages (page_uuid, scrapbook_uuid, position, title)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (page_uuid) DO UPDATE SET
                position = excluded.position,
                title = excluded.title;",
            params![
                page.id.to_string(),
                scrapbook.id.to_string(),
                page_position as i64,
                page.title.as_str(),
            ],
        )?;

        for (item_position, item) in page.items.iter().enumerate() {
            conn.execute(
                "INSERT INTO items (item_uuid, page_uuid, position, kind, content, x, y)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT (item_uuid) DO UPDATE SET
                    position = excluded.position,
                    content = excluded.content,
                    x = excluded.x,
                    y = excluded.y;",
                params![
                    item.id.to_string(),
                    page.id.to_string(),
                    item_position as i64,
                    item.kind.as_str(),
                    item.content.as_str(),
                    item.position.x,
                    item.position.y,
                ],
            )?;
        }
    }
    Ok(())
}

fn load_scrapbook(conn: &Connection, id: ScrapbookId, title: String) -> RepoResult<Scrapbook> {
    let mut stmt = conn.prepare(
        "SELECT page_uuid, title
         FROM pages
         WHERE scrapbook_uuid = ?1
         ORDER BY position ASC;",
    )?;
    let mut rows = stmt.query([id.to_string()])?;
    let mut pages = Vec::new();
    while let Some(row) = rows.next()? {
        let page_text: String = row.get(0)?;
        let page_id = parse_uuid(&page_text, "pages.page_uuid")?;
        pages.push(Page {
            id: page_id,
            title: row.get(1)?,
            items: load_items(conn, page_id)?,
        });
    }

    let scrapbook = Scrapbook { id, title, pages };
    scrapbook.validate()?;
    Ok(scrapbook)
}

fn load_items(conn: &Connection, page_id: PageId) -> RepoResult<Vec<Item>> {
    let mut stmt = conn.prepare(
        "SELECT item_uuid, kind, content, x, y
         FROM items
         WHERE page_uuid = ?1
         ORDER BY position ASC;",
    )?;
    let mut rows = stmt.query([page_id.to_string()])?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        let id_text: String = row.get("item_uuid")?;
        let kind_text: String = row.get("kind")?;
        let kind = ItemKind::parse(&kind_text).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid item kind `{kind_text}` in items.kind"))
        })?;
        items.push(Item {
            id: parse_uuid(&id_text, "items.item_uuid")?,
            kind,
            content: row.get("content")?,
            position: Position::new(row.get("x")?, row.get("y")?),
        });
    }
    Ok(items)
}

fn parse_uuid(value: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}
