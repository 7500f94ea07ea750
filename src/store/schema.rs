//! SQLite schema creation and forward migrations for the local cache.

use crate::store::{StoreError, StoreResult};
use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info};

/// Schema version the code expects.
///
/// History: v1 base tables, v2 tags and links, v3 full-text index with its
/// triggers and the performance indexes.
pub const SCHEMA_VERSION: i64 = 3;

// ===========================================
// Migration Registry
// ===========================================

/// One forward migration step.
#[derive(Debug, Clone)]
pub struct Migration {
    pub version: i64,
    pub description: &'static str,
    pub up: &'static str,
    /// Set when the step changes the shape of `notes` or the index built on it.
    pub reshapes_notes: bool,
}

impl Migration {
    const fn new(
        version: i64,
        description: &'static str,
        up: &'static str,
        reshapes_notes: bool,
    ) -> Self {
        Self {
            version,
            description,
            up,
            reshapes_notes,
        }
    }
}

/// Registry of all migrations in version order.
pub const MIGRATIONS: &[Migration] = &[
    Migration::new(
        1,
        "Base tables: notes and pending_ops",
        "CREATE TABLE IF NOT EXISTS notes (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL DEFAULT '',
            body TEXT NOT NULL DEFAULT '',
            updated_at INTEGER NOT NULL,
            deleted INTEGER NOT NULL DEFAULT 0
        );
        CREATE TABLE IF NOT EXISTS pending_ops (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            entity_id TEXT NOT NULL,
            kind TEXT NOT NULL CHECK (kind IN ('upsert_note', 'delete_note')),
            payload TEXT,
            created_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s', 'now') AS INTEGER) * 1000)
        );",
        true,
    ),
    Migration::new(
        2,
        "Tag and link relations",
        "CREATE TABLE IF NOT EXISTS note_tags (
            note_id TEXT NOT NULL,
            tag TEXT NOT NULL,
            PRIMARY KEY (note_id, tag)
        );
        CREATE TABLE IF NOT EXISTS note_links (
            source_id TEXT NOT NULL,
            target_title TEXT NOT NULL,
            target_id TEXT,
            PRIMARY KEY (source_id, target_title)
        );",
        false,
    ),
    Migration::new(
        3,
        "Full-text index and performance indexes",
        "CREATE VIRTUAL TABLE IF NOT EXISTS notes_fts USING fts5(
            id UNINDEXED,
            title,
            body
        );
        CREATE INDEX IF NOT EXISTS idx_notes_updated_live
            ON notes(updated_at DESC) WHERE deleted = 0;
        CREATE INDEX IF NOT EXISTS idx_note_tags_tag ON note_tags(tag);
        CREATE INDEX IF NOT EXISTS idx_note_links_target ON note_links(target_title);",
        true,
    ),
];

/// Full current-version schema, used for stores created from scratch.
const CURRENT_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS notes (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL DEFAULT '',
        body TEXT NOT NULL DEFAULT '',
        updated_at INTEGER NOT NULL,
        deleted INTEGER NOT NULL DEFAULT 0
    );

    CREATE TABLE IF NOT EXISTS pending_ops (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        entity_id TEXT NOT NULL,
        kind TEXT NOT NULL CHECK (kind IN ('upsert_note', 'delete_note')),
        payload TEXT,
        created_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s', 'now') AS INTEGER) * 1000)
    );

    CREATE TABLE IF NOT EXISTS note_tags (
        note_id TEXT NOT NULL,
        tag TEXT NOT NULL,
        PRIMARY KEY (note_id, tag)
    );

    CREATE TABLE IF NOT EXISTS note_links (
        source_id TEXT NOT NULL,
        target_title TEXT NOT NULL,
        target_id TEXT,
        PRIMARY KEY (source_id, target_title)
    );

    CREATE VIRTUAL TABLE IF NOT EXISTS notes_fts USING fts5(
        id UNINDEXED,
        title,
        body
    );

    CREATE INDEX IF NOT EXISTS idx_notes_updated_live
        ON notes(updated_at DESC) WHERE deleted = 0;
    CREATE INDEX IF NOT EXISTS idx_note_tags_tag ON note_tags(tag);
    CREATE INDEX IF NOT EXISTS idx_note_links_target ON note_links(target_title);
";

// ===========================================
// Search Index Triggers
// ===========================================

/// Hooks that mirror live notes into `notes_fts`.
///
/// The update hook always drops the old entry and re-adds it from the new
/// row when that row is live, which covers edits and transitions into and
/// out of the deleted state alike.
const SEARCH_TRIGGERS: &str = "
    DROP TRIGGER IF EXISTS notes_fts_insert;
    DROP TRIGGER IF EXISTS notes_fts_update;
    DROP TRIGGER IF EXISTS notes_fts_delete;

    CREATE TRIGGER notes_fts_insert AFTER INSERT ON notes
    WHEN NEW.deleted = 0 BEGIN
        INSERT INTO notes_fts(id, title, body) VALUES (NEW.id, NEW.title, NEW.body);
    END;

    CREATE TRIGGER notes_fts_update AFTER UPDATE ON notes BEGIN
        DELETE FROM notes_fts WHERE id = OLD.id;
        INSERT INTO notes_fts(id, title, body)
            SELECT NEW.id, NEW.title, NEW.body WHERE NEW.deleted = 0;
    END;

    CREATE TRIGGER notes_fts_delete AFTER DELETE ON notes BEGIN
        DELETE FROM notes_fts WHERE id = OLD.id;
    END;
";

const RESEED_SEARCH_INDEX: &str = "
    DELETE FROM notes_fts;
    INSERT INTO notes_fts(id, title, body)
        SELECT id, title, body FROM notes WHERE deleted = 0;
";

// ===========================================
// Entry Points
// ===========================================

/// Brings the store at `conn` to [`SCHEMA_VERSION`].
///
/// A brand-new store gets the current schema directly. An older store is
/// walked forward one step at a time, each step in its own transaction
/// together with its version record. Any failure is returned as
/// [`StoreError::Schema`] and must be treated as fatal.
pub fn migrate(conn: &mut Connection) -> StoreResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL
        );",
    )?;

    let current = detect_version(conn)?;
    debug!(current, target = SCHEMA_VERSION, "checking schema version");

    if current > SCHEMA_VERSION {
        return Err(StoreError::Schema {
            version: current,
            reason: format!(
                "store was written by a newer release (expected at most {})",
                SCHEMA_VERSION
            ),
        });
    }

    if current == 0 {
        return create_current_schema(conn);
    }

    let mut reshaped = false;
    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        apply_migration(conn, migration)?;
        reshaped |= migration.reshapes_notes;
    }

    if reshaped {
        run_schema_step(conn, SCHEMA_VERSION, "rebuilding search index", |tx| {
            tx.execute_batch(SEARCH_TRIGGERS)?;
            tx.execute_batch(RESEED_SEARCH_INDEX)
        })?;
        debug!("search triggers reinstalled and index reseeded");
    }

    Ok(())
}

/// Returns the recorded schema version, 0 for an empty store.
pub fn schema_version(conn: &Connection) -> StoreResult<i64> {
    let version: Option<i64> = conn
        .query_row("SELECT MAX(version) FROM schema_version", [], |row| {
            row.get(0)
        })
        .optional()?
        .flatten();
    Ok(version.unwrap_or(0))
}

/// Rebuilds the full-text index from the notes table.
///
/// Useful after corruption or bulk writes that bypassed the triggers.
pub fn rebuild_search_index(conn: &mut Connection) -> StoreResult<()> {
    let tx = conn.transaction()?;
    tx.execute_batch(RESEED_SEARCH_INDEX)?;
    tx.commit()?;
    debug!("search index reseeded");
    Ok(())
}

// ===========================================
// Internals
// ===========================================

fn detect_version(conn: &Connection) -> StoreResult<i64> {
    let recorded = schema_version(conn)?;
    if recorded > 0 {
        return Ok(recorded);
    }
    // Stores created before version tracking only ever had the base tables.
    if table_exists(conn, "notes")? {
        info!("unversioned store found, treating as version 1");
        return Ok(1);
    }
    Ok(0)
}

fn create_current_schema(conn: &mut Connection) -> StoreResult<()> {
    run_schema_step(conn, SCHEMA_VERSION, "creating schema", |tx| {
        tx.execute_batch(CURRENT_SCHEMA)?;
        tx.execute_batch(SEARCH_TRIGGERS)?;
        record_version(tx, SCHEMA_VERSION)
    })?;
    info!(version = SCHEMA_VERSION, "created store schema");
    Ok(())
}

fn apply_migration(conn: &mut Connection, migration: &Migration) -> StoreResult<()> {
    debug!(
        version = migration.version,
        description = migration.description,
        "applying migration"
    );
    run_schema_step(conn, migration.version, migration.description, |tx| {
        tx.execute_batch(migration.up)?;
        record_version(tx, migration.version)
    })?;
    info!(
        version = migration.version,
        description = migration.description,
        "applied migration"
    );
    Ok(())
}

/// Runs one schema step in its own transaction.
///
/// Every failure, the commit included, comes back as [`StoreError::Schema`].
fn run_schema_step<F>(conn: &mut Connection, version: i64, step: &str, f: F) -> StoreResult<()>
where
    F: FnOnce(&rusqlite::Transaction<'_>) -> rusqlite::Result<()>,
{
    let tx = conn
        .transaction()
        .map_err(|e| schema_error(version, step, e))?;
    f(&tx).map_err(|e| schema_error(version, step, e))?;
    tx.commit().map_err(|e| schema_error(version, step, e))
}

fn record_version(conn: &Connection, version: i64) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (?1, datetime('now'))",
        [version],
    )?;
    Ok(())
}

fn table_exists(conn: &Connection, name: &str) -> StoreResult<bool> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
        [name],
        |row| row.get(0),
    )?;
    Ok(exists)
}

fn schema_error(version: i64, step: &str, err: rusqlite::Error) -> StoreError {
    StoreError::Schema {
        version,
        reason: format!("{}: {}", step, err),
    }
}
