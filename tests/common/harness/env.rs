//! Isolated test environment with a temp store.

// Allow dead code since this is a test utility shared by several test binaries
#![allow(dead_code)]

use super::{CacheCommand, TestNote};
use duru_cache::domain::{NoteId, OpKind};
use duru_cache::store::{NoteRepository, Outbox, SqliteStore};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Isolated test environment with a temporary database and config home.
///
/// Everything lives in a temp directory that is cleaned up on drop. Notes
/// are seeded through the library API, then inspected through the CLI.
pub struct TestEnv {
    /// The temporary directory (kept for lifetime management)
    _temp_dir: TempDir,
    root: PathBuf,
}

impl TestEnv {
    /// Creates a new isolated test environment.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path().to_path_buf();
        Self {
            _temp_dir: temp_dir,
            root,
        }
    }

    /// Returns the root of the temp directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the path of the store database.
    pub fn db_path(&self) -> PathBuf {
        self.root.join("cache").join("notes.db")
    }

    /// Returns the directory used as HOME and XDG_CONFIG_HOME.
    pub fn home(&self) -> PathBuf {
        self.root.join("home")
    }

    /// Opens (creating if needed) the store.
    pub fn store(&self) -> SqliteStore {
        SqliteStore::open(&self.db_path()).expect("Failed to open store")
    }

    /// Adds a test note with its tags and links to the store.
    pub fn add_note(&self, test_note: &TestNote) -> NoteId {
        let mut store = self.store();
        let note = test_note.to_note();
        store.upsert_note(&note).expect("Failed to upsert note");
        store
            .replace_tags_for_note(note.id(), test_note.tags())
            .expect("Failed to write tags");
        store
            .replace_links_for_note(note.id(), test_note.links())
            .expect("Failed to write links");
        note.id().clone()
    }

    /// Appends an op to the outbox and returns its id.
    pub fn enqueue(&self, entity: &NoteId, kind: OpKind, payload: Option<&str>) -> i64 {
        self.store()
            .enqueue(entity, kind, payload)
            .expect("Failed to enqueue")
    }

    /// Creates a CacheCommand configured for this test environment.
    pub fn cmd(&self) -> CacheCommand {
        CacheCommand::new().home(&self.home()).db(&self.db_path())
    }

    /// Writes the user config file and returns its path.
    pub fn write_config(&self, content: &str) -> PathBuf {
        let dir = self.home().join("duru");
        std::fs::create_dir_all(&dir).expect("Failed to create config dir");
        let path = dir.join("config.toml");
        std::fs::write(&path, content).expect("Failed to write config");
        path
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_cleanup_on_drop() {
        let path = {
            let env = TestEnv::new();
            env.root().to_path_buf()
        };
        assert!(!path.exists(), "temp directory should be cleaned up on drop");
    }

    #[test]
    fn test_env_db_path_is_inside_root() {
        let env = TestEnv::new();
        assert!(env.db_path().starts_with(env.root()));
        assert!(env.db_path().ends_with("cache/notes.db"));
    }

    #[test]
    fn test_env_provides_command_with_db() {
        let env = TestEnv::new();
        let cmd = env.cmd();
        let args = cmd.get_args();
        assert_eq!(args[0], "--db");
        assert_eq!(args[1], env.db_path().to_string_lossy());
    }

    #[test]
    fn test_env_add_note_persists_relations() {
        let env = TestEnv::new();
        let id = env.add_note(&TestNote::new("Seeded").tag("home").link("Other"));

        let store = env.store();
        assert!(store.find_note(&id).unwrap().is_some());
        assert_eq!(store.tags_for_note(&id).unwrap().len(), 1);
        assert_eq!(store.links_for_note(&id).unwrap().len(), 1);
    }
}
