use anyhow::Result;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// One persisted query/command interaction. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: String,
    pub query: String,
    pub command: String,
    pub shell: String,
    pub is_explanation: bool,
}

/// Newest-first sequence of entries persisted as `history.json`.
///
/// Entries are only ever prepended or wholesale cleared. Like the config
/// store, there is no cross-process locking.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
    shell: String,
}

impl HistoryStore {
    pub fn new(dir: &Path, shell: &str) -> Self {
        Self {
            path: dir.join("history.json"),
            shell: shell.to_string(),
        }
    }

    fn load(&self) -> Vec<HistoryEntry> {
        match fs::read_to_string(&self.path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!(path = ?self.path, error = %e, "malformed history, starting empty");
                Vec::new()
            }),
            Err(_) => Vec::new(),
        }
    }

    fn save(&self, entries: &[HistoryEntry]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(entries)?)?;
        Ok(())
    }

    /// Prepends a new entry stamped with the current time and the shell the
    /// store was opened with. Newest entries live at index 0.
    pub fn add(&self, query: &str, command: &str, is_explanation: bool) -> Result<()> {
        let mut entries = self.load();
        entries.insert(
            0,
            HistoryEntry {
                timestamp: Local::now().to_rfc3339(),
                query: query.to_string(),
                command: command.to_string(),
                shell: self.shell.clone(),
                is_explanation,
            },
        );
        self.save(&entries)
    }

    /// Most recent generated command, skipping explanation-only entries.
    pub fn get_last(&self) -> Option<HistoryEntry> {
        self.load().into_iter().find(|entry| !entry.is_explanation)
    }

    pub fn get_last_command(&self) -> Option<String> {
        self.get_last().map(|entry| entry.command)
    }

    /// The `limit` most recent entries, newest first.
    pub fn get_all(&self, limit: usize) -> Vec<HistoryEntry> {
        self.load().into_iter().take(limit).collect()
    }

    pub fn clear(&self) -> Result<()> {
        self.save(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn store(dir: &tempfile::TempDir) -> HistoryStore {
        HistoryStore::new(dir.path(), "bash")
    }

    #[test]
    fn empty_store_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let history = store(&dir);

        assert!(history.get_all(10).is_empty());
        assert!(history.get_last().is_none());
    }

    #[test]
    fn add_prepends_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let history = store(&dir);

        history.add("list files", "ls -la", false).unwrap();
        history.add("disk usage", "du -sh .", false).unwrap();

        let entries = history.get_all(10);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].command, "du -sh .");
        assert_eq!(entries[1].command, "ls -la");
        assert_eq!(entries[0].shell, "bash");
    }

    #[test]
    fn get_all_returns_most_recent_first() {
        let dir = tempfile::tempdir().unwrap();
        let history = store(&dir);

        for i in 0..5 {
            history
                .add(&format!("query {}", i), &format!("cmd-{}", i), false)
                .unwrap();
        }

        // limit smaller than the store size must keep the newest entries
        let entries = history.get_all(3);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].command, "cmd-4");
        assert_eq!(entries[1].command, "cmd-3");
        assert_eq!(entries[2].command, "cmd-2");

        // limit larger than the store returns everything
        assert_eq!(history.get_all(100).len(), 5);
    }

    #[test]
    fn get_last_skips_explanation_entries() {
        let dir = tempfile::tempdir().unwrap();
        let history = store(&dir);

        history.add("list files", "ls -la", false).unwrap();
        history.add("tar -xzf foo.tar.gz", "", true).unwrap();
        history.add("du -sh", "", true).unwrap();

        let last = history.get_last().unwrap();
        assert_eq!(last.command, "ls -la");
        assert!(!last.is_explanation);
        assert_eq!(history.get_last_command().unwrap(), "ls -la");
    }

    #[test]
    fn get_last_is_none_for_explanations_only() {
        let dir = tempfile::tempdir().unwrap();
        let history = store(&dir);
        history.add("grep -r foo .", "", true).unwrap();

        assert!(history.get_last().is_none());
    }

    #[test]
    fn entries_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let history = store(&dir);
        history.add("count lines", "wc -l file.txt", false).unwrap();
        let written = history.get_all(1)[0].clone();

        // a fresh store over the same directory sees identical fields
        let reopened = HistoryStore::new(dir.path(), "zsh");
        let read_back = reopened.get_all(1)[0].clone();
        assert_eq!(written, read_back);
        assert_eq!(read_back.shell, "bash");
        assert!(!read_back.timestamp.is_empty());
    }

    #[test]
    fn clear_empties_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let history = store(&dir);
        history.add("list files", "ls", false).unwrap();

        history.clear().unwrap();
        assert!(history.get_all(10).is_empty());

        // the document on disk is a valid empty array, not missing
        let content = fs::read_to_string(dir.path().join("history.json")).unwrap();
        let parsed: Vec<HistoryEntry> = serde_json::from_str(&content).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn malformed_history_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("history.json"), "[{broken").unwrap();

        let history = store(&dir);
        assert!(history.get_all(10).is_empty());
    }
}
