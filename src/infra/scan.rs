use crate::domain::{Journal, ingest_text};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("journal directory does not exist: {0}")]
    JournalDirMissing(String),

    #[error("failed to read journal directory: {0}")]
    ReadDir(String),

    #[error("failed to read journal file: {0}")]
    ReadFile(String),
}

#[derive(Debug, Error)]
pub enum ResolveJournalDirError {
    #[error("failed to resolve current directory: {0}")]
    CurrentDir(String),
}

/// Picks the journal directory: an explicit `--dir` argument wins, then the
/// `TRAIL_JOURNAL_DIR` environment variable, then the working directory.
pub fn resolve_journal_dir(explicit: Option<PathBuf>) -> Result<PathBuf, ResolveJournalDirError> {
    if let Some(dir) = explicit {
        return Ok(dir);
    }
    if let Some(dir) = std::env::var_os("TRAIL_JOURNAL_DIR") {
        return Ok(PathBuf::from(dir));
    }
    std::env::current_dir().map_err(|error| ResolveJournalDirError::CurrentDir(error.to_string()))
}

/// Builds the journal from every regular file directly inside `dir`.
/// Subdirectories are not recursed into. Any I/O failure aborts the whole
/// build; a partial model would be indistinguishable from an empty journal.
pub fn build_journal(dir: &Path) -> Result<Journal, ScanError> {
    if !dir.is_dir() {
        return Err(ScanError::JournalDirMissing(dir.display().to_string()));
    }

    let mut journal = Journal::default();

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .into_iter();
    for entry in walker {
        let entry =
            entry.map_err(|error| ScanError::ReadDir(format!("{}: {error}", dir.display())))?;
        if !entry.file_type().is_file() {
            continue;
        }
        ingest_file(entry.path(), &mut journal)?;
    }

    log::info!(
        "scanned {}: {} project(s)",
        dir.display(),
        journal.projects.len()
    );
    Ok(journal)
}

/// Reads one file and merges its contents into `journal`.
pub fn ingest_file(path: &Path, journal: &mut Journal) -> Result<(), ScanError> {
    let content = fs::read_to_string(path)
        .map_err(|error| ScanError::ReadFile(format!("{}: {error}", path.display())))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    ingest_text(&content, &file_name, journal);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use time::macros::date;

    #[test]
    fn builds_journal_from_directory_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("25-06-01.md"), "@proj +ui\n* did the thing\n")
            .expect("write file");
        fs::write(dir.path().join("25-06-02.md"), "@proj +ui\n* more\n").expect("write file");

        let journal = build_journal(dir.path()).expect("build");
        let task = journal.task("proj", "ui").expect("task exists");
        assert_eq!(task.entries.len(), 2);
    }

    #[test]
    fn subdirectories_are_not_recursed_into() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("25-06-01.md"), "@top +t\n* kept\n").expect("write file");
        let nested = dir.path().join("archive");
        fs::create_dir(&nested).expect("mkdir");
        fs::write(nested.join("25-06-01.md"), "@nested +t\n* ignored\n").expect("write file");

        let journal = build_journal(dir.path()).expect("build");
        assert!(journal.projects.contains_key("top"));
        assert!(!journal.projects.contains_key("nested"));
    }

    #[test]
    fn missing_directory_is_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let gone = dir.path().join("nope");
        assert!(matches!(
            build_journal(&gone),
            Err(ScanError::JournalDirMissing(_))
        ));
    }

    #[test]
    fn dateless_files_contribute_no_entries() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("README.md"), "@proj +ui\n* undated\n").expect("write file");

        let journal = build_journal(dir.path()).expect("build");
        let task = journal.task("proj", "ui").expect("task exists");
        assert!(task.entries.is_empty());
    }

    #[test]
    fn file_order_does_not_change_entry_dates() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("25-06-02.md"), "@p +t\n* b\n").expect("write file");
        fs::write(dir.path().join("25-06-01.md"), "@p +t\n* a\n").expect("write file");

        let journal = build_journal(dir.path()).expect("build");
        let task = journal.task("p", "t").expect("task exists");
        let sorted = task.entries_by_date_desc();
        assert_eq!(sorted[0].date, date!(2025 - 06 - 02));
        assert_eq!(sorted[1].date, date!(2025 - 06 - 01));
    }
}
