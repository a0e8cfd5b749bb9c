//! The formatting step and the file handles it works on

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::YamlfixConfig;
use crate::normalize::normalize_content;

/// A source to fix: standard input or a file opened for reading and writing.
#[derive(Debug)]
pub enum TargetFile {
    Stdin,
    File { path: PathBuf, handle: File },
}

impl TargetFile {
    /// Open `path` read-write so it can be fixed in place.
    pub fn open(path: &Path) -> io::Result<Self> {
        let handle = OpenOptions::new().read(true).write(true).open(path)?;
        Ok(TargetFile::File {
            path: path.to_path_buf(),
            handle,
        })
    }

    pub fn label(&self) -> String {
        match self {
            TargetFile::Stdin => "<stdin>".to_string(),
            TargetFile::File { path, .. } => path.display().to_string(),
        }
    }
}

/// What a formatter reports back.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FixOutcome {
    /// Fixed text for sources that cannot be written back (stdin)
    pub output: Option<String>,
    /// Whether any source needed changes
    pub changed: bool,
}

/// Rewrites sources according to a resolved configuration.
pub trait Formatter {
    /// Fix `files`; in `check` mode nothing is written back.
    fn fix_files(
        &self,
        files: &mut [TargetFile],
        check: bool,
        config: &YamlfixConfig,
    ) -> io::Result<FixOutcome>;
}

/// Built-in whitespace-level formatter.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextFormatter;

impl Formatter for TextFormatter {
    fn fix_files(
        &self,
        files: &mut [TargetFile],
        check: bool,
        config: &YamlfixConfig,
    ) -> io::Result<FixOutcome> {
        let mut outcome = FixOutcome::default();

        for file in files.iter_mut() {
            let label = file.label();
            let source = match file {
                TargetFile::Stdin => {
                    let mut source = String::new();
                    io::stdin().read_to_string(&mut source)?;
                    source
                }
                TargetFile::File { handle, .. } => {
                    let mut source = String::new();
                    handle.read_to_string(&mut source)?;
                    source
                }
            };

            let result = normalize_content(&source, config);
            if result.has_changes() {
                outcome.changed = true;
            }

            match file {
                TargetFile::Stdin => {
                    outcome.output = Some(result.content);
                }
                TargetFile::File { handle, .. } => {
                    if !result.has_changes() {
                        debug!(file = %label, "already well formatted");
                    } else if check {
                        info!(file = %label, "would be fixed");
                    } else {
                        rewrite(handle, &result.content)?;
                        info!(file = %label, "fixed");
                    }
                }
            }
        }

        Ok(outcome)
    }
}

fn rewrite(handle: &mut File, content: &str) -> io::Result<()> {
    handle.seek(SeekFrom::Start(0))?;
    handle.write_all(content.as_bytes())?;
    handle.set_len(content.len() as u64)?;
    handle.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_fix_rewrites_file_in_place() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.yaml");
        fs::write(&path, "\n\na: 1   \nb: 2\n\n\n\n").unwrap();

        let mut files = vec![TargetFile::open(&path).unwrap()];
        let outcome = TextFormatter
            .fix_files(&mut files, false, &YamlfixConfig::default())
            .unwrap();
        drop(files);

        assert!(outcome.changed);
        assert_eq!(outcome.output, None);
        assert_eq!(fs::read_to_string(&path).unwrap(), "---\na: 1\nb: 2\n");
    }

    #[test]
    fn test_check_does_not_write() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.yaml");
        fs::write(&path, "a: 1").unwrap();

        let mut files = vec![TargetFile::open(&path).unwrap()];
        let outcome = TextFormatter
            .fix_files(&mut files, true, &YamlfixConfig::default())
            .unwrap();

        assert!(outcome.changed);
        assert_eq!(fs::read_to_string(&path).unwrap(), "a: 1");
    }

    #[test]
    fn test_clean_file_reports_unchanged() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.yaml");
        fs::write(&path, "---\na: 1\n").unwrap();

        let mut files = vec![TargetFile::open(&path).unwrap()];
        let outcome = TextFormatter
            .fix_files(&mut files, true, &YamlfixConfig::default())
            .unwrap();

        assert!(!outcome.changed);
    }

    #[test]
    fn test_open_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let result = TargetFile::open(&dir.path().join("missing.yaml"));
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::NotFound);
    }
}
