//! Output redirection: locating the operator in a token sequence and opening its target.

use crate::lexer::Token;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// Stream of the spawned command that a redirection diverts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetStream {
    Stdout,
    Stderr,
}

/// Whether previous contents of the target file are discarded or kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectMode {
    Truncate,
    Append,
}

/// A redirection found on a command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectSpec {
    pub stream: TargetStream,
    pub mode: RedirectMode,
    pub filename: String,
    /// Position of the operator in the token sequence; everything before it is argv.
    pub operator_index: usize,
}

/// Errors raised while preparing a redirection target.
#[derive(Debug, thiserror::Error)]
pub enum RedirectError {
    #[error("{}: cannot write to directory", .0.display())]
    IsDirectory(PathBuf),
    #[error("{}: cannot create directory: {source}", .path.display())]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("{}: {source}", .path.display())]
    Open { path: PathBuf, source: io::Error },
}

/// Finds the first redirection operator in `tokens`.
///
/// Returns its index together with the diverted stream and the open mode.
/// Later operators, if any, are not considered.
pub fn find_redirection(tokens: &[Token]) -> Option<(usize, TargetStream, RedirectMode)> {
    tokens.iter().enumerate().find_map(|(idx, token)| match token {
        Token::Redirect(op) => Some((idx, op.stream(), op.mode())),
        Token::Word(_) => None,
    })
}

impl RedirectSpec {
    /// Resolves the target against `cwd`, creates missing parent directories and
    /// opens the file according to [`RedirectMode`].
    ///
    /// An existing directory at the target path is rejected before anything is
    /// created or modified.
    pub fn open(&self, cwd: &Path) -> Result<File, RedirectError> {
        let path = cwd.join(&self.filename);
        if path.is_dir() {
            return Err(RedirectError::IsDirectory(path));
        }

        if let Some(parent) = path.parent() {
            create_dir_all(parent).map_err(|source| RedirectError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut options = OpenOptions::new();
        match self.mode {
            RedirectMode::Truncate => options.write(true).create(true).truncate(true),
            RedirectMode::Append => options.append(true).create(true),
        };
        let file = options
            .open(&path)
            .map_err(|source| RedirectError::Open { path: path.clone(), source })?;
        tracing::debug!(path = %path.display(), mode = ?self.mode, "opened redirect target");
        Ok(file)
    }
}

#[cfg(unix)]
fn create_dir_all(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().recursive(true).mode(0o755).create(path)
}

#[cfg(not(unix))]
fn create_dir_all(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::split_into_tokens;
    use std::io::Write;

    fn spec(filename: &str, mode: RedirectMode) -> RedirectSpec {
        RedirectSpec {
            stream: TargetStream::Stdout,
            mode,
            filename: filename.to_string(),
            operator_index: 1,
        }
    }

    #[test]
    fn test_find_plain_truncate() {
        let tokens = split_into_tokens("ls -l > out.txt").unwrap();
        assert_eq!(
            find_redirection(&tokens),
            Some((2, TargetStream::Stdout, RedirectMode::Truncate))
        );
    }

    #[test]
    fn test_find_stdout_append() {
        let tokens = split_into_tokens("ls 1>> out.txt").unwrap();
        assert_eq!(
            find_redirection(&tokens),
            Some((1, TargetStream::Stdout, RedirectMode::Append))
        );
    }

    #[test]
    fn test_find_stderr_operators() {
        let tokens = split_into_tokens("cmd a 2> err").unwrap();
        assert_eq!(
            find_redirection(&tokens),
            Some((2, TargetStream::Stderr, RedirectMode::Truncate))
        );
        let tokens = split_into_tokens("cmd 2>> err").unwrap();
        assert_eq!(
            find_redirection(&tokens),
            Some((1, TargetStream::Stderr, RedirectMode::Append))
        );
    }

    #[test]
    fn test_only_first_operator_counts() {
        let tokens = split_into_tokens("cmd 2> a > b").unwrap();
        assert_eq!(
            find_redirection(&tokens),
            Some((1, TargetStream::Stderr, RedirectMode::Truncate))
        );
    }

    #[test]
    fn test_quoted_operator_is_not_a_redirection() {
        let tokens = split_into_tokens("echo '>' x").unwrap();
        assert_eq!(find_redirection(&tokens), None);
    }

    #[test]
    fn test_open_creates_parent_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let mut file = spec("x/y/out.txt", RedirectMode::Truncate)
            .open(tmp.path())
            .unwrap();
        writeln!(file, "hi").unwrap();
        drop(file);
        assert_eq!(fs::read_to_string(tmp.path().join("x/y/out.txt")).unwrap(), "hi\n");
    }

    #[test]
    fn test_truncate_discards_and_append_keeps() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("log");
        fs::write(&target, "old\n").unwrap();

        let mut file = spec("log", RedirectMode::Append).open(tmp.path()).unwrap();
        writeln!(file, "new").unwrap();
        drop(file);
        assert_eq!(fs::read_to_string(&target).unwrap(), "old\nnew\n");

        let mut file = spec("log", RedirectMode::Truncate).open(tmp.path()).unwrap();
        writeln!(file, "only").unwrap();
        drop(file);
        assert_eq!(fs::read_to_string(&target).unwrap(), "only\n");
    }

    #[test]
    fn test_absolute_filename_ignores_cwd() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("abs.txt");
        let redirect = spec(&target.to_string_lossy(), RedirectMode::Truncate);
        redirect.open(Path::new("/nonexistent/cwd")).unwrap();
        assert!(target.is_file());
    }

    #[test]
    fn test_directory_target_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir(tmp.path().join("dir")).unwrap();
        let err = spec("dir", RedirectMode::Truncate).open(tmp.path()).unwrap_err();
        assert!(matches!(err, RedirectError::IsDirectory(_)));
        assert!(err.to_string().ends_with("cannot write to directory"));
        assert_eq!(fs::read_dir(tmp.path().join("dir")).unwrap().count(), 0);
    }

    #[test]
    #[cfg(unix)]
    fn test_parent_is_a_file() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("plain"), "").unwrap();
        let err = spec("plain/out.txt", RedirectMode::Truncate)
            .open(tmp.path())
            .unwrap_err();
        assert!(matches!(err, RedirectError::CreateDir { .. }));
    }

    #[test]
    #[cfg(unix)]
    fn test_open_failure_with_existing_parent() {
        let tmp = tempfile::tempdir().unwrap();
        let link = tmp.path().join("dangling");
        std::os::unix::fs::symlink(tmp.path().join("missing/target"), &link).unwrap();

        let err = spec("dangling", RedirectMode::Append)
            .open(tmp.path())
            .unwrap_err();
        assert!(matches!(err, RedirectError::Open { ref path, .. } if *path == link));
        assert!(!tmp.path().join("missing").exists());
    }
}
