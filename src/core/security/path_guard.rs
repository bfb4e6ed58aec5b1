use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::config::SecurityConfig;

/// Errors that can occur while resolving a path.
///
/// `path` is always the string the caller passed in, never the path joined
/// onto the root, so the configured root is not echoed back.
#[derive(Debug, thiserror::Error)]
pub enum PathSecurityError {
    #[error("Path '{path}' is outside the allowed root directory")]
    OutsideRootDirectory { path: String },

    #[error("Symlink '{path}' points outside the allowed root directory")]
    SymlinkOutsideRoot { path: String },

    #[error("Symlinks are not allowed: '{path}'")]
    SymlinkNotAllowed { path: String },

    #[error("Path does not exist: '{path}'")]
    PathNotFound { path: String },

    #[error("Allowed root directory is not accessible: {}", .0.kind())]
    RootUnavailable(io::Error),

    #[error("IO error for path '{path}': {}", error.kind())]
    IoError { path: String, error: io::Error },
}

/// Resolves user-supplied paths against the security policy.
///
/// Resolution:
/// 1. Relative paths are joined onto the root, when one is configured
/// 2. The path must exist
/// 3. A symlink is refused outright when symlinks are disabled
/// 4. The canonical path must lie within the canonical root
#[derive(Debug, Clone, Default)]
pub struct PathGuard {
    root: Option<PathBuf>,
    allow_symlinks: bool,
}

impl PathGuard {
    pub fn new(root: Option<PathBuf>, allow_symlinks: bool) -> Self {
        Self {
            root,
            allow_symlinks,
        }
    }

    pub fn from_config(config: &SecurityConfig) -> Self {
        Self::new(config.root_path.clone(), config.allow_symlinks)
    }

    /// Resolve `input` to a canonical path that satisfies the policy.
    pub fn resolve(&self, input: &str) -> Result<PathBuf, PathSecurityError> {
        let path = match &self.root {
            Some(root) if Path::new(input).is_relative() => root.join(input),
            _ => PathBuf::from(input),
        };

        let metadata = path.symlink_metadata().map_err(|e| not_found_or_io(input, e))?;
        let is_symlink = metadata.file_type().is_symlink();
        if is_symlink && !self.allow_symlinks {
            return Err(PathSecurityError::SymlinkNotAllowed {
                path: input.to_string(),
            });
        }

        let canonical = path.canonicalize().map_err(|e| not_found_or_io(input, e))?;

        let Some(root) = &self.root else {
            return Ok(canonical);
        };
        let canonical_root = root
            .canonicalize()
            .map_err(PathSecurityError::RootUnavailable)?;

        if canonical.starts_with(&canonical_root) {
            debug!("Resolved {:?} to {:?}", input, canonical);
            Ok(canonical)
        } else if is_symlink {
            Err(PathSecurityError::SymlinkOutsideRoot {
                path: input.to_string(),
            })
        } else {
            Err(PathSecurityError::OutsideRootDirectory {
                path: input.to_string(),
            })
        }
    }
}

fn not_found_or_io(input: &str, error: io::Error) -> PathSecurityError {
    let path = input.to_string();
    if error.kind() == io::ErrorKind::NotFound {
        PathSecurityError::PathNotFound { path }
    } else {
        PathSecurityError::IoError { path, error }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn guard(root: &Path, allow_symlinks: bool) -> PathGuard {
        PathGuard::new(Some(root.to_path_buf()), allow_symlinks)
    }

    #[test]
    fn test_no_root_allows_existing_paths() {
        let temp_dir = TempDir::new().unwrap();
        let test_file = temp_dir.path().join("test.txt");
        fs::write(&test_file, "test").unwrap();

        let resolved = PathGuard::default()
            .resolve(test_file.to_str().unwrap())
            .unwrap();
        assert_eq!(resolved, test_file.canonicalize().unwrap());
    }

    #[test]
    fn test_relative_path_joined_onto_root() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("notes")).unwrap();
        fs::write(temp_dir.path().join("notes/a.txt"), "a").unwrap();

        let resolved = guard(temp_dir.path(), true).resolve("notes/a.txt").unwrap();
        assert!(resolved.ends_with("notes/a.txt"));
    }

    #[test]
    fn test_path_outside_root() {
        let root_dir = TempDir::new().unwrap();
        let outside_dir = TempDir::new().unwrap();
        let outside_file = outside_dir.path().join("outside.txt");
        fs::write(&outside_file, "test").unwrap();

        let result = guard(root_dir.path(), true).resolve(outside_file.to_str().unwrap());
        assert!(matches!(
            result,
            Err(PathSecurityError::OutsideRootDirectory { .. })
        ));
    }

    #[test]
    fn test_path_traversal_blocked() {
        let temp_dir = TempDir::new().unwrap();
        let subdir = temp_dir.path().join("subdir");
        fs::create_dir(&subdir).unwrap();
        fs::write(temp_dir.path().join("test.txt"), "test").unwrap();

        let result = guard(&subdir, true).resolve("../test.txt");
        assert!(matches!(
            result,
            Err(PathSecurityError::OutsideRootDirectory { .. })
        ));
    }

    #[test]
    fn test_nonexistent_path() {
        let temp_dir = TempDir::new().unwrap();
        let result = guard(temp_dir.path(), true).resolve("does_not_exist.txt");
        assert!(matches!(result, Err(PathSecurityError::PathNotFound { .. })));
    }

    #[test]
    fn test_errors_name_only_the_requested_path() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("private_root");
        fs::create_dir(&root).unwrap();
        let root_str = root.to_string_lossy().to_string();

        let err = guard(&root, true).resolve("missing.txt").unwrap_err();
        assert_eq!(err.to_string(), "Path does not exist: 'missing.txt'");

        fs::write(temp_dir.path().join("sibling.txt"), "x").unwrap();
        let err = guard(&root, true).resolve("../sibling.txt").unwrap_err();
        assert!(!err.to_string().contains(&root_str));
        assert!(err.to_string().contains("'../sibling.txt'"));
    }

    #[test]
    fn test_error_does_not_reveal_root() {
        let root_dir = TempDir::new().unwrap();
        let outside_dir = TempDir::new().unwrap();
        let outside_file = outside_dir.path().join("o.txt");
        fs::write(&outside_file, "x").unwrap();

        let err = guard(root_dir.path(), true)
            .resolve(outside_file.to_str().unwrap())
            .unwrap_err();
        let root = root_dir.path().to_string_lossy().to_string();
        assert!(!err.to_string().contains(&root));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_within_root() {
        use std::os::unix::fs::symlink;

        let temp_dir = TempDir::new().unwrap();
        let target_file = temp_dir.path().join("target.txt");
        let link_file = temp_dir.path().join("link.txt");
        fs::write(&target_file, "test").unwrap();
        symlink(&target_file, &link_file).unwrap();

        let resolved = guard(temp_dir.path(), true)
            .resolve(link_file.to_str().unwrap())
            .unwrap();
        assert_eq!(resolved, target_file.canonicalize().unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_outside_root_blocked() {
        use std::os::unix::fs::symlink;

        let root_dir = TempDir::new().unwrap();
        let outside_dir = TempDir::new().unwrap();
        let target_file = outside_dir.path().join("target.txt");
        let link_file = root_dir.path().join("link.txt");
        fs::write(&target_file, "test").unwrap();
        symlink(&target_file, &link_file).unwrap();

        let result = guard(root_dir.path(), true).resolve(link_file.to_str().unwrap());
        assert!(matches!(
            result,
            Err(PathSecurityError::SymlinkOutsideRoot { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_disallowed_by_config() {
        use std::os::unix::fs::symlink;

        let temp_dir = TempDir::new().unwrap();
        let target_file = temp_dir.path().join("target.txt");
        let link_file = temp_dir.path().join("link.txt");
        fs::write(&target_file, "test").unwrap();
        symlink(&target_file, &link_file).unwrap();

        let result = guard(temp_dir.path(), false).resolve(link_file.to_str().unwrap());
        assert!(matches!(
            result,
            Err(PathSecurityError::SymlinkNotAllowed { .. })
        ));
    }
}
