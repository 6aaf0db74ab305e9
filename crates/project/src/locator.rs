//! Project file discovery

use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use t6inject_core::{InjectError, Result, ENTRY_FILE, SOURCE_EXTENSION};
use tracing::debug;

/// A discovered project
#[derive(Debug, Clone)]
pub struct Project {
    /// Project root as given
    pub root: PathBuf,
    /// Every `.gsc` file under the root, traversal order
    pub files: Vec<PathBuf>,
    /// Whether `main.gsc` sits directly in the root
    pub has_entry: bool,
}

impl Project {
    /// Scan a project directory
    pub fn discover<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();
        let files = list_project_files(root)?;
        let has_entry = has_entry_file(root)?;

        debug!(
            "Discovered project {:?}: {} scripts, entry {}",
            root,
            files.len(),
            if has_entry { "present" } else { "missing" }
        );

        Ok(Self {
            root: root.to_path_buf(),
            files,
            has_entry,
        })
    }
}

/// List every `.gsc` file under `project_root`, recursively
///
/// # Errors
/// - `InvalidArgument` if `project_root` is empty
/// - `NotFound` if it does not exist
/// - `Io` if the root or any directory below it cannot be read
///
/// Symlinks are followed. Dangling links are skipped.
pub fn list_project_files<P: AsRef<Path>>(project_root: P) -> Result<Vec<PathBuf>> {
    let root = project_root.as_ref();

    if root.as_os_str().is_empty() {
        return Err(InjectError::InvalidArgument(
            "Project directory cannot be empty".into(),
        ));
    }

    match fs::metadata(root) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            return Err(InjectError::NotFound(format!(
                "Project directory {} is not a directory",
                root.display()
            )))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(InjectError::NotFound(format!(
                "Project directory {} does not exist",
                root.display()
            )))
        }
        Err(e) => {
            return Err(InjectError::io_context(
                format!("Failed to query {}", root.display()),
                e,
            ))
        }
    }

    let mut files = Vec::new();
    let mut visited = HashSet::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        // Symlinked directories are followed; each real directory is read once
        let real = fs::canonicalize(&dir)
            .map_err(|e| InjectError::io_context(format!("Failed to resolve {}", dir.display()), e))?;
        if !visited.insert(real) {
            debug!("Skipping already visited directory {:?}", dir);
            continue;
        }

        let entries = fs::read_dir(&dir)
            .map_err(|e| InjectError::io_context(format!("Failed to read {}", dir.display()), e))?;

        for entry in entries {
            let entry = entry
                .map_err(|e| InjectError::io_context(format!("Failed to read {}", dir.display()), e))?;
            let path = entry.path();
            let meta = match fs::metadata(&path) {
                Ok(meta) => meta,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    debug!("Skipping dangling link {:?}", path);
                    continue;
                }
                Err(e) => {
                    return Err(InjectError::io_context(
                        format!("Failed to stat {}", path.display()),
                        e,
                    ))
                }
            };

            if meta.is_dir() {
                pending.push(path);
            } else if meta.is_file() && is_source_file(&path) {
                debug!("Found script: {:?}", path);
                files.push(path);
            }
        }
    }

    Ok(files)
}

/// Whether `main.gsc` exists directly in `project_root`
///
/// A missing entry script is `Ok(false)`; only an unreadable root is an error.
pub fn has_entry_file<P: AsRef<Path>>(project_root: P) -> Result<bool> {
    let root = project_root.as_ref();

    fs::metadata(root)
        .map_err(|e| InjectError::io_context(format!("Failed to query {}", root.display()), e))?;

    match fs::metadata(root.join(ENTRY_FILE)) {
        Ok(meta) => Ok(meta.is_file()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(InjectError::io_context(
            format!("Failed to query {}", root.join(ENTRY_FILE).display()),
            e,
        )),
    }
}

fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(SOURCE_EXTENSION))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_lists_all_scripts_without_entry() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        write(&root.join("a.gsc"), "init() {}");
        write(&root.join("b.gsc"), "init() {}");
        write(&root.join("maps/mp/c.gsc"), "init() {}");
        write(&root.join("readme.txt"), "not a script");
        write(&root.join("maps/notes.md"), "not a script");

        let mut files = list_project_files(root).unwrap();
        files.sort();

        assert_eq!(
            files,
            vec![root.join("a.gsc"), root.join("b.gsc"), root.join("maps/mp/c.gsc")]
        );
        assert!(!has_entry_file(root).unwrap());
    }

    #[test]
    fn test_entry_detected_with_nested_scripts() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        write(&root.join("main.gsc"), "main() {}");
        write(&root.join("a/b/c/d/deep.gsc"), "deep() {}");

        assert!(has_entry_file(root).unwrap());
        assert_eq!(list_project_files(root).unwrap().len(), 2);
    }

    #[test]
    fn test_nested_main_is_not_entry() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        write(&root.join("scripts/main.gsc"), "main() {}");

        assert!(!has_entry_file(root).unwrap());
    }

    #[test]
    fn test_directory_named_main_is_not_entry() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("main.gsc")).unwrap();

        assert!(!has_entry_file(root).unwrap());
    }

    #[test]
    fn test_empty_project_is_ok() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(list_project_files(temp_dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_empty_root_is_invalid_argument() {
        assert!(matches!(
            list_project_files(""),
            Err(InjectError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_missing_root() {
        let temp_dir = tempfile::tempdir().unwrap();
        let missing = temp_dir.path().join("gone");

        assert!(matches!(
            list_project_files(&missing),
            Err(InjectError::NotFound(_))
        ));
        assert!(matches!(has_entry_file(&missing), Err(InjectError::Io(_))));
    }

    #[test]
    fn test_root_that_is_a_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = temp_dir.path().join("main.gsc");
        write(&file, "main() {}");

        assert!(matches!(list_project_files(&file), Err(InjectError::NotFound(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_followed_once() {
        use std::os::unix::fs::symlink;

        let temp_dir = tempfile::tempdir().unwrap();
        let shared = temp_dir.path().join("shared");
        let root = temp_dir.path().join("project");
        write(&shared.join("util.gsc"), "util() {}");
        write(&root.join("main.gsc"), "main() {}");

        symlink(&shared, root.join("linked")).unwrap();
        symlink(&shared, root.join("dir.gsc")).unwrap();
        symlink(root.join("gone.gsc"), root.join("dangling.gsc")).unwrap();
        symlink(&root, root.join("loop")).unwrap();

        let mut files = list_project_files(&root).unwrap();
        files.sort();

        // `shared` is reachable through two links but read only once
        assert_eq!(files.len(), 2);
        assert_eq!(files[1], root.join("main.gsc"));
        assert!(files[0].ends_with("util.gsc"));
        assert!(!files.iter().any(|f| f.ends_with("dir.gsc") || f.ends_with("dangling.gsc")));
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_root_is_io_error() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tempfile::tempdir().unwrap();
        let locked = temp_dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let inner = locked.join("project");
        let result = list_project_files(&inner);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        // the superuser bypasses permission bits and sees the real NotFound
        match result {
            Err(InjectError::Io(e)) => assert_eq!(e.kind(), ErrorKind::PermissionDenied),
            Err(InjectError::NotFound(_)) => {}
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_discover_project() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        write(&root.join("main.gsc"), "main() {}");
        write(&root.join("helper.gsc"), "helper() {}");

        let project = Project::discover(root).unwrap();
        assert_eq!(project.root, root);
        assert_eq!(project.files.len(), 2);
        assert!(project.has_entry);
    }
}
