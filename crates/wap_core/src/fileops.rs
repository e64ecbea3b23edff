//! Primitive file tree operations with well-defined overwrite semantics.
//!
//! `copy_path` outcomes:
//!
//! | src  | dst       | outcome         |
//! |------|-----------|-----------------|
//! | file | file      | overwrite       |
//! | file | dir       | path exists     |
//! | file | missing   | new file        |
//! | dir  | file      | path exists     |
//! | dir  | dir       | merge contents  |
//! | dir  | missing   | new directory   |

use camino::Utf8Path;
use std::fs;
use walkdir::WalkDir;

use crate::error::{Error, IoResultExt, Result};
use crate::utils::utf8_path;

/// Deletes a file, symlink or directory tree. The path must exist.
pub fn delete_path(path: &Utf8Path) -> Result<()> {
    let metadata = fs::symlink_metadata(path).at_path(path)?;
    if metadata.is_dir() {
        fs::remove_dir_all(path).at_path(path)
    } else {
        remove_file_or_link(path)
    }
}

#[cfg(windows)]
fn remove_file_or_link(path: &Utf8Path) -> Result<()> {
    // directory symlinks on windows are removed like directories
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(_) => fs::remove_dir(path).at_path(path),
    }
}

#[cfg(not(windows))]
fn remove_file_or_link(path: &Utf8Path) -> Result<()> {
    fs::remove_file(path).at_path(path)
}

/// Deletes every child of `path`, but not `path` itself.
pub fn clean_dir(path: &Utf8Path) -> Result<()> {
    for entry in path.read_dir_utf8().at_path(path)? {
        let entry = entry.at_path(path)?;
        delete_path(entry.path())?;
    }
    Ok(())
}

/// Copies `src` to `dst` following the table in the module docs.
pub fn copy_path(src: &Utf8Path, dst: &Utf8Path) -> Result<()> {
    if src.is_file() {
        if dst.is_dir() {
            return Err(Error::path_exists(
                dst,
                format!(
                    "Cannot copy file {src} to {dst} because it is a directory. Please remove \
                     that directory or choose a different target."
                ),
            ));
        }
        fs::copy(src, dst).at_path(dst)?;
        Ok(())
    } else if src.is_dir() {
        if dst.is_file() {
            return Err(Error::path_exists(
                dst,
                format!(
                    "Cannot copy directory {src} to {dst} because it is a file. Please remove \
                     that file or choose a different target."
                ),
            ));
        }
        copy_tree(src, dst)
    } else {
        Err(Error::path_type(
            src,
            format!("Cannot copy path {src} because it is not a file or directory."),
        ))
    }
}

fn copy_tree(src: &Utf8Path, dst: &Utf8Path) -> Result<()> {
    fs::create_dir_all(dst).at_path(dst)?;

    for entry in WalkDir::new(src).min_depth(1).follow_links(true) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(src.as_std_path()).to_path_buf();
            match utf8_path(path) {
                Ok(path) => Error::io(&path, e.into()),
                Err(err) => err,
            }
        })?;
        let path = utf8_path(entry.path().to_path_buf())?;
        let Ok(relative) = path.strip_prefix(src) else {
            return Err(Error::path_type(
                &path,
                format!("Path {path} escaped the directory {src} while copying."),
            ));
        };
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            if target.is_file() {
                return Err(Error::path_exists(
                    &target,
                    format!("Cannot copy directory {path} to {target} because it is a file."),
                ));
            }
            fs::create_dir_all(&target).at_path(&target)?;
        } else {
            if target.is_dir() {
                return Err(Error::path_exists(
                    &target,
                    format!("Cannot copy file {path} to {target} because it is a directory."),
                ));
            }
            tracing::trace!(%path, %target, "copying file");
            fs::copy(&path, &target).at_path(&target)?;
        }
    }

    Ok(())
}

/// Makes `new_path` a symbolic link to the absolute form of `target_path`.
///
/// If `new_path` already resolves to the target this is a no-op. If it exists and
/// points elsewhere it is replaced when `force` is set, otherwise this fails.
pub fn symlink(new_path: &Utf8Path, target_path: &Utf8Path, force: bool) -> Result<()> {
    let target = target_path.canonicalize_utf8().at_path(target_path)?;

    if fs::symlink_metadata(new_path).is_ok() {
        if new_path.canonicalize_utf8().ok().as_deref() == Some(target.as_path()) {
            return Ok(());
        }
        if !force {
            return Err(Error::path_exists(
                new_path,
                format!(
                    "Intended symlink {new_path} already exists and points to a different \
                     target."
                ),
            ));
        }
        tracing::debug!(%new_path, "removing existing path before linking");
        delete_path(new_path)?;
    }

    match new_path.parent() {
        Some(parent) if parent.as_str().is_empty() || parent.is_dir() => {}
        _ => {
            return Err(Error::path_missing(
                new_path,
                format!("Unable to create link {new_path}. Ensure its parent directory exists."),
            ))
        }
    }

    create_symlink(new_path, &target)
}

#[cfg(unix)]
fn create_symlink(new_path: &Utf8Path, target: &Utf8Path) -> Result<()> {
    std::os::unix::fs::symlink(target, new_path).at_path(new_path)
}

#[cfg(windows)]
fn create_symlink(new_path: &Utf8Path, target: &Utf8Path) -> Result<()> {
    // ERROR_PRIVILEGE_NOT_HELD
    const PRIVILEGE_NOT_HELD: i32 = 1314;

    let result = if target.is_dir() {
        std::os::windows::fs::symlink_dir(target, new_path)
    } else {
        std::os::windows::fs::symlink_file(target, new_path)
    };

    match result {
        Err(err) if err.raw_os_error() == Some(PRIVILEGE_NOT_HELD) => Err(Error::Platform {
            message: format!(
                "Could not create symbolic link from {new_path} to {target} because this \
                 program lacks the privilege to do so."
            ),
            hint: "Enable Windows Developer Mode or run this program as an administrator"
                .to_string(),
        }),
        other => other.at_path(new_path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use camino::Utf8PathBuf;
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    fn utf8_root(dir: &tempfile::TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap()
    }

    fn snapshot(root: &Utf8Path) -> BTreeMap<String, Option<Vec<u8>>> {
        WalkDir::new(root)
            .min_depth(1)
            .into_iter()
            .map(|e| e.unwrap())
            .map(|e| {
                let rel = e.path().strip_prefix(root).unwrap().to_string_lossy().into_owned();
                let contents = e.file_type().is_file().then(|| fs::read(e.path()).unwrap());
                (rel, contents)
            })
            .collect()
    }

    fn make_tree(root: &Utf8Path) {
        fs::create_dir_all(root.join("sub/deeper")).unwrap();
        fs::write(root.join("a.lua"), "a").unwrap();
        fs::write(root.join("sub/b.lua"), "b").unwrap();
        fs::write(root.join("sub/deeper/c.lua"), "c").unwrap();
    }

    #[test]
    fn test_copy_file_new_and_overwrite() {
        let dir = tempdir().unwrap();
        let root = utf8_root(&dir);
        fs::write(root.join("src"), "new").unwrap();

        copy_path(&root.join("src"), &root.join("dst")).unwrap();
        assert_eq!(fs::read_to_string(root.join("dst")).unwrap(), "new");

        fs::write(root.join("dst"), "old").unwrap();
        copy_path(&root.join("src"), &root.join("dst")).unwrap();
        copy_path(&root.join("src"), &root.join("dst")).unwrap();
        assert_eq!(fs::read_to_string(root.join("dst")).unwrap(), "new");
    }

    #[test]
    fn test_copy_file_over_dir_fails() {
        let dir = tempdir().unwrap();
        let root = utf8_root(&dir);
        fs::write(root.join("src"), "x").unwrap();
        fs::create_dir(root.join("dst")).unwrap();

        let err = copy_path(&root.join("src"), &root.join("dst")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PathExists);
    }

    #[test]
    fn test_copy_dir_over_file_fails() {
        let dir = tempdir().unwrap();
        let root = utf8_root(&dir);
        make_tree(&root.join("src"));
        fs::write(root.join("dst"), "x").unwrap();

        let err = copy_path(&root.join("src"), &root.join("dst")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PathExists);
    }

    #[test]
    fn test_copy_dir_merges_and_is_idempotent() {
        let dir = tempdir().unwrap();
        let root = utf8_root(&dir);
        make_tree(&root.join("src"));
        fs::create_dir(root.join("dst")).unwrap();
        fs::write(root.join("dst/keep.txt"), "kept").unwrap();

        copy_path(&root.join("src"), &root.join("dst")).unwrap();
        let once = snapshot(&root.join("dst"));
        copy_path(&root.join("src"), &root.join("dst")).unwrap();
        let twice = snapshot(&root.join("dst"));

        assert_eq!(once, twice);
        assert_eq!(once["keep.txt"], Some(b"kept".to_vec()));
        assert_eq!(once["sub/deeper/c.lua"], Some(b"c".to_vec()));
    }

    #[test]
    fn test_copy_missing_source() {
        let dir = tempdir().unwrap();
        let root = utf8_root(&dir);
        let err = copy_path(&root.join("nope"), &root.join("dst")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PathType);
    }

    #[test]
    fn test_clean_dir_keeps_root() {
        let dir = tempdir().unwrap();
        let root = utf8_root(&dir);
        make_tree(&root.join("out"));

        clean_dir(&root.join("out")).unwrap();

        assert!(root.join("out").is_dir());
        assert_eq!(fs::read_dir(root.join("out")).unwrap().count(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_is_idempotent() {
        let dir = tempdir().unwrap();
        let root = utf8_root(&dir);
        make_tree(&root.join("target"));
        let link = root.join("link");

        symlink(&link, &root.join("target"), false).unwrap();
        symlink(&link, &root.join("target"), false).unwrap();

        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(
            link.canonicalize_utf8().unwrap(),
            root.join("target").canonicalize_utf8().unwrap()
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_existing_elsewhere() {
        let dir = tempdir().unwrap();
        let root = utf8_root(&dir);
        make_tree(&root.join("target"));
        fs::create_dir(root.join("link")).unwrap();

        let err = symlink(&root.join("link"), &root.join("target"), false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PathExists);
        assert!(err.hint().is_some());

        symlink(&root.join("link"), &root.join("target"), true).unwrap();
        assert!(root.join("link/a.lua").is_file());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_missing_parent() {
        let dir = tempdir().unwrap();
        let root = utf8_root(&dir);
        make_tree(&root.join("target"));

        let err = symlink(&root.join("no/such/link"), &root.join("target"), false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PathMissing);
    }
}
