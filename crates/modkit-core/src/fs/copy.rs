//! Recursive directory copy used to materialize modules.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::error::CopyError;

/// Copy the contents of directory `src` into `dst`.
///
/// When `dst` is missing or an empty directory the tree is first built in a
/// sibling staging directory and then renamed into place, so a failed copy
/// leaves nothing behind. When `dst` already has content the source is
/// merged into it and same-named files are overwritten.
pub fn copy_from_path(src: &Path, dst: &Path) -> Result<(), CopyError> {
    let src_meta = fs::metadata(src).map_err(|e| CopyError::io("stat", src, e))?;
    if !src_meta.is_dir() {
        return Err(CopyError::NotADirectory {
            path: src.to_path_buf(),
        });
    }
    ensure_not_nested(src, dst)?;

    match fs::symlink_metadata(dst) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => stage_and_swap(src, dst, false),
        Err(e) => Err(CopyError::io("stat", dst, e)),
        Ok(meta) if meta.is_dir() && is_empty_dir(dst)? => stage_and_swap(src, dst, true),
        Ok(_) if dst.is_dir() => {
            debug!(src = %src.display(), dst = %dst.display(), "merging into existing directory");
            copy_tree(src, dst)
        }
        Ok(_) => Err(CopyError::DestinationNotADirectory {
            path: dst.to_path_buf(),
        }),
    }
}

fn stage_and_swap(src: &Path, dst: &Path, replace_empty: bool) -> Result<(), CopyError> {
    let parent = parent_dir(dst);
    fs::create_dir_all(&parent).map_err(|e| CopyError::io("create directory", &parent, e))?;

    let tmp = unique_temp_path(dst)?;
    fs::create_dir(&tmp).map_err(|e| CopyError::io("create directory", &tmp, e))?;

    let staged = copy_tree(src, &tmp).and_then(|()| {
        let perms = fs::metadata(src)
            .map_err(|e| CopyError::io("stat", src, e))?
            .permissions();
        fs::set_permissions(&tmp, perms).map_err(|e| CopyError::io("set permissions on", &tmp, e))
    });
    if let Err(err) = staged {
        discard_staging(&tmp);
        return Err(err);
    }

    if replace_empty && let Err(e) = fs::remove_dir(dst) {
        discard_staging(&tmp);
        return Err(CopyError::io("remove empty destination", dst, e));
    }

    if let Err(e) = fs::rename(&tmp, dst) {
        discard_staging(&tmp);
        return Err(CopyError::io("move staged copy into", dst, e));
    }

    debug!(src = %src.display(), dst = %dst.display(), "copied module tree");
    Ok(())
}

fn discard_staging(tmp: &Path) {
    if let Err(e) = fs::remove_dir_all(tmp) {
        debug!(path = %tmp.display(), error = %e, "failed to remove staging directory");
    }
}

/// Copy the tree, then apply directory permissions deepest first so a
/// read-only source directory never blocks writing its own children.
fn copy_tree(src: &Path, dst: &Path) -> Result<(), CopyError> {
    let mut dir_perms = Vec::new();
    copy_entries(src, dst, &mut dir_perms)?;
    for (dir, perms) in dir_perms {
        fs::set_permissions(&dir, perms)
            .map_err(|e| CopyError::io("set permissions on", &dir, e))?;
    }
    Ok(())
}

fn copy_entries(
    src: &Path,
    dst: &Path,
    dir_perms: &mut Vec<(PathBuf, fs::Permissions)>,
) -> Result<(), CopyError> {
    let entries = fs::read_dir(src).map_err(|e| CopyError::io("read directory", src, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| CopyError::io("read directory", src, e))?;
        let from = entry.path();
        let to = dst.join(entry.file_name());
        let ty = entry
            .file_type()
            .map_err(|e| CopyError::io("stat", &from, e))?;

        if ty.is_dir() {
            remove_symlink(&to)?;
            fs::create_dir_all(&to).map_err(|e| CopyError::io("create directory", &to, e))?;
            copy_entries(&from, &to, dir_perms)?;
            let perms = fs::metadata(&from)
                .map_err(|e| CopyError::io("stat", &from, e))?
                .permissions();
            dir_perms.push((to, perms));
        } else if ty.is_file() {
            remove_symlink(&to)?;
            fs::copy(&from, &to).map_err(|e| CopyError::io("copy file", &from, e))?;
        } else if ty.is_symlink() {
            copy_symlink(&from, &to)?;
        } else {
            return Err(CopyError::UnsupportedEntry { path: from });
        }
    }
    Ok(())
}

/// An existing link at `to` is replaced, never written through.
fn remove_symlink(to: &Path) -> Result<(), CopyError> {
    match fs::symlink_metadata(to) {
        Ok(meta) if meta.file_type().is_symlink() => {
            fs::remove_file(to).map_err(|e| CopyError::io("replace", to, e))
        }
        _ => Ok(()),
    }
}

#[cfg(unix)]
fn copy_symlink(from: &Path, to: &Path) -> Result<(), CopyError> {
    let target = fs::read_link(from).map_err(|e| CopyError::io("read link", from, e))?;
    if fs::symlink_metadata(to).is_ok() {
        fs::remove_file(to).map_err(|e| CopyError::io("replace", to, e))?;
    }
    std::os::unix::fs::symlink(&target, to).map_err(|e| CopyError::io("create symlink", to, e))
}

#[cfg(not(unix))]
fn copy_symlink(from: &Path, _to: &Path) -> Result<(), CopyError> {
    Err(CopyError::UnsupportedEntry {
        path: from.to_path_buf(),
    })
}

fn is_empty_dir(path: &Path) -> Result<bool, CopyError> {
    let mut entries = fs::read_dir(path).map_err(|e| CopyError::io("read directory", path, e))?;
    Ok(entries.next().is_none())
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Copying a directory into its own subtree would never terminate.
fn ensure_not_nested(src: &Path, dst: &Path) -> Result<(), CopyError> {
    let src_abs = normalize(src).map_err(|e| CopyError::io("resolve", src, e))?;
    let dst_abs = normalize(dst).map_err(|e| CopyError::io("resolve", dst, e))?;
    if dst_abs.starts_with(&src_abs) {
        return Err(CopyError::DestinationInsideSource {
            src: src.to_path_buf(),
            dst: dst.to_path_buf(),
        });
    }
    Ok(())
}

fn normalize(path: &Path) -> io::Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    Ok(out)
}

fn unique_temp_path(dst: &Path) -> Result<PathBuf, CopyError> {
    let parent = parent_dir(dst);
    let base = dst
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "module".to_string());

    for attempt in 0u32..1000 {
        let name = if attempt == 0 {
            format!(".{}.tmp.{}", base, std::process::id())
        } else {
            format!(".{}.tmp.{}.{}", base, std::process::id(), attempt)
        };
        let candidate = parent.join(name);
        if !candidate.exists() {
            return Ok(candidate);
        }
    }

    Err(CopyError::Staging {
        path: dst.to_path_buf(),
    })
}
