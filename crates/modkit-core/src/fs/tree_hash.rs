//! Deterministic tree digest for verifying materialized modules
//!
//! Two trees hash equal exactly when they hold the same relative paths,
//! file contents and symlink targets.

use anyhow::Context;
use std::fs;
use std::path::Path;

const FILE_MARKER: u8 = 0x00;
const SYMLINK_MARKER: u8 = 0xFE;
const DIR_MARKER: u8 = 0xFF;

/// Compute the tree digest of a directory
///
/// # Algorithm
/// - Recursive traversal, entries sorted by file name
/// - Files: `relative_path || 0x00 || content`
/// - Directories: `relative_path || 0xFF`, then their entries
/// - Symlinks: `relative_path || 0xFE || link target` (never followed)
/// - Output: blake3 hex string
///
/// Permissions and timestamps are not part of the digest.
///
/// # Example
/// ```no_run
/// use modkit_core::fs::tree_hash::hash_tree;
/// use std::path::Path;
///
/// let src = hash_tree(Path::new("modules/network/vpc"))?;
/// let dst = hash_tree(Path::new("deployment/primary/vpc"))?;
/// assert_eq!(src, dst);
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn hash_tree(path: &Path) -> anyhow::Result<String> {
    let mut hasher = blake3::Hasher::new();
    hash_entries(&mut hasher, path, "")?;
    Ok(hasher.finalize().to_hex().to_string())
}

fn hash_entries(hasher: &mut blake3::Hasher, dir: &Path, prefix: &str) -> anyhow::Result<()> {
    let mut entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Failed to read directory entries: {}", dir.display()))?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        let rel = match prefix {
            "" => entry.file_name().to_string_lossy().into_owned(),
            _ => format!("{}/{}", prefix, entry.file_name().to_string_lossy()),
        };
        let ty = entry
            .file_type()
            .with_context(|| format!("Failed to stat: {}", path.display()))?;

        hasher.update(rel.as_bytes());
        if ty.is_dir() {
            hasher.update(&[DIR_MARKER]);
            hash_entries(hasher, &path, &rel)?;
        } else if ty.is_file() {
            hasher.update(&[FILE_MARKER]);
            let file = fs::File::open(&path)
                .with_context(|| format!("Failed to open file: {}", path.display()))?;
            hasher
                .update_reader(file)
                .with_context(|| format!("Failed to read file: {}", path.display()))?;
        } else if ty.is_symlink() {
            let target = fs::read_link(&path)
                .with_context(|| format!("Failed to read link: {}", path.display()))?;
            hasher.update(&[SYMLINK_MARKER]);
            hasher.update(target.to_string_lossy().as_bytes());
        } else {
            anyhow::bail!("Unsupported filesystem entry type: {}", path.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_file(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create_dir_all should succeed in test temp dirs");
        }
        fs::write(path, content).expect("write should succeed in test temp dirs");
    }

    fn module_tree(root: &Path) {
        write_file(&root.join("main.tf"), "resource \"google_compute_network\" \"n\" {}\n");
        write_file(&root.join("variables.tf"), "variable \"project_id\" {}\n");
        write_file(&root.join("templates").join("startup.sh"), "#!/bin/sh\n");
    }

    #[test]
    fn digest_is_blake3_hex() {
        let tmp = TempDir::new().expect("tempdir should succeed");
        let hash = hash_tree(tmp.path()).expect("hash_tree should succeed");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn identical_trees_hash_equal() {
        let a = TempDir::new().expect("tempdir should succeed");
        let b = TempDir::new().expect("tempdir should succeed");
        module_tree(a.path());
        module_tree(b.path());

        assert_eq!(
            hash_tree(a.path()).expect("hash_tree should succeed"),
            hash_tree(b.path()).expect("hash_tree should succeed")
        );
    }

    #[test]
    fn content_and_layout_changes_are_detected() {
        let tmp = TempDir::new().expect("tempdir should succeed");
        module_tree(tmp.path());
        let before = hash_tree(tmp.path()).expect("hash_tree should succeed");

        write_file(&tmp.path().join("main.tf"), "# edited\n");
        let edited = hash_tree(tmp.path()).expect("hash_tree should succeed");
        assert_ne!(before, edited);

        fs::create_dir_all(tmp.path().join("empty")).expect("create_dir_all should succeed");
        let with_dir = hash_tree(tmp.path()).expect("hash_tree should succeed");
        assert_ne!(edited, with_dir, "Empty directories are part of the digest");
    }

    #[test]
    fn file_moved_between_directories_changes_hash() {
        let a = TempDir::new().expect("tempdir should succeed");
        write_file(&a.path().join("x").join("f.tf"), "same");
        let b = TempDir::new().expect("tempdir should succeed");
        write_file(&b.path().join("y").join("f.tf"), "same");

        assert_ne!(
            hash_tree(a.path()).expect("hash_tree should succeed"),
            hash_tree(b.path()).expect("hash_tree should succeed")
        );
    }

    #[test]
    fn copied_tree_has_same_hash() {
        let tmp = TempDir::new().expect("tempdir should succeed");
        let src = tmp.path().join("src");
        module_tree(&src);

        let dst = tmp.path().join("dst");
        crate::fs::copy_from_path(&src, &dst).expect("copy should succeed");

        assert_eq!(
            hash_tree(&src).expect("hash_tree should succeed"),
            hash_tree(&dst).expect("hash_tree should succeed")
        );
    }

    #[cfg(unix)]
    #[test]
    fn symlink_target_changes_hash() {
        let a = TempDir::new().expect("tempdir should succeed");
        write_file(&a.path().join("a.tf"), "a");
        std::os::unix::fs::symlink("a.tf", a.path().join("link.tf"))
            .expect("symlink should succeed");

        let b = TempDir::new().expect("tempdir should succeed");
        write_file(&b.path().join("a.tf"), "a");
        std::os::unix::fs::symlink("missing.tf", b.path().join("link.tf"))
            .expect("symlink should succeed");

        assert_ne!(
            hash_tree(a.path()).expect("hash_tree should succeed"),
            hash_tree(b.path()).expect("hash_tree should succeed")
        );
    }

    #[test]
    fn missing_or_file_path_fails() {
        let tmp = TempDir::new().expect("tempdir should succeed");
        assert!(hash_tree(&tmp.path().join("missing")).is_err());

        let file = tmp.path().join("main.tf");
        write_file(&file, "x");
        assert!(hash_tree(&file).is_err());
    }
}
