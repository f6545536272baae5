//! Size heuristic for install directories left behind by partial uninstalls.

use std::fs;
use std::io;
use std::path::Path;
use walkdir::WalkDir;

/// Bytes in a kibibyte
const KIB: u64 = 1024;

/// Default threshold: directories holding less than 2 KiB are ghosts.
///
/// Older titles sometimes write saves into the install directory; anything
/// at or above the threshold is left alone.
pub const DEFAULT_GHOST_THRESHOLD_BYTES: u64 = 2 * KIB;

/// Decides whether an existing install directory is a ghost
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GhostPolicy {
    /// A directory whose regular files total less than this is a ghost
    pub threshold_bytes: u64,
}

impl Default for GhostPolicy {
    fn default() -> Self {
        Self {
            threshold_bytes: DEFAULT_GHOST_THRESHOLD_BYTES,
        }
    }
}

impl GhostPolicy {
    pub fn from_kib(kib: u64) -> Self {
        Self {
            threshold_bytes: kib.saturating_mul(KIB),
        }
    }

    /// `Ok(true)` when `dir` has no entries, or its regular files sum to less
    /// than the threshold.
    ///
    /// Symlinks are never followed or counted. The walk stops as soon as the
    /// running total exceeds the threshold. Anything that cannot be read is an
    /// error; callers must treat it as not a ghost.
    pub fn is_ghost(&self, dir: &Path) -> io::Result<bool> {
        if fs::read_dir(dir)?.next().is_none() {
            return Ok(true);
        }

        let mut total = 0u64;
        for entry in WalkDir::new(dir).min_depth(1).follow_links(false) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            total = total.saturating_add(entry.metadata()?.len());
            if total > self.threshold_bytes {
                return Ok(false);
            }
        }

        Ok(total < self.threshold_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_bytes(dir: &Path, name: &str, len: usize) {
        fs::write(dir.join(name), vec![0u8; len]).unwrap();
    }

    #[test]
    fn empty_directory_is_ghost() {
        let temp = TempDir::new().unwrap();
        assert!(GhostPolicy::default().is_ghost(temp.path()).unwrap());
    }

    #[test]
    fn small_files_are_ghost() {
        let temp = TempDir::new().unwrap();
        write_bytes(temp.path(), "steam_appid.txt", 6);
        fs::create_dir_all(temp.path().join("bin/logs")).unwrap();
        write_bytes(&temp.path().join("bin/logs"), "crash.txt", 900);

        assert!(GhostPolicy::default().is_ghost(temp.path()).unwrap());
    }

    #[test]
    fn only_empty_subdirectories_is_ghost() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("a/b/c")).unwrap();

        assert!(GhostPolicy::default().is_ghost(temp.path()).unwrap());
    }

    #[test]
    fn exactly_threshold_is_not_ghost() {
        let temp = TempDir::new().unwrap();
        write_bytes(temp.path(), "save.dat", 2048);

        assert!(!GhostPolicy::default().is_ghost(temp.path()).unwrap());
    }

    #[test]
    fn large_nested_file_is_not_ghost() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("data")).unwrap();
        write_bytes(&temp.path().join("data"), "pak0.pak", 10 * 1024);

        assert!(!GhostPolicy::default().is_ghost(temp.path()).unwrap());
    }

    #[test]
    fn threshold_is_tunable() {
        let temp = TempDir::new().unwrap();
        write_bytes(temp.path(), "save.dat", 3000);

        assert!(!GhostPolicy::default().is_ghost(temp.path()).unwrap());
        assert!(GhostPolicy::from_kib(4).is_ghost(temp.path()).unwrap());
        assert_eq!(GhostPolicy::from_kib(4).threshold_bytes, 4096);
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_not_measured() {
        let outside = TempDir::new().unwrap();
        write_bytes(outside.path(), "huge.bin", 64 * 1024);
        fs::create_dir(outside.path().join("big_dir")).unwrap();
        write_bytes(&outside.path().join("big_dir"), "more.bin", 64 * 1024);

        let temp = TempDir::new().unwrap();
        std::os::unix::fs::symlink(outside.path().join("huge.bin"), temp.path().join("link.bin")).unwrap();
        std::os::unix::fs::symlink(outside.path().join("big_dir"), temp.path().join("link_dir")).unwrap();

        assert!(GhostPolicy::default().is_ghost(temp.path()).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_subdirectory_is_an_error() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let locked = temp.path().join("locked");
        fs::create_dir(&locked).unwrap();
        write_bytes(&locked, "save.dat", 10);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Root ignores permission bits.
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let result = GhostPolicy::default().is_ghost(temp.path());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(result.is_err());
    }

    #[test]
    fn missing_directory_is_an_error() {
        let temp = TempDir::new().unwrap();
        assert!(GhostPolicy::default().is_ghost(&temp.path().join("gone")).is_err());
    }
}
