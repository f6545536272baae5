//! # Manifest Module
//!
//! Reads `appmanifest_<id>.acf` files from Steam libraries.
//!
//! Only the `"installdir"` key is extracted. Parsing is line-oriented and
//! ignores the rest of the KeyValues structure, so truncated or oddly nested
//! files still yield their install directory.

mod parser;
mod store;

pub use parser::{app_id_from_file_name, is_manifest_file_name, parse_install_dir};
pub use store::{load_manifests, ManifestLoad, ManifestStore};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Folder under a library that holds the install directories
pub const COMMON_DIR: &str = "common";

/// One installed application's record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Absolute path to the manifest file (unique per run)
    pub path: PathBuf,
    /// Raw `"installdir"` value, if the key was present
    pub install_dir: Option<String>,
    /// Numeric id from the file name, when it has one
    pub app_id: Option<u32>,
}

impl Manifest {
    /// Build a manifest record from already-read file contents
    pub fn from_contents(path: impl Into<PathBuf>, contents: &str) -> Self {
        let path = path.into();
        let app_id = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(app_id_from_file_name);

        Self {
            install_dir: parse_install_dir(contents),
            app_id,
            path,
        }
    }

    /// `<manifest dir>/common`
    pub fn common_dir(&self) -> PathBuf {
        self.path
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(COMMON_DIR)
    }

    /// `<manifest dir>/common/<installdir>`, without any validation
    pub fn resolved_install_path(&self) -> Option<PathBuf> {
        self.install_dir
            .as_deref()
            .map(|dir| self.common_dir().join(dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_install_path_under_common() {
        let manifest = Manifest::from_contents(
            "/lib/steamapps/appmanifest_220.acf",
            "\"AppState\"\n{\n\t\"installdir\"\t\t\"Half-Life 2\"\n}\n",
        );

        assert_eq!(manifest.app_id, Some(220));
        assert_eq!(manifest.install_dir.as_deref(), Some("Half-Life 2"));
        assert_eq!(
            manifest.resolved_install_path(),
            Some(PathBuf::from("/lib/steamapps/common/Half-Life 2"))
        );
    }

    #[test]
    fn missing_key_has_no_resolved_path() {
        let manifest = Manifest::from_contents("/lib/steamapps/appmanifest_x.acf", "\"AppState\"\n{\n}\n");

        assert_eq!(manifest.install_dir, None);
        assert_eq!(manifest.app_id, None);
        assert_eq!(manifest.resolved_install_path(), None);
    }
}
