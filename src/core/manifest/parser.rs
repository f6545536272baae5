//! Line-oriented extraction of the fields the engine needs.

use regex::Regex;
use std::sync::OnceLock;

const MANIFEST_PREFIX: &str = "appmanifest_";
const MANIFEST_SUFFIX: &str = ".acf";
const INSTALL_DIR_KEY: &str = "\"installdir\"";

/// Case-sensitive `appmanifest_*.acf` check. The middle token is not validated.
pub fn is_manifest_file_name(name: &str) -> bool {
    name.starts_with(MANIFEST_PREFIX) && name.ends_with(MANIFEST_SUFFIX)
}

/// Numeric app id from `appmanifest_<digits>.acf`
pub fn app_id_from_file_name(name: &str) -> Option<u32> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(r"^appmanifest_(\d+)\.acf$").expect("static manifest pattern is valid")
    });

    pattern
        .captures(name)
        .and_then(|caps| caps.get(1))
        .and_then(|id| id.as_str().parse().ok())
}

/// Value of the first line starting with `"installdir"`.
///
/// Leading whitespace is trimmed before matching. The value has surrounding
/// whitespace and one layer of double quotes removed.
pub fn parse_install_dir(contents: &str) -> Option<String> {
    contents.lines().find_map(|line| {
        let rest = line.trim_start().strip_prefix(INSTALL_DIR_KEY)?;
        let value = rest.trim();
        let value = value.strip_prefix('"').unwrap_or(value);
        let value = value.strip_suffix('"').unwrap_or(value);
        Some(value.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#""AppState"
{
	"appid"		"620"
	"name"		"Portal 2"
	"StateFlags"		"4"
	"installdir"		"Portal 2"
	"SizeOnDisk"		"12884901888"
	"UserConfig"
	{
		"installdir"		"Shadowed"
	}
}
"#;

    #[test]
    fn extracts_first_installdir() {
        assert_eq!(parse_install_dir(SAMPLE).as_deref(), Some("Portal 2"));
    }

    #[test]
    fn missing_key_is_none() {
        assert_eq!(parse_install_dir("\"AppState\"\n{\n\t\"appid\"\t\"1\"\n}"), None);
        assert_eq!(parse_install_dir(""), None);
    }

    #[test]
    fn key_must_start_the_line() {
        assert_eq!(parse_install_dir("\"name\" \"installdir\" \"Nope\""), None);
    }

    #[test]
    fn key_is_case_sensitive() {
        assert_eq!(parse_install_dir("\"InstallDir\" \"Nope\""), None);
    }

    #[test]
    fn strips_only_one_layer_of_quotes() {
        assert_eq!(
            parse_install_dir("  \"installdir\"   \"\"Quoted\"\"  ").as_deref(),
            Some("\"Quoted\"")
        );
    }

    #[test]
    fn unquoted_value_is_kept() {
        assert_eq!(parse_install_dir("\"installdir\" Bare Name").as_deref(), Some("Bare Name"));
    }

    #[test]
    fn handles_crlf_line_endings() {
        let contents = "\"AppState\"\r\n{\r\n\t\"installdir\"\t\t\"Dota 2\"\r\n}\r\n";
        assert_eq!(parse_install_dir(contents).as_deref(), Some("Dota 2"));
    }

    #[test]
    fn file_name_filter() {
        assert!(is_manifest_file_name("appmanifest_570.acf"));
        assert!(is_manifest_file_name("appmanifest_.acf"));
        assert!(is_manifest_file_name("appmanifest_backup copy.acf"));
        assert!(!is_manifest_file_name("AppManifest_570.acf"));
        assert!(!is_manifest_file_name("appmanifest_570.ACF"));
        assert!(!is_manifest_file_name("libraryfolders.vdf"));
    }

    #[test]
    fn app_id_needs_digits() {
        assert_eq!(app_id_from_file_name("appmanifest_570.acf"), Some(570));
        assert_eq!(app_id_from_file_name("appmanifest_backup.acf"), None);
        assert_eq!(app_id_from_file_name("appmanifest_99999999999.acf"), None);
    }
}
