//! Hand-maintained override files: custom backdrops keyed by film slug and
//! calendar quotes keyed by civil date. Parsed as JSON5 so trailing commas
//! and comments in the hand-edited files don't break a build.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// An absent file is simply an empty map; an unreadable or malformed one is
/// an error the caller downgrades to a warning.
pub fn load_string_map(path: &Path) -> Result<BTreeMap<String, String>> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    let raw =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let parsed: BTreeMap<String, String> =
        json5::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn absent_file_is_an_empty_map() {
        let tmp = tempdir().expect("tempdir");
        let map = load_string_map(&tmp.path().join("custom-quotes.json")).expect("load");
        assert!(map.is_empty());
    }

    #[test]
    fn tolerates_comments_and_trailing_commas() {
        let tmp = tempdir().expect("tempdir");
        let path = tmp.path().join("custom-backdrops.json");
        fs::write(
            &path,
            "{\n  // picked by hand\n  \"arrival\": \"https://example.test/arrival.jpg\",\n}\n",
        )
        .expect("write");

        let map = load_string_map(&path).expect("load");
        assert_eq!(
            map.get("arrival").map(String::as_str),
            Some("https://example.test/arrival.jpg")
        );
    }

    #[test]
    fn malformed_file_is_an_error() {
        let tmp = tempdir().expect("tempdir");
        let path = tmp.path().join("custom-quotes.json");
        fs::write(&path, "[1, 2]").expect("write");
        assert!(load_string_map(&path).is_err());
    }
}
