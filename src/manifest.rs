use crate::model::SongEntry;
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

pub const MANIFEST_FILE: &str = "songs.json";
pub const UNKNOWN_ARTIST: &str = "unknown artist";

/// Separator candidates for filename inference, in priority order.
const SEPARATORS: &[char] = &['-', '_', '–', '—'];

#[derive(Debug, Deserialize)]
struct RawSong {
    file: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    singer: Option<String>,
}

/// Loads the playlist, swallowing the failure into an empty list. The
/// diagnostic (if any) is left to the caller via [`read_manifest`].
pub fn load(songs_dir: &Path) -> Vec<SongEntry> {
    read_manifest(songs_dir).unwrap_or_default()
}

/// Reads and normalizes `songs.json` from the songs directory. Elements that
/// are neither filename strings nor objects with a string `file` field are
/// dropped; only a missing/unreadable manifest is an error.
pub fn read_manifest(songs_dir: &Path) -> Result<Vec<SongEntry>> {
    let path = songs_dir.join(MANIFEST_FILE);
    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read manifest {}", path.display()))?;
    let values: Vec<Value> = serde_json::from_str(&raw)
        .with_context(|| format!("manifest {} is not a JSON array", path.display()))?;

    Ok(values
        .into_iter()
        .filter_map(|value| entry_from_value(value, songs_dir))
        .collect())
}

fn entry_from_value(value: Value, songs_dir: &Path) -> Option<SongEntry> {
    match value {
        Value::String(file) => Some(entry_from_filename(&file, songs_dir)),
        Value::Object(_) => {
            let raw: RawSong = serde_json::from_value(value).ok()?;
            let mut entry = entry_from_filename(&raw.file, songs_dir);
            if let Some(title) = raw.title.filter(|title| !title.is_empty()) {
                entry.title = title;
            }
            if let Some(singer) = raw.singer.filter(|singer| !singer.is_empty()) {
                entry.singer = singer;
            }
            Some(entry)
        }
        _ => None,
    }
}

/// Builds an entry from a bare filename, inferring title/singer from the
/// extension-stripped stem.
pub fn entry_from_filename(file: &str, songs_dir: &Path) -> SongEntry {
    let base = strip_extension(file).to_string();
    let (title, singer) = infer_title_singer(&base);
    SongEntry {
        file: file.to_string(),
        audio_path: songs_dir.join(file),
        base,
        title,
        singer,
    }
}

fn strip_extension(file: &str) -> &str {
    match file.rsplit_once('.') {
        Some((stem, ext)) if !ext.is_empty() && !ext.contains('/') => stem,
        _ => file,
    }
}

/// The first separator that splits the stem into at least two trimmed parts
/// wins; the shorter of the first two parts is the singer (the first part on
/// a length tie), the remaining parts rejoined with that separator are the
/// title. No split means the whole stem is the title.
fn infer_title_singer(base: &str) -> (String, String) {
    for sep in SEPARATORS {
        let parts: Vec<&str> = base.split(*sep).map(str::trim).collect();
        if parts.len() < 2 {
            continue;
        }

        let sep = sep.to_string();
        if parts[0].chars().count() <= parts[1].chars().count() {
            return (parts[1..].join(&sep), parts[0].to_string());
        }
        return (parts[0].to_string(), parts[1..].join(&sep));
    }

    (base.to_string(), UNKNOWN_ARTIST.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn write_manifest(dir: &Path, json: &str) {
        std::fs::write(dir.join(MANIFEST_FILE), json).expect("manifest fixture");
    }

    #[test]
    fn shorter_part_becomes_singer() {
        let entry = entry_from_filename("Taylor-ShakeItOff.mp3", Path::new("songs"));
        assert_eq!(entry.singer, "Taylor");
        assert_eq!(entry.title, "ShakeItOff");
        assert_eq!(entry.base, "Taylor-ShakeItOff");
        assert_eq!(entry.audio_path, PathBuf::from("songs/Taylor-ShakeItOff.mp3"));
    }

    #[test]
    fn longer_first_part_stays_title() {
        let entry = entry_from_filename("AVeryLongTitleName-A.mp3", Path::new("songs"));
        assert_eq!(entry.title, "AVeryLongTitleName");
        assert_eq!(entry.singer, "A");
    }

    #[test]
    fn tie_makes_first_part_the_singer() {
        let entry = entry_from_filename("Abba-Sosa.mp3", Path::new("songs"));
        assert_eq!(entry.singer, "Abba");
        assert_eq!(entry.title, "Sosa");
    }

    #[test]
    fn no_separator_falls_back_to_unknown_artist() {
        let entry = entry_from_filename("NoSeparatorHere.mp3", Path::new("songs"));
        assert_eq!(entry.title, "NoSeparatorHere");
        assert_eq!(entry.singer, UNKNOWN_ARTIST);
    }

    #[test]
    fn separators_are_tried_in_priority_order() {
        // '-' splits first even though '_' is also present.
        let entry = entry_from_filename("My_Band-Anthem_One.mp3", Path::new("songs"));
        assert_eq!(entry.singer, "My_Band");
        assert_eq!(entry.title, "Anthem_One");
    }

    #[test]
    fn multi_part_title_rejoins_with_winning_separator() {
        let entry = entry_from_filename("IU - Good Day - Live.mp3", Path::new("songs"));
        assert_eq!(entry.singer, "IU");
        assert_eq!(entry.title, "Good Day-Live");
    }

    #[test]
    fn dash_variants_are_supported() {
        let entry = entry_from_filename("Ann–Morning.flac", Path::new("songs"));
        assert_eq!(entry.singer, "Ann");
        assert_eq!(entry.title, "Morning");
    }

    #[test]
    fn extension_stripping_only_drops_the_last_segment() {
        assert_eq!(strip_extension("a.b.mp3"), "a.b");
        assert_eq!(strip_extension("noext"), "noext");
        assert_eq!(strip_extension("trailingdot."), "trailingdot.");
    }

    #[test]
    fn object_entries_keep_explicit_fields() {
        let dir = tempdir().expect("tempdir");
        write_manifest(
            dir.path(),
            r#"[{"file": "x-y.mp3", "title": "Real Title", "singer": "Real Singer"}]"#,
        );

        let playlist = load(dir.path());
        assert_eq!(playlist.len(), 1);
        assert_eq!(playlist[0].title, "Real Title");
        assert_eq!(playlist[0].singer, "Real Singer");
        assert_eq!(playlist[0].base, "x-y");
    }

    #[test]
    fn object_entries_inherit_inferred_fields() {
        let dir = tempdir().expect("tempdir");
        write_manifest(
            dir.path(),
            r#"[{"file": "Ben-Harvest.mp3", "title": "", "singer": null}]"#,
        );

        let playlist = load(dir.path());
        assert_eq!(playlist[0].title, "Harvest");
        assert_eq!(playlist[0].singer, "Ben");
    }

    #[test]
    fn malformed_elements_are_dropped_silently() {
        let dir = tempdir().expect("tempdir");
        write_manifest(
            dir.path(),
            r#"["ok-one.mp3", 42, null, {"title": "no file"}, {"file": 7}, ["nested"], "two.mp3"]"#,
        );

        let playlist = load(dir.path());
        assert_eq!(playlist.len(), 2);
        assert_eq!(playlist[0].singer, "ok");
        assert_eq!(playlist[1].title, "two");
    }

    #[test]
    fn missing_manifest_loads_as_empty() {
        let dir = tempdir().expect("tempdir");
        assert!(read_manifest(dir.path()).is_err());
        assert!(load(dir.path()).is_empty());
    }

    #[test]
    fn non_array_manifest_loads_as_empty() {
        let dir = tempdir().expect("tempdir");
        write_manifest(dir.path(), r#"{"songs": []}"#);
        assert!(read_manifest(dir.path()).is_err());
        assert!(load(dir.path()).is_empty());
    }
}
