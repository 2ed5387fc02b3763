//! Turns raw bucket entries into display-ready records.
//!
//! Object stores have no folders, only keys such as `photos/2021/cat.jpg`. This module
//! formats sizes and timestamps for display and infers the set of directories from the
//! key prefixes. Keys ending in `/` are directory markers and are never listed as files.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

use crate::contract::RawObject;

const SIZE_UNITS: [&str; 9] = ["Bytes", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];
const TIMESTAMP_FORMAT: &str = "%B %d, %Y %I:%M %p";

/// Placeholder shown when a size or timestamp does not apply.
pub const MISSING: &str = "-";

#[derive(Debug, Clone)]
pub struct ClassifyOptions {
    pub timezone: Tz,
}

#[derive(Debug, Clone)]
pub struct UrlOptions {
    /// Prefix for public object URLs, without trailing slash.
    pub public_url_base: String,
    /// Site-relative prefix for directory listings, without trailing slash.
    pub site_prefix: String,
}

/// A raw object with its metadata formatted for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedObject {
    pub key: String,
    pub name: String,
    pub size: String,
    pub last_modified: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// One row of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingEntry {
    pub kind: EntryKind,
    pub name: String,
    pub key: String,
    pub size: String,
    pub last_modified: String,
    pub url: String,
}

impl ListingEntry {
    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

pub fn is_directory_marker(key: &str) -> bool {
    key.ends_with('/')
}

/// Last path segment of a key, ignoring trailing separators.
pub fn basename(key: &str) -> &str {
    let trimmed = key.trim_end_matches('/');
    match trimmed.rsplit_once('/') {
        Some((_, name)) => name,
        None => trimmed,
    }
}

/// Key of the directory containing `key`, or `None` when it sits at the bucket root.
pub fn parent_key(key: &str) -> Option<&str> {
    let trimmed = key.trim_end_matches('/');
    match trimmed.rsplit_once('/') {
        Some((parent, _)) if !parent.is_empty() => Some(parent),
        _ => None,
    }
}

/// A directory key is usable as a relative path: no empty, `.` or `..` segments.
pub fn is_well_formed_dir_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .split('/')
            .all(|segment| !matches!(segment, "" | "." | ".."))
}

/// Human readable size using base-1024 units, rounded to two decimals.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut next_threshold: u128 = 1024;
    while u128::from(bytes) >= next_threshold && unit < SIZE_UNITS.len() - 1 {
        unit += 1;
        next_threshold *= 1024;
    }

    let scaled = bytes as f64 / 1024f64.powi(unit as i32);
    let rounded = (scaled * 100.0).round() / 100.0;
    format!("{} {}", rounded, SIZE_UNITS[unit])
}

pub fn format_timestamp(timestamp: DateTime<Utc>, timezone: &Tz) -> String {
    timestamp
        .with_timezone(timezone)
        .format(TIMESTAMP_FORMAT)
        .to_string()
}

/// Percent-encode every segment of a key, keeping the `/` separators.
pub fn encode_key(key: &str) -> String {
    key.split('/')
        .map(|segment| {
            url::form_urlencoded::byte_serialize(segment.as_bytes())
                .collect::<String>()
                .replace('+', "%20")
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Normalize raw entries. Entries without a key are dropped.
pub fn process_objects(objects: &[RawObject], options: &ClassifyOptions) -> Vec<ClassifiedObject> {
    let now = Utc::now();

    objects
        .iter()
        .filter_map(|object| {
            let Some(key) = object.key.as_deref() else {
                debug!(?object, "Skipping listed object without a key");
                return None;
            };
            Some(ClassifiedObject {
                key: key.to_string(),
                name: basename(key).to_string(),
                size: object
                    .size
                    .map(format_file_size)
                    .unwrap_or_else(|| MISSING.to_string()),
                last_modified: format_timestamp(
                    object.last_modified.unwrap_or(now),
                    &options.timezone,
                ),
            })
        })
        .collect()
}

/// Unique directory keys implied by the objects, deepest first.
///
/// Each key contributes its parent directory (a marker such as `a/b/` contributes `a`), and
/// every ancestor of those is included as well. Prefixes with empty, `.` or `..` segments are
/// skipped.
pub fn directory_keys(objects: &[ClassifiedObject]) -> Vec<String> {
    let mut keys = BTreeSet::new();

    for object in objects {
        let Some(mut dir) = parent_key(&object.key) else {
            continue;
        };
        if !is_well_formed_dir_key(dir) {
            debug!(key = %object.key, "Skipping malformed directory prefix");
            continue;
        }

        while keys.insert(dir.to_string()) {
            match parent_key(dir) {
                Some(parent) => dir = parent,
                None => break,
            }
        }
    }

    let mut keys: Vec<String> = keys.into_iter().collect();
    keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    keys
}

pub fn objects_to_directories(objects: &[ClassifiedObject], urls: &UrlOptions) -> Vec<ListingEntry> {
    directory_keys(objects)
        .into_iter()
        .map(|key| ListingEntry {
            kind: EntryKind::Directory,
            name: basename(&key).to_string(),
            url: format!("{}/{}", urls.site_prefix, encode_key(&key)),
            size: MISSING.to_string(),
            last_modified: MISSING.to_string(),
            key,
        })
        .collect()
}

pub fn objects_to_files(objects: &[ClassifiedObject], urls: &UrlOptions) -> Vec<ListingEntry> {
    objects
        .iter()
        .filter(|object| !is_directory_marker(&object.key))
        .map(|object| ListingEntry {
            kind: EntryKind::File,
            name: object.name.clone(),
            key: object.key.clone(),
            size: object.size.clone(),
            last_modified: object.last_modified.clone(),
            url: format!("{}/{}", urls.public_url_base, encode_key(&object.key)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn urls() -> UrlOptions {
        UrlOptions {
            public_url_base: "https://bucket.s3.amazonaws.com".into(),
            site_prefix: "/files".into(),
        }
    }

    fn classified(key: &str) -> ClassifiedObject {
        ClassifiedObject {
            key: key.into(),
            name: basename(key).into(),
            size: "1 KB".into(),
            last_modified: "January 01, 2021 12:00 AM".into(),
        }
    }

    #[test]
    fn formats_sizes_in_base_1024_units() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(1), "1 Bytes");
        assert_eq!(format_file_size(1023), "1023 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(2048), "2 KB");
        assert_eq!(format_file_size(1_048_576), "1 MB");
        assert_eq!(format_file_size(1_234_567), "1.18 MB");
        assert_eq!(format_file_size(5 * 1024 * 1024 * 1024), "5 GB");
        assert_eq!(format_file_size(u64::MAX), "16 EB");
    }

    #[test]
    fn formats_timestamps_in_display_timezone() {
        let tz: Tz = "America/Sao_Paulo".parse().unwrap();
        let noon = Utc.with_ymd_and_hms(2021, 3, 4, 15, 7, 0).unwrap();
        assert_eq!(format_timestamp(noon, &tz), "March 04, 2021 12:07 PM");

        let new_year = Utc.with_ymd_and_hms(2021, 1, 1, 2, 30, 0).unwrap();
        assert_eq!(format_timestamp(new_year, &tz), "December 31, 2020 11:30 PM");
    }

    #[test]
    fn basename_and_parent_ignore_trailing_separator() {
        assert_eq!(basename("a/b/file.txt"), "file.txt");
        assert_eq!(basename("a/b/"), "b");
        assert_eq!(basename("top.txt"), "top.txt");
        assert_eq!(parent_key("a/b/file.txt"), Some("a/b"));
        assert_eq!(parent_key("a/b/"), Some("a"));
        assert_eq!(parent_key("a/"), None);
        assert_eq!(parent_key("top.txt"), None);
    }

    #[test]
    fn encodes_segments_but_keeps_separators() {
        assert_eq!(encode_key("docs/my file+v2.pdf"), "docs/my%20file%2Bv2.pdf");
        assert_eq!(encode_key("plain/key.txt"), "plain/key.txt");
        assert_eq!(encode_key("música/ação.mp3"), "m%C3%BAsica/a%C3%A7%C3%A3o.mp3");
    }

    #[test]
    fn process_objects_applies_fallbacks_and_drops_keyless_entries() {
        let options = ClassifyOptions {
            timezone: "UTC".parse().unwrap(),
        };
        let stamp = Utc.with_ymd_and_hms(2020, 6, 1, 18, 0, 0).unwrap();
        let raw = vec![
            RawObject::new("a/file.txt", Some(2048)).with_last_modified(stamp),
            RawObject::new("a/", None),
            RawObject::default(),
        ];

        let objects = process_objects(&raw, &options);

        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].name, "file.txt");
        assert_eq!(objects[0].size, "2 KB");
        assert_eq!(objects[0].last_modified, "June 01, 2020 06:00 PM");
        assert_eq!(objects[1].size, MISSING);
        assert!(!objects[1].last_modified.is_empty());
    }

    #[test]
    fn directory_keys_are_unique_deepest_first_with_ancestors() {
        let objects = vec![
            classified("x/y/z/deep.txt"),
            classified("a/one.txt"),
            classified("a/two.txt"),
            classified("root.txt"),
        ];

        assert_eq!(directory_keys(&objects), vec!["x/y/z", "x/y", "a", "x"]);
    }

    #[test]
    fn markers_contribute_their_parent_directory() {
        let objects = vec![classified("a/b/"), classified("top/")];
        assert_eq!(directory_keys(&objects), vec!["a"]);
    }

    #[test]
    fn directory_keys_skip_malformed_prefixes() {
        let objects = vec![
            classified("a//b.txt"),
            classified("/lead.txt"),
            classified("../../escaped/x.txt"),
            classified("a/./y.txt"),
            classified("up/../down/z.txt"),
        ];
        assert!(directory_keys(&objects).is_empty());
    }

    #[test]
    fn well_formed_keys_reject_dot_segments() {
        assert!(is_well_formed_dir_key("a/b"));
        assert!(is_well_formed_dir_key("a/.hidden"));
        assert!(!is_well_formed_dir_key(""));
        assert!(!is_well_formed_dir_key("a/."));
        assert!(!is_well_formed_dir_key(".."));
        assert!(!is_well_formed_dir_key("a//b"));
    }

    #[test]
    fn files_exclude_markers_and_carry_public_urls() {
        let objects = vec![classified("a/"), classified("a/read me.md")];
        let files = objects_to_files(&objects, &urls());

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].kind, EntryKind::File);
        assert_eq!(files[0].url, "https://bucket.s3.amazonaws.com/a/read%20me.md");
    }

    #[test]
    fn directories_link_to_site_listing() {
        let objects = vec![classified("photos/2021/cat.jpg")];
        let dirs = objects_to_directories(&objects, &urls());

        assert_eq!(dirs.len(), 2);
        assert_eq!(dirs[0].key, "photos/2021");
        assert_eq!(dirs[0].name, "2021");
        assert_eq!(dirs[0].url, "/files/photos/2021");
        assert_eq!(dirs[0].size, MISSING);
        assert!(dirs.iter().all(ListingEntry::is_directory));
    }
}
