//! Reconciles the canonical table against the files present for one set.
//!
//! Codepoint-named sets are matched by computing the expected filename of every
//! table key. The name-based set (Sensa) ships hand gestures named in plain
//! English, so its files are matched heuristically against entry names and
//! skin-tone suffixes instead.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::LazyLock;
use tracing::{debug, info, warn};

use crate::config::EmojiSetConfig;
use crate::core::table::{
    is_skin_modifier, modifier_for_skin_number, segments, EmojiTable, DEFAULT_SKIN_TONE,
};

/// Taxonomy group the name-based catalog is drawn from
pub const NAME_BASED_GROUP: &str = "People & Body";

/// Prefix of synthetic keys given to files no entry could be matched to
pub const MANUAL_KEY_PREFIX: &str = "manual";

static VERSION_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^E[0-9.]+\s+").expect("valid version prefix regex"));

static SKIN_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" skin ([1-5])$").expect("valid skin suffix regex"));

/// Optional colour / black-and-white renditions of one asset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetVariants {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bw: Option<String>,
}

/// Where one emoji lives for a given set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetMapEntry {
    #[serde(rename = "assetPath")]
    pub asset_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub svg: Option<AssetVariants>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub png: Option<AssetVariants>,
}

impl SetMapEntry {
    pub fn new(asset_path: impl Into<String>) -> Self {
        Self {
            asset_path: asset_path.into(),
            svg: None,
            png: None,
        }
    }
}

/// Codepoint key (or `manualN`) -> asset location
pub type EmojiSetMap = BTreeMap<String, SetMapEntry>;

/// File the name matcher could not place, kept for human follow-up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualAssignment {
    pub key: String,
    pub file: String,
}

/// Diagnostics written next to every rebuilt set map
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticReport {
    pub missing_files: Vec<String>,
    pub unused_files: Vec<String>,
    pub manual_assignments: Vec<ManualAssignment>,
}

/// Result of one set map build
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetMapBuild {
    pub map: EmojiSetMap,
    pub report: DiagnosticReport,
}

/// True for keys minted for unmatched name-based files
pub fn is_manual_key(key: &str) -> bool {
    key.strip_prefix(MANUAL_KEY_PREFIX)
        .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
}

/// Build the asset map and diagnostics for `set` from a directory listing
///
/// Files not ending in the set's extension are ignored. The listing is sorted
/// first so the output does not depend on directory enumeration order.
pub fn build_set_map(set: &EmojiSetConfig, table: &EmojiTable, files: &[String]) -> SetMapBuild {
    let mut files: Vec<String> = files
        .iter()
        .filter(|f| f.ends_with(&set.ext))
        .cloned()
        .collect();
    files.sort();

    let build = if set.naming.is_name_based() {
        build_name_based(set, table, &files)
    } else {
        build_codepoint_based(set, table, &files)
    };

    info!(
        "{}: {} mapped, {} missing, {} unused, {} manual",
        set.name,
        build.map.len(),
        build.report.missing_files.len(),
        build.report.unused_files.len(),
        build.report.manual_assignments.len()
    );

    build
}

fn build_codepoint_based(set: &EmojiSetConfig, table: &EmojiTable, files: &[String]) -> SetMapBuild {
    let present: BTreeSet<&str> = files.iter().map(String::as_str).collect();
    let mut map = EmojiSetMap::new();
    let mut report = DiagnosticReport::default();
    let mut expected = BTreeSet::new();

    for code in table.keys() {
        let filename = set.filename_for(code);
        if present.contains(filename.as_str()) {
            map.insert(code.clone(), SetMapEntry::new(set.asset_path_for(code)));
        } else {
            report
                .missing_files
                .push(format!("{code} (expected: {filename})"));
        }
        expected.insert(filename);
    }

    report.unused_files = files
        .iter()
        .filter(|f| !expected.contains(f.as_str()))
        .cloned()
        .collect();

    SetMapBuild { map, report }
}

/// Lowercase, drop everything but `[a-z0-9 ]`, collapse spaces
pub fn normalize_name(name: &str) -> String {
    let lowered = name.to_lowercase();
    let kept: String = lowered
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == ' ')
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Entry name reduced to its base form: `E1.0 clapping hands: medium skin tone` -> `clapping hands`
fn base_name(name: &str) -> String {
    let without_version = VERSION_PREFIX_RE.replace(name, "");
    let base = without_version
        .split(':')
        .next()
        .unwrap_or_default()
        .trim();
    normalize_name(base)
}

/// Split a Sensa stem into its normalized name and skin variant
fn parse_name_based_stem(stem: &str) -> (String, &'static str) {
    match SKIN_SUFFIX_RE.captures(stem) {
        Some(caps) => {
            let skin = caps[1]
                .parse::<u8>()
                .ok()
                .and_then(modifier_for_skin_number)
                .unwrap_or(DEFAULT_SKIN_TONE);
            let name = &stem[..caps.get(0).map_or(stem.len(), |m| m.start())];
            (normalize_name(name), skin)
        }
        None => (normalize_name(stem), DEFAULT_SKIN_TONE),
    }
}

fn build_name_based(set: &EmojiSetConfig, table: &EmojiTable, files: &[String]) -> SetMapBuild {
    // normalized name -> skin variant -> table key
    let mut lookup: HashMap<String, HashMap<String, String>> = HashMap::new();
    for (code, entry) in table {
        if entry.group != NAME_BASED_GROUP || !entry.subgroup.contains("hand") {
            continue;
        }

        let skin = segments(code)
            .filter(|s| is_skin_modifier(s))
            .last()
            .unwrap_or(DEFAULT_SKIN_TONE);
        // A later key replaces an earlier one with the same base name and variant
        lookup
            .entry(base_name(&entry.name))
            .or_default()
            .insert(skin.to_string(), code.clone());
    }
    debug!("Name lookup holds {} base names", lookup.len());

    let mut map = EmojiSetMap::new();
    let mut report = DiagnosticReport::default();
    let mut manual_count = 0usize;

    for file in files {
        let stem = file.strip_suffix(set.ext.as_str()).unwrap_or(file.as_str());
        let (name, skin) = parse_name_based_stem(stem);

        let variants = lookup.get(&name);
        let code = variants
            .and_then(|v| v.get(skin))
            .or_else(|| {
                if skin == DEFAULT_SKIN_TONE {
                    None
                } else {
                    variants.and_then(|v| v.get(DEFAULT_SKIN_TONE))
                }
            })
            .cloned();

        let asset_path = set.asset_path_for(stem);
        match code {
            Some(code) => {
                if map.contains_key(&code) {
                    warn!("{} maps to {} which is already assigned", file, code);
                }
                map.insert(code, SetMapEntry::new(asset_path));
            }
            None => {
                manual_count += 1;
                let key = format!("{MANUAL_KEY_PREFIX}{manual_count}");
                debug!("No entry matches '{}', assigned {}", stem, key);
                map.insert(key.clone(), SetMapEntry::new(asset_path));
                report.manual_assignments.push(ManualAssignment {
                    key,
                    file: stem.to_string(),
                });
            }
        }
    }

    // hand entries the catalog has no file for
    let mut missing: Vec<String> = lookup
        .values()
        .flat_map(|variants| variants.values())
        .filter(|code| !map.contains_key(*code))
        .map(|code| format!("{code} (expected: {})", table[code].name))
        .collect();
    missing.sort();
    report.missing_files = missing;

    SetMapBuild { map, report }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_sets;
    use crate::core::table::EmojiEntry;

    fn entry(code: &str, name: &str, group: &str, subgroup: &str) -> (String, EmojiEntry) {
        (
            code.to_string(),
            EmojiEntry {
                codepoints: code.to_string(),
                name: name.to_string(),
                group: group.to_string(),
                subgroup: subgroup.to_string(),
                ..EmojiEntry::default()
            },
        )
    }

    fn files(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn hands_table() -> EmojiTable {
        EmojiTable::from([
            entry("1F44F", "clapping hands", "People & Body", "hands"),
            entry(
                "1F44F-1F3FD",
                "clapping hands: medium skin tone",
                "People & Body",
                "hands",
            ),
            entry(
                "1F44F-1F3FF",
                "clapping hands: dark skin tone",
                "People & Body",
                "hands",
            ),
            entry("1F44B", "E0.6 waving hand", "People & Body", "hand-fingers-open"),
            entry("1F600", "grinning face", "Smileys & Emotion", "face-smiling"),
            entry("1F9B5", "leg", "People & Body", "body-parts"),
        ])
    }

    #[test]
    fn test_prefixed_set_maps_present_files() {
        let sets = default_sets();
        let table = EmojiTable::from([entry("1F600", "grinning face", "", "")]);

        let build = build_set_map(&sets["blobmoji"], &table, &files(&["emoji_u1f600.svg"]));

        assert_eq!(
            build.map,
            EmojiSetMap::from([(
                "1F600".to_string(),
                SetMapEntry::new("/emoji/blobmoji/emoji_u1f600.svg")
            )])
        );
        assert!(build.report.missing_files.is_empty());
        assert!(build.report.unused_files.is_empty());
        assert!(build.report.manual_assignments.is_empty());
    }

    #[test]
    fn test_missing_and_unused_files() {
        let sets = default_sets();
        let table = EmojiTable::from([
            entry("1F600", "grinning face", "", ""),
            entry("1F603", "grinning face with big eyes", "", ""),
        ]);

        let build = build_set_map(
            &sets["twemoji"],
            &table,
            &files(&["1f600.svg", "2764.svg", "1f600.png"]),
        );

        assert_eq!(build.map.len(), 1);
        assert_eq!(build.map["1F600"].asset_path, "/emoji/twemoji/1f600.svg");
        assert_eq!(
            build.report.missing_files,
            vec!["1F603 (expected: 1f603.svg)"]
        );
        assert_eq!(build.report.unused_files, vec!["2764.svg"]);
    }

    #[test]
    fn test_case_sensitive_filenames() {
        let sets = default_sets();
        let table = EmojiTable::from([entry("1F600", "grinning face", "", "")]);

        let build = build_set_map(&sets["openmoji"], &table, &files(&["1f600.svg"]));
        assert!(build.map.is_empty());
        assert_eq!(build.report.unused_files, vec!["1f600.svg"]);
    }

    #[test]
    fn test_empty_directory_yields_empty_map() {
        let sets = default_sets();
        let table = EmojiTable::from([entry("1F600", "grinning face", "", "")]);

        let build = build_set_map(&sets["openmoji"], &table, &[]);
        assert!(build.map.is_empty());
        assert_eq!(build.report.missing_files.len(), 1);
    }

    #[test]
    fn test_name_based_matches_default_and_skin_variants() {
        let sets = default_sets();
        let build = build_set_map(
            &sets["sensamoji"],
            &hands_table(),
            &files(&["Clapping hands.svg", "Clapping hands skin 3.svg"]),
        );

        assert_eq!(
            build.map["1F44F"].asset_path,
            "/emoji/sensamoji/Clapping hands.svg"
        );
        assert_eq!(
            build.map["1F44F-1F3FD"].asset_path,
            "/emoji/sensamoji/Clapping hands skin 3.svg"
        );
        assert_eq!(build.map.len(), 2);
        assert!(build.report.manual_assignments.is_empty());
        assert!(build.report.unused_files.is_empty());
    }

    #[test]
    fn test_name_based_falls_back_to_default_variant() {
        let sets = default_sets();
        let build = build_set_map(
            &sets["sensamoji"],
            &hands_table(),
            &files(&["Waving hand skin 2.svg"]),
        );

        assert_eq!(
            build.map["1F44B"].asset_path,
            "/emoji/sensamoji/Waving hand skin 2.svg"
        );
        assert!(build.report.manual_assignments.is_empty());
    }

    #[test]
    fn test_name_based_later_key_wins_for_shared_name() {
        let sets = default_sets();
        let mut table = hands_table();
        let (code, entry) = entry("1F44B-FE0F", "waving hand", "People & Body", "hand-fingers-open");
        table.insert(code, entry);

        let build = build_set_map(&sets["sensamoji"], &table, &files(&["Waving hand.svg"]));

        assert_eq!(
            build.map["1F44B-FE0F"].asset_path,
            "/emoji/sensamoji/Waving hand.svg"
        );
        assert!(!build.map.contains_key("1F44B"));
        assert!(build
            .report
            .missing_files
            .iter()
            .all(|line| !line.starts_with("1F44B")));
    }

    #[test]
    fn test_name_based_manual_assignments() {
        let sets = default_sets();
        let build = build_set_map(
            &sets["sensamoji"],
            &hands_table(),
            &files(&["Leg.svg", "Grinning face.svg", "Clapping hands.svg", "notes.txt"]),
        );

        // sorted: Clapping hands, Grinning face, Leg
        assert_eq!(
            build.report.manual_assignments,
            vec![
                ManualAssignment {
                    key: "manual1".to_string(),
                    file: "Grinning face".to_string()
                },
                ManualAssignment {
                    key: "manual2".to_string(),
                    file: "Leg".to_string()
                },
            ]
        );
        assert_eq!(build.map["manual2"].asset_path, "/emoji/sensamoji/Leg.svg");
        assert!(build.map.contains_key("1F44F"));
        assert_eq!(build.map.len(), 3);
    }

    #[test]
    fn test_name_based_reports_unmatched_hand_entries() {
        let sets = default_sets();
        let build = build_set_map(
            &sets["sensamoji"],
            &hands_table(),
            &files(&["Clapping hands.svg"]),
        );

        assert_eq!(
            build.report.missing_files,
            vec![
                "1F44B (expected: E0.6 waving hand)",
                "1F44F-1F3FD (expected: clapping hands: medium skin tone)",
                "1F44F-1F3FF (expected: clapping hands: dark skin tone)",
            ]
        );
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Thumbs-Up  Sign!"), "thumbsup sign");
        assert_eq!(normalize_name("  OK   hand "), "ok hand");
        assert_eq!(base_name("E0.6 clapping hands: medium skin tone"), "clapping hands");
    }

    #[test]
    fn test_parse_name_based_stem() {
        assert_eq!(
            parse_name_based_stem("Clapping hands skin 5"),
            ("clapping hands".to_string(), "1F3FF")
        );
        assert_eq!(
            parse_name_based_stem("Clapping hands"),
            ("clapping hands".to_string(), "default")
        );
        assert_eq!(
            parse_name_based_stem("Clapping hands skin 7"),
            ("clapping hands skin 7".to_string(), "default")
        );
    }

    #[test]
    fn test_is_manual_key() {
        assert!(is_manual_key("manual1"));
        assert!(is_manual_key("manual42"));
        assert!(!is_manual_key("manual"));
        assert!(!is_manual_key("1F600"));
    }

    #[test]
    fn test_report_json_shape() {
        let report = DiagnosticReport {
            missing_files: vec!["1F600 (expected: 1F600.svg)".to_string()],
            unused_files: vec![],
            manual_assignments: vec![ManualAssignment {
                key: "manual1".to_string(),
                file: "Leg".to_string(),
            }],
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "missingFiles": ["1F600 (expected: 1F600.svg)"],
                "unusedFiles": [],
                "manualAssignments": [{"key": "manual1", "file": "Leg"}]
            })
        );
    }
}
