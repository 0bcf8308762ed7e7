//! Parser for the Unicode `emoji-test.txt` enumeration.

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use crate::core::table::{EmojiEntry, EmojiTable};

static GROUP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#\s*group:\s*(.+?)\s*$").expect("valid group regex"));

static SUBGROUP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#\s*subgroup:\s*(.+?)\s*$").expect("valid subgroup regex"));

static LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^([0-9A-Fa-f]+(?:\s+[0-9A-Fa-f]+)*)\s*;\s*fully-qualified\s*#\s*(\S+)\s+(?:E(\d+(?:\.\d+)?)\s+)?(.+?)\s*$",
    )
    .expect("valid data line regex")
});

/// Canonical key for whitespace-separated hex codepoints
///
/// Each codepoint is zero-padded to four digits and uppercased: `23 fe0f` -> `0023-FE0F`.
pub fn canonical_key(codepoints: &str) -> String {
    codepoints
        .split_whitespace()
        .map(|cp| format!("{:0>4}", cp.to_uppercase()))
        .collect::<Vec<_>>()
        .join("-")
}

/// Parse the enumeration into a fresh table
///
/// Only fully-qualified lines are kept; a repeated key keeps its first line.
pub fn parse_emoji_test(text: &str) -> EmojiTable {
    let mut table = EmojiTable::new();
    let mut group = String::new();
    let mut subgroup = String::new();
    let mut skipped = 0usize;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(caps) = GROUP_RE.captures(line) {
            group = caps[1].to_string();
            continue;
        }
        if let Some(caps) = SUBGROUP_RE.captures(line) {
            subgroup = caps[1].to_string();
            continue;
        }
        if line.starts_with('#') {
            continue;
        }

        let Some(caps) = LINE_RE.captures(line) else {
            skipped += 1;
            continue;
        };

        let key = canonical_key(&caps[1]);
        if table.contains_key(&key) {
            continue;
        }

        let entry = EmojiEntry {
            codepoints: key.clone(),
            unicode: caps[2].to_string(),
            name: caps[4].to_string(),
            group: group.clone(),
            subgroup: subgroup.clone(),
            version: caps.get(3).map(|m| m.as_str().to_string()),
            is_zwj: key.split('-').any(|segment| segment == "200D"),
            ..EmojiEntry::default()
        };
        table.insert(key, entry);
    }

    debug!(
        "Parsed {} fully-qualified entries ({} other data lines skipped)",
        table.len(),
        skipped
    );

    table
}
