use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Canonical table: codepoint key -> entry, iterated in ascending key order
pub type EmojiTable = BTreeMap<String, EmojiEntry>;

/// Skin-tone modifier codepoints paired with their labels, lightest first
pub const SKIN_TONE_MODIFIERS: [(&str, &str); 5] = [
    ("1F3FB", "light"),
    ("1F3FC", "medium-light"),
    ("1F3FD", "medium"),
    ("1F3FE", "medium-dark"),
    ("1F3FF", "dark"),
];

pub const DEFAULT_SKIN_TONE: &str = "default";

/// Descriptive metadata for one emoji sequence
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmojiEntry {
    pub codepoints: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub unicode: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub group: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub subgroup: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not", rename = "isZWJ")]
    pub is_zwj: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub shortcodes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skin_tone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gemoji: Option<GemojiBlock>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iamcal: Option<IamcalBlock>,
}

/// Enrichment merged from the gemoji database
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GemojiBlock {
    pub aliases: Vec<String>,
    pub tags: Vec<String>,
    pub description: String,
    pub category: String,
}

/// Enrichment merged from iamcal emoji-data
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IamcalBlock {
    pub short_names: Vec<String>,
    pub keywords: Vec<String>,
    pub category: String,
    pub added_in: String,
}

impl EmojiEntry {
    /// Entry carrying only its key, as produced from asset filenames
    pub fn bare(code: impl Into<String>) -> Self {
        Self {
            codepoints: code.into(),
            ..Self::default()
        }
    }

    /// True if any shortcode matches `token` after colon stripping and lowercasing
    pub fn has_shortcode(&self, normalized: &str) -> bool {
        self.shortcodes
            .iter()
            .any(|sc| normalize_shortcode(sc) == normalized)
    }
}

/// Strip surrounding colons and lowercase: `:WAVE:` -> `wave`
pub fn normalize_shortcode(shortcode: &str) -> String {
    shortcode.trim_matches(':').to_lowercase()
}

/// Key segments of a codepoint sequence (`1F44B-1F3FD` -> `["1F44B", "1F3FD"]`)
pub fn segments(code: &str) -> impl Iterator<Item = &str> {
    code.split('-')
}

/// Skin-tone label derived from the key
///
/// The first modifier in [`SKIN_TONE_MODIFIERS`] order present as a segment wins.
pub fn skin_tone_for(code: &str) -> &'static str {
    let upper = code.to_uppercase();
    SKIN_TONE_MODIFIERS
        .iter()
        .find(|(modifier, _)| segments(&upper).any(|segment| segment == *modifier))
        .map(|(_, label)| *label)
        .unwrap_or(DEFAULT_SKIN_TONE)
}

/// Modifier codepoint for a 1-based skin number (1 = light ... 5 = dark)
pub fn modifier_for_skin_number(number: u8) -> Option<&'static str> {
    match number {
        1..=5 => Some(SKIN_TONE_MODIFIERS[(number - 1) as usize].0),
        _ => None,
    }
}

/// True for the five skin-tone modifier codepoints
pub fn is_skin_modifier(segment: &str) -> bool {
    SKIN_TONE_MODIFIERS.iter().any(|(m, _)| *m == segment)
}

/// Convert a codepoint key into the characters it denotes
pub fn key_to_unicode(code: &str) -> Option<String> {
    segments(code)
        .map(|segment| u32::from_str_radix(segment, 16).ok().and_then(char::from_u32))
        .collect()
}
