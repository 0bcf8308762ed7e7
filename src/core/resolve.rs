//! Turns user tokens (character, codepoint key or shortcode) into renderable output.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::config::EmojiSystemConfig;
use crate::core::setmap::{is_manual_key, EmojiSetMap};
use crate::core::table::{key_to_unicode, normalize_shortcode, EmojiEntry, EmojiTable};

/// Set key -> that set's asset map
pub type SetMaps = BTreeMap<String, EmojiSetMap>;

/// Table entry joined with the asset path a set provides for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedEmoji {
    #[serde(flatten)]
    pub entry: EmojiEntry,
    #[serde(rename = "assetPath")]
    pub asset_path: Option<String>,
}

/// Display preferences; unset sets fall back to the system config
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayOptions {
    pub preferred_set: Option<String>,
    pub fallback_set: Option<String>,
    pub size: Option<u32>,
    pub class_name: Option<String>,
}

/// What a token renders as
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Display {
    Image {
        src: String,
        alt: String,
        title: String,
        set: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        size: Option<u32>,
        #[serde(rename = "className", skip_serializing_if = "Option::is_none")]
        class_name: Option<String>,
        #[serde(skip_serializing_if = "std::ops::Not::not")]
        grayscale: bool,
    },
    Text {
        text: String,
    },
}

/// Normalize a token to a table key
///
/// Tries an exact key, then the literal character, then shortcodes (colons
/// stripped, case-insensitive). Scans run in ascending key order so the first
/// match is stable.
pub fn normalize(token: &str, table: &EmojiTable, shortcodes_enabled: bool) -> Option<String> {
    if table.contains_key(token) {
        return Some(token.to_string());
    }

    if let Some((code, _)) = table.iter().find(|(_, e)| e.unicode == token) {
        return Some(code.clone());
    }

    if !shortcodes_enabled {
        return None;
    }

    let wanted = normalize_shortcode(token);
    if wanted.is_empty() {
        return None;
    }
    table
        .iter()
        .find(|(_, e)| e.has_shortcode(&wanted))
        .map(|(code, _)| code.clone())
}

/// Join an entry with the asset path `set_key` provides
///
/// `None` when the key is not in the table or is a `manualN` placeholder. A
/// present entry whose set has no asset comes back with `asset_path: None`.
pub fn resolve(code: &str, set_key: &str, table: &EmojiTable, maps: &SetMaps) -> Option<ResolvedEmoji> {
    if is_manual_key(code) {
        return None;
    }
    let entry = table.get(code)?;
    let asset_path = maps
        .get(set_key)
        .and_then(|map| map.get(code))
        .map(|m| m.asset_path.clone());

    Some(ResolvedEmoji {
        entry: entry.clone(),
        asset_path,
    })
}

/// Pick the rendering for a token across the preferred and fallback sets
pub fn get_display(
    token: &str,
    options: &DisplayOptions,
    table: &EmojiTable,
    system: &EmojiSystemConfig,
    maps: &SetMaps,
) -> Display {
    let Some(code) = normalize(token, table, system.shortcodes_enabled) else {
        debug!("'{}' does not resolve to a known emoji", token);
        return Display::Text {
            text: token.to_string(),
        };
    };

    let sets = [
        options
            .preferred_set
            .clone()
            .unwrap_or_else(|| system.active_set.clone()),
        options
            .fallback_set
            .clone()
            .unwrap_or_else(|| system.fallback_set.clone()),
    ];

    for set in sets {
        let Some(resolved) = resolve(&code, &set, table, maps) else {
            continue;
        };
        if let Some(src) = resolved.asset_path {
            debug!("'{}' -> {} from {}", token, code, set);
            return Display::Image {
                src,
                alt: resolved.entry.name.clone(),
                title: resolved.entry.name,
                set,
                size: options.size,
                class_name: options.class_name.clone(),
                grayscale: system.grayscale,
            };
        }
    }

    let entry = &table[&code];
    let text = if entry.unicode.is_empty() {
        key_to_unicode(&code).unwrap_or_else(|| token.to_string())
    } else {
        entry.unicode.clone()
    };
    Display::Text { text }
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

impl Display {
    pub fn is_image(&self) -> bool {
        matches!(self, Self::Image { .. })
    }

    /// Render as an `<img>` or `<span>` element
    pub fn to_html(&self) -> String {
        match self {
            Self::Image {
                src,
                alt,
                title,
                size,
                class_name,
                grayscale,
                ..
            } => {
                let mut html = format!(
                    "<img src=\"{}\" alt=\"{}\" title=\"{}\"",
                    escape_html(src),
                    escape_html(alt),
                    escape_html(title)
                );
                if let Some(size) = size {
                    html.push_str(&format!(" width=\"{size}\" height=\"{size}\""));
                }
                if let Some(class_name) = class_name {
                    html.push_str(&format!(" class=\"{}\"", escape_html(class_name)));
                }
                let mut style = Vec::new();
                if let Some(size) = size {
                    style.push(format!("width:{size}px;height:{size}px"));
                }
                if *grayscale {
                    style.push("filter:grayscale(1)".to_string());
                }
                if !style.is_empty() {
                    html.push_str(&format!(" style=\"{}\"", style.join(";")));
                }
                html.push_str(" />");
                html
            }
            Self::Text { text } => format!("<span>{}</span>", escape_html(text)),
        }
    }
}
