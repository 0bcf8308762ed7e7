//! Construction and enrichment of the canonical codepoint table.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

use crate::config::EmojiSystemConfig;
use crate::core::error::{EmojiError, EmojiResult};
use crate::core::table::{normalize_shortcode, skin_tone_for, EmojiEntry, EmojiTable};
use crate::core::table::{GemojiBlock, IamcalBlock};
use crate::core::unicode::parse_emoji_test;

/// Outcome of an enrichment pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichReport {
    /// Entries touched by the pass
    pub updated: usize,
    /// Entries in the table
    pub total: usize,
    /// Shortcodes skipped because another entry already owns them
    #[serde(default, skip_serializing_if = "is_zero")]
    pub conflicts: usize,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

/// One record of the gemoji database
#[derive(Debug, Deserialize)]
struct GemojiRecord {
    #[serde(default)]
    emoji: Option<String>,
    #[serde(default)]
    aliases: Vec<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    category: Option<String>,
}

/// One record of iamcal emoji-data
#[derive(Debug, Deserialize)]
struct IamcalRecord {
    #[serde(default)]
    unified: Option<String>,
    #[serde(default)]
    short_names: Vec<String>,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    added_in: Option<String>,
}

/// Build the table from the Unicode emoji-test.txt enumeration
pub fn build_from_unicode(text: &str) -> EmojiResult<EmojiTable> {
    let table = parse_emoji_test(text);
    if table.is_empty() {
        return Err(EmojiError::parse(
            "emoji-test.txt",
            "no fully-qualified entries found",
        ));
    }
    info!("Built base table with {} entries", table.len());
    Ok(table)
}

/// Build a bare table from the filenames present in each set's asset directory
///
/// `listings` maps set keys to the filenames found on disk; sets with no
/// listing (missing directory) are skipped. Name-based sets contribute nothing
/// since their stems are not codepoints.
pub fn build_from_asset_files(
    system: &EmojiSystemConfig,
    listings: &BTreeMap<String, Vec<String>>,
) -> EmojiResult<EmojiTable> {
    let mut table = EmojiTable::new();

    for (set_key, files) in listings {
        let set = system.set(set_key)?;
        if set.naming.is_name_based() {
            debug!("Skipping name-based set {} for base build", set_key);
            continue;
        }

        let before = table.len();
        for code in files.iter().filter_map(|f| set.code_from_filename(f)) {
            table
                .entry(code.clone())
                .or_insert_with(|| EmojiEntry::bare(code));
        }
        debug!("{} contributed {} new keys", set_key, table.len() - before);
    }

    if table.is_empty() {
        return Err(EmojiError::NoAssetsFound);
    }

    info!("Built bare base table with {} entries", table.len());
    Ok(table)
}

/// Tracks which entry owns each normalized shortcode
struct ShortcodeIndex {
    owners: HashMap<String, String>,
    conflicts: usize,
}

impl ShortcodeIndex {
    fn new(table: &EmojiTable) -> Self {
        let mut owners = HashMap::new();
        for (code, entry) in table {
            for sc in &entry.shortcodes {
                owners
                    .entry(normalize_shortcode(sc))
                    .or_insert_with(|| code.clone());
            }
        }
        Self {
            owners,
            conflicts: 0,
        }
    }

    /// Append `candidates` to the entry, skipping blanks, duplicates and
    /// shortcodes already owned by a different entry
    fn extend(&mut self, code: &str, entry: &mut EmojiEntry, candidates: &[String]) {
        for candidate in candidates {
            let candidate = candidate.trim();
            let normalized = normalize_shortcode(candidate);
            if normalized.is_empty() {
                continue;
            }

            match self.owners.get(&normalized) {
                Some(owner) if owner == code => {}
                Some(owner) => {
                    debug!(
                        "Shortcode '{}' for {} already belongs to {}",
                        candidate, code, owner
                    );
                    self.conflicts += 1;
                }
                None => {
                    self.owners.insert(normalized, code.to_string());
                    entry.shortcodes.push(candidate.to_string());
                }
            }
        }
    }
}

/// Merge the gemoji database (keyed by literal character)
pub fn merge_gemoji(table: &mut EmojiTable, json: &str) -> EmojiResult<EnrichReport> {
    let records: Vec<GemojiRecord> =
        serde_json::from_str(json).map_err(|e| EmojiError::parse("gemoji emoji.json", e))?;

    let by_char: HashMap<String, GemojiRecord> = records
        .into_iter()
        .filter_map(|r| match r.emoji.clone() {
            Some(ch) if !ch.is_empty() => Some((ch, r)),
            _ => None,
        })
        .collect();

    let mut index = ShortcodeIndex::new(table);
    let mut updated = 0;

    for (code, entry) in table.iter_mut() {
        if entry.unicode.is_empty() {
            continue;
        }
        let Some(record) = by_char.get(&entry.unicode) else {
            continue;
        };

        entry.gemoji = Some(GemojiBlock {
            aliases: record.aliases.clone(),
            tags: record.tags.clone(),
            description: record.description.clone().unwrap_or_default(),
            category: record.category.clone().unwrap_or_default(),
        });
        index.extend(code, entry, &record.aliases);
        updated += 1;
    }

    // Tags only after every alias has been claimed
    for (code, entry) in table.iter_mut() {
        if let Some(record) = by_char.get(&entry.unicode) {
            index.extend(code, entry, &record.tags);
        }
    }

    info!("Merged gemoji data into {} entries", updated);
    Ok(EnrichReport {
        updated,
        total: table.len(),
        conflicts: index.conflicts,
    })
}

/// Merge iamcal emoji-data (keyed by codepoint)
pub fn merge_iamcal(table: &mut EmojiTable, json: &str) -> EmojiResult<EnrichReport> {
    let records: Vec<IamcalRecord> =
        serde_json::from_str(json).map_err(|e| EmojiError::parse("iamcal emoji.json", e))?;

    let by_code: HashMap<String, IamcalRecord> = records
        .into_iter()
        .filter_map(|r| match r.unified.as_deref() {
            Some(unified) if !unified.is_empty() => Some((unified.to_uppercase(), r)),
            _ => None,
        })
        .collect();

    let mut index = ShortcodeIndex::new(table);
    let mut updated = 0;

    for (code, entry) in table.iter_mut() {
        let Some(record) = by_code.get(&code.to_uppercase()) else {
            continue;
        };

        entry.iamcal = Some(IamcalBlock {
            short_names: record.short_names.clone(),
            keywords: record.keywords.clone(),
            category: record.category.clone().unwrap_or_default(),
            added_in: record.added_in.clone().unwrap_or_default(),
        });
        index.extend(code, entry, &record.short_names);
        updated += 1;
    }

    info!("Merged iamcal data into {} entries", updated);
    Ok(EnrichReport {
        updated,
        total: table.len(),
        conflicts: index.conflicts,
    })
}

/// Recompute the `skin_tone` label of every entry from its key
pub fn apply_skin_tones(table: &mut EmojiTable) -> EnrichReport {
    let mut updated = 0;
    for (code, entry) in table.iter_mut() {
        let tone = skin_tone_for(code);
        if entry.skin_tone.as_deref() != Some(tone) {
            entry.skin_tone = Some(tone.to_string());
            updated += 1;
        }
    }

    info!("Labeled skin tones: {} of {} entries changed", updated, table.len());
    EnrichReport {
        updated,
        total: table.len(),
        conflicts: 0,
    }
}
