use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::core::error::{EmojiError, EmojiResult};
use crate::core::naming::{FilenameCase, NamingPolicy};

pub const DEFAULT_UNICODE_URL: &str = "https://unicode.org/Public/emoji/latest/emoji-test.txt";
pub const DEFAULT_GEMOJI_URL: &str =
    "https://raw.githubusercontent.com/github/gemoji/master/db/emoji.json";
pub const DEFAULT_IAMCAL_URL: &str =
    "https://raw.githubusercontent.com/iamcal/emoji-data/master/emoji.json";

const OPENMOJI_VERSION: &str = "15.1.0";
const TWEMOJI_VERSION: &str = "14.0.2";

/// Configuration for the emoji console
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Project root; set asset directories are resolved against it
    pub root_dir: Option<PathBuf>,

    /// Directory holding emoji-base.json, set maps and debug reports
    pub data_dir: Option<PathBuf>,

    /// Logging configuration
    pub logging: Option<LoggingConfig>,

    /// Remote reference data locations
    pub sources: Option<SourcesConfig>,

    /// Emoji system settings and set definitions
    #[serde(default)]
    pub emoji: EmojiSystemConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Enable verbose logging by default
    pub verbose: Option<bool>,

    /// Time format for log timestamps (uses time crate format syntax)
    pub time_format: Option<String>,
}

/// Remote reference data locations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourcesConfig {
    /// Unicode emoji-test.txt enumeration
    pub unicode_url: Option<String>,

    /// gemoji database (keyed by literal character)
    pub gemoji_url: Option<String>,

    /// iamcal emoji-data database (keyed by codepoint)
    pub iamcal_url: Option<String>,
}

/// Static definition of a single emoji asset provider
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EmojiSetConfig {
    pub name: String,
    /// Asset folder, relative to the project root
    pub asset_dir: PathBuf,
    /// File extension including the leading dot
    pub ext: String,
    /// Public URL prefix the asset paths are served under
    pub url_prefix: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Remote zip archive the assets can be installed from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle_url: Option<String>,
    pub naming: NamingPolicy,
}

impl EmojiSetConfig {
    pub fn case(&self) -> FilenameCase {
        self.naming.case()
    }

    pub fn filename_for(&self, code: &str) -> String {
        self.naming.filename_for(code, &self.ext)
    }

    pub fn asset_path_for(&self, code: &str) -> String {
        format!(
            "{}/{}",
            self.url_prefix.trim_end_matches('/'),
            self.filename_for(code)
        )
    }

    pub fn code_from_filename(&self, filename: &str) -> Option<String> {
        self.naming.code_from_filename(filename, &self.ext)
    }
}

/// Process-wide emoji settings, immutable once loaded
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EmojiSystemConfig {
    pub active_set: String,
    pub fallback_set: String,
    pub grayscale: bool,
    pub shortcodes_enabled: bool,
    pub sets: BTreeMap<String, EmojiSetConfig>,
}

impl Default for EmojiSystemConfig {
    fn default() -> Self {
        Self {
            active_set: "openmoji".to_string(),
            fallback_set: "twemoji".to_string(),
            grayscale: false,
            shortcodes_enabled: true,
            sets: default_sets(),
        }
    }
}

impl EmojiSystemConfig {
    /// Look up a set definition, failing on unknown keys
    pub fn set(&self, key: &str) -> EmojiResult<&EmojiSetConfig> {
        self.sets
            .get(key)
            .ok_or_else(|| EmojiError::InvalidSetKey(key.to_string()))
    }
}

fn codepoint_set(
    name: &str,
    key: &str,
    naming: NamingPolicy,
    notes: Option<&str>,
    bundle_url: Option<String>,
) -> EmojiSetConfig {
    EmojiSetConfig {
        name: name.to_string(),
        asset_dir: PathBuf::from("public/emoji").join(key),
        ext: ".svg".to_string(),
        url_prefix: format!("/emoji/{key}"),
        notes: notes.map(str::to_string),
        bundle_url,
        naming,
    }
}

/// The five providers the console ships with
pub fn default_sets() -> BTreeMap<String, EmojiSetConfig> {
    let emoji_u = || NamingPolicy::PrefixedUnderscoreHex {
        prefix: "emoji_u".to_string(),
    };
    let underscore_note =
        Some("Filenames are prefixed with emoji_u and use underscores between codepoints");

    let mut sets = BTreeMap::new();
    sets.insert(
        "openmoji".to_string(),
        codepoint_set(
            "OpenMoji",
            "openmoji",
            NamingPolicy::UpperHex,
            None,
            Some(format!(
                "https://github.com/hfg-gmuend/openmoji/releases/download/{OPENMOJI_VERSION}/openmoji-svg-color.zip"
            )),
        ),
    );
    sets.insert(
        "twemoji".to_string(),
        codepoint_set(
            "Twemoji",
            "twemoji",
            NamingPolicy::LowerHex,
            Some("SVGs are taken from assets/svg in the tagged source archive"),
            Some(format!(
                "https://github.com/twitter/twemoji/archive/refs/tags/v{TWEMOJI_VERSION}.zip"
            )),
        ),
    );
    sets.insert(
        "blobmoji".to_string(),
        codepoint_set("Blobmoji", "blobmoji", emoji_u(), underscore_note, None),
    );
    sets.insert(
        "notomoji".to_string(),
        codepoint_set("Noto Emoji", "notomoji", emoji_u(), underscore_note, None),
    );
    sets.insert(
        "sensamoji".to_string(),
        codepoint_set(
            "Sensa",
            "sensamoji",
            NamingPolicy::Literal,
            Some("Filenames are plain English names, not codepoints. Needs custom mapping."),
            None,
        ),
    );
    sets
}

impl Config {
    /// Load configuration from file
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .await
            .context("Failed to read config file")?;

        let config: Config =
            toml::from_str(&content).context("Failed to parse config file as TOML")?;

        Ok(config)
    }

    /// Try to load configuration from standard locations
    pub async fn load() -> Result<Self> {
        for path in Self::get_config_paths() {
            if path.exists() {
                return Self::load_from_file(&path).await;
            }
        }

        Ok(Self::default())
    }

    /// Get potential configuration file paths in order of preference
    pub fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from("emojimap.toml"),
            PathBuf::from(".emojimap.toml"),
        ];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("emojimap").join("config.toml"));
        }

        if let Some(home_dir) = dirs::home_dir() {
            paths.push(
                home_dir
                    .join(".config")
                    .join("emojimap")
                    .join("config.toml"),
            );
            paths.push(home_dir.join(".emojimap.toml"));
        }

        paths
    }

    pub fn get_root_dir(&self) -> PathBuf {
        let path = self.root_dir.clone().unwrap_or_else(|| PathBuf::from("."));
        Self::expand_tilde(&path)
    }

    /// Artifact directory, resolved against the root unless absolute
    pub fn get_data_dir(&self) -> PathBuf {
        let path = self
            .data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("public/dev/emoji"));
        self.resolve_path(&path)
    }

    /// Resolve a root-relative path (asset directories, data dir)
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        let expanded = Self::expand_tilde(path);
        if expanded.is_absolute() {
            expanded
        } else {
            self.get_root_dir().join(expanded)
        }
    }

    /// Absolute asset directory of a configured set
    pub fn asset_dir(&self, set_key: &str) -> EmojiResult<PathBuf> {
        let set = self.emoji.set(set_key)?;
        Ok(self.resolve_path(&set.asset_dir))
    }

    fn expand_tilde(path: &Path) -> PathBuf {
        match path.to_str() {
            Some(path_str) => PathBuf::from(shellexpand::tilde(path_str).into_owned()),
            None => path.to_path_buf(),
        }
    }

    pub fn get_unicode_url(&self) -> String {
        self.sources
            .as_ref()
            .and_then(|s| s.unicode_url.clone())
            .unwrap_or_else(|| DEFAULT_UNICODE_URL.to_string())
    }

    pub fn get_gemoji_url(&self) -> String {
        self.sources
            .as_ref()
            .and_then(|s| s.gemoji_url.clone())
            .unwrap_or_else(|| DEFAULT_GEMOJI_URL.to_string())
    }

    pub fn get_iamcal_url(&self) -> String {
        self.sources
            .as_ref()
            .and_then(|s| s.iamcal_url.clone())
            .unwrap_or_else(|| DEFAULT_IAMCAL_URL.to_string())
    }

    /// Check if verbose logging is enabled by default
    pub fn is_verbose_default(&self) -> bool {
        self.logging
            .as_ref()
            .and_then(|l| l.verbose)
            .unwrap_or(false)
    }

    /// Get the time format for log timestamps
    pub fn get_time_format(&self) -> String {
        self.logging
            .as_ref()
            .and_then(|l| l.time_format.clone())
            .unwrap_or_else(|| "[year]-[month]-[day] [hour]:[minute]:[second]".to_string())
    }

    /// Save configuration to file
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create config directory")?;
        }

        fs::write(path.as_ref(), content)
            .await
            .context("Failed to write config file")?;

        Ok(())
    }
}
