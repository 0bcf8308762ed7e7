//! Per-set rules translating a codepoint key to a filename or public URL and back.
//!
//! Every provider picks one [`NamingPolicy`] variant. The transforms are pure
//! functions of the key plus the set's policy and extension, which is what
//! lets the set map builder compare a disk listing against table keys.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Case transform applied to codepoint keys when forming filenames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilenameCase {
    Lower,
    Upper,
    Asis,
}

/// How a set derives filenames from codepoint keys
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum NamingPolicy {
    /// `1F44D-1F3FB.svg`
    UpperHex,
    /// `1f44d-1f3fb.svg`
    LowerHex,
    /// `emoji_u1f44d_1f3fb.svg`
    PrefixedUnderscoreHex { prefix: String },
    /// Filenames are display names, not codepoints
    Literal,
}

impl NamingPolicy {
    pub fn case(&self) -> FilenameCase {
        match self {
            Self::UpperHex => FilenameCase::Upper,
            Self::LowerHex | Self::PrefixedUnderscoreHex { .. } => FilenameCase::Lower,
            Self::Literal => FilenameCase::Asis,
        }
    }

    /// True when filenames cannot be derived from codepoints at all
    pub fn is_name_based(&self) -> bool {
        matches!(self, Self::Literal)
    }

    /// Filename stem (no extension) for a key
    pub fn stem_for(&self, code: &str) -> String {
        match self {
            Self::UpperHex => code.to_uppercase(),
            Self::LowerHex => code.to_lowercase(),
            Self::PrefixedUnderscoreHex { prefix } => {
                format!("{prefix}{}", code.to_lowercase().replace('-', "_"))
            }
            Self::Literal => code.to_string(),
        }
    }

    pub fn filename_for(&self, code: &str, ext: &str) -> String {
        format!("{}{ext}", self.stem_for(code))
    }

    /// Inverse of [`filename_for`](Self::filename_for)
    ///
    /// Returns `None` when the extension does not match or a required prefix is
    /// absent. For [`NamingPolicy::Literal`] the stem comes back unchanged.
    pub fn code_from_filename(&self, filename: &str, ext: &str) -> Option<String> {
        let stem = filename.strip_suffix(ext)?;
        if stem.is_empty() {
            return None;
        }

        match self {
            Self::UpperHex | Self::LowerHex => Some(stem.to_uppercase()),
            Self::PrefixedUnderscoreHex { prefix } => {
                let rest = stem.strip_prefix(prefix.as_str())?;
                if rest.is_empty() {
                    return None;
                }
                Some(rest.replace('_', "-").to_uppercase())
            }
            Self::Literal => Some(stem.to_string()),
        }
    }
}

impl fmt::Display for NamingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UpperHex => write!(f, "upper-hex"),
            Self::LowerHex => write!(f, "lower-hex"),
            Self::PrefixedUnderscoreHex { prefix } => write!(f, "prefixed-underscore-hex ({prefix})"),
            Self::Literal => write!(f, "literal"),
        }
    }
}
