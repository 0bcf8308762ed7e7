use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced by the console operations
///
/// Every variant maps onto a stable machine-readable code (see [`EmojiError::code`])
/// which is what ends up in the `error.code` field of an [`Envelope`].
#[derive(Debug, Error)]
pub enum EmojiError {
    #[error("emoji-base.json not found at {0}. Build the base table first.")]
    MissingBase(PathBuf),

    #[error("Asset directory not found: {0}. Download or install the assets for this set first.")]
    MissingAssetDir(PathBuf),

    #[error("Invalid or missing set key: '{0}'")]
    InvalidSetKey(String),

    #[error("No emoji assets found in any set directories")]
    NoAssetsFound,

    #[error("No asset bundle is configured for set '{0}'")]
    NoBundle(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Failed to download {url}: {reason}")]
    Transport { url: String, reason: String },

    #[error("Failed to parse {what}: {reason}")]
    Parse { what: String, reason: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl EmojiError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingBase(_) => "MISSING_EMOJI_BASE",
            Self::MissingAssetDir(_) => "MISSING_ASSET_DIR",
            Self::InvalidSetKey(_) => "INVALID_SET_KEY",
            Self::NoAssetsFound => "NO_ASSETS_FOUND",
            Self::NoBundle(_) => "NO_BUNDLE",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Transport { .. } => "TRANSPORT_ERROR",
            Self::Parse { .. } => "PARSE_ERROR",
            Self::Io { .. } => "IO_ERROR",
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(what: impl Into<String>, reason: impl ToString) -> Self {
        Self::Parse {
            what: what.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn transport(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::Transport {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

pub type EmojiResult<T> = std::result::Result<T, EmojiError>;

/// Structured error body carried by a failed [`Envelope`]
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// Uniform response shape for every console operation
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Envelope<T: Serialize> {
    Success { success: bool, data: T },
    Failure { success: bool, error: ErrorBody },
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self::Success {
            success: true,
            data,
        }
    }

    pub fn err(error: &EmojiError) -> Self {
        Self::Failure {
            success: false,
            error: ErrorBody {
                code: error.code().to_string(),
                message: error.to_string(),
            },
        }
    }
}
