// Console symbols printed ahead of human-readable output
// Named by meaning rather than by the glyph they happen to use

/// Status and feedback symbols
pub const SYMBOL_INDICATOR_SUCCESS: &str = "✅";
pub const SYMBOL_INDICATOR_ERROR: &str = "❌";
pub const SYMBOL_INDICATOR_WARNING: &str = "⚠️";
pub const SYMBOL_INDICATOR_INFO: &str = "📋";

/// Content and data symbols
pub const SYMBOL_CONTENT_FILE: &str = "📄";
pub const SYMBOL_CONTENT_FOLDER: &str = "📁";
pub const SYMBOL_CONTENT_PACKAGE: &str = "📦";
pub const SYMBOL_CONTENT_TRASH: &str = "🗑️";
pub const SYMBOL_CONTENT_ARROW_RIGHT: &str = "→";

/// Set markers in the provider listing
pub const SYMBOL_SET_ACTIVE: &str = "★";
pub const SYMBOL_SET_FALLBACK: &str = "☆";
