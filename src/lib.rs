// Library interface for emojimap
pub mod cli;
pub mod config;
pub mod core;
pub mod symbols;

// Re-export commonly used types
pub use crate::config::{Config, EmojiSetConfig, EmojiSystemConfig};
pub use crate::core::console::Console;
pub use crate::core::error::{EmojiError, EmojiResult, Envelope};
pub use crate::core::naming::NamingPolicy;
pub use crate::core::resolve::{get_display, normalize, resolve, Display, DisplayOptions};
