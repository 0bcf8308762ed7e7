use anyhow::Result;
use serde::Serialize;

use crate::core::error::{EmojiResult, Envelope};
use crate::symbols::SYMBOL_INDICATOR_ERROR;

/// Prints operation results either as the JSON envelope or as human text
#[derive(Debug, Clone, Copy)]
pub struct Output {
    json: bool,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    /// Print `result` and report whether it succeeded
    ///
    /// `human` is only called for successes outside JSON mode. Failures go to
    /// stderr in human mode and to stdout as a failure envelope in JSON mode.
    pub fn emit<T, F>(&self, result: EmojiResult<T>, human: F) -> Result<bool>
    where
        T: Serialize,
        F: FnOnce(&T),
    {
        match result {
            Ok(data) => {
                if self.json {
                    println!("{}", serde_json::to_string_pretty(&Envelope::ok(&data))?);
                } else {
                    human(&data);
                }
                Ok(true)
            }
            Err(e) => {
                if self.json {
                    println!("{}", serde_json::to_string_pretty(&Envelope::<()>::err(&e))?);
                } else {
                    eprintln!("{SYMBOL_INDICATOR_ERROR} {e} [{}]", e.code());
                }
                Ok(false)
            }
        }
    }
}
