use anyhow::Result;
use clap::Args;

use crate::cli::output::Output;
use crate::core::console::Console;
use crate::core::resolve::{Display, DisplayOptions};
use crate::symbols::*;

#[derive(Args)]
pub struct ResolveArgs {
    /// Emoji character, codepoint key (1F44B) or shortcode (:wave:)
    pub token: String,

    /// Preferred set (defaults to the configured active set)
    #[arg(long)]
    pub set: Option<String>,

    /// Fallback set (defaults to the configured fallback set)
    #[arg(long)]
    pub fallback: Option<String>,

    /// Rendered size in pixels
    #[arg(long)]
    pub size: Option<u32>,

    /// CSS class for the rendered element
    #[arg(long = "class")]
    pub class_name: Option<String>,
}

impl From<&ResolveArgs> for DisplayOptions {
    fn from(args: &ResolveArgs) -> Self {
        Self {
            preferred_set: args.set.clone(),
            fallback_set: args.fallback.clone(),
            size: args.size,
            class_name: args.class_name.clone(),
        }
    }
}

pub async fn handle_resolve_command(args: ResolveArgs, console: &Console, output: Output) -> Result<bool> {
    let options = DisplayOptions::from(&args);
    output.emit(console.resolve(&args.token, &options).await, |outcome| {
        match (&outcome.code, &outcome.display) {
            (Some(code), Display::Image { set, .. }) => {
                println!("{SYMBOL_INDICATOR_SUCCESS} {} {SYMBOL_CONTENT_ARROW_RIGHT} {code} ({set})", outcome.token);
            }
            (Some(code), Display::Text { .. }) => {
                println!("{SYMBOL_INDICATOR_WARNING} {} {SYMBOL_CONTENT_ARROW_RIGHT} {code} (no asset in any set)", outcome.token);
            }
            (None, _) => {
                println!("{SYMBOL_INDICATOR_WARNING} {} is not a known emoji", outcome.token);
            }
        }
        println!("{}", outcome.html);
    })
}
