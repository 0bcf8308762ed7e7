use anyhow::Result;
use clap::Parser;

use crate::cli::output::Output;
use crate::core::console::Console;
use crate::symbols::*;

#[derive(Parser)]
pub enum MapCommands {
    /// Rebuild a set's asset map and diagnostic report from its asset directory
    Build {
        /// Set key (see `emojimap sets`)
        set: String,
    },
    /// Show whether a set's map has been built
    Status {
        /// Set key (see `emojimap sets`)
        set: String,
    },
}

/// Handle set map subcommands
pub async fn handle_map_command(command: MapCommands, console: &Console, output: Output) -> Result<bool> {
    match command {
        MapCommands::Build { set } => output.emit(console.build_map(&set).await, |summary| {
            println!(
                "{SYMBOL_INDICATOR_SUCCESS} {}: {} mapped, {} missing, {} unused, {} manual",
                summary.set, summary.mapped, summary.missing, summary.unused, summary.manual
            );
            println!("{SYMBOL_CONTENT_FILE} {}", summary.map_path.display());
            println!("{SYMBOL_INDICATOR_INFO} {}", summary.report_path.display());
        }),
        MapCommands::Status { set } => {
            let file = console.store().set_map_path(&set);
            output.emit(console.map_status(&set).await, |status| {
                if status.exists {
                    println!(
                        "{SYMBOL_CONTENT_FILE} {}: {} entries, modified {}",
                        file.display(),
                        status.size.unwrap_or_default(),
                        status.date.as_deref().unwrap_or("unknown")
                    );
                } else {
                    println!(
                        "{SYMBOL_INDICATOR_WARNING} {} has not been built",
                        file.display()
                    );
                }
            })
        }
    }
}
