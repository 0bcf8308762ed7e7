use anyhow::Result;
use clap::Parser;

use crate::cli::output::Output;
use crate::core::console::Console;
use crate::symbols::*;

#[derive(Parser)]
pub enum AssetsCommands {
    /// Show the contents of a set's asset directory
    Status {
        /// Set key (see `emojimap sets`)
        set: String,

        /// List every file, not just the count
        #[arg(short, long)]
        list: bool,
    },
    /// Download and unpack the asset bundle of one or more sets
    Download {
        /// Set keys with a configured bundle
        #[arg(required = true)]
        sets: Vec<String>,
    },
    /// Delete a set's asset directory
    Remove {
        /// Set key (see `emojimap sets`)
        set: String,
    },
}

/// Handle asset directory subcommands
pub async fn handle_assets_command(
    command: AssetsCommands,
    console: &Console,
    output: Output,
) -> Result<bool> {
    match command {
        AssetsCommands::Status { set, list } => {
            output.emit(console.asset_status(&set).await, |status| {
                if !status.exists {
                    println!("{SYMBOL_INDICATOR_WARNING} No asset directory for {set}");
                    return;
                }
                println!("{SYMBOL_CONTENT_FOLDER} {set}: {} files", status.file_count);
                if list {
                    for file in &status.files {
                        println!("  {file}");
                    }
                }
            })
        }
        AssetsCommands::Download { sets } => {
            output.emit(console.download_assets(&sets).await, |summaries| {
                for summary in summaries {
                    println!(
                        "{SYMBOL_CONTENT_PACKAGE} {}: {} files {SYMBOL_CONTENT_ARROW_RIGHT} {}",
                        summary.set,
                        summary.files,
                        summary.dir.display()
                    );
                }
            })
        }
        AssetsCommands::Remove { set } => output.emit(console.remove_assets(&set).await, |removed| {
            println!("{SYMBOL_CONTENT_TRASH} Removed {}", removed.dir.display());
        }),
    }
}
