use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use crate::cli::output::Output;
use crate::core::base::EnrichReport;
use crate::core::console::{BaseBuildSummary, Console};
use crate::symbols::*;

#[derive(Parser)]
pub enum BaseCommands {
    /// Build emoji-base.json from the Unicode emoji-test.txt enumeration
    Build {
        /// Read emoji-test.txt from a local file instead of downloading it
        #[arg(long, conflicts_with = "from_assets")]
        source: Option<PathBuf>,

        /// Build bare entries from the asset files already on disk (no network)
        #[arg(long)]
        from_assets: bool,
    },
    /// Merge gemoji aliases and tags (matched by character)
    MergeGemoji {
        /// Read emoji.json from a local file instead of downloading it
        #[arg(long)]
        source: Option<PathBuf>,
    },
    /// Merge iamcal emoji-data short names (matched by codepoint)
    MergeIamcal {
        /// Read emoji.json from a local file instead of downloading it
        #[arg(long)]
        source: Option<PathBuf>,
    },
    /// Label every entry with its skin tone
    SkinTones,
}

/// Handle base table subcommands
pub async fn handle_base_command(
    command: BaseCommands,
    console: &Console,
    output: Output,
) -> Result<bool> {
    match command {
        BaseCommands::Build {
            from_assets: true, ..
        } => output.emit(console.build_base_from_assets().await, print_build),
        BaseCommands::Build { source, .. } => {
            output.emit(console.build_base(source.as_deref()).await, print_build)
        }
        BaseCommands::MergeGemoji { source } => output.emit(
            console.merge_gemoji(source.as_deref()).await,
            |report| print_enrich("Merged gemoji", report),
        ),
        BaseCommands::MergeIamcal { source } => output.emit(
            console.merge_iamcal(source.as_deref()).await,
            |report| print_enrich("Merged iamcal", report),
        ),
        BaseCommands::SkinTones => output.emit(console.apply_skin_tones().await, |report| {
            print_enrich("Labeled skin tones", report)
        }),
    }
}

fn print_build(summary: &BaseBuildSummary) {
    println!(
        "{SYMBOL_INDICATOR_SUCCESS} Built base table with {} entries {SYMBOL_CONTENT_ARROW_RIGHT} {}",
        summary.entries,
        summary.path.display()
    );
    if !summary.scanned_sets.is_empty() {
        println!(
            "{SYMBOL_CONTENT_FOLDER} Scanned sets: {}",
            summary.scanned_sets.join(", ")
        );
    }
}

fn print_enrich(what: &str, report: &EnrichReport) {
    println!(
        "{SYMBOL_INDICATOR_SUCCESS} {what}: {} of {} entries updated",
        report.updated, report.total
    );
    if report.conflicts > 0 {
        println!(
            "{SYMBOL_INDICATOR_WARNING} {} shortcodes skipped (already used by another emoji)",
            report.conflicts
        );
    }
}
