use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use clap_mangen::Man;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use emojimap::cli::assets::{handle_assets_command, AssetsCommands};
use emojimap::cli::base::{handle_base_command, BaseCommands};
use emojimap::cli::map::{handle_map_command, MapCommands};
use emojimap::cli::output::Output;
use emojimap::cli::resolve::{handle_resolve_command, ResolveArgs};
use emojimap::core::console::{Console, SetSummary};
use emojimap::core::fetch::HttpSource;
use emojimap::symbols::*;
use emojimap::Config;

#[derive(Parser)]
#[command(name = "emojimap")]
#[command(about = "Dev console for emoji asset metadata: base table, set maps and resolution")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Args {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging (overrides config file)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print the {success, data | error} JSON envelope instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Generate shell completions for the specified shell
    #[arg(long, value_enum)]
    completions: Option<Shell>,

    /// Generate man page
    #[arg(long)]
    man: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Parser)]
enum Commands {
    /// Build and enrich the canonical emoji table (emoji-base.json)
    Base {
        #[command(subcommand)]
        command: BaseCommands,
    },
    /// Build or inspect per-set asset maps
    Map {
        #[command(subcommand)]
        command: MapCommands,
    },
    /// Manage a set's asset files
    Assets {
        #[command(subcommand)]
        command: AssetsCommands,
    },
    /// Resolve a character, codepoint key or shortcode to its rendering
    Resolve(ResolveArgs),
    /// List the configured emoji sets
    Sets,
}

fn create_subscriber(
    verbose: bool,
    time_format: String,
) -> Box<dyn tracing::Subscriber + Send + Sync> {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    // Only a fixed set of formats is offered; the parsed description must be 'static
    let description = match time_format.as_str() {
        "[hour]:[minute]:[second]" => "[hour]:[minute]:[second]",
        "[month]-[day] [hour]:[minute]" => "[month]-[day] [hour]:[minute]",
        "[year]/[month]/[day] [hour]:[minute]:[second]" => {
            "[year]/[month]/[day] [hour]:[minute]:[second]"
        }
        other => {
            if other != "[year]-[month]-[day] [hour]:[minute]:[second]" {
                eprintln!("Custom time format '{other}' not supported. Using default format.");
            }
            "[year]-[month]-[day] [hour]:[minute]:[second]"
        }
    };
    let format_desc = time::format_description::parse(description).unwrap_or_default();

    // Logs go to stderr so --json output on stdout stays parseable
    Box::new(
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(io::stderr)
            .with_timer(tracing_subscriber::fmt::time::LocalTime::new(format_desc))
            .finish(),
    )
}

fn print_sets(sets: &[SetSummary]) {
    println!("Configured emoji sets:");
    println!();

    for set in sets {
        let marker = if set.active {
            SYMBOL_SET_ACTIVE
        } else if set.fallback {
            SYMBOL_SET_FALLBACK
        } else {
            " "
        };
        println!(
            "{marker} {:<10} {:<12} {:<34} {}",
            set.key,
            set.name,
            set.naming.to_string(),
            set.asset_dir.display()
        );
        if let Some(notes) = &set.notes {
            println!("    {SYMBOL_INDICATOR_INFO} {notes}");
        }
    }

    println!();
    println!("{SYMBOL_SET_ACTIVE} active set   {SYMBOL_SET_FALLBACK} fallback set");
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let start_time = Instant::now();
    let args = Args::parse();

    // Handle --completions flag early
    if let Some(shell) = args.completions {
        let mut app = Args::command();
        generate(shell, &mut app, "emojimap", &mut io::stdout());
        return Ok(ExitCode::SUCCESS);
    }

    // Handle --man flag early
    if args.man {
        let app = Args::command();
        let man = Man::new(app);
        man.render(&mut io::stdout())?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = args.command else {
        let mut app = Args::command();
        app.print_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    // Load configuration
    let config = if let Some(config_path) = &args.config {
        Config::load_from_file(config_path).await?
    } else {
        Config::load().await?
    };

    // Determine verbose setting
    let verbose = args.verbose || config.is_verbose_default();
    let time_format = config.get_time_format();

    // Initialize logging
    let subscriber = create_subscriber(verbose, time_format);
    tracing::subscriber::set_global_default(subscriber)?;

    // Log custom config usage if applicable
    if let Some(config_path) = &args.config {
        info!("{SYMBOL_INDICATOR_INFO} Using custom config file: {}", config_path.display());
    }
    debug!("Artifacts directory: {}", config.get_data_dir().display());

    let output = Output::new(args.json);
    let console = Console::new(config, Arc::new(HttpSource::new()?));

    let succeeded = match command {
        Commands::Base { command } => handle_base_command(command, &console, output).await?,
        Commands::Map { command } => handle_map_command(command, &console, output).await?,
        Commands::Assets { command } => handle_assets_command(command, &console, output).await?,
        Commands::Resolve(resolve_args) => {
            handle_resolve_command(resolve_args, &console, output).await?
        }
        Commands::Sets => output.emit(Ok(console.list_sets()), |sets| print_sets(sets))?,
    };

    debug!("Finished in {:.2?}", start_time.elapsed());

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
