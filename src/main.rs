mod commands;
mod gpxxml;
mod report;

use clap::{Parser, Subcommand};
use commands::InputReader;
use commands::info::info_command;
use commands::points::points_command;
use std::error::Error;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "gpxstats",
    about = "Distance, time and speed statistics for GPX tracks"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Summarise each track: distance, duration and speed statistics")]
    Info {
        /// GPX file to read, stdin when omitted
        file: Option<PathBuf>,

        /// Sphere radius for the total distance, e.g. 6371km
        #[arg(long)]
        radius: Option<String>,

        #[arg(long, value_enum, default_value_t = InputReader::Stream)]
        reader: InputReader,
    },

    #[command(about = "List every point with its distance, elapsed time and speeds")]
    Points {
        /// GPX file to read, stdin when omitted
        file: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = InputReader::Stream)]
        reader: InputReader,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    match cli.command {
        Commands::Info {
            file,
            radius,
            reader,
        } => info_command(file.as_deref(), radius.as_deref(), reader),
        Commands::Points { file, reader } => points_command(file.as_deref(), reader),
    }
}
