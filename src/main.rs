use clap::{Parser as ClapParser, Subcommand};
use cloudlens::cli::{self, ScanOptions};

#[derive(ClapParser)]
#[command(name = "cloudlens")]
#[command(about = "CloudLens - stream log records through pattern-capture pipelines")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a log stream, augmenting records with pattern captures
    Scan {
        /// Input file (reads from stdin if not provided)
        file: Option<String>,

        /// Parse the input as a JSON document instead of log lines
        #[arg(long)]
        json: bool,

        /// Capture pattern applied to each record (repeatable)
        #[arg(short, long = "pattern")]
        patterns: Vec<String>,

        /// Record key the patterns match against (defaults to "message")
        #[arg(short, long)]
        key: Option<String>,

        /// Pretty-print records
        #[arg(long)]
        pretty: bool,

        /// Print only the record count at end of stream
        #[arg(short, long)]
        quiet: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Scan {
            file,
            json,
            patterns,
            key,
            pretty,
            quiet,
        } => cli::execute_scan(&ScanOptions {
            file,
            json,
            patterns,
            key,
            pretty,
            quiet,
        }),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
