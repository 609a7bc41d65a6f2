use clap::Parser;
use datefold::cli::{OrganizeOptions, run_cli_with_config};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "datefold",
    version,
    about = "Copy images into year-month folders next to the source directory"
)]
struct Args {
    /// Directory containing the images to organize
    source_directory: Option<PathBuf>,

    /// Show where files would go without copying anything
    #[arg(long)]
    dry_run: bool,

    /// Print the summary as JSON instead of progress lines
    #[arg(long)]
    json: bool,

    /// Path to a TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    let Some(source_dir) = args.source_directory else {
        println!("Usage: datefold <source_directory> [--dry-run] [--json] [--config <FILE>]");
        println!("Please provide the path to your image directory.");
        return;
    };

    let options = OrganizeOptions {
        dry_run: args.dry_run,
        json: args.json,
    };

    if let Err(e) = run_cli_with_config(&source_dir, options, args.config.as_deref()) {
        eprintln!("Error: {}", e);
    }
}
