use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use slotforge_protocol::config::EngineConfig;
use std::process;
use tracing::{error, info};

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about = "Weekly timetable generator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON file with search parameters and penalty weights.
    #[arg(global = true, long)]
    config: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Generate(cmd::generate::GenerateArgs),
    Status(cmd::status::StatusArgs),
}

fn main() {
    tracing_subscriber::fmt::init();

    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    match cli.command {
        Commands::Generate(args) => {
            let mut config = args.config.clone();
            if let Some(path) = &cli.config {
                info!("⚙️  Loading config from: {}", path);
                let mut file_config = EngineConfig::load_from_file(path).unwrap_or_else(|e| {
                    error!("❌ {}", e);
                    process::exit(1);
                });
                if let Some(sub) = matches.subcommand_matches("generate") {
                    file_config.merge_from_cli(&args.config, sub);
                }
                config = file_config;
            }
            process::exit(cmd::generate::run(args, config));
        }
        Commands::Status(args) => process::exit(cmd::status::run(args)),
    }
}
