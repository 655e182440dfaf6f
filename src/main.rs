use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser, Subcommand};
use shotlens::analysis::RallyBundle;
use shotlens::config::EngineConfig;
use std::process;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Rally file (`meta_info` + `rally_info`).
    #[arg(global = true, short, long, default_value = "data/rally.json")]
    rally: String,

    /// Directory holding `stroke<N>_analysis.json` files.
    #[arg(global = true, short, long, default_value = "data/analysis")]
    analysis_dir: String,

    /// JSON engine config; command-line flags override it.
    #[arg(global = true, long)]
    config: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Inspect(cmd::inspect::InspectArgs),
    Simulate(cmd::simulate::SimulateArgs),
}

fn resolve_config(path: Option<&str>, cli: &EngineConfig, matches: &ArgMatches) -> EngineConfig {
    let config = match path {
        Some(path) => {
            info!("Loading engine config from {}", path);
            let mut config = EngineConfig::load_from_file(path).unwrap_or_else(|e| {
                error!("{}", e);
                eprintln!("{}", e);
                process::exit(1);
            });
            config.merge_from_cli(cli, matches);
            config
        }
        None => cli.clone(),
    };
    // Flags are checked after the merge, like file values.
    if let Err(e) = config.validate() {
        error!("{}", e);
        eprintln!("{}", e);
        process::exit(1);
    }
    config
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Raw matches tell user-typed flags apart from defaults.
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    let (cli_config, sub_name) = match &cli.command {
        Commands::Inspect(args) => (&args.config, "inspect"),
        Commands::Simulate(args) => (&args.config, "simulate"),
    };
    let Some(sub_matches) = matches.subcommand_matches(sub_name) else {
        error!("missing subcommand matches for {}", sub_name);
        process::exit(2);
    };
    let config = resolve_config(cli.config.as_deref(), cli_config, sub_matches);

    info!("Loading rally {} (analysis: {})", cli.rally, cli.analysis_dir);
    let bundle = RallyBundle::load(&cli.rally, &cli.analysis_dir).unwrap_or_else(|e| {
        error!("{}", e);
        eprintln!("{}", e);
        process::exit(1);
    });

    let result = match cli.command {
        Commands::Inspect(args) => cmd::inspect::run(args, bundle, config),
        Commands::Simulate(args) => cmd::simulate::run(args, bundle, config),
    };
    if let Err(e) = result {
        eprintln!("{}", e);
        process::exit(1);
    }
}
