use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser, Subcommand};
use keyweave_core::config::DriverConfig;
use keyweave_core::keymap::KeyOverride;
use keyweave_core::overrides::load_overrides;
use keyweave_core::{
    BuildReport, Keyboard, KeyboardOptions, QueueSink, RebuildOutcome, StaticBackend,
};
use std::process;
use tracing::{error, info, warn, Level};

mod cmd;
mod reports;

pub type CliKeyboard = Keyboard<StaticBackend, QueueSink>;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Hardware keymap description (JSON).
    #[arg(
        global = true,
        short = 'k',
        long,
        default_value = "data/keymaps/us.json"
    )]
    keymap: String,

    /// Driver config (JSON). Flags given on the command line win.
    #[arg(global = true, long)]
    config: Option<String>,

    /// Override file (`hardware_code,key` CSV).
    #[arg(global = true, short = 'o', long)]
    overrides: Option<String>,

    #[arg(global = true, long, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Map(cmd::map::MapArgs),
    Replay(cmd::replay::ReplayArgs),
    Simulate(cmd::simulate::SimulateArgs),
    Names(cmd::names::NamesArgs),
}

fn main() {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    tracing_subscriber::fmt()
        .with_max_level(if cli.debug { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    info!("🚀 Initializing Keyweave...");

    let (driver, sub_matches) = match &cli.command {
        Commands::Map(args) => (&args.driver, subcommand(&matches, "map")),
        Commands::Replay(args) => (&args.driver, subcommand(&matches, "replay")),
        Commands::Simulate(args) => (&args.driver, subcommand(&matches, "simulate")),
        Commands::Names(args) => (&args.driver, subcommand(&matches, "names")),
    };

    let config = match &cli.config {
        Some(path) => {
            info!("⚙️  Loading Driver Config from: {}", path);
            let mut file_config = DriverConfig::load_from_file(path).unwrap_or_else(|e| {
                error!("{}", e);
                process::exit(1);
            });
            file_config.merge_from_cli(driver, sub_matches);
            file_config
        }
        None => driver.clone(),
    };

    let overrides = match &cli.overrides {
        Some(path) => {
            info!("🔧 Loading Overrides: {}", path);
            load_overrides(path).unwrap_or_else(|e| {
                error!("{}", e);
                process::exit(1);
            })
        }
        None => Vec::new(),
    };

    info!("📂 Loading Keymap: {}", cli.keymap);
    let (keyboard, report) = open_keyboard(&cli.keymap, &config, overrides);

    match cli.command {
        Commands::Map(args) => cmd::map::run(args, &keyboard, &report),
        Commands::Replay(args) => cmd::replay::run(args, &keyboard),
        Commands::Simulate(args) => cmd::simulate::run(args, &keyboard),
        Commands::Names(args) => cmd::names::run(args, &keyboard),
    }
}

fn subcommand<'a>(matches: &'a ArgMatches, name: &str) -> &'a ArgMatches {
    matches.subcommand_matches(name).unwrap_or(matches)
}

fn open_keyboard(
    path: &str,
    config: &DriverConfig,
    overrides: Vec<KeyOverride>,
) -> (CliKeyboard, BuildReport) {
    let backend = StaticBackend::from_file(path, config.modifier_mode).unwrap_or_else(|e| {
        error!("\n❌ FATAL ERROR LOADING KEYMAP:");
        error!("   {}", e);
        process::exit(1);
    });

    let options = KeyboardOptions {
        overrides,
        ..KeyboardOptions::from_config(config)
    };
    let keyboard = Keyboard::new(
        backend,
        QueueSink::with_capacity(config.event_capacity),
        options,
    );

    match keyboard.rebuild_mapping() {
        RebuildOutcome::Rebuilt(report) => {
            if report.capacity_exceeded() {
                warn!(
                    "⚠️  {} hardware codes have no logical key",
                    report.unassigned.len()
                );
            }
            (keyboard, report)
        }
        RebuildOutcome::Retained(e) | RebuildOutcome::Degraded(e) => {
            error!("❌ Could not build a mapping: {}", e);
            process::exit(1);
        }
    }
}
