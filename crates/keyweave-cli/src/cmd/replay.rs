use crate::reports;
use crate::CliKeyboard;
use clap::Args;
use keyweave_core::config::DriverConfig;
use keyweave_core::event::RawKeyEvent;
use keyweave_core::{KeyEvent, KwResult};
use serde::Serialize;
use std::fs;
use std::process;
use tracing::{error, info};

#[derive(Args, Debug, Clone)]
pub struct ReplayArgs {
    #[command(flatten)]
    pub driver: DriverConfig,

    /// JSON list of raw key events.
    #[arg(short, long)]
    pub events: String,

    /// Print emitted events and the final down set as JSON.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Serialize)]
struct ReplayOutput {
    events: Vec<KeyEvent>,
    down: Vec<u16>,
}

fn load_events(path: &str) -> KwResult<Vec<RawKeyEvent>> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn run(args: ReplayArgs, keyboard: &CliKeyboard) {
    let raw_events = load_events(&args.events).unwrap_or_else(|e| {
        error!("Failed to load events from {}: {}", args.events, e);
        process::exit(1);
    });
    info!("▶️  Replaying {} raw events", raw_events.len());

    let mut emitted = Vec::new();
    for mut raw in raw_events {
        keyboard.handle_raw_event(&mut raw);
        emitted.extend(keyboard.inspect(|_, sink| sink.drain()));
    }

    let state = keyboard.snapshot_state();

    if args.json {
        let output = ReplayOutput {
            events: emitted,
            down: state.down_keys().map(|k| k.0).collect(),
        };
        match serde_json::to_string_pretty(&output) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!("Failed to serialize events: {}", e);
                process::exit(1);
            }
        }
        return;
    }

    let mapping = keyboard.mapping();
    reports::print_events(&emitted, |k| mapping.name_of(k));
    reports::print_down_keys(&state, |k| mapping.name_of(k));
}
