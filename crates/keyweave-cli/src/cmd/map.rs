use crate::reports;
use crate::CliKeyboard;
use clap::Args;
use keyweave_core::config::DriverConfig;
use keyweave_core::keymap::HardwareCode;
use keyweave_core::{BuildReport, KeyboardBackend};
use serde::Serialize;
use std::process;
use tracing::error;

#[derive(Args, Debug, Clone)]
pub struct MapArgs {
    #[command(flatten)]
    pub driver: DriverConfig,

    /// Print the build report and keycode table as JSON.
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Also list codes the keymap reports no symbol for.
    #[arg(short, long, default_value_t = false)]
    pub all: bool,
}

#[derive(Serialize)]
struct KeycodeEntry {
    code: HardwareCode,
    symbols: Vec<String>,
    key: i32,
    name: Option<String>,
}

#[derive(Serialize)]
struct MapOutput<'a> {
    report: &'a BuildReport,
    keycodes: Vec<KeycodeEntry>,
}

pub fn run(args: MapArgs, keyboard: &CliKeyboard, report: &BuildReport) {
    let desc = keyboard.backend().query_keymap().unwrap_or_else(|e| {
        error!("{}", e);
        process::exit(1);
    });
    let mapping = keyboard.mapping();

    if args.json {
        let keycodes = mapping
            .keycodes()
            .iter()
            .filter(|(_, slot)| args.all || slot.sentinel() >= 0)
            .map(|(code, slot)| KeycodeEntry {
                code,
                symbols: desc.symbols_for(code).to_vec(),
                key: slot.sentinel(),
                name: slot.key().map(|k| mapping.name_of(k)),
            })
            .collect();
        let output = MapOutput { report, keycodes };
        match serde_json::to_string_pretty(&output) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!("Failed to serialize mapping: {}", e);
                process::exit(1);
            }
        }
        return;
    }

    reports::print_build_summary(report);
    reports::print_keycodes(&desc, &mapping, args.all);
}
