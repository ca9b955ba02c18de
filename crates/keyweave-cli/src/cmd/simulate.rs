use crate::reports;
use crate::CliKeyboard;
use clap::Args;
use keyweave_core::config::DriverConfig;
use keyweave_core::event::RawKeyEvent;
use keyweave_core::{KeyEventKind, LogicalKey};
use std::collections::{BTreeSet, HashMap};
use std::process;
use tracing::{error, info, warn};

#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub driver: DriverConfig,

    /// Number of raw key actions to generate.
    #[arg(short = 'n', long, default_value_t = 10_000)]
    pub steps: usize,

    #[arg(short = 'S', long)]
    pub seed: Option<u64>,
}

pub fn run(args: SimulateArgs, keyboard: &CliKeyboard) {
    let mut rng = if let Some(s) = args.seed {
        fastrand::Rng::with_seed(s)
    } else {
        fastrand::Rng::new()
    };

    let mapping = keyboard.mapping();
    let codes: Vec<u32> = mapping
        .keycodes()
        .iter()
        .filter(|(_, slot)| slot.key().is_some())
        .map(|(code, _)| code)
        .collect();

    if codes.is_empty() {
        error!("❌ Keymap has no assigned codes to simulate");
        process::exit(1);
    }
    if args.driver.emergency_terminate {
        warn!("⚠️  Emergency terminate is enabled; a random chord may stop this process");
    }

    info!(
        "🎲 Simulating {} key actions over {} codes",
        args.steps,
        codes.len()
    );

    let mut counts: HashMap<KeyEventKind, usize> = HashMap::new();
    let mut expected: BTreeSet<LogicalKey> = BTreeSet::new();
    let mut dropped = 0usize;

    for _ in 0..args.steps {
        let code = codes[rng.usize(..codes.len())];
        let mut raw = if rng.bool() {
            RawKeyEvent::press(code)
        } else {
            RawKeyEvent::release(code)
        };
        if let Some(c) = char::from_u32(rng.u32(0x61..0x7b)) {
            raw = raw.with_char(c);
        }

        let transition = keyboard.handle_raw_event(&mut raw);
        if transition.kind.is_some() && !transition.emitted {
            dropped += 1;
        }

        for event in keyboard.inspect(|_, sink| sink.drain()) {
            *counts.entry(event.kind).or_default() += 1;
            match event.kind {
                KeyEventKind::Press | KeyEventKind::Repeat => expected.insert(event.key),
                KeyEventKind::Release => expected.remove(&event.key),
            };
        }
    }

    reports::print_event_counts(&counts);

    let snapshot = keyboard.snapshot_state();
    let actual: BTreeSet<LogicalKey> = snapshot.down_keys().collect();
    reports::print_down_keys(&snapshot, |k| mapping.name_of(k));

    if dropped > 0 {
        warn!("⚠️  {} events found the queue full", dropped);
    }
    if actual != expected {
        error!(
            "❌ State store disagrees with the event stream: store {:?}, events {:?}",
            actual, expected
        );
        process::exit(1);
    }
    println!("\n✅ State store matches the event stream ({} keys down)", actual.len());
}
