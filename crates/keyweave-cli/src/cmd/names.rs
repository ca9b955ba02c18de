use crate::reports;
use crate::CliKeyboard;
use clap::Args;
use keyweave_core::config::DriverConfig;
use keyweave_core::KeyboardBackend;

#[derive(Args, Debug, Clone)]
pub struct NamesArgs {
    #[command(flatten)]
    pub driver: DriverConfig,

    /// Include unnamed logical keys no hardware code maps to.
    #[arg(short, long, default_value_t = false)]
    pub all: bool,
}

pub fn run(args: NamesArgs, keyboard: &CliKeyboard) {
    println!("\n🔤 === KEY NAMES: {} === 🔤", keyboard.backend().name());
    reports::print_names(&keyboard.mapping(), args.all);
}
