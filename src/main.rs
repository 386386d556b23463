use clap::Parser;

use flatten_json::{run, Cli};

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Cli::parse();
    run(args)
}
