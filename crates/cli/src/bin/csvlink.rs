// csvlink - join matching rows of two CSV files

use std::process::ExitCode;

use clap::Parser;
use csvdedupe_cli::link::{run, LinkArgs};

fn main() -> ExitCode {
    csvdedupe_cli::finish(run(LinkArgs::parse()))
}
