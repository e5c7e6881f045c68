// csvdedupe - write duplicate clusters back into a CSV file

use std::process::ExitCode;

use clap::Parser;
use csvdedupe_cli::dedupe::{run, DedupeArgs};

fn main() -> ExitCode {
    csvdedupe_cli::finish(run(DedupeArgs::parse()))
}
