use clap::Parser;
use postester::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
