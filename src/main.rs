use clap::Parser;
use coinwatch::cli::{Cli, run};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
