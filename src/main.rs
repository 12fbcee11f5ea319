use clap::Parser;
use trendlens::cli::{Cli, run};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
