use std::process::ExitCode;

use clap::Parser;
use listset_bench::{BenchConfig, run};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = BenchConfig::parse();

    match run(&config) {
        Ok(report) => {
            println!("{report}");
            tracing::info!(
                kind = %report.kind,
                threads = report.threads,
                add_threads = report.classes.add,
                remove_threads = report.classes.remove,
                contains_threads = report.classes.contains,
                throughput = report.throughput(),
                "benchmark finished"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
