use clap::Parser;
use preview_filter_lib::cli::{self, Args};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set RUST_LOG to control log level, e.g. RUST_LOG=preview_filter_lib=debug
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let args = Args::parse();
    let summary = cli::run(&args)?;

    println!(
        "presented {} frames, final filter {}",
        summary.presented, summary.final_filter
    );
    println!("{}", serde_json::to_string_pretty(&summary.diagnostics)?);
    Ok(())
}
