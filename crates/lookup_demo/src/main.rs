#![forbid(unsafe_code)]

//! `lookup-demo`: drive a country lookup field from the command line.
//!
//! ```bash
//! cargo run -p lookup_demo -- --frames
//! ```

use clap::Parser;
use lookup_demo::cli::Cli;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let outcome = lookup_demo::run(&cli).await?;

    if cli.frames {
        for (i, frame) in outcome.frames.iter().enumerate() {
            println!("--- frame {i} ---\n{frame}");
        }
        println!("--- final ---");
    }
    println!("{}", outcome.view);
    println!();
    match &outcome.committed {
        Some(code) => println!("committed: {code}"),
        None => println!("committed: (none)"),
    }
    println!("changes: {}", outcome.changes.len());
    for err in &outcome.errors {
        println!("error: {err}");
    }

    Ok(())
}
