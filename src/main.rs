//! Quandl Function Runner
//!
//! One-shot command line invocation of a pack function:
//!
//!   quandl_runner quandl-series NASDAQOMX/XNDXT25 "trade date, low, high" 2019-09-01 2019-09-30
//!
//! Arguments are parsed as JSON scalars where possible and passed to the
//! function positionally; the resulting grid prints as JSON to stdout.

use eyre::Result;
use serde_json::Value;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use quandl_functions::functions::{self, manifest};
use quandl_functions::{PackConfig, QuandlClient};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (stdout carries the grid, so keep logs quiet)
    FmtSubscriber::builder()
        .with_max_level(Level::WARN)
        .with_target(false)
        .compact()
        .init();

    let mut argv = std::env::args().skip(1);
    let name = match argv.next() {
        Some(name) => name,
        None => {
            print_usage();
            return Ok(());
        }
    };

    let params: Vec<Value> = argv.map(parse_arg).collect();

    if std::env::var("QUANDL_API_KEY").is_err() {
        eprintln!("⚠️  QUANDL_API_KEY not set!");
        eprintln!("   export QUANDL_API_KEY=\"your-key\"");
        eprintln!();
    }

    let config = PackConfig::default();
    let client = QuandlClient::new(&config)?;

    let grid = functions::invoke(&client, &name, &params).await?;
    println!("{}", serde_json::to_string_pretty(grid.rows())?);

    Ok(())
}

/// CLI args become JSON scalars where they parse as such, else strings
fn parse_arg(raw: String) -> Value {
    serde_json::from_str(&raw).unwrap_or_else(|_| Value::String(raw))
}

fn print_usage() {
    println!("Usage: quandl_runner <function> [args...]");
    println!();
    println!("Functions:");
    for spec in manifest::manifest() {
        println!("  {:<14} {}", spec.name, spec.description);
        for example in spec.examples {
            println!("      e.g. {}", example);
        }
    }
}
