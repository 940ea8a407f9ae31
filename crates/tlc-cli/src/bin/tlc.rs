use anyhow::Result;
use clap::Parser;
use tlc_cli::{run, CliArgs};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = CliArgs::parse();

    let default_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(format!("tlc={default_level}"))))
        .with_writer(std::io::stderr)
        .init();

    let results = run(&args)?;

    let mut any_errors = false;
    for result in &results {
        if !result.diagnostics.is_empty() {
            if args.json {
                let payload: Vec<_> = result.diagnostics.iter().collect();
                eprintln!("{}", serde_json::to_string(&payload)?);
            } else {
                for diagnostic in result.diagnostics.iter() {
                    eprintln!("{}:{diagnostic}", result.path.display());
                }
            }
        }
        any_errors |= result.diagnostics.errored();
    }

    if any_errors {
        std::process::exit(1);
    }
    Ok(())
}
