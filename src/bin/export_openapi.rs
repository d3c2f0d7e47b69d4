//! Print or write the OpenAPI document
//!
//! ```text
//! export_openapi                       # stdout
//! export_openapi --output openapi.json # write file
//! export_openapi --check openapi.json  # fail if the file is stale
//! ```

use anyhow::{Context, bail};
use credit_exchange::gateway::openapi::ApiDoc;
use utoipa::OpenApi;

enum Action {
    Print,
    Write(String),
    Check(String),
}

fn parse_args(args: &[String]) -> anyhow::Result<Action> {
    match args {
        [] => Ok(Action::Print),
        [flag, path] if flag == "--output" => Ok(Action::Write(path.clone())),
        [flag, path] if flag == "--check" => Ok(Action::Check(path.clone())),
        _ => bail!("usage: export_openapi [--output <path> | --check <path>]"),
    }
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let action = parse_args(&args)?;

    let json = ApiDoc::openapi()
        .to_pretty_json()
        .context("Failed to serialize OpenAPI document")?;

    match action {
        Action::Print => println!("{}", json),
        Action::Write(path) => {
            std::fs::write(&path, &json).with_context(|| format!("Failed to write {}", path))?;
            eprintln!("OpenAPI document written to {}", path);
        }
        Action::Check(path) => {
            let on_disk = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path))?;
            if on_disk.trim_end() != json.trim_end() {
                bail!("{} is out of date; regenerate with --output {}", path, path);
            }
            eprintln!("{} is up to date", path);
        }
    }
    Ok(())
}
