//! services/api/src/bin/openapi.rs
//!
//! Dumps the quiz API's OpenAPI document. Usage: `openapi [PATH]`, where
//! `PATH` defaults to `openapi.json` and `-` prints to stdout.

use api_lib::web::rest::ApiDoc;
use std::io::Write;
use utoipa::OpenApi;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let target = std::env::args().nth(1).unwrap_or_else(|| "openapi.json".to_string());
    let document = ApiDoc::openapi().to_pretty_json()?;

    if target == "-" {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", document)?;
    } else {
        std::fs::write(&target, document)?;
        eprintln!("Wrote the quiz API document to {}", target);
    }
    Ok(())
}
