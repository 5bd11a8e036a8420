//! services/api/src/bin/openapi.rs
//!
//! Writes the OpenAPI document for the summaries API.
//! Usage: `openapi [PATH]`; `-` prints to stdout, the default is `openapi.json`.

use api_lib::web::rest::ApiDoc;
use std::io::Write;
use utoipa::OpenApi;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let target = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "openapi.json".to_string());
    let json = ApiDoc::openapi().to_pretty_json()?;

    if target == "-" {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
    } else {
        std::fs::write(&target, json)?;
        eprintln!("OpenAPI document written to {}", target);
    }
    Ok(())
}
