//! Generate OpenAPI specification files
//!
//! Writes the API description in JSON and YAML formats.

use repolens_web::openapi::{get_openapi_json, get_openapi_yaml};
use std::fs;
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Generating OpenAPI specification files...");

    let docs_dir = Path::new("repolens-web/docs");
    if !docs_dir.exists() {
        fs::create_dir_all(docs_dir)?;
    }

    let json_path = docs_dir.join("openapi.json");
    fs::write(&json_path, get_openapi_json()?)?;
    println!("Generated: {}", json_path.display());

    let yaml_path = docs_dir.join("openapi.yaml");
    fs::write(&yaml_path, get_openapi_yaml()?)?;
    println!("Generated: {}", yaml_path.display());

    Ok(())
}
