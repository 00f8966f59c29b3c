use super::{json_pretty, EXIT_MANIFEST_ERROR, EXIT_SUCCESS};
use std::path::Path;
use tundra_schema::{parse_manifest_file, ManifestError};

pub fn run(manifest: &Path, json: bool) -> Result<u8, String> {
    tracing::debug!(path = %manifest.display(), "validating manifest");
    match parse_manifest_file(manifest) {
        Ok(validated) => {
            if json {
                println!(
                    "{}",
                    json_pretty(&serde_json::json!({
                        "valid": true,
                        "project": validated.project.name,
                    }))?
                );
            } else {
                println!("✓ {} is a valid manifest", manifest.display());
            }
            Ok(EXIT_SUCCESS)
        }
        Err(ManifestError::Invalid(violations)) => {
            if json {
                println!(
                    "{}",
                    json_pretty(&serde_json::json!({
                        "valid": false,
                        "violations": violations,
                    }))?
                );
            } else {
                eprintln!("✗ {} failed validation:", manifest.display());
                for violation in &violations {
                    eprintln!("  {violation}");
                }
            }
            Ok(EXIT_MANIFEST_ERROR)
        }
        Err(other) => Err(other.to_string()),
    }
}
