use super::EXIT_SUCCESS;
use std::path::Path;

pub fn run(output: Option<&Path>) -> Result<u8, String> {
    let schema = tundra_schema::schema_json();
    match output {
        Some(path) => {
            std::fs::write(path, format!("{schema}\n"))
                .map_err(|e| format!("failed to write schema to {}: {e}", path.display()))?;
            tracing::debug!(path = %path.display(), "schema written");
        }
        None => println!("{schema}"),
    }
    Ok(EXIT_SUCCESS)
}
