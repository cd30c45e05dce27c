//! `validate` command handler

use serde_json::json;

use crate::cli::args::{OutputFormat, ValidateArgs};
use crate::config::ConfigLoader;
use crate::error::PhaserError;

/// Validate the manifest and report declared resources.
///
/// # Errors
///
/// Returns a configuration error listing every validation issue.
pub fn run(args: &ValidateArgs) -> Result<(), PhaserError> {
    let result = ConfigLoader::default().load(&args.config)?;
    let manifest = &result.manifest;

    match args.format {
        OutputFormat::Human => {
            for warning in &result.warnings {
                println!("warning: {warning}");
            }
            println!(
                "{}: valid ({} resource(s), provider {})",
                args.config.display(),
                manifest.resources.len(),
                manifest.provider.version
            );
        }
        OutputFormat::Json => {
            let warnings: Vec<String> = result.warnings.iter().map(ToString::to_string).collect();
            let resources: Vec<&String> = manifest.resources.keys().collect();
            println!(
                "{}",
                json!({
                    "valid": true,
                    "path": args.config.display().to_string(),
                    "provider_version": manifest.provider.version,
                    "resources": resources,
                    "warnings": warnings,
                })
            );
        }
    }
    Ok(())
}
