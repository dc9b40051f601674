//! CLI command implementations.
//!
//! Contains the business logic for each CLI command, built on top of
//! [`crate::Platform`].

#![allow(clippy::too_many_lines)]

use std::fs;
use std::io::Read as _;

use crate::cli::output::{
    OutputFormat, format_audit_events, format_cache_stats, format_correction_outcome, format_metrics,
    format_module_list, format_validation_result,
};
use crate::cli::parser::{Cli, Commands};
use crate::config::Settings;
use crate::error::{CommandError, Error, Result};
use crate::platform::Platform;

/// Executes the CLI command.
///
/// # Errors
///
/// Returns an error if the command fails to execute, or if the input
/// file cannot be read.
pub fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);
    let mut settings = Settings::from_env();
    if let Some(path) = &cli.cache_path {
        settings.external_cache_path = Some(path.display().to_string());
    }
    let platform = Platform::new(settings);

    match &cli.command {
        Commands::Validate { file, document_type, modules } => {
            cmd_validate(&platform, file.as_deref(), document_type, modules, format)
        }
        Commands::Correct { file, document_type, modules, max_iterations, output } => cmd_correct(
            &platform,
            file.as_deref(),
            document_type,
            modules,
            *max_iterations,
            output.as_deref(),
            format,
        ),
        Commands::ListModules => cmd_list_modules(&platform, format),
        Commands::EnableModule { module_id } => cmd_enable_module(&platform, module_id, format),
        Commands::DisableModule { module_id } => cmd_disable_module(&platform, module_id, format),
        Commands::ClearCache { namespace } => cmd_clear_cache(&platform, namespace.as_deref(), format),
        Commands::CacheStats => cmd_cache_stats(&platform, format),
        Commands::Metrics => cmd_metrics(&platform, format),
        Commands::Audit { limit } => cmd_audit(&platform, *limit, format),
    }
}

/// Reads the document text from a file path, or from stdin when `file` is `None`.
fn read_input(file: Option<&std::path::Path>) -> Result<String> {
    match file {
        Some(path) => fs::read_to_string(path).map_err(Error::from),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(Error::from)?;
            Ok(buf)
        }
    }
}

fn cmd_validate(
    platform: &Platform,
    file: Option<&std::path::Path>,
    document_type: &str,
    modules: &[String],
    format: OutputFormat,
) -> Result<String> {
    let text = read_input(file)?;
    let result = platform.validate(&text, document_type, modules)?;
    Ok(format_validation_result(&result, format))
}

fn cmd_correct(
    platform: &Platform,
    file: Option<&std::path::Path>,
    document_type: &str,
    modules: &[String],
    max_iterations: Option<usize>,
    output: Option<&std::path::Path>,
    format: OutputFormat,
) -> Result<String> {
    let text = read_input(file)?;
    let outcome = platform.correct(&text, document_type, modules, max_iterations)?;
    if let Some(output_path) = output {
        fs::write(output_path, &outcome.final_text).map_err(Error::from)?;
    }
    Ok(format_correction_outcome(&outcome, format))
}

fn cmd_list_modules(platform: &Platform, format: OutputFormat) -> Result<String> {
    Ok(format_module_list(&platform.list_modules(), format))
}

fn cmd_enable_module(platform: &Platform, module_id: &str, format: OutputFormat) -> Result<String> {
    if !platform.list_modules().iter().any(|m| m.module_id == module_id) {
        return Err(Error::Command(CommandError::InvalidArgument(format!(
            "unknown module: {module_id}"
        ))));
    }
    platform.enable_module(module_id);
    let message = format!("module '{module_id}' enabled");
    Ok(format_status_message(&message, format))
}

fn cmd_disable_module(platform: &Platform, module_id: &str, format: OutputFormat) -> Result<String> {
    if !platform.list_modules().iter().any(|m| m.module_id == module_id) {
        return Err(Error::Command(CommandError::InvalidArgument(format!(
            "unknown module: {module_id}"
        ))));
    }
    platform.disable_module(module_id);
    let message = format!("module '{module_id}' disabled");
    Ok(format_status_message(&message, format))
}

fn cmd_clear_cache(platform: &Platform, namespace: Option<&str>, format: OutputFormat) -> Result<String> {
    platform.clear_cache(namespace);
    let message = namespace.map_or_else(
        || "cache cleared".to_string(),
        |ns| format!("cache cleared for namespace '{ns}'"),
    );
    Ok(format_status_message(&message, format))
}

fn cmd_cache_stats(platform: &Platform, format: OutputFormat) -> Result<String> {
    Ok(format_cache_stats(&platform.cache_stats(), format))
}

fn cmd_metrics(platform: &Platform, format: OutputFormat) -> Result<String> {
    Ok(format_metrics(&platform.metrics(), format))
}

fn cmd_audit(platform: &Platform, limit: usize, format: OutputFormat) -> Result<String> {
    let mut events = platform.audit_events();
    if events.len() > limit {
        events = events.split_off(events.len() - limit);
    }
    Ok(format_audit_events(&events, format))
}

fn format_status_message(message: &str, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format!("{message}\n"),
        OutputFormat::Json | OutputFormat::Ndjson => {
            serde_json::json!({ "success": true, "message": message }).to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings::default()
    }

    #[test]
    fn test_cmd_validate_with_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        std::fs::write(&path, "Our fund delivers guaranteed high returns.").unwrap();

        let platform = Platform::new(settings());
        let output = cmd_validate(
            &platform,
            Some(path.as_path()),
            "financial_promotion",
            &["fca_uk".to_string()],
            OutputFormat::Json,
        )
        .unwrap();
        assert!(output.contains("fair_clear_not_misleading"));
    }

    #[test]
    fn test_cmd_correct_with_file_and_output_path() {
        let dir = tempfile::tempdir().unwrap();
        let input_path = dir.path().join("doc.txt");
        let output_path = dir.path().join("corrected.txt");
        std::fs::write(&input_path, "Our fund delivers guaranteed high returns.").unwrap();

        let platform = Platform::new(settings());
        let result = cmd_correct(
            &platform,
            Some(input_path.as_path()),
            "financial_promotion",
            &["fca_uk".to_string()],
            None,
            Some(output_path.as_path()),
            OutputFormat::Text,
        )
        .unwrap();
        assert!(result.contains("Converged"));
        assert!(output_path.exists());
    }

    #[test]
    fn test_cmd_list_modules_reports_five() {
        let platform = Platform::new(settings());
        let output = cmd_list_modules(&platform, OutputFormat::Json).unwrap();
        let modules: Vec<serde_json::Value> =
            serde_json::from_str::<serde_json::Value>(&output).unwrap()["modules"]
                .as_array()
                .unwrap()
                .clone();
        assert_eq!(modules.len(), 5);
    }

    #[test]
    fn test_cmd_enable_disable_roundtrip() {
        let platform = Platform::new(settings());
        cmd_disable_module(&platform, "nda", OutputFormat::Text).unwrap();
        assert!(!platform.list_modules().iter().find(|m| m.module_id == "nda").unwrap().enabled);
        cmd_enable_module(&platform, "nda", OutputFormat::Text).unwrap();
        assert!(platform.list_modules().iter().find(|m| m.module_id == "nda").unwrap().enabled);
    }

    #[test]
    fn test_cmd_enable_unknown_module_errors() {
        let platform = Platform::new(settings());
        let err = cmd_enable_module(&platform, "not_a_module", OutputFormat::Text).unwrap_err();
        assert!(matches!(err, Error::Command(CommandError::InvalidArgument(_))));
    }

    #[test]
    fn test_cmd_cache_stats_tracks_hit_after_repeat_validate() {
        let platform = Platform::new(settings());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        std::fs::write(&path, "guaranteed returns").unwrap();

        cmd_validate(&platform, Some(path.as_path()), "financial_promotion", &["fca_uk".to_string()], OutputFormat::Text).unwrap();
        cmd_validate(&platform, Some(path.as_path()), "financial_promotion", &["fca_uk".to_string()], OutputFormat::Text).unwrap();

        let output = cmd_cache_stats(&platform, OutputFormat::Json).unwrap();
        assert!(output.contains("\"hits\": 1"));
    }

    #[test]
    fn test_cmd_metrics_reports_json() {
        let platform = Platform::new(settings());
        let output = cmd_metrics(&platform, OutputFormat::Json).unwrap();
        assert!(output == "{}" || output.starts_with('{'));
    }
}
