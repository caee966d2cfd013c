//! Output renderers and formatting helpers for CLI commands.

use std::io::Write;
use std::path::Path;

use anyhow::anyhow;
use reuploader_config::ReuploaderConfig;
use serde::Serialize;
use serde_json::json;

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult, output_error};
use crate::commands::scan::SceneScan;
use crate::commands::session::SessionSummary;

fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
    writeln!(out, "{text}").map_err(output_error)
}

pub(crate) fn render_summary<W: Write>(
    out: &mut W,
    summary: &SessionSummary,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => write_json(out, summary),
        OutputFormat::Table => write_summary_table(out, summary).map_err(output_error),
    }
}

fn write_summary_table<W: Write>(out: &mut W, summary: &SessionSummary) -> std::io::Result<()> {
    writeln!(
        out,
        "{} session: {} reuploaded, {} failed",
        summary.mode,
        summary.mappings.len(),
        summary.failures.len()
    )?;
    if let Some(reason) = &summary.parse_error {
        writeln!(out, "scene not parsed: {reason}")?;
    }
    if !summary.mappings.is_empty() {
        writeln!(out, "{:<20} NEW ID", "OLD ID")?;
        for mapping in &summary.mappings {
            writeln!(out, "{:<20} {}", mapping.old_id, mapping.new_id)?;
        }
    }
    if !summary.failures.is_empty() {
        writeln!(out, "{:<20} {:<22} REASON", "ASSET", "KIND")?;
        for failure in &summary.failures {
            writeln!(
                out,
                "{:<20} {:<22} {}",
                failure.asset, failure.kind, failure.reason
            )?;
        }
    }
    match (&summary.map_file, &summary.persist_error) {
        (Some(path), None) => writeln!(out, "map written to {}", path.display()),
        (Some(path), Some(reason)) => {
            writeln!(out, "map NOT written to {}: {reason}", path.display())
        }
        (None, _) => writeln!(out, "map not written (no successful reuploads)"),
    }
}

pub(crate) fn render_scan<W: Write>(
    out: &mut W,
    scan: &SceneScan,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => {
            let ids: Vec<u64> = scan.ids.iter().map(|id| id.get()).collect();
            write_json(
                out,
                &json!({
                    "scene": scan.scene,
                    "marker": scan.marker,
                    "assetIds": ids,
                    "parseError": scan.parse_error,
                }),
            )
        }
        OutputFormat::Table => {
            if let Some(reason) = &scan.parse_error {
                writeln!(out, "warning: {reason}").map_err(output_error)?;
            }
            if scan.ids.is_empty() {
                writeln!(out, "no {} references found", scan.marker).map_err(output_error)?;
            }
            for id in &scan.ids {
                writeln!(out, "{id}").map_err(output_error)?;
            }
            Ok(())
        }
    }
}

pub(crate) fn render_config<W: Write>(
    out: &mut W,
    path: &Path,
    config: &ReuploaderConfig,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => write_json(
            out,
            &json!({
                "path": path,
                "credentials": config.credentials.describe(),
                "downloadEndpoint": config.download_endpoint,
                "uploadEndpoint": config.upload_endpoint.as_str(),
                "downloadTimeoutSecs": config.download_timeout.as_secs(),
                "uploadTimeoutSecs": config.upload_timeout.as_secs(),
            }),
        ),
        OutputFormat::Table => {
            let lines = [
                format!("config: {}", path.display()),
                format!("credentials: {}", config.credentials.describe()),
                format!("download endpoint: {}", config.download_endpoint),
                format!("upload endpoint: {}", config.upload_endpoint),
                format!("download timeout: {}s", config.download_timeout.as_secs()),
                format!("upload timeout: {}s", config.upload_timeout.as_secs()),
            ];
            for line in lines {
                writeln!(out, "{line}").map_err(output_error)?;
            }
            Ok(())
        }
    }
}
