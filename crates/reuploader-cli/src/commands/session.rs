//! Per-session bookkeeping shared by the interactive loop and one-shot commands.
//!
//! A [`SessionLog`] owns the identifier map of the active session.
//! [`SessionLog::begin`] resets it when a new session starts, and
//! [`SessionLog::finish`] persists a non-empty map and yields the
//! [`SessionSummary`] shown to the operator.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::anyhow;
use reuploader_core::{
    AssetId, AssetTransport, IdentifierMap, PipelineError, PipelineResult, ReuploadPipeline,
    UploadMetadata,
};
use serde::Serialize;
use tracing::{error, warn};

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult, output_error};
use crate::output::render_summary;

/// One asset the session could not reupload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct AssetFailure {
    pub(crate) asset: String,
    pub(crate) kind: &'static str,
    pub(crate) reason: String,
}

/// Outcome of a finished session.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SessionSummary {
    pub(crate) mode: &'static str,
    pub(crate) mappings: IdentifierMap,
    pub(crate) failures: Vec<AssetFailure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) map_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) persist_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) parse_error: Option<String>,
}

pub(crate) struct SessionLog {
    mode: &'static str,
    echo: bool,
    map: IdentifierMap,
    failures: Vec<AssetFailure>,
    parse_error: Option<String>,
}

impl SessionLog {
    /// Start an empty session. With `echo` set, each outcome is written as it happens.
    pub(crate) const fn new(mode: &'static str, echo: bool) -> Self {
        Self {
            mode,
            echo,
            map: IdentifierMap::new(),
            failures: Vec::new(),
            parse_error: None,
        }
    }

    /// Start a new session in `mode`, dropping everything the previous one recorded.
    pub(crate) fn begin(&mut self, mode: &'static str) {
        self.mode = mode;
        self.map.reset();
        self.failures.clear();
        self.parse_error = None;
    }

    /// Record that the scene document could not be parsed.
    pub(crate) fn scene_unparsed(&mut self, reason: &str) {
        self.parse_error = Some(reason.to_string());
    }

    /// Reupload an already validated id.
    pub(crate) async fn reupload<T, W>(
        &mut self,
        pipeline: &ReuploadPipeline<T>,
        asset_id: AssetId,
        metadata: &UploadMetadata,
        out: &mut W,
    ) -> CliResult<()>
    where
        T: AssetTransport,
        W: Write + Send,
    {
        let outcome = pipeline.reupload_asset(asset_id, metadata).await;
        self.record(
            &asset_id.to_string(),
            outcome.map(|new_id| (asset_id, new_id)),
            out,
        )
    }

    /// Reupload a raw operator-supplied id; invalid input is recorded as a failure.
    pub(crate) async fn reupload_input<T, W>(
        &mut self,
        pipeline: &ReuploadPipeline<T>,
        input: &str,
        metadata: &UploadMetadata,
        out: &mut W,
    ) -> CliResult<()>
    where
        T: AssetTransport,
        W: Write + Send,
    {
        match input.parse::<AssetId>() {
            Ok(asset_id) => self.reupload(pipeline, asset_id, metadata, out).await,
            Err(err) => self.record(input, Err(PipelineError::from(err)), out),
        }
    }

    fn record<W: Write>(
        &mut self,
        label: &str,
        outcome: PipelineResult<(AssetId, AssetId)>,
        out: &mut W,
    ) -> CliResult<()> {
        match outcome {
            Ok((old_id, new_id)) => {
                self.map.record(old_id, new_id);
                if self.echo {
                    writeln!(out, "reuploaded {old_id} -> {new_id}").map_err(output_error)?;
                }
            }
            Err(err) => {
                let kind = err.kind();
                let reason = format!("{:#}", anyhow::Error::new(err));
                warn!(asset = label, kind, %reason, "asset skipped");
                if self.echo {
                    writeln!(out, "failed {label}: {reason}").map_err(output_error)?;
                }
                self.failures.push(AssetFailure {
                    asset: label.to_string(),
                    kind,
                    reason,
                });
            }
        }
        Ok(())
    }

    /// Persist the map when it holds any mapping and summarise the session.
    pub(crate) fn finish(&self, map_path: &Path) -> SessionSummary {
        let (map_file, persist_error) = if self.map.is_empty() {
            (None, None)
        } else {
            let persist_error = self.map.persist(map_path).err().map(|err| {
                let reason = format!("{:#}", anyhow::Error::new(err));
                error!(path = %map_path.display(), %reason, "identifier map not written");
                reason
            });
            (Some(map_path.to_path_buf()), persist_error)
        };

        SessionSummary {
            mode: self.mode,
            mappings: self.map.clone(),
            failures: self.failures.clone(),
            map_file,
            persist_error,
            parse_error: self.parse_error.clone(),
        }
    }
}

/// Render the summary of a one-shot command; a failed persist becomes exit code 3.
pub(crate) fn finish_one_shot<W: Write>(
    summary: &SessionSummary,
    format: OutputFormat,
    out: &mut W,
) -> CliResult<()> {
    render_summary(out, summary, format)?;
    match &summary.persist_error {
        Some(reason) => Err(CliError::failure(anyhow!("{reason}"))),
        None => Ok(()),
    }
}
