use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use reuploader_core::{AssetId, ExtractError, ReferenceScanner};
use tracing::{info, warn};

use crate::cli::{OutputFormat, ScanArgs};
use crate::client::{CliError, CliResult};
use crate::output::render_scan;

/// References found in one scene document.
///
/// A document that fails to parse yields no ids and keeps the parser's
/// message so callers can report it without aborting.
#[derive(Debug)]
pub(crate) struct SceneScan {
    pub(crate) scene: PathBuf,
    pub(crate) marker: String,
    pub(crate) ids: BTreeSet<AssetId>,
    pub(crate) parse_error: Option<String>,
}

pub(crate) fn scan_scene(scanner: &ReferenceScanner, scene: &Path) -> CliResult<SceneScan> {
    let (ids, parse_error) = match scanner.scan_path(scene) {
        Ok(ids) => (ids, None),
        Err(err @ ExtractError::Parse { .. }) => {
            warn!(scene = %scene.display(), error = %err, "scene document could not be parsed");
            (BTreeSet::new(), Some(err.to_string()))
        }
        Err(err @ ExtractError::Io { .. }) => {
            return Err(CliError::validation(format!(
                "{:#}",
                anyhow::Error::new(err)
            )));
        }
    };
    info!(
        scene = %scene.display(),
        marker = scanner.marker(),
        references = ids.len(),
        "scene scanned"
    );
    Ok(SceneScan {
        scene: scene.to_path_buf(),
        marker: scanner.marker().to_string(),
        ids,
        parse_error,
    })
}

pub(crate) fn handle_scan<W: Write>(
    args: ScanArgs,
    format: OutputFormat,
    out: &mut W,
) -> CliResult<()> {
    let scanner = ReferenceScanner::new(args.marker);
    let scan = scan_scene(&scanner, &args.scene)?;
    render_scan(out, &scan, format)
}
