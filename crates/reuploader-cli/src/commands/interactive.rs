//! Menu-driven session used when no subcommand is given.
//!
//! Every mode selection resets the session's [`SessionLog`], so the identifier
//! map written at the end of a mode only covers the assets of that mode.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::anyhow;
use reuploader_core::{
    AssetId, AssetTransport, DEFAULT_ASSET_TYPE, ReferenceScanner, UploadMetadata,
};

use crate::client::{AppContext, CliError, CliResult, output_error};
use crate::commands::batch::{BatchRequest, run_batch};
use crate::commands::reupload::default_display_name;
use crate::commands::scan::scan_scene;
use crate::commands::session::SessionLog;
use crate::output::render_summary;

const MENU: &str = concat!(
    "\n1) Reupload assets referenced by a scene file",
    "\n2) Reupload assets by id",
    "\nq) Quit",
    "\n> "
);
const BATCH_ASSET_TYPE: &str = "Animation";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Menu,
    Quit,
}

pub(crate) struct InteractiveSession<'a, T, R, W> {
    ctx: &'a AppContext<T>,
    scanner: ReferenceScanner,
    log: SessionLog,
    input: R,
    output: W,
}

impl<'a, T, R, W> InteractiveSession<'a, T, R, W>
where
    T: AssetTransport,
    R: BufRead + Send,
    W: Write + Send,
{
    pub(crate) fn new(ctx: &'a AppContext<T>, input: R, output: W) -> Self {
        Self {
            ctx,
            scanner: ReferenceScanner::default(),
            log: SessionLog::new("interactive", true),
            input,
            output,
        }
    }

    /// Run until the operator quits or input ends.
    pub(crate) async fn run(mut self) -> CliResult<()> {
        loop {
            let Some(choice) = self.prompt(MENU)? else {
                break;
            };
            let flow = match choice.to_ascii_lowercase().as_str() {
                "1" => self.batch_mode().await?,
                "2" => self.manual_mode().await?,
                "q" | "quit" | "exit" => Flow::Quit,
                "" => Flow::Menu,
                other => {
                    self.say(&format!("Unknown option '{other}'."))?;
                    Flow::Menu
                }
            };
            if flow == Flow::Quit {
                break;
            }
        }
        self.say("Goodbye.")
    }

    async fn batch_mode(&mut self) -> CliResult<Flow> {
        self.log.begin("batch");
        let Some(raw_path) = self.prompt("Scene file path: ")? else {
            return Ok(Flow::Quit);
        };
        let scene = PathBuf::from(trim_quotes(&raw_path));
        let scan = match scan_scene(&self.scanner, &scene) {
            Ok(scan) => scan,
            Err(err) => {
                self.say(&err.display_message())?;
                return Ok(Flow::Menu);
            }
        };
        if let Some(reason) = &scan.parse_error {
            self.say(&format!("Could not parse scene: {reason}"))?;
        }
        if scan.ids.is_empty() {
            self.say("No asset references found.")?;
            return Ok(Flow::Menu);
        }
        self.say(&format!("Found {} asset reference(s).", scan.ids.len()))?;

        let Some(prefix) = self.prompt("Display name prefix: ")? else {
            return Ok(Flow::Quit);
        };
        let Some(description) = self.prompt("Description: ")? else {
            return Ok(Flow::Quit);
        };
        let Some(asset_type) = self.prompt(&format!("Asset type [{BATCH_ASSET_TYPE}]: "))? else {
            return Ok(Flow::Quit);
        };
        let request = BatchRequest {
            prefix,
            description,
            asset_type: or_default(asset_type, BATCH_ASSET_TYPE),
        };

        run_batch(
            &self.ctx.pipeline,
            &scan.ids,
            &request,
            &mut self.log,
            &mut self.output,
        )
        .await?;
        self.summarise()?;
        Ok(Flow::Menu)
    }

    async fn manual_mode(&mut self) -> CliResult<Flow> {
        self.log.begin("manual");
        let flow = loop {
            let Some(input) = self.prompt("Asset id (b = back, q = quit): ")? else {
                break Flow::Quit;
            };
            match input.to_ascii_lowercase().as_str() {
                "b" | "back" => break Flow::Menu,
                "q" | "quit" | "exit" => break Flow::Quit,
                "" => continue,
                _ => {}
            }
            let asset_id = match input.parse::<AssetId>() {
                Ok(asset_id) => asset_id,
                Err(err) => {
                    self.say(&format!("{err}; enter digits only."))?;
                    continue;
                }
            };

            let default_name = default_display_name(&asset_id.to_string());
            let Some(name) = self.prompt(&format!("Display name [{default_name}]: "))? else {
                break Flow::Quit;
            };
            let Some(description) = self.prompt("Description: ")? else {
                break Flow::Quit;
            };
            let Some(asset_type) =
                self.prompt(&format!("Asset type [{DEFAULT_ASSET_TYPE}]: "))?
            else {
                break Flow::Quit;
            };

            let metadata =
                UploadMetadata::new(or_default(name, &default_name), description, asset_type);
            self.log
                .reupload(&self.ctx.pipeline, asset_id, &metadata, &mut self.output)
                .await?;
        };
        self.summarise()?;
        Ok(flow)
    }

    /// Persist and render; a failed persist is shown but never ends the session.
    fn summarise(&mut self) -> CliResult<()> {
        let summary = self.log.finish(&self.ctx.map_path);
        render_summary(&mut self.output, &summary, self.ctx.format)
    }

    fn prompt(&mut self, label: &str) -> CliResult<Option<String>> {
        write!(self.output, "{label}").map_err(output_error)?;
        self.output.flush().map_err(output_error)?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .map_err(|err| CliError::failure(anyhow!("failed to read input: {err}")))?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn say(&mut self, message: &str) -> CliResult<()> {
        writeln!(self.output, "{message}").map_err(output_error)
    }
}

fn trim_quotes(raw: &str) -> &str {
    raw.trim().trim_matches(|ch: char| ch == '"' || ch == '\'')
}

fn or_default(value: String, default: &str) -> String {
    if value.trim().is_empty() {
        default.to_string()
    } else {
        value
    }
}
