//! CLI error type and the application context shared by command handlers.

use std::fmt::{self, Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};

use anyhow::anyhow;
use reuploader_config::{ConfigError, LoadOutcome, ReuploaderConfig, load_or_bootstrap};
use reuploader_core::{HttpTransport, ReuploadPipeline};
use tracing::info;

use crate::cli::OutputFormat;

/// CLI-level error type to distinguish operator mistakes from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        let operational = matches!(
            err,
            ConfigError::Io { .. } | ConfigError::Json { operation: "serialize", .. }
        );
        if operational {
            Self::failure(err)
        } else {
            Self::validation(format!("{:#}", anyhow::Error::new(err)))
        }
    }
}

/// Map a failed write to the terminal into a CLI failure.
pub(crate) fn output_error(err: io::Error) -> CliError {
    CliError::failure(anyhow!("failed to write output: {err}"))
}

/// Pipeline and session settings passed to command handlers.
pub(crate) struct AppContext<T = HttpTransport> {
    pub(crate) pipeline: ReuploadPipeline<T>,
    pub(crate) map_path: PathBuf,
    pub(crate) format: OutputFormat,
}

impl AppContext<HttpTransport> {
    /// Load (or bootstrap) the configuration and build the HTTP pipeline.
    pub(crate) fn load(
        config_path: &Path,
        map_path: PathBuf,
        format: OutputFormat,
    ) -> CliResult<Self> {
        match load_or_bootstrap(config_path)? {
            LoadOutcome::Loaded(config) => Self::from_config(&config, map_path, format),
            LoadOutcome::Bootstrapped(path) => Err(CliError::validation(format!(
                "wrote a configuration template to '{}'; set x_api_key or roblosecurity and run again",
                path.display()
            ))),
        }
    }

    pub(crate) fn from_config(
        config: &ReuploaderConfig,
        map_path: PathBuf,
        format: OutputFormat,
    ) -> CliResult<Self> {
        let transport = HttpTransport::new(config)
            .map_err(|err| CliError::validation(format!("invalid credentials: {err}")))?;
        info!(credentials = config.credentials.describe(), "configuration loaded");
        Ok(Self {
            pipeline: ReuploadPipeline::new(transport),
            map_path,
            format,
        })
    }
}

/// Context whose endpoints point at `base_url`, writing the map into `map_path`.
#[cfg(test)]
pub(crate) fn context_for(base_url: &str, map_path: PathBuf, format: OutputFormat) -> AppContext {
    let value = reuploader_test_support::fixtures::config_for_server(base_url);
    let file = serde_json::from_value(value).expect("fixture config parses");
    let config = reuploader_config::resolve(file).expect("fixture config resolves");
    AppContext::from_config(&config, map_path, format)
        .map_err(|err| err.display_message())
        .expect("context builds")
}
