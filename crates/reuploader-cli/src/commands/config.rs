use std::io::Write;
use std::path::Path;

use anyhow::anyhow;
use reuploader_config::{ConfigError, ConfigFile, read_config_file, resolve, write_config_file};

use crate::cli::{ConfigInitArgs, OutputFormat};
use crate::client::{CliError, CliResult, output_error};
use crate::output::render_config;

pub(crate) fn handle_config_init<W: Write>(
    path: &Path,
    args: ConfigInitArgs,
    prompt_credentials: bool,
    out: &mut W,
) -> CliResult<()> {
    let mut file = ConfigFile::template();
    if prompt_credentials {
        file.x_api_key = prompt_secret("x_api_key (blank to skip): ")?;
        file.roblosecurity = prompt_secret(".ROBLOSECURITY cookie (blank to skip): ")?;
    }

    write_config_file(path, &file, args.force).map_err(|err| match err {
        err @ ConfigError::AlreadyExists { .. } => {
            CliError::validation(format!("{err}; pass --force to overwrite it"))
        }
        other => CliError::from(other),
    })?;

    writeln!(out, "Wrote configuration to {}.", path.display()).map_err(output_error)?;
    if file.x_api_key.is_none() && file.roblosecurity.is_none() {
        writeln!(
            out,
            "Set x_api_key or roblosecurity in that file before reuploading."
        )
        .map_err(output_error)?;
    }
    Ok(())
}

pub(crate) fn handle_config_show<W: Write>(
    path: &Path,
    format: OutputFormat,
    out: &mut W,
) -> CliResult<()> {
    if !path.exists() {
        return Err(CliError::validation(format!(
            "no configuration at {}; run `reuploader config init` first",
            path.display()
        )));
    }
    let config = resolve(read_config_file(path)?)?;
    render_config(out, path, &config, format)
}

fn prompt_secret(label: &str) -> CliResult<Option<String>> {
    let value = rpassword::prompt_password(label)
        .map_err(|err| CliError::failure(anyhow!("failed to read secret from terminal: {err}")))?;
    let trimmed = value.trim();
    Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use reuploader_test_support::TestWorkspace;
    use reuploader_test_support::fixtures::config_for_server;

    fn init(path: &Path, force: bool) -> CliResult<String> {
        let mut out = Vec::new();
        handle_config_init(path, ConfigInitArgs { force }, false, &mut out)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    #[test]
    fn init_writes_template_and_refuses_overwrite() -> Result<()> {
        let workspace = TestWorkspace::new()?;
        let path = workspace.join("config.json");

        let text = init(&path, false).map_err(|err| anyhow!(err.display_message()))?;
        assert!(text.contains("Set x_api_key or roblosecurity"));
        let written: serde_json::Value = serde_json::from_str(&workspace.read("config.json")?)?;
        assert!(written["x_api_key"].is_null());
        assert_eq!(
            written["upload_endpoint"],
            "https://apis.roblox.com/assets/v1/assets"
        );

        let err = init(&path, false).expect_err("second init must refuse");
        assert_eq!(err.exit_code(), 2);
        assert!(err.display_message().contains("--force"));

        init(&path, true).map_err(|err| anyhow!(err.display_message()))?;
        Ok(())
    }

    #[test]
    fn show_redacts_credentials() -> Result<()> {
        let workspace = TestWorkspace::new()?;
        let path =
            workspace.write_json("config.json", &config_for_server("http://127.0.0.1:9"))?;

        let mut out = Vec::new();
        handle_config_show(&path, OutputFormat::Table, &mut out)
            .map_err(|err| anyhow!(err.display_message()))?;
        let text = String::from_utf8(out)?;

        assert!(text.contains("credentials: api key"));
        assert!(text.contains("download timeout: 5s"));
        assert!(!text.contains("test-key"));
        Ok(())
    }

    #[test]
    fn show_without_credentials_is_a_validation_error() -> Result<()> {
        let workspace = TestWorkspace::new()?;
        let path = workspace.join("config.json");
        init(&path, false).map_err(|err| anyhow!(err.display_message()))?;

        let err = handle_config_show(&path, OutputFormat::Json, &mut Vec::<u8>::new())
            .expect_err("template has no credentials");
        assert_eq!(err.exit_code(), 2);
        assert!(err.display_message().contains("credentials"));

        let missing = handle_config_show(
            &workspace.join("none.json"),
            OutputFormat::Table,
            &mut Vec::<u8>::new(),
        )
        .expect_err("missing file");
        assert!(missing.display_message().contains("config init"));
        Ok(())
    }
}
