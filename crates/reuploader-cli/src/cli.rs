//! Command-line parsing, logging setup and dispatch.

use std::io::{self, BufReader, IsTerminal};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use reuploader_config::CONFIG_FILE_NAME;
use reuploader_core::{DEFAULT_ASSET_TYPE, DEFAULT_REFERENCE_MARKER};
use reuploader_telemetry::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, init_logging};

use crate::client::{AppContext, CliResult};
use crate::commands::batch::handle_batch;
use crate::commands::config::{handle_config_init, handle_config_show};
use crate::commands::interactive::InteractiveSession;
use crate::commands::reupload::handle_reupload;
use crate::commands::scan::handle_scan;

const DEFAULT_MAP_FILE: &str = "reupload_map.json";
const DEFAULT_BATCH_ASSET_TYPE: &str = "Animation";

/// Parses CLI arguments, installs logging and executes the requested command.
/// Returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    let logging = LoggingConfig {
        level: &cli.log_level,
        format: cli.log_format.unwrap_or_else(LogFormat::infer),
    };
    if let Err(err) = init_logging(&logging) {
        eprintln!("error: {err:#}");
        return 3;
    }

    match dispatch(cli).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

async fn dispatch(cli: Cli) -> CliResult<()> {
    let mut stdout = io::stdout();
    match cli.command {
        None => {
            let ctx = AppContext::load(&cli.config, cli.map_file, cli.output)?;
            InteractiveSession::new(&ctx, BufReader::new(io::stdin()), stdout)
                .run()
                .await
        }
        Some(Command::Batch(args)) => {
            let ctx = AppContext::load(&cli.config, cli.map_file, cli.output)?;
            handle_batch(&ctx, args, &mut stdout).await
        }
        Some(Command::Reupload(args)) => {
            let ctx = AppContext::load(&cli.config, cli.map_file, cli.output)?;
            handle_reupload(&ctx, args, &mut stdout).await
        }
        Some(Command::Scan(args)) => handle_scan(args, cli.output, &mut stdout),
        Some(Command::Config(ConfigCommand::Init(args))) => {
            handle_config_init(&cli.config, args, io::stdin().is_terminal(), &mut stdout)
        }
        Some(Command::Config(ConfigCommand::Show)) => {
            handle_config_show(&cli.config, cli.output, &mut stdout)
        }
    }
}

#[derive(Parser)]
#[command(
    name = "reuploader",
    version,
    about = "Reupload assets to your own account and record the old → new id map"
)]
struct Cli {
    #[arg(
        long,
        global = true,
        env = "REUPLOADER_CONFIG",
        default_value = CONFIG_FILE_NAME,
        help = "Path to the JSON configuration file"
    )]
    config: PathBuf,
    #[arg(
        long,
        global = true,
        env = "REUPLOADER_MAP_FILE",
        default_value = DEFAULT_MAP_FILE,
        help = "Where the old → new id map is written"
    )]
    map_file: PathBuf,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for summaries and listings"
    )]
    output: OutputFormat,
    #[arg(
        long,
        global = true,
        env = "REUPLOADER_LOG_LEVEL",
        default_value = DEFAULT_LOG_LEVEL
    )]
    log_level: String,
    #[arg(
        long,
        global = true,
        env = "REUPLOADER_LOG_FORMAT",
        help = "Log format: pretty, compact or json"
    )]
    log_format: Option<LogFormat>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Reupload every asset referenced by a scene file.
    Batch(BatchArgs),
    /// Reupload assets by id.
    Reupload(ReuploadArgs),
    /// List the asset ids a scene file references, without network access.
    Scan(ScanArgs),
    /// Manage the configuration file.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Write a configuration template.
    Init(ConfigInitArgs),
    /// Print the resolved configuration with credentials redacted.
    Show,
}

#[derive(Args)]
pub(crate) struct BatchArgs {
    #[arg(help = "Scene document (.rbxmx) to scan")]
    pub(crate) scene: PathBuf,
    #[arg(long, default_value_t, help = "Prefix for each new asset's display name")]
    pub(crate) prefix: String,
    #[arg(long, default_value_t)]
    pub(crate) description: String,
    #[arg(long, default_value = DEFAULT_BATCH_ASSET_TYPE)]
    pub(crate) asset_type: String,
    #[arg(long, default_value = DEFAULT_REFERENCE_MARKER, help = "Property name marker to scan for")]
    pub(crate) marker: String,
}

#[derive(Args)]
pub(crate) struct ReuploadArgs {
    #[arg(required = true, help = "Asset ids to reupload")]
    pub(crate) ids: Vec<String>,
    #[arg(long, help = "Display name (defaults to Reupload_<id>)")]
    pub(crate) name: Option<String>,
    #[arg(long, default_value_t)]
    pub(crate) description: String,
    #[arg(long, default_value = DEFAULT_ASSET_TYPE)]
    pub(crate) asset_type: String,
}

#[derive(Args)]
pub(crate) struct ScanArgs {
    #[arg(help = "Scene document (.rbxmx) to scan")]
    pub(crate) scene: PathBuf,
    #[arg(long, default_value = DEFAULT_REFERENCE_MARKER)]
    pub(crate) marker: String,
}

#[derive(Args)]
pub(crate) struct ConfigInitArgs {
    #[arg(long, help = "Overwrite an existing configuration file")]
    pub(crate) force: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Table,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("reuploader").chain(args.iter().copied()))
            .expect("arguments should parse")
    }

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_selects_interactive_defaults() {
        let cli = parse(&[]);
        assert!(cli.command.is_none());
        assert_eq!(cli.config, PathBuf::from("config.json"));
        assert_eq!(cli.map_file, PathBuf::from("reupload_map.json"));
        assert_eq!(cli.output, OutputFormat::Table);
        assert!(cli.log_format.is_none());
    }

    #[test]
    fn batch_defaults_to_animation_marker_and_type() {
        let cli = parse(&["batch", "scene.rbxmx", "--prefix", "Anim_", "--output", "json"]);
        let Some(Command::Batch(args)) = cli.command else {
            panic!("expected batch command");
        };
        assert_eq!(args.scene, PathBuf::from("scene.rbxmx"));
        assert_eq!(args.prefix, "Anim_");
        assert_eq!(args.description, "");
        assert_eq!(args.asset_type, "Animation");
        assert_eq!(args.marker, "AnimationId");
        assert_eq!(cli.output, OutputFormat::Json);
    }

    #[test]
    fn reupload_requires_ids_and_defaults_to_model() {
        assert!(Cli::try_parse_from(["reuploader", "reupload"]).is_err());

        let cli = parse(&["reupload", "123", "456", "--log-format", "json"]);
        let Some(Command::Reupload(args)) = cli.command else {
            panic!("expected reupload command");
        };
        assert_eq!(args.ids, vec!["123", "456"]);
        assert_eq!(args.asset_type, "Model");
        assert!(args.name.is_none());
        assert_eq!(cli.log_format, Some(LogFormat::Json));
    }

    #[test]
    fn config_subcommands_parse() {
        let cli = parse(&["config", "init", "--force", "--config", "alt.json"]);
        assert!(matches!(
            cli.command,
            Some(Command::Config(ConfigCommand::Init(ConfigInitArgs { force: true })))
        ));
        assert_eq!(cli.config, PathBuf::from("alt.json"));

        let cli = parse(&["config", "show"]);
        assert!(matches!(cli.command, Some(Command::Config(ConfigCommand::Show))));
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        assert!(Cli::try_parse_from(["reuploader", "--log-format", "xml", "scan", "a"]).is_err());
    }
}
