use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand};
use rcplay_playback::{HttpRemoteDriverConfig, PlaybackSettings};

fn parse_positive_u64(value: &str) -> Result<u64, String> {
    let parsed = value
        .parse::<u64>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

fn parse_host_port(value: &str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("host:port cannot be empty".to_string());
    }
    if trimmed.contains("://") {
        return Err("expected host:port without a scheme".to_string());
    }
    Ok(trimmed.to_string())
}

#[derive(Debug, Parser)]
#[command(
    name = "rcplay",
    about = "Step-type catalog and remote-control playback for browser automation scripts",
    version
)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

impl Cli {
    pub(crate) fn log_progress(&self) -> bool {
        match &self.command {
            CliCommand::Catalog(_) => false,
            CliCommand::Run(args) => args.remote.log_progress,
            CliCommand::RunSuite(args) => args.remote.log_progress,
        }
    }
}

#[derive(Debug, Subcommand)]
pub(crate) enum CliCommand {
    /// List every step type grouped by category.
    Catalog(CatalogArgs),
    /// Play one script against a remote-control server.
    Run(RunArgs),
    /// Play every script of a suite against a remote-control server.
    RunSuite(RunSuiteArgs),
}

#[derive(Debug, Args)]
pub(crate) struct CatalogArgs {
    #[arg(long, action = ArgAction::SetTrue, help = "Emit step type summaries as JSON")]
    pub(crate) json: bool,

    #[arg(
        long = "negatable-only",
        action = ArgAction::SetTrue,
        help = "Only list step types that have a negated form"
    )]
    pub(crate) negatable_only: bool,
}

#[derive(Debug, Args)]
pub(crate) struct RunArgs {
    #[arg(long, help = "Path to a script JSON file")]
    pub(crate) script: PathBuf,

    #[command(flatten)]
    pub(crate) remote: RemoteArgs,
}

#[derive(Debug, Args)]
pub(crate) struct RunSuiteArgs {
    #[arg(long, help = "Path to a suite JSON file (a single script file also works)")]
    pub(crate) suite: PathBuf,

    #[command(flatten)]
    pub(crate) remote: RemoteArgs,
}

#[derive(Debug, Clone, Args)]
pub(crate) struct RemoteArgs {
    #[arg(
        long = "host-port",
        env = "RCPLAY_HOST_PORT",
        default_value = "localhost:4444",
        value_parser = parse_host_port,
        help = "host:port of the remote-control server"
    )]
    pub(crate) host_port: String,

    #[arg(
        long,
        env = "RCPLAY_BROWSER",
        default_value = "*firefox",
        help = "Browser string passed when opening a session"
    )]
    pub(crate) browser: String,

    #[arg(
        long = "browser-version",
        env = "RCPLAY_BROWSER_VERSION",
        help = "Requested browser version"
    )]
    pub(crate) browser_version: Option<String>,

    #[arg(long, env = "RCPLAY_PLATFORM", help = "Requested platform")]
    pub(crate) platform: Option<String>,

    #[arg(
        long = "request-timeout-ms",
        env = "RCPLAY_REQUEST_TIMEOUT_MS",
        default_value_t = 30_000,
        value_parser = parse_positive_u64,
        help = "Timeout for each remote command in milliseconds"
    )]
    pub(crate) request_timeout_ms: u64,

    #[arg(
        long = "result-url-base",
        env = "RCPLAY_RESULT_URL_BASE",
        help = "Base URL of per-session result pages"
    )]
    pub(crate) result_url_base: Option<String>,

    #[arg(
        long = "pause-tick-ms",
        env = "RCPLAY_PAUSE_TICK_MS",
        default_value_t = 100,
        value_parser = parse_positive_u64,
        help = "Interval of the local pause timer in milliseconds"
    )]
    pub(crate) pause_tick_ms: u64,

    #[arg(long = "summary-json-out", help = "Write the run summary as JSON to this path")]
    pub(crate) summary_json_out: Option<PathBuf>,

    #[arg(
        long = "log-progress",
        action = ArgAction::SetTrue,
        help = "Report progress as info-level log events instead of console lines"
    )]
    pub(crate) log_progress: bool,
}

impl RemoteArgs {
    pub(crate) fn driver_config(&self) -> HttpRemoteDriverConfig {
        HttpRemoteDriverConfig {
            host_port: self.host_port.clone(),
            request_timeout_ms: self.request_timeout_ms,
            result_url_base: self.result_url_base.clone(),
        }
    }

    pub(crate) fn playback_settings(&self) -> PlaybackSettings {
        PlaybackSettings {
            browser: self.browser.clone(),
            browser_version: self.browser_version.clone(),
            platform: self.platform.clone(),
            pause_tick: Duration::from_millis(self.pause_tick_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use clap::Parser;

    use super::{Cli, CliCommand};

    #[test]
    fn unit_run_defaults_match_local_server() {
        let cli = Cli::try_parse_from(["rcplay", "run", "--script", "login.json"])
            .expect("parse run");
        let CliCommand::Run(args) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(args.script.to_str(), Some("login.json"));
        let config = args.remote.driver_config();
        assert_eq!(config.request_timeout_ms, 30_000);
        let settings = args.remote.playback_settings();
        assert_eq!(settings.pause_tick, Duration::from_millis(100));
        assert!(args.remote.summary_json_out.is_none());
        assert!(!args.remote.log_progress);
    }

    #[test]
    fn unit_log_progress_flag_parses() {
        let cli = Cli::try_parse_from(["rcplay", "run", "--script", "a.json", "--log-progress"])
            .expect("parse run");
        assert!(cli.log_progress());
        let CliCommand::Run(args) = cli.command else {
            panic!("expected run command");
        };
        assert!(args.remote.log_progress);

        let catalog = Cli::try_parse_from(["rcplay", "catalog"]).expect("parse catalog");
        assert!(!catalog.log_progress());
    }

    #[test]
    fn unit_run_suite_accepts_remote_overrides() {
        let cli = Cli::try_parse_from([
            "rcplay",
            "run-suite",
            "--suite",
            "suite.json",
            "--host-port",
            "grid.local:5555",
            "--browser",
            "*googlechrome",
            "--request-timeout-ms",
            "750",
            "--summary-json-out",
            "out/summary.json",
        ])
        .expect("parse run-suite");
        let CliCommand::RunSuite(args) = cli.command else {
            panic!("expected run-suite command");
        };
        assert_eq!(args.remote.host_port, "grid.local:5555");
        assert_eq!(args.remote.playback_settings().browser, "*googlechrome");
        assert_eq!(args.remote.driver_config().request_timeout_ms, 750);
        assert!(args.remote.summary_json_out.is_some());
    }

    #[test]
    fn unit_rejects_zero_timeout_and_scheme_host() {
        let zero = Cli::try_parse_from([
            "rcplay",
            "run",
            "--script",
            "a.json",
            "--request-timeout-ms",
            "0",
        ]);
        assert!(zero.is_err());
        let scheme = Cli::try_parse_from([
            "rcplay",
            "run",
            "--script",
            "a.json",
            "--host-port",
            "http://localhost:4444",
        ]);
        assert!(scheme.is_err());
    }

    #[test]
    fn unit_catalog_flags_parse() {
        let cli = Cli::try_parse_from(["rcplay", "catalog", "--json", "--negatable-only"])
            .expect("parse catalog");
        let CliCommand::Catalog(args) = cli.command else {
            panic!("expected catalog command");
        };
        assert!(args.json);
        assert!(args.negatable_only);
    }
}
