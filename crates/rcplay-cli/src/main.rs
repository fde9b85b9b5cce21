mod cli_args;
mod console_observer;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use rcplay_catalog::{ParamKind, StepCatalog, StepTypeSummary};
use rcplay_playback::{
    load_script, load_scripts, HttpRemoteDriver, InMemorySuite, PlaybackObserver, PlaybackResult,
    Script, ScriptPlayback, SeleniumVersion, StopSignal, SuitePlayback, TracingObserver,
};
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::cli_args::{CatalogArgs, Cli, CliCommand, RemoteArgs, RunArgs, RunSuiteArgs};
use crate::console_observer::{outcome_label, ConsoleObserver};

fn init_tracing(default_level: LevelFilter) {
    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

#[derive(Debug, Serialize)]
struct StepSummary {
    id: String,
    step_type: String,
    negated: bool,
    outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

#[derive(Debug, Serialize)]
struct ScriptRunSummary {
    script: String,
    result: PlaybackResult,
    steps: Vec<StepSummary>,
}

impl ScriptRunSummary {
    fn new(script: &Script, result: PlaybackResult) -> Self {
        Self {
            script: script.name.clone(),
            result,
            steps: script
                .steps
                .iter()
                .map(|step| StepSummary {
                    id: step.id.clone(),
                    step_type: step.step_type.name().to_string(),
                    negated: step.negated,
                    outcome: outcome_label(step.outcome),
                    message: step.failure_message.clone(),
                })
                .collect(),
        }
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    Ok(())
}

fn write_summary_json<T: Serialize>(path: &Path, summary: &T) -> Result<()> {
    ensure_parent_dir(path)?;
    let rendered = serde_json::to_string_pretty(summary).context("serialize run summary json")?;
    std::fs::write(path, rendered).with_context(|| format!("failed to write {}", path.display()))
}

fn render_params(summary: &StepTypeSummary) -> String {
    summary
        .params
        .iter()
        .map(|(name, kind)| match kind {
            ParamKind::Locator => format!("{name}: locator"),
            ParamKind::String => name.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_catalog(args: &CatalogArgs) -> Result<()> {
    let catalog = StepCatalog::selenium1();
    let summaries = catalog
        .summaries()
        .into_iter()
        .filter(|summary| !args.negatable_only || summary.negatable)
        .collect::<Vec<_>>();

    if args.json {
        let rendered =
            serde_json::to_string_pretty(&summaries).context("serialize step type summaries")?;
        println!("{rendered}");
        return Ok(());
    }

    let mut current_category: Option<&str> = None;
    for summary in &summaries {
        if current_category != Some(summary.category.as_str()) {
            println!("{}", summary.category);
            current_category = Some(summary.category.as_str());
        }
        match summary.negated_name.as_deref() {
            Some(negated) => println!(
                "  {}({}) / {negated}",
                summary.name,
                render_params(summary)
            ),
            None => println!("  {}({})", summary.name, render_params(summary)),
        }
    }
    println!("{} step types", summaries.len());
    Ok(())
}

fn progress_observer(remote: &RemoteArgs, script_count: usize) -> Arc<dyn PlaybackObserver> {
    if remote.log_progress {
        Arc::new(TracingObserver)
    } else {
        Arc::new(ConsoleObserver::new(script_count))
    }
}

fn build_playback(remote: &RemoteArgs, script_count: usize) -> Result<ScriptPlayback> {
    let driver = HttpRemoteDriver::new(remote.driver_config())
        .context("failed to initialize remote driver")?;
    let playback = ScriptPlayback::new(Arc::new(driver), remote.playback_settings())
        .context("invalid playback settings")?
        .with_observer(progress_observer(remote, script_count));
    Ok(playback)
}

/// Single-script runs only drive Selenium 1 scripts; suites report other
/// dialects per script instead.
fn ensure_remote_playable(script: &Script) -> Result<()> {
    if script.selenium_version != SeleniumVersion::Selenium1 {
        anyhow::bail!(
            "script '{}' is a Selenium {} script and cannot be played on a remote-control server",
            script.name,
            script.selenium_version.label()
        );
    }
    Ok(())
}

fn spawn_stop_on_ctrl_c(stop: StopSignal) -> JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("stop requested; finishing the current step");
            stop.request_stop();
        }
    })
}

async fn run_script(args: RunArgs) -> Result<bool> {
    let catalog = StepCatalog::selenium1();
    let mut script = load_script(&args.script, &catalog)
        .with_context(|| format!("failed to load script '{}'", args.script.display()))?;
    ensure_remote_playable(&script)?;
    tracing::info!(
        script = script.name.as_str(),
        steps = script.steps.len(),
        "loaded script"
    );
    let playback = build_playback(&args.remote, 1)?;

    let stop = StopSignal::new();
    let ctrl_c = spawn_stop_on_ctrl_c(stop.clone());
    let result = playback.run_with_stop(&mut script, stop).await;
    ctrl_c.abort();

    let success = result.success;
    match result.error_message.as_deref() {
        Some(message) => println!("script {}: failed: {message}", script.name),
        None if success => println!("script {}: passed", script.name),
        None => println!("script {}: failed", script.name),
    }
    if let Some(url) = result.url.as_deref() {
        println!("results: {url}");
    }
    if let Some(path) = args.remote.summary_json_out.as_deref() {
        write_summary_json(path, &ScriptRunSummary::new(&script, result))?;
    }
    Ok(success)
}

async fn run_suite(args: RunSuiteArgs) -> Result<bool> {
    let catalog = StepCatalog::selenium1();
    let scripts = load_scripts(&args.suite, &catalog)
        .with_context(|| format!("failed to load suite '{}'", args.suite.display()))?;
    tracing::info!(scripts = scripts.len(), "loaded suite");
    let suite = SuitePlayback::new(build_playback(&args.remote, scripts.len())?);
    let mut source = InMemorySuite::new(scripts);

    let stop = StopSignal::new();
    let ctrl_c = spawn_stop_on_ctrl_c(stop.clone());
    let report = suite.run_with_stop(&mut source, stop).await;
    ctrl_c.abort();

    println!(
        "suite summary: scripts={} passed={} failed={} stopped={}",
        report.results.len(),
        report.results.len() - report.failed_count(),
        report.failed_count(),
        report.stopped,
    );
    if let Some(path) = args.remote.summary_json_out.as_deref() {
        write_summary_json(path, &report)?;
    }
    Ok(report.success())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(if cli.log_progress() {
        LevelFilter::INFO
    } else {
        LevelFilter::WARN
    });
    let success = match cli.command {
        CliCommand::Catalog(args) => {
            print_catalog(&args)?;
            true
        }
        CliCommand::Run(args) => run_script(args).await?,
        CliCommand::RunSuite(args) => run_suite(args).await?,
    };
    if !success {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rcplay_catalog::{ParamKind, StepCatalog, StepTypeSummary};
    use rcplay_playback::{PlaybackResult, Script, SeleniumVersion, Step, StepOutcome};
    use tempfile::tempdir;

    use super::{ensure_remote_playable, render_params, write_summary_json, ScriptRunSummary};

    #[test]
    fn unit_render_params_marks_locator_parameters() {
        let summary = StepTypeSummary {
            name: "type".to_string(),
            category: "Action: Keyboard".to_string(),
            base_name: "doType".to_string(),
            negatable: false,
            negated_name: None,
            params: vec![
                ("locator".to_string(), ParamKind::Locator),
                ("value".to_string(), ParamKind::String),
            ],
        };
        assert_eq!(render_params(&summary), "locator: locator, value");
    }

    #[test]
    fn unit_single_run_rejects_selenium2_scripts() {
        let legacy = Script::new("legacy", Vec::new());
        assert!(ensure_remote_playable(&legacy).is_ok());

        let mut modern = Script::new("modern", Vec::new());
        modern.selenium_version = SeleniumVersion::Selenium2;
        let error = ensure_remote_playable(&modern).expect_err("selenium 2");
        assert!(error.to_string().contains("Selenium 2"));
    }

    #[test]
    fn functional_script_summary_json_lists_step_outcomes() {
        let catalog = StepCatalog::selenium1();
        let mut script = Script::new(
            "login",
            vec![Step::new("s1", Arc::clone(catalog.open().expect("open")))
                .with_text("url", "http://example.test/")],
        );
        script.steps[0].record(StepOutcome::Error, Some("ERROR: boom".to_string()));
        let result = PlaybackResult {
            success: false,
            error_message: Some("ERROR: boom".to_string()),
            url: None,
            failure_kind: None,
        };

        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("nested").join("summary.json");
        write_summary_json(&path, &ScriptRunSummary::new(&script, result)).expect("write");

        let raw = std::fs::read_to_string(&path).expect("read");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("json");
        assert_eq!(value["script"], "login");
        assert_eq!(value["result"]["errormessage"], "ERROR: boom");
        assert_eq!(value["steps"][0]["outcome"], "error");
        assert_eq!(value["steps"][0]["step_type"], "open");
    }
}
