//! Command implementations

use anyhow::{bail, Context};
use clap::{ArgGroup, Args};
use scan_intake::{
    ArchivePayload, ControllerConfig, HttpIntakeClient, IntakeService, ScanReport,
    SubmissionController, SubmissionState, TargetKind, TargetValue,
};
use scan_session::{GateDecision, SessionSignal, SessionStore, StaticProvider, ViewGate};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::Config;
use crate::output;

/// Arguments for `scanctl submit`
#[derive(Debug, Args)]
#[command(group(ArgGroup::new("target").required(true).args(["url", "archive"])))]
pub struct SubmitArgs {
    /// Repository URL to scan
    #[arg(long)]
    pub url: Option<String>,

    /// Path to a .zip archive to upload
    #[arg(long)]
    pub archive: Option<PathBuf>,

    /// Print the outcome as JSON
    #[arg(long)]
    pub json: bool,
}

/// How a command ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    Failed,
    SignInRequired,
    Cancelled,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Done => ExitCode::SUCCESS,
            Outcome::Failed => ExitCode::FAILURE,
            Outcome::SignInRequired => ExitCode::from(2),
            Outcome::Cancelled => ExitCode::from(130),
        }
    }
}

#[derive(Serialize)]
struct SubmitOutput<'a> {
    state: &'a SubmissionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<&'a ScanReport>,
}

async fn resolve_session(config: &Config) -> anyhow::Result<(SessionStore, SessionSignal)> {
    let store = SessionStore::new(config.session.store_config());
    let provider = Arc::new(StaticProvider::new(config.identity.clone()));
    store.start(provider).await?;

    let signal = store.resolved().await;
    debug!(session = signal.label(), "Session resolved");
    Ok((store, signal))
}

/// Print who is signed in.
pub async fn whoami(config: &Config) -> anyhow::Result<Outcome> {
    let (store, signal) = resolve_session(config).await?;
    store.shutdown();

    match ViewGate::Public.decide(&signal) {
        GateDecision::Render {
            identity: Some(identity),
        } => {
            println!("Signed in as {} ({})", identity.greeting_name(), identity.uid);
            if let Some(email) = &identity.email {
                println!("Email: {}", email);
            }
        }
        _ => println!("Not signed in"),
    }
    Ok(Outcome::Done)
}

/// Submit one target for scanning.
pub async fn submit(config: &Config, args: SubmitArgs) -> anyhow::Result<Outcome> {
    let (store, signal) = resolve_session(config).await?;
    let decision = ViewGate::Protected.decide(&signal);
    store.shutdown();

    let identity = match decision {
        GateDecision::Render {
            identity: Some(identity),
        } => identity,
        _ => {
            println!("{}", output::SIGN_IN_PROMPT);
            return Ok(Outcome::SignInRequired);
        }
    };
    println!("{}", output::greeting(identity.greeting_name()));

    let client = HttpIntakeClient::new(config.intake.clone())?;
    let controller = SubmissionController::new(
        Arc::new(client),
        ControllerConfig {
            limits: config.limits.clone(),
        },
    );

    let value = match (args.url, args.archive) {
        (Some(url), _) => {
            controller.set_mode(TargetKind::Url)?;
            TargetValue::Text(url)
        }
        (None, Some(path)) => {
            controller.set_mode(TargetKind::Archive)?;
            let archive = ArchivePayload::read_from(&path)
                .await
                .with_context(|| format!("reading {}", path.display()))?;
            TargetValue::Archive(archive)
        }
        (None, None) => bail!("either --url or --archive is required"),
    };

    if let Err(e) = controller.set_value(value) {
        eprintln!("{}", e.user_message());
        return Ok(Outcome::Failed);
    }

    info!(uid = %identity.uid, "Submitting scan");
    let result = tokio::select! {
        result = controller.submit() => result,
        _ = tokio::signal::ctrl_c() => {
            controller.dispose();
            eprintln!("Cancelled.");
            return Ok(Outcome::Cancelled);
        }
    };

    let state = match result {
        Ok(state) => state,
        Err(e) => {
            eprintln!("{}", e.user_message());
            return Ok(Outcome::Failed);
        }
    };

    let report = controller.last_report();
    if args.json {
        let out = SubmitOutput {
            state: &state,
            report: report.as_ref(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if let Some(report) = &report {
        output::print_report(report);
    } else if let Some(message) = state.message() {
        eprintln!("{}", message);
    }

    Ok(match state {
        SubmissionState::Succeeded(_) => Outcome::Done,
        _ => Outcome::Failed,
    })
}

/// Check that the intake service is up.
pub async fn ping(config: &Config) -> anyhow::Result<Outcome> {
    let client = HttpIntakeClient::new(config.intake.clone())?;
    match client.ping().await {
        Ok(pong) => {
            println!("{}: {}", client.config().base_url, pong.message);
            Ok(Outcome::Done)
        }
        Err(e) => {
            debug!(error = %e, "Ping failed");
            eprintln!("{}", e.user_message());
            Ok(Outcome::Failed)
        }
    }
}
