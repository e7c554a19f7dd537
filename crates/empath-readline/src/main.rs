mod console;
mod logging;

use std::time::Duration;

use anyhow::Result;
use colored::Colorize;
use empath_core::config::{AppConfig, SecretConfig};
use empath_core::error::EmpathError;
use empath_core::patient::{IntakeOutcome, collect_profile};
use empath_core::secret::{SecretService, resolve_gemini_credential};
use empath_core::session::{
    Console, ConsultationLoop, ConsultationOutcome, EstablishedSession, INTERRUPTED_MESSAGE,
    ModelFallbackSelector, ModelListing,
};
use empath_infrastructure::{ConfigService, EmpathPaths, SecretServiceImpl};
use empath_interaction::GeminiApiBackend;
use tokio_util::sync::CancellationToken;

use crate::console::TerminalConsole;

const API_KEY_ENV: &str = "GEMINI_API_KEY";
const INITIAL_REPLY_LABEL: &str = "Empath AI";

/// Entry point of the Empath consultation REPL.
///
/// 1. Loads config and secrets, configuring the Gemini backend
/// 2. Runs the intake questionnaire
/// 3. Opens a session on the first candidate model that answers
/// 4. Hands the session to the consultation loop
///
/// Every failure path ends with an explanatory message and exit code 0.
#[tokio::main]
async fn main() -> Result<()> {
    let paths = EmpathPaths::default();
    let config = match ConfigService::new(paths.clone()).load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", format!("Ignoring invalid config: {err:#}").yellow());
            AppConfig::default()
        }
    };
    let _log_guard = logging::init(&paths, &config.logging);
    tracing::info!("Starting empath {}", env!("CARGO_PKG_VERSION"));

    let (backend, preferred_model) = match configure_backend(&paths, &config).await {
        Ok(configured) => configured,
        Err(err) => {
            tracing::error!("Configuration failed: {}", err);
            println!("{}", format!("Failed to configure Gemini API: {}", err.detail()).red());
            return Ok(());
        }
    };

    let mut console = match TerminalConsole::new(&config.console) {
        Ok(console) => console,
        Err(err) => {
            tracing::error!("Terminal setup failed: {}", err);
            println!("{}", format!("Failed to initialize terminal: {err}").red());
            return Ok(());
        }
    };

    let cancel = CancellationToken::new();
    let watcher = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            watcher.cancel();
        }
    });

    console.clear();
    console.heading("=== Empath AI (Medical AI Assistant) ===");
    console.say("Initializing medical database...");

    let profile = match collect_profile(&mut console, &cancel).await {
        IntakeOutcome::Completed(profile) => profile,
        IntakeOutcome::Interrupted => {
            console.say(INTERRUPTED_MESSAGE);
            return Ok(());
        }
    };

    console.say("Connecting to medical AI core...");
    let selector = ModelFallbackSelector::new(config.candidate_models(preferred_model.as_deref()));
    let prompt = profile.persona_prompt();

    let established = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            console.say(INTERRUPTED_MESSAGE);
            return Ok(());
        }
        result = selector.establish_session(&backend, &prompt) => result,
    };

    let EstablishedSession {
        session,
        model_id,
        initial_reply,
    } = match established {
        Ok(established) => established,
        Err(err) => {
            report_connection_failure(&mut console, &err);
            return Ok(());
        }
    };
    tracing::info!("Consulting with model '{}'", model_id);

    console.clear();
    console.heading(&format!(
        "=== Medical Consultation: Dr. Serene & {} ===",
        profile.name
    ));
    console.say("");
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            console.say(INTERRUPTED_MESSAGE);
            return Ok(());
        }
        _ = console.render_reply(INITIAL_REPLY_LABEL, &initial_reply) => {}
    }

    let mut consultation = ConsultationLoop::new(session, profile.name.clone());
    match consultation.run(&mut console, &cancel).await {
        ConsultationOutcome::Farewell | ConsultationOutcome::Interrupted => {}
        ConsultationOutcome::TransportFailed(err) => {
            tracing::error!("Consultation ended by transport failure: {}", err);
        }
    }

    Ok(())
}

/// Resolves the credential and builds the backend.
///
/// `GEMINI_API_KEY` takes precedence, so a missing `secret.json` is only an
/// error when the variable is unset. A template secret file is created to show
/// where the key belongs.
async fn configure_backend(
    paths: &EmpathPaths,
    config: &AppConfig,
) -> Result<(GeminiApiBackend, Option<String>), EmpathError> {
    let env_key = std::env::var(API_KEY_ENV)
        .ok()
        .filter(|key| !key.trim().is_empty());

    let service = SecretServiceImpl::new(paths)?;
    if !service.secret_file_exists().await {
        if let Err(err) = paths.ensure_secret_file() {
            tracing::warn!("Could not create secret.json template: {}", err);
        }
    }

    let secrets = match service.load_secrets().await {
        Ok(secrets) => secrets,
        Err(_) if env_key.is_some() => SecretConfig::default(),
        Err(err) => return Err(err),
    };

    let (api_key, preferred_model) = resolve_gemini_credential(&secrets, env_key)?;

    let mut backend = GeminiApiBackend::new(api_key)?;
    if let Some(base_url) = &config.api.base_url {
        backend = backend.with_base_url(base_url);
    }
    if let Some(secs) = config.api.request_timeout_secs {
        backend = backend.with_timeout(Duration::from_secs(secs))?;
    }

    Ok((backend, preferred_model))
}

fn report_connection_failure(console: &mut TerminalConsole, err: &EmpathError) {
    tracing::error!("Session bootstrap failed: {}", err);
    console.error("\nConnection Error: Could not connect to any Gemini model.");

    let EmpathError::NoModelAvailable {
        last_error,
        listing,
    } = err
    else {
        console.error(&format!("Last Error Details: {}", err.detail()));
        return;
    };

    console.error(&format!("Last Error Details: {last_error}"));
    console.say("\n--- DIAGNOSTICS: Available Models ---");
    match listing {
        ModelListing::Available(models) => {
            for model in models {
                console.say(&format!("- {model}"));
            }
        }
        ModelListing::Unavailable(reason) => {
            console.say(&format!("Could not list models: {reason}"));
        }
    }
    console.say("-------------------------------------\n");
}
