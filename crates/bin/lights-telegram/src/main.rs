//! # lights-telegram
//!
//! Composition root that wires all adapters together and runs the bridge.
//!
//! ## Responsibilities
//! - Resolve settings (CLI argument, env vars) and read the config document
//! - Write a template and exit non-zero when the config is missing or broken
//! - Construct the TOML state store, the MQTT bus and the Telegram client
//! - Construct application services, injecting adapters via port traits
//! - Run the bus event loop and the chat poller, dispatch chat messages
//! - Handle graceful shutdown on Ctrl-C
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::{mpsc, watch};
use tracing_subscriber::EnvFilter;

use lights_adapter_mqtt::{MqttBus, run_event_loop};
use lights_adapter_storage_toml::TomlStateStore;
use lights_adapter_telegram::{TelegramApi, TelegramChat, poll_loop};
use lights_app::services::auth_gate::AuthorizationGate;
use lights_app::services::reconciler::StateReconciler;
use lights_app::services::registry::Registry;
use lights_app::services::router::CommandRouter;
use lights_app::state::SharedState;

use crate::config::{Config, Settings};

/// Long-poll timeout for `getUpdates`, in seconds.
const POLL_TIMEOUT_SECS: u64 = 30;
const INBOX_CAPACITY: usize = 64;

#[tokio::main]
async fn main() -> ExitCode {
    let settings = Settings::from_env();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&settings.log_filter))
        .init();

    match run(settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(settings: Settings) -> anyhow::Result<()> {
    // Config
    let document = config::load_document(&settings.config_path).await?;
    let config = Config::from_document(&document, |key| std::env::var(key).ok())?;
    tracing::info!(path = %settings.config_path.display(), "configuration loaded");

    // State
    let store = TomlStateStore::new(&settings.config_path, document);
    let shared = Arc::new(
        SharedState::load(store)
            .await
            .context("failed to load bridge state")?,
    );
    let registry = Registry::new(Arc::clone(&shared));
    let gate = AuthorizationGate::new(shared);
    if gate.admin().await.is_none() {
        tracing::warn!("admin_id is not set, nobody can administer the bridge");
    }

    // Bus
    let (bus, eventloop) = MqttBus::new(&config.mqtt)?;
    let reconciler = StateReconciler::new(registry.clone());
    let bus_task = tokio::spawn(run_event_loop(eventloop, bus.client(), reconciler));

    // Chat
    let api = Arc::new(TelegramApi::new(&config.api_key));
    let me = api
        .get_me()
        .await
        .context("failed to reach the Telegram Bot API")?;
    tracing::info!(bot = me.display_name(), "connected to Telegram");
    let chat = TelegramChat::new(Arc::clone(&api));

    let (tx, mut rx) = mpsc::channel(INBOX_CAPACITY);
    let (cancel_tx, cancel_rx) = watch::channel(false);
    let poller = tokio::spawn(poll_loop(api, POLL_TIMEOUT_SECS, tx, cancel_rx));

    // Dispatch
    let router = CommandRouter::new(registry, gate, bus.clone(), chat);
    loop {
        tokio::select! {
            msg = rx.recv() => match msg {
                Some(msg) => router.handle(&msg).await,
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                break;
            }
        }
    }

    // Shutdown
    let _ = cancel_tx.send(true);
    if let Err(err) = poller.await {
        tracing::warn!(error = %err, "poller task failed");
    }
    if let Err(err) = bus.disconnect().await {
        tracing::warn!(error = %err, "failed to disconnect from MQTT broker");
    }
    bus_task.abort();
    Ok(())
}
