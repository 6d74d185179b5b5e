//! main.rs — Rover telemetry simulator entry point
//!
//! Runs two concurrent loops:
//!   1. Tick loop: advances the rover session every `tick_ms` and broadcasts the
//!      frame (plus any threshold alerts) to every connected dashboard
//!   2. Control server: WebSocket on `ctrl_port` for operator commands
//!      (pause, overrides, randomize, reset, autonomous toggle, profiles),
//!      `/state` for a one-shot snapshot, `/health` for liveness
//!
//! Pausing only skips the update; the ticker keeps firing.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::{State, WebSocketUpgrade, ws::{Message, WebSocket}},
    response::Response,
    routing::get,
};
use clap::Parser;
use rover_simulator::config::FullConfig;
use rover_simulator::session::{RoverSession, parse_command};
use rover_types::{ProfileName, ServerMessage, TelemetryFrame};
use tokio::sync::{RwLock, broadcast};
use tokio::time::interval;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "rover-sim", about = "Synthetic rover telemetry simulator")]
struct Args {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,
    /// Control panel WebSocket port
    #[arg(long)]
    ctrl_port: Option<u16>,
    /// Telemetry tick period in milliseconds
    #[arg(long)]
    tick_ms: Option<u64>,
    /// Drift profile: dashboard | store
    #[arg(long, value_parser = parse_profile)]
    profile: Option<ProfileName>,
    /// Fixed seed for a reproducible trajectory
    #[arg(long)]
    seed: Option<u64>,
    /// Start with autonomous mode enabled
    #[arg(long)]
    autonomous: bool,
}

impl Args {
    fn apply(&self, cfg: &mut FullConfig) {
        if let Some(port) = self.ctrl_port {
            cfg.server.ctrl_port = port;
        }
        if let Some(ms) = self.tick_ms {
            cfg.telemetry.tick_ms = ms;
        }
        if let Some(profile) = self.profile {
            cfg.telemetry.profile = profile;
        }
        if let Some(seed) = self.seed {
            cfg.source.seed = Some(seed);
        }
        if self.autonomous {
            cfg.telemetry.autonomous = true;
        }
    }
}

fn parse_profile(s: &str) -> Result<ProfileName, String> {
    match s.to_ascii_lowercase().as_str() {
        "dashboard" => Ok(ProfileName::Dashboard),
        "store" => Ok(ProfileName::Store),
        other => Err(format!("unknown profile '{other}' (expected dashboard or store)")),
    }
}

// ── Shared state ──────────────────────────────────────────────────────────────

type SharedState = Arc<RwLock<RoverSession>>;
type Telemetry = Arc<broadcast::Sender<String>>;

// ── Main ──────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rover_simulator=info,rover_sim=info".into()),
        )
        .init();

    let args = Args::parse();

    let mut cfg = FullConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    args.apply(&mut cfg);
    cfg.validate()?;

    info!(
        "🤖 Rover simulator starting — profile {}, {}ms tick, autonomous {}",
        cfg.telemetry.profile, cfg.telemetry.tick_ms, cfg.telemetry.autonomous
    );

    let session = RoverSession::from_config(&cfg)?;
    let shared: SharedState = Arc::new(RwLock::new(session));

    // Broadcast channel for telemetry (dashboards)
    let (telem_tx, _) = broadcast::channel::<String>(64);
    let telem_tx: Telemetry = Arc::new(telem_tx);

    tokio::spawn(tick_loop(shared.clone(), telem_tx.clone(), cfg.telemetry.tick_period()));

    let ctrl_addr = format!("{}:{}", cfg.server.bind, cfg.server.ctrl_port);
    info!("🖥  Control panel WebSocket at ws://{ctrl_addr}/ws");

    let app = Router::new()
        .route("/ws", get(ws_handler))
        .route("/state", get(state_handler))
        .route("/health", get(|| async { "rover-sim ok" }))
        .with_state((shared, telem_tx))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any));

    let listener = tokio::net::TcpListener::bind(&ctrl_addr)
        .await
        .with_context(|| format!("binding {ctrl_addr}"))?;
    axum::serve(listener, app).await.context("control server stopped")?;
    Ok(())
}

// ── Tick loop ─────────────────────────────────────────────────────────────────

async fn tick_loop(state: SharedState, telem: Telemetry, period: Duration) {
    let mut ticker = interval(period);

    info!("⏱ Tick loop running every {}ms", period.as_millis());

    loop {
        ticker.tick().await;

        let out = state.write().await.tick();
        let Some(out) = out else { continue };

        let tick = out.frame.tick;
        let behavior = out.frame.state.behavior;
        let battery = out.frame.state.battery_pct;

        publish(&telem, &ServerMessage::Telemetry(out.frame));
        for alert in out.alerts {
            publish(&telem, &ServerMessage::Alert(alert));
        }

        if tick % 20 == 0 {
            info!("📡 tick={tick} | behavior={behavior} | battery={battery}% | clients={}",
                telem.receiver_count());
        }
    }
}

fn publish(telem: &Telemetry, msg: &ServerMessage) {
    match serde_json::to_string(msg) {
        // No subscribers is fine
        Ok(json) => { let _ = telem.send(json); }
        Err(e) => warn!("Telemetry: serialize failed: {e}"),
    }
}

// ── HTTP handlers ─────────────────────────────────────────────────────────────

async fn state_handler(State((state, _)): State<(SharedState, Telemetry)>) -> Json<TelemetryFrame> {
    Json(state.read().await.snapshot())
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State((state, telem_tx)): State<(SharedState, Telemetry)>,
) -> Response {
    ws.on_upgrade(move |socket| handle_ws(socket, state, telem_tx))
}

async fn handle_ws(mut socket: WebSocket, state: SharedState, telem_tx: Telemetry) {
    let mut telem_rx = telem_tx.subscribe();

    // Bring the new client up to date before streaming
    let greeting = {
        let s = state.read().await;
        [
            s.status(),
            ServerMessage::History { frames: s.history().frames() },
            ServerMessage::Alerts { alerts: s.alerts().list() },
        ]
    };
    for msg in &greeting {
        match serde_json::to_string(msg) {
            Ok(json) => {
                if socket.send(Message::Text(json)).await.is_err() { return; }
            }
            Err(e) => warn!("WS: serialize failed: {e}"),
        }
    }

    loop {
        tokio::select! {
            // Relay telemetry to client
            relayed = telem_rx.recv() => match relayed {
                Ok(json) => {
                    if socket.send(Message::Text(json)).await.is_err() { break; }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("WS: client lagging, skipped {n} messages");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            // Handle commands from the dashboard
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Text(raw))) => handle_command(&state, &telem_tx, &raw).await,
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => { warn!("WS: receive failed: {e}"); break; }
            },
        }
    }
}

/// Commands are JSON: { "cmd": "...", "args": {...} }
async fn handle_command(state: &SharedState, telem: &Telemetry, raw: &str) {
    let cmd = match parse_command(raw) {
        Ok(cmd) => cmd,
        Err(e) => { warn!("Ignoring control message: {e}"); return; }
    };
    let replies = state.write().await.apply(cmd);
    for msg in &replies {
        publish(telem, msg);
    }
}
