//! # rover-simulator
//!
//! Synthetic telemetry for a remote-controlled rover: a biased random walk over
//! temperature, distance, gas, battery, signal and heading, plus a stateless
//! behavior classifier. The `rover-sim` binary drives a [`session::RoverSession`]
//! on a fixed tick and exposes it over a control WebSocket.

pub mod alerts;
pub mod behavior;
pub mod config;
pub mod history;
pub mod profiles;
pub mod random;
pub mod session;
pub mod telemetry;

pub use behavior::classify;
pub use random::{RngSource, ScriptedSource, UnitSource};
pub use session::RoverSession;
pub use telemetry::TelemetryGenerator;
