//! # Stress Client Library
//!
//! Client side of a tick-synchronized UDP protocol, built to load and measure
//! an authoritative server rather than to play on it.
//!
//! ## How a session runs
//!
//! 1. [`handshake()`] sends `HELLO` and waits, bounded by a timeout, for
//!    `WELCOME:<id>`. Failure abandons only that session.
//! 2. Two tasks then share one socket until a common deadline:
//!    - the simulation loop ([`session`]) sends a `Ping` every interval until
//!      the game starts, then a `ClientUpdate` with the walker's position;
//!    - the receive loop ([`receiver`]) decodes broadcasts, flips the
//!      `game_started` flag and feeds ticks into the [`tick_tracker`].
//! 3. Both tasks are joined, then the loss figures are computed into a
//!    [`metrics::ClientReport`].
//!
//! Clients never share state with each other. Within a client the loops only
//! share an atomic flag; the tick tracker belongs to the receive loop and is
//! handed over when it is joined.
//!
//! ## Module Organization
//!
//! - `channel`: socket, authority address and wire format of one session
//! - `config`: run parameters and their defaults
//! - `handshake`: HELLO/WELCOME exchange
//! - `session`: movement rules and the fixed-cadence send loop
//! - `receiver`: the timeout-polled receive loop
//! - `tick_tracker`: expected-versus-received tick accounting
//! - `metrics`: per-client reports, run summary, CSV tables
//! - `stress`: per-client orchestration and N-client fan-out
//! - `interpolation`: snapshot smoothing for the viewer
//! - `rendering`: viewer drawing
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::config::StressConfig;
//! use client::stress::run_stress_test;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = StressConfig {
//!         clients: 50,
//!         duration: Duration::from_secs(5),
//!         ..StressConfig::default()
//!     };
//!
//!     let metrics = run_stress_test(&config).await;
//!     for report in metrics.reports() {
//!         println!("{}", report.summary_line());
//!     }
//! }
//! ```

pub mod channel;
pub mod config;
pub mod handshake;
pub mod interpolation;
pub mod metrics;
pub mod receiver;
pub mod rendering;
pub mod session;
pub mod stress;
pub mod tick_tracker;

pub use handshake::{handshake, HandshakeError};
