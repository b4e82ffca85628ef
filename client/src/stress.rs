//! Runs simulated clients against an authority and gathers their metrics.

use crate::channel::Channel;
use crate::config::StressConfig;
use crate::handshake::{handshake, HandshakeError};
use crate::metrics::{ClientReport, MetricsAggregator};
use crate::receiver::run_receive_loop;
use crate::session::ClientSession;
use log::{info, warn};
use std::io;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinError;
use tokio::time::{sleep, Instant};

/// Why one client produced no report. Never affects the other clients.
#[derive(Debug, Error)]
pub enum StressError {
    #[error("socket setup failed: {0}")]
    Socket(#[from] io::Error),

    #[error(transparent)]
    Handshake(#[from] HandshakeError),

    #[error("client task failed: {0}")]
    Task(#[from] JoinError),
}

/// One full session: handshake, then both loops until the shared deadline.
///
/// The deadline starts after the handshake, so every session runs for the
/// configured duration no matter how long it waited for its welcome.
pub async fn run_client(client_num: usize, config: &StressConfig) -> Result<ClientReport, StressError> {
    let channel = Channel::bind(config.server_addr, config.wire_format).await?;
    let id = handshake(&channel, config.handshake_timeout).await?;
    info!("[Client {}] Welcomed with id {}", client_num, id);

    let game_started = Arc::new(AtomicBool::new(false));
    let deadline = Instant::now() + config.duration;

    let receiver = tokio::spawn(run_receive_loop(
        channel.clone(),
        Arc::clone(&game_started),
        deadline,
        config.recv_poll_timeout,
    ));
    let session = ClientSession::new(id, config.movement, game_started);
    let simulation = tokio::spawn(session.run(channel, config.send_interval, deadline));

    // Both loops must finish before the tracker is read.
    let (sim, recv) = tokio::try_join!(simulation, receiver)?;

    let report = ClientReport::new(client_num, id, &sim, &recv);
    info!("{}", report.summary_line());
    Ok(report)
}

/// Launches `config.clients` independent sessions, `config.stagger` apart,
/// and waits for all of them.
pub async fn run_stress_test(config: &StressConfig) -> MetricsAggregator {
    let config = Arc::new(config.clone());
    let mut handles = Vec::with_capacity(config.clients);

    for client_num in 1..=config.clients {
        let task_config = Arc::clone(&config);
        handles.push((
            client_num,
            tokio::spawn(async move { run_client(client_num, &task_config).await }),
        ));
        if client_num < config.clients && !config.stagger.is_zero() {
            sleep(config.stagger).await;
        }
    }

    let mut metrics = MetricsAggregator::new();
    for (client_num, handle) in handles {
        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(e) => Err(StressError::from(e)),
        };
        match outcome {
            Ok(report) => metrics.record(report),
            Err(e) => {
                warn!("[Client {}] {}", client_num, e);
                metrics.record_failure(client_num, e.to_string());
            }
        }
    }

    let summary = metrics.summary();
    info!(
        "Run finished: {} clients, {} failed, {} updates and {} pings sent ({} send failures), mean loss {:.2}%, worst {:.2}%",
        summary.clients,
        summary.failed,
        summary.total_updates,
        summary.total_pings,
        summary.total_send_failures,
        summary.mean_loss_percent,
        summary.worst_loss_percent
    );
    metrics
}
