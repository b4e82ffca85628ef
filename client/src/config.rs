//! Run parameters consumed by the stress harness and the viewer.

use shared::{WireFormat, CANVAS_BOUND, RECV_POLL_MS, SEND_INTERVAL_MS, SERVER_PORT, VIEWER_PORT};
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;

/// How a simulated client moves once the game has started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Movement {
    /// `x += 1, y += 1` every tick, starting at the origin.
    #[default]
    Linear,
    /// Random step per axis from [`shared::WALK_STEPS`], clamped to `[0, bound]`.
    RandomWalk { bound: i32 },
}

impl Movement {
    pub fn random_walk() -> Self {
        Movement::RandomWalk {
            bound: CANVAS_BOUND,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StressConfig {
    pub clients: usize,
    pub duration: Duration,
    pub server_addr: SocketAddr,
    pub send_interval: Duration,
    pub recv_poll_timeout: Duration,
    pub handshake_timeout: Duration,
    pub movement: Movement,
    pub wire_format: WireFormat,
    /// Delay between launching consecutive clients.
    pub stagger: Duration,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            clients: 10,
            duration: Duration::from_secs(10),
            server_addr: SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, SERVER_PORT)),
            send_interval: Duration::from_millis(SEND_INTERVAL_MS),
            recv_poll_timeout: Duration::from_millis(RECV_POLL_MS),
            handshake_timeout: Duration::from_millis(RECV_POLL_MS),
            movement: Movement::Linear,
            wire_format: WireFormat::Text,
            stagger: Duration::from_millis(10),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub listen_addr: SocketAddr,
    pub wire_format: WireFormat,
    /// Blend factor added per rendered frame.
    pub interp_step: f32,
    pub width: usize,
    pub height: usize,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, VIEWER_PORT)),
            wire_format: WireFormat::Binary,
            interp_step: 0.1,
            width: 800,
            height: 600,
        }
    }
}
