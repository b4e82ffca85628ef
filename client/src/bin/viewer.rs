//! Live view of broadcast snapshots with interpolated motion.

use clap::{Parser, ValueEnum};
use client::config::ViewerConfig;
use client::interpolation::Interpolator;
use client::rendering::Renderer;
use log::{debug, error, info};
use macroquad::prelude::*;
use macroquad::window::Conf;
use shared::{Message, WireFormat, RECV_BUFFER_SIZE, VIEWER_PORT};
use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

const RECV_ERROR_BACKOFF: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Text,
    Binary,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// UDP port receiving snapshot broadcasts
    #[arg(short = 'p', long, default_value_t = VIEWER_PORT)]
    port: u16,

    /// Wire format of the broadcasts
    #[arg(short = 'f', long, value_enum, default_value = "binary")]
    format: FormatArg,

    /// Blend factor added per frame
    #[arg(short = 's', long, default_value = "0.1")]
    step: f32,
}

impl Args {
    fn into_config(self) -> ViewerConfig {
        ViewerConfig {
            listen_addr: SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, self.port)),
            wire_format: match self.format {
                FormatArg::Text => WireFormat::Text,
                FormatArg::Binary => WireFormat::Binary,
            },
            interp_step: self.step.clamp(0.0, 1.0),
            ..ViewerConfig::default()
        }
    }
}

fn lock(interpolator: &Mutex<Interpolator>) -> MutexGuard<'_, Interpolator> {
    interpolator.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Waits for one datagram and applies it if it is a snapshot.
fn receive_snapshot(
    socket: &UdpSocket,
    buffer: &mut [u8],
    format: WireFormat,
    interpolator: &Mutex<Interpolator>,
) -> io::Result<()> {
    let (len, _) = socket.recv_from(buffer)?;
    match format.decode(&buffer[..len]) {
        Ok(Message::StatePacket { players, .. }) => lock(interpolator).on_snapshot(&players),
        Ok(other) => debug!("Ignoring {} message", other.kind()),
        Err(e) => debug!("Dropping datagram: {}", e),
    }
    Ok(())
}

/// Blocking listener thread: every decoded snapshot replaces the tracked set.
fn spawn_listener(
    socket: UdpSocket,
    format: WireFormat,
    interpolator: Arc<Mutex<Interpolator>>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut buffer = vec![0u8; RECV_BUFFER_SIZE];
        loop {
            if let Err(e) = receive_snapshot(&socket, &mut buffer, format, &interpolator) {
                error!("Error receiving snapshot: {}", e);
                thread::sleep(RECV_ERROR_BACKOFF);
            }
        }
    })
}

fn window_conf() -> Conf {
    let defaults = ViewerConfig::default();
    Conf {
        window_title: "Live Player Viewer".to_owned(),
        window_width: defaults.width as i32,
        window_height: defaults.height as i32,
        window_resizable: true,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    let config = Args::parse().into_config();

    let socket = match UdpSocket::bind(config.listen_addr) {
        Ok(socket) => socket,
        Err(e) => {
            error!("Failed to bind {}: {}", config.listen_addr, e);
            return;
        }
    };
    info!("Listening for snapshots on {}", config.listen_addr);

    let interpolator = Arc::new(Mutex::new(Interpolator::new()));
    let _listener = spawn_listener(socket, config.wire_format, Arc::clone(&interpolator));
    let mut renderer = Renderer::new();

    loop {
        let (positions, bounds) = {
            let mut interp = lock(&interpolator);
            (interp.advance(config.interp_step), interp.bounds())
        };

        renderer.render(&positions, bounds);

        if is_key_pressed(KeyCode::Escape) {
            break;
        }
        next_frame().await;
    }
}
