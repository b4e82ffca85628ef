use clap::{Parser, ValueEnum};
use client::config::{Movement, StressConfig};
use client::stress::run_stress_test;
use log::info;
use shared::WireFormat;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MovementArg {
    /// x and y grow by one every tick
    Linear,
    /// Bounded random walk over the canvas
    Random,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Text,
    Binary,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of simulated clients
    #[arg(short = 'c', long, default_value = "10")]
    clients: usize,

    /// Duration of the test in seconds
    #[arg(short = 'd', long, default_value = "10")]
    duration: u64,

    /// Server address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:9000")]
    server: SocketAddr,

    /// Interval between pings/updates in milliseconds
    #[arg(short = 'i', long, default_value = "100")]
    interval_ms: u64,

    /// Movement rule once the game has started
    #[arg(short = 'm', long, value_enum, default_value = "linear")]
    movement: MovementArg,

    /// Wire format spoken by the server
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: FormatArg,

    /// Directory for the loss and packet size CSV tables
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

impl Args {
    fn into_config(self) -> StressConfig {
        StressConfig {
            clients: self.clients,
            duration: Duration::from_secs(self.duration),
            server_addr: self.server,
            send_interval: Duration::from_millis(self.interval_ms.max(1)),
            movement: match self.movement {
                MovementArg::Linear => Movement::Linear,
                MovementArg::Random => Movement::random_walk(),
            },
            wire_format: match self.format {
                FormatArg::Text => WireFormat::Text,
                FormatArg::Binary => WireFormat::Binary,
            },
            ..StressConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for per-client results");
    }

    let args = Args::parse();
    let log_dir = args.log_dir.clone();
    let config = args.into_config();

    info!(
        "Starting {} clients against {} for {:?} ({:?}, {:?})",
        config.clients, config.server_addr, config.duration, config.wire_format, config.movement
    );

    let metrics = run_stress_test(&config).await;

    for report in metrics.reports() {
        println!("{}", report.summary_line());
    }
    for failure in metrics.failures() {
        println!("[Client {}] {}", failure.client_num, failure.reason);
    }

    if let Some(dir) = log_dir {
        let (loss, sizes) = metrics.export_csv(&dir)?;
        info!("Wrote {} and {}", loss.display(), sizes.display());
    }

    Ok(())
}
