//! In-process stand-in for the authoritative server.
//!
//! Answers `HELLO` with a fresh id, records pings and updates per id and
//! broadcasts a snapshot to every registered client on a fixed interval.

use log::debug;
use shared::message::ClientId;
use shared::{GameState, Message, PlayerState, WireFormat};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};

#[derive(Debug, Default, Clone)]
pub struct ClientRecord {
    pub pings: u64,
    pub updates: u64,
    pub last_position: Option<(i32, i32)>,
    /// Updates whose id did not belong to the sending address.
    pub spoofed: u64,
}

type AuthorityLog = HashMap<ClientId, ClientRecord>;

pub struct Authority {
    pub addr: SocketAddr,
    log: Arc<Mutex<AuthorityLog>>,
    handle: JoinHandle<()>,
}

impl Authority {
    /// `start_after` keeps the broadcasts in `Waiting` for that long.
    pub async fn spawn(format: WireFormat, broadcast_every: Duration, start_after: Duration) -> Authority {
        let socket = UdpSocket::bind("127.0.0.1:0").await.expect("bind authority");
        let addr = socket.local_addr().expect("authority addr");
        let log = Arc::new(Mutex::new(AuthorityLog::default()));

        let handle = tokio::spawn(serve(socket, format, broadcast_every, start_after, Arc::clone(&log)));

        Authority { addr, log, handle }
    }

    pub fn snapshot(&self) -> HashMap<ClientId, ClientRecord> {
        self.log.lock().unwrap().clone()
    }
}

impl Drop for Authority {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve(
    socket: UdpSocket,
    format: WireFormat,
    broadcast_every: Duration,
    start_after: Duration,
    log: Arc<Mutex<AuthorityLog>>,
) {
    let started_at = Instant::now() + start_after;
    let mut by_addr: HashMap<SocketAddr, ClientId> = HashMap::new();
    let mut next_id: ClientId = 1;
    let mut tick: u32 = 0;
    let mut buffer = [0u8; 2048];

    let mut ticker = interval(broadcast_every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            result = socket.recv_from(&mut buffer) => {
                let (len, from) = match result {
                    Ok(received) => received,
                    Err(_) => continue,
                };
                let msg = match format.decode(&buffer[..len]) {
                    Ok(msg) => msg,
                    Err(e) => {
                        debug!("authority dropped datagram from {}: {}", from, e);
                        continue;
                    }
                };

                let reply = {
                    let mut log = log.lock().unwrap();
                    match msg {
                        Message::Hello => {
                            let id = *by_addr.entry(from).or_insert_with(|| {
                                let id = next_id;
                                next_id += 1;
                                id
                            });
                            log.entry(id).or_default();
                            Some(Message::Welcome { id })
                        }
                        Message::Ping { id } => {
                            if by_addr.get(&from) == Some(&id) {
                                log.entry(id).or_default().pings += 1;
                            }
                            None
                        }
                        Message::ClientUpdate { id, x, y } => {
                            let record = log.entry(id).or_default();
                            if by_addr.get(&from) == Some(&id) {
                                record.updates += 1;
                                record.last_position = Some((x, y));
                            } else {
                                record.spoofed += 1;
                            }
                            None
                        }
                        _ => None,
                    }
                };

                if let Some(reply) = reply {
                    if let Ok(data) = format.encode(&reply) {
                        let _ = socket.send_to(&data, from).await;
                    }
                }
            }

            _ = ticker.tick() => {
                let state = if Instant::now() >= started_at {
                    GameState::Started
                } else {
                    GameState::Waiting
                };
                let (players, targets): (Vec<PlayerState>, Vec<SocketAddr>) = {
                    let log = log.lock().unwrap();
                    let players = log
                        .iter()
                        .filter_map(|(id, r)| r.last_position.map(|(x, y)| PlayerState::new(*id, x, y)))
                        .collect();
                    (players, by_addr.keys().copied().collect())
                };

                let packet = Message::StatePacket { state, tick: Some(tick), players };
                if let Ok(data) = format.encode(&packet) {
                    for target in targets {
                        let _ = socket.send_to(&data, target).await;
                    }
                }
                tick += 1;
            }
        }
    }
}
