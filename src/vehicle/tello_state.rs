use super::VehicleError;
use crate::{event, warn};
use regex::Regex;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, LazyLock};
use tokio::net::UdpSocket;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

static STATE_FIELD_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z_]+):([^;]*);").unwrap());

/// One decoded state packet as pushed by the vehicle about ten times a second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelloState {
    /// `None` while no pad is in view, detection is off (`mid:-2`) or the firmware has
    /// no pad support at all.
    mid: Option<i32>,
    x: Option<i32>,
    y: Option<i32>,
    z: Option<i32>,
    bat: u8,
    tof: i32,
}

impl TelloState {
    /// Id reported for "no mission pad".
    pub const NO_PAD: i32 = -1;

    /// Decodes a `key:value;` state line. Unknown keys are ignored. Battery and
    /// time-of-flight are required; the pad fields only exist on pad-capable firmware.
    pub fn parse(packet: &str) -> Option<Self> {
        let fields: HashMap<&str, &str> = STATE_FIELD_REGEX
            .captures_iter(packet)
            .filter_map(|c| Some((c.get(1)?.as_str(), c.get(2)?.as_str())))
            .collect();
        let int = |key: &str| fields.get(key).and_then(|v| v.trim().parse::<i32>().ok());
        let mid = int("mid").filter(|id| *id >= 0);
        let offset = |key: &str| mid.and(int(key));
        Some(Self {
            mid,
            x: offset("x"),
            y: offset("y"),
            z: offset("z"),
            bat: u8::try_from(int("bat")?.clamp(0, 100)).ok()?,
            tof: int("tof")?,
        })
    }

    pub fn mission_pad_id(&self) -> i32 { self.mid.unwrap_or(Self::NO_PAD) }
    pub fn mission_pad_x(&self) -> Option<i32> { self.x }
    pub fn mission_pad_y(&self) -> Option<i32> { self.y }
    pub fn mission_pad_z(&self) -> Option<i32> { self.z }
    pub fn battery(&self) -> u8 { self.bat }
    pub fn tof(&self) -> i32 { self.tof }
}

/// Receives state packets and keeps the latest one available to readers.
pub struct StateListener {
    latest: RwLock<Option<TelloState>>,
    c_tok: CancellationToken,
}

impl StateListener {
    const MAX_PACKET_LEN: usize = 1024;

    pub fn new(c_tok: CancellationToken) -> Self {
        Self { latest: RwLock::new(None), c_tok }
    }

    pub async fn latest(&self) -> Result<TelloState, VehicleError> {
        self.latest.read().await.ok_or(VehicleError::StateUnavailable)
    }

    /// Binds the state port and spawns the receive loop. The loop ends when the
    /// listener's cancellation token fires.
    pub async fn start(self: &Arc<Self>, bind: SocketAddr) -> Result<(), VehicleError> {
        let socket = UdpSocket::bind(bind).await?;
        let listener = Arc::clone(self);
        tokio::spawn(async move { listener.run(socket).await });
        Ok(())
    }

    async fn run(&self, socket: UdpSocket) {
        let mut buf = [0u8; Self::MAX_PACKET_LEN];
        loop {
            let received = tokio::select! {
                res = socket.recv_from(&mut buf) => res,
                () = self.c_tok.cancelled() => break,
            };
            match received {
                Ok((len, _)) => {
                    let packet = String::from_utf8_lossy(&buf[..len]);
                    if let Some(state) = TelloState::parse(&packet) {
                        event!("State packet: {state:?}");
                        *self.latest.write().await = Some(state);
                    } else {
                        event!("Dropping malformed state packet {packet:?}");
                    }
                }
                Err(e) => warn!("State socket receive failed: {e}"),
            }
        }
    }

    #[cfg(test)]
    pub(crate) async fn inject(&self, state: TelloState) {
        *self.latest.write().await = Some(state);
    }
}
