use super::{MoveDirection, StateListener, Vehicle, VehicleError};
use crate::config::GroundConfig;
use crate::flight_control::{CameraDirection, VelocityState};
use crate::{event, info, log};
use async_trait::async_trait;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

/// UDP text-SDK connection to a Tello.
///
/// The command socket sits behind a single mutex, so every command, including RC
/// frames, is written by exactly one task at a time and a reply is always matched
/// to the command that caused it.
pub struct TelloLink {
    cmd_socket: Mutex<UdpSocket>,
    remote: SocketAddr,
    reply_timeout: Duration,
    state: Arc<StateListener>,
    state_addr: SocketAddr,
    state_started: AtomicBool,
}

impl TelloLink {
    const MAX_REPLY_LEN: usize = 256;
    const MOVE_RANGE_CM: std::ops::RangeInclusive<u32> = 20..=500;

    /// Opens the local command socket. No datagram is sent before [`Vehicle::connect`].
    pub async fn bind(conf: &GroundConfig, c_tok: CancellationToken) -> Result<Self, VehicleError> {
        let socket = UdpSocket::bind(conf.tello_local_addr).await?;
        Ok(Self {
            cmd_socket: Mutex::new(socket),
            remote: conf.tello_addr,
            reply_timeout: conf.reply_timeout,
            state: Arc::new(StateListener::new(c_tok)),
            state_addr: conf.tello_state_addr,
            state_started: AtomicBool::new(false),
        })
    }

    pub fn state(&self) -> Arc<StateListener> { Arc::clone(&self.state) }

    /// Sends `cmd` and waits for the vehicle's reply.
    async fn send_command(&self, cmd: &str) -> Result<String, VehicleError> {
        let socket = self.cmd_socket.lock().await;
        let mut buf = [0u8; Self::MAX_REPLY_LEN];
        // late replies of timed out commands would otherwise be read as ours
        while let Ok((len, _)) = socket.try_recv_from(&mut buf) {
            log!("Discarding stale reply {:?}", String::from_utf8_lossy(&buf[..len]));
        }
        socket.send_to(cmd.as_bytes(), self.remote).await?;
        event!("Sent {cmd:?}");
        let (len, _) = timeout(self.reply_timeout, socket.recv_from(&mut buf))
            .await
            .map_err(|_| VehicleError::Timeout)??;
        let reply = String::from_utf8_lossy(&buf[..len]).trim().to_string();
        event!("Reply to {cmd:?}: {reply:?}");
        if reply.to_lowercase().starts_with("error") {
            Err(VehicleError::Rejected(reply))
        } else {
            Ok(reply)
        }
    }

    async fn send_control(&self, cmd: &str) -> Result<(), VehicleError> {
        let reply = self.send_command(cmd).await?;
        if reply.eq_ignore_ascii_case("ok") {
            Ok(())
        } else {
            Err(VehicleError::Rejected(reply))
        }
    }
}

#[async_trait]
impl Vehicle for TelloLink {
    async fn connect(&self) -> Result<(), VehicleError> {
        self.send_control("command").await.map_err(|e| match e {
            VehicleError::Timeout => VehicleError::NoConnection,
            other => other,
        })?;
        if !self.state_started.swap(true, Ordering::AcqRel) {
            if let Err(e) = self.state.start(self.state_addr).await {
                self.state_started.store(false, Ordering::Release);
                return Err(e);
            }
        }
        info!("Command channel to {} open.", self.remote);
        Ok(())
    }

    async fn send_velocity(&self, rc: VelocityState) -> Result<(), VehicleError> {
        let cmd = format!("rc {} {} {} {}", rc.lr(), rc.fb(), rc.ud(), rc.yv());
        let socket = self.cmd_socket.lock().await;
        socket.send_to(cmd.as_bytes(), self.remote).await?;
        event!("Sent {cmd:?}");
        Ok(())
    }

    async fn takeoff(&self) -> Result<(), VehicleError> { self.send_control("takeoff").await }

    async fn land(&self) -> Result<(), VehicleError> { self.send_control("land").await }

    async fn battery(&self) -> Result<u8, VehicleError> {
        Ok(self.state.latest().await?.battery())
    }

    async fn mission_pad_id(&self) -> Result<i32, VehicleError> {
        Ok(self.state.latest().await?.mission_pad_id())
    }

    async fn mission_pad_distance_x(&self) -> Result<i32, VehicleError> {
        self.state.latest().await?.mission_pad_x().ok_or(VehicleError::StateUnavailable)
    }

    async fn mission_pad_distance_y(&self) -> Result<i32, VehicleError> {
        self.state.latest().await?.mission_pad_y().ok_or(VehicleError::StateUnavailable)
    }

    async fn mission_pad_distance_z(&self) -> Result<i32, VehicleError> {
        self.state.latest().await?.mission_pad_z().ok_or(VehicleError::StateUnavailable)
    }

    async fn travel(&self, dir: MoveDirection, cm: u32) -> Result<(), VehicleError> {
        if !Self::MOVE_RANGE_CM.contains(&cm) {
            return Err(VehicleError::OutOfRange(cm));
        }
        self.send_control(&format!("{dir} {cm}")).await
    }

    async fn enable_mission_pads(&self) -> Result<(), VehicleError> {
        self.send_control("mon").await?;
        // 2: detect pads below and in front of the vehicle
        self.send_control("mdirection 2").await
    }

    async fn set_camera(&self, dir: CameraDirection) -> Result<(), VehicleError> {
        let flag = match dir {
            CameraDirection::Forward => 0,
            CameraDirection::Downward => 1,
        };
        self.send_control(&format!("downvision {flag}")).await
    }

    async fn stream_on(&self) -> Result<(), VehicleError> { self.send_control("streamon").await }

    async fn stream_off(&self) -> Result<(), VehicleError> { self.send_control("streamoff").await }

    async fn tof_distance(&self) -> Result<i32, VehicleError> {
        Ok(self.state.latest().await?.tof())
    }
}
