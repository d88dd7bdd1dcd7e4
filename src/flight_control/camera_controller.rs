use super::ground_event::{EventSink, GroundEvent};
use crate::vehicle::{Vehicle, VehicleError};
use crate::{info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use strum_macros::Display;
use tokio::net::UdpSocket;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum CameraDirection {
    Forward,
    Downward,
}

impl CameraDirection {
    pub fn toggled(self) -> Self {
        match self {
            CameraDirection::Forward => CameraDirection::Downward,
            CameraDirection::Downward => CameraDirection::Forward,
        }
    }
}

/// Camera direction and the relay of the encoded video stream to the console.
///
/// The stream is never decoded here: each datagram the vehicle pushes to the video
/// port is forwarded as one [`GroundEvent::VideoFrame`].
pub struct CameraController {
    vehicle: Arc<dyn Vehicle>,
    sink: Arc<dyn EventSink>,
    video_addr: SocketAddr,
    direction: Mutex<CameraDirection>,
    stream_tok: Mutex<Option<CancellationToken>>,
}

impl CameraController {
    const MAX_DATAGRAM_LEN: usize = 2048;

    pub fn new(vehicle: Arc<dyn Vehicle>, sink: Arc<dyn EventSink>, video_addr: SocketAddr) -> Self {
        Self {
            vehicle,
            sink,
            video_addr,
            direction: Mutex::new(CameraDirection::Forward),
            stream_tok: Mutex::new(None),
        }
    }

    /// Switches between the front and the downward camera.
    pub async fn toggle_direction(&self) -> Result<CameraDirection, VehicleError> {
        let mut direction = self.direction.lock().await;
        let next = direction.toggled();
        self.vehicle.set_camera(next).await?;
        *direction = next;
        info!("Camera now facing {next}.");
        Ok(next)
    }

    /// Starts relaying video. Returns `Ok(false)` if the relay is already running.
    pub async fn start_stream(&self) -> Result<bool, VehicleError> {
        let mut stream_tok = self.stream_tok.lock().await;
        if stream_tok.is_some() {
            return Ok(false);
        }
        self.vehicle.stream_on().await?;
        let socket = UdpSocket::bind(self.video_addr).await?;
        let c_tok = CancellationToken::new();
        *stream_tok = Some(c_tok.clone());

        let sink = Arc::clone(&self.sink);
        tokio::spawn(async move {
            let mut buf = vec![0u8; Self::MAX_DATAGRAM_LEN];
            loop {
                let received = tokio::select! {
                    res = socket.recv_from(&mut buf) => res,
                    () = c_tok.cancelled() => break,
                };
                match received {
                    Ok((len, _)) => sink.publish(GroundEvent::VideoFrame(buf[..len].to_vec())),
                    Err(e) => warn!("Video socket receive failed: {e}"),
                }
            }
            info!("Video relay stopped.");
        });
        info!("Video relay listening on {}.", self.video_addr);
        Ok(true)
    }

    /// Signals the relay to stop after its current datagram. Returns `false` if it was
    /// not running.
    pub async fn stop_stream(&self) -> bool {
        match self.stream_tok.lock().await.take() {
            Some(c_tok) => {
                c_tok.cancel();
                true
            }
            None => false,
        }
    }
}
