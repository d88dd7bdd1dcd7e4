//! Vehicle collaborator seam.
//!
//! The flight core only talks to the quadcopter through the [`Vehicle`] trait. The
//! production implementation is [`TelloLink`], which speaks the UDP text SDK; tests
//! substitute a recording mock.

mod tello_link;
mod tello_state;

pub use tello_link::TelloLink;
pub use tello_state::{StateListener, TelloState};

use crate::flight_control::{CameraDirection, VelocityState};
use async_trait::async_trait;
use strum_macros::Display;

/// Failures of the vehicle collaborator.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum VehicleError {
    /// The vehicle did not answer the handshake or the socket could not be opened.
    #[strum(to_string = "vehicle unreachable")]
    NoConnection,
    /// A command was sent but no reply arrived within the reply timeout.
    #[strum(to_string = "no reply from vehicle")]
    Timeout,
    /// The vehicle answered with an error string.
    #[strum(to_string = "vehicle rejected command: {0}")]
    Rejected(String),
    /// A movement distance outside of what the vehicle accepts.
    #[strum(to_string = "distance {0} cm out of range")]
    OutOfRange(u32),
    /// No state packet has been received yet.
    #[strum(to_string = "no state packet received yet")]
    StateUnavailable,
    #[strum(to_string = "socket error: {0}")]
    Io(String),
}

impl std::error::Error for VehicleError {}

impl From<std::io::Error> for VehicleError {
    fn from(value: std::io::Error) -> Self {
        match value.kind() {
            std::io::ErrorKind::TimedOut => VehicleError::Timeout,
            std::io::ErrorKind::ConnectionRefused | std::io::ErrorKind::AddrNotAvailable => {
                VehicleError::NoConnection
            }
            _ => VehicleError::Io(value.to_string()),
        }
    }
}

/// Direction of a discrete, distance based movement.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum MoveDirection {
    Left,
    Right,
    Forward,
    Back,
}

/// Everything the ground station needs from a quadcopter.
///
/// Implementations must serialize commands internally: the control loop, the
/// mission-pad navigator and ad-hoc operator commands call into the same
/// vehicle concurrently.
#[async_trait]
pub trait Vehicle: Send + Sync {
    async fn connect(&self) -> Result<(), VehicleError>;
    /// Sends one RC frame. Fire-and-forget on the vehicle side.
    async fn send_velocity(&self, rc: VelocityState) -> Result<(), VehicleError>;
    async fn takeoff(&self) -> Result<(), VehicleError>;
    async fn land(&self) -> Result<(), VehicleError>;
    /// Battery charge in percent.
    async fn battery(&self) -> Result<u8, VehicleError>;
    /// Id of the currently detected mission pad, `-1` if none is in view.
    async fn mission_pad_id(&self) -> Result<i32, VehicleError>;
    async fn mission_pad_distance_x(&self) -> Result<i32, VehicleError>;
    async fn mission_pad_distance_y(&self) -> Result<i32, VehicleError>;
    async fn mission_pad_distance_z(&self) -> Result<i32, VehicleError>;
    /// Moves by `cm` centimetres and returns once the vehicle reports completion.
    async fn travel(&self, dir: MoveDirection, cm: u32) -> Result<(), VehicleError>;
    async fn enable_mission_pads(&self) -> Result<(), VehicleError>;
    async fn set_camera(&self, dir: CameraDirection) -> Result<(), VehicleError>;
    async fn stream_on(&self) -> Result<(), VehicleError>;
    async fn stream_off(&self) -> Result<(), VehicleError>;
    /// Height above ground from the time-of-flight sensor, in cm.
    async fn tof_distance(&self) -> Result<i32, VehicleError>;

    async fn move_left(&self, cm: u32) -> Result<(), VehicleError> {
        self.travel(MoveDirection::Left, cm).await
    }
    async fn move_right(&self, cm: u32) -> Result<(), VehicleError> {
        self.travel(MoveDirection::Right, cm).await
    }
    async fn move_forward(&self, cm: u32) -> Result<(), VehicleError> {
        self.travel(MoveDirection::Forward, cm).await
    }
    async fn move_back(&self, cm: u32) -> Result<(), VehicleError> {
        self.travel(MoveDirection::Back, cm).await
    }
}

#[cfg(test)]
pub(crate) mod mock;
