//! Flight side of the ground station: key event arbitration, the RC control loop,
//! mission pad navigation and the periodic background tasks around the drone.

mod camera_controller;
mod command_arbiter;
mod control_loop;
mod flight_computer;
mod flight_event;
mod flight_state;
mod ground_event;
mod mission_pad;
mod surface_sampler;
mod telemetry;
mod velocity_state;


pub use camera_controller::{CameraController, CameraDirection};
pub use command_arbiter::{CommandArbiter, CommandError};
pub use control_loop::ControlLoop;
pub use flight_computer::FlightComputer;
pub use flight_event::{Direction, FlightEvent, Phase, ReleasePolicy, UnknownKey};
pub use flight_state::{AirState, ConnectionState};
pub use ground_event::{EventSink, GroundEvent};
pub use mission_pad::{MissionPadNavigator, MissionPadReading, NavOutcome, NavState, PadData};
pub use surface_sampler::{SurfaceSample, SurfaceSampler};
pub use telemetry::TelemetryEmitter;
pub use velocity_state::{Axis, VelocityState};
