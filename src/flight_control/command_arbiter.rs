use super::control_loop::ControlLoop;
use super::flight_computer::FlightComputer;
use super::flight_event::{FlightEvent, Phase, ReleasePolicy, UnknownKey};
use super::ground_event::{EventSink, GroundEvent};
use super::velocity_state::VelocityState;
use crate::vehicle::{Vehicle, VehicleError};
use crate::{cmd, error, warn};
use std::sync::Arc;
use strum_macros::Display;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[strum(to_string = "drone not connected")]
    NotConnected,
    #[strum(transparent)]
    UnknownKey(UnknownKey),
    #[strum(transparent)]
    Vehicle(VehicleError),
}

impl std::error::Error for CommandError {}

impl From<UnknownKey> for CommandError {
    fn from(value: UnknownKey) -> Self { CommandError::UnknownKey(value) }
}

impl From<VehicleError> for CommandError {
    fn from(value: VehicleError) -> Self { CommandError::Vehicle(value) }
}

/// Turns key events into the RC vector and keeps the control loop alive while the
/// vector is non-neutral.
///
/// The arbiter is the only writer of the vector; the control loop only reads it.
pub struct CommandArbiter {
    velocity: Arc<Mutex<VelocityState>>,
    control_loop: Arc<ControlLoop>,
    f_cont: Arc<FlightComputer>,
    sink: Arc<dyn EventSink>,
    policy: ReleasePolicy,
}

impl CommandArbiter {
    pub fn new(
        f_cont: Arc<FlightComputer>,
        sink: Arc<dyn EventSink>,
        policy: ReleasePolicy,
        c_tok: CancellationToken,
    ) -> Self {
        let velocity = Arc::new(Mutex::new(VelocityState::NEUTRAL));
        let control_loop = Arc::new(ControlLoop::new(
            Arc::clone(&velocity),
            f_cont.vehicle(),
            Arc::clone(&sink),
            c_tok,
        ));
        Self { velocity, control_loop, f_cont, sink, policy }
    }

    pub fn control_loop(&self) -> Arc<ControlLoop> { Arc::clone(&self.control_loop) }

    pub async fn velocity(&self) -> VelocityState { *self.velocity.lock().await }

    fn vehicle(&self) -> Arc<dyn Vehicle> { self.f_cont.vehicle() }

    /// Applies one key event and returns the resulting vector.
    ///
    /// A failure is logged, published and followed by a cleanup pass before it is
    /// handed back; the arbiter itself stays usable.
    pub async fn apply(&self, event: FlightEvent) -> Result<VelocityState, CommandError> {
        match self.try_apply(event).await {
            Ok(rc) => Ok(rc),
            Err(e) => {
                error!("Error processing {event}: {e}");
                self.sink.publish(GroundEvent::failure("command_arbiter", &e));
                self.cleanup().await;
                Err(e)
            }
        }
    }

    /// Parses a console key (`w`, `release-Up`, ...) and applies it.
    pub async fn apply_key(&self, key: &str) -> Result<VelocityState, CommandError> {
        match key.parse::<FlightEvent>() {
            Ok(event) => self.apply(event).await,
            Err(e) => {
                warn!("Ignoring console key: {e}");
                self.sink.publish(GroundEvent::failure("command_arbiter", &e));
                Err(e.into())
            }
        }
    }

    async fn try_apply(&self, event: FlightEvent) -> Result<VelocityState, CommandError> {
        let conn = self.f_cont.connection().await;
        if !conn.connected() {
            return Err(CommandError::NotConnected);
        }
        let axis = event.direction.axis();
        let rc = {
            let mut velocity = self.velocity.lock().await;
            match (event.phase, self.policy) {
                (Phase::Press, _) => {
                    velocity.set_axis(axis, event.direction.sign() * conn.speed());
                }
                (Phase::Release, ReleasePolicy::ZeroAll) => velocity.zero_all(),
                (Phase::Release, ReleasePolicy::PerAxis) => {
                    if velocity.axis(axis).signum() == event.direction.sign() {
                        velocity.set_axis(axis, 0);
                    }
                }
            }
            *velocity
        };
        cmd!("{event} -> {rc}");

        if rc.is_neutral() {
            if event.phase == Phase::Release {
                self.vehicle().send_velocity(rc).await?;
            }
        } else {
            self.control_loop.ensure_running();
        }
        Ok(rc)
    }

    /// Zeroes the vector without touching the link, used after a fresh connect.
    pub async fn reset(&self) { self.velocity.lock().await.zero_all(); }

    /// Zeroes the vector and sends a neutral frame right away.
    pub async fn halt(&self) -> Result<(), CommandError> {
        self.velocity.lock().await.zero_all();
        cmd!("halt -> {}", VelocityState::NEUTRAL);
        self.vehicle().send_velocity(VelocityState::NEUTRAL).await?;
        Ok(())
    }

    /// Best-effort reset after a failed command: neutral vector, and a neutral frame if
    /// the link is up.
    async fn cleanup(&self) {
        self.velocity.lock().await.zero_all();
        if !self.f_cont.is_connected().await {
            return;
        }
        if let Err(e) = self.vehicle().send_velocity(VelocityState::NEUTRAL).await {
            warn!("Neutral frame during cleanup was not sent: {e}");
        }
    }
}
