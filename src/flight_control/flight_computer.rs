use super::flight_state::{AirState, ConnectionState};
use crate::vehicle::{Vehicle, VehicleError};
use crate::{info, warn};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Owns the connection lifecycle and the airborne flag of the quadcopter.
///
/// Connection state sits behind its own lock so that slow maneuvers (takeoff,
/// landing) never stall the key event path, which only needs a quick read.
pub struct FlightComputer {
    vehicle: Arc<dyn Vehicle>,
    conn: RwLock<ConnectionState>,
    air_state: Mutex<AirState>,
}

impl FlightComputer {
    pub fn new(vehicle: Arc<dyn Vehicle>, speed: i32) -> Self {
        Self {
            vehicle,
            conn: RwLock::new(ConnectionState::new(speed)),
            air_state: Mutex::new(AirState::Grounded),
        }
    }

    pub fn vehicle(&self) -> Arc<dyn Vehicle> { Arc::clone(&self.vehicle) }

    pub async fn connection(&self) -> ConnectionState { *self.conn.read().await }

    pub async fn is_connected(&self) -> bool { self.conn.read().await.connected() }

    pub async fn air_state(&self) -> AirState { *self.air_state.lock().await }

    /// Performs the handshake and switches the video stream on.
    ///
    /// A failed handshake is returned to the caller and leaves the state disconnected;
    /// there is no automatic retry. A failing `streamon` only costs the video feed.
    pub async fn connect(&self) -> Result<(), VehicleError> {
        self.vehicle.connect().await?;
        self.conn.write().await.mark_connected();
        match self.vehicle.battery().await {
            Ok(pct) => info!("Connected to drone. Battery level: {pct}%"),
            Err(_) => info!("Connected to drone. Battery level not reported yet."),
        }
        if let Err(e) = self.vehicle.stream_on().await {
            warn!("Could not switch on the video stream: {e}");
        }
        Ok(())
    }

    /// Lands when airborne, takes off when grounded.
    ///
    /// The air state only flips after the vehicle acknowledged the maneuver. Concurrent
    /// toggles are serialized.
    pub async fn takeoff_land(&self) -> Result<AirState, VehicleError> {
        let mut air_state = self.air_state.lock().await;
        match *air_state {
            AirState::Airborne => self.vehicle.land().await?,
            AirState::Grounded => self.vehicle.takeoff().await?,
        }
        *air_state = air_state.toggled();
        info!("Drone is now {}.", *air_state);
        Ok(*air_state)
    }

    /// Lands regardless of the recorded air state.
    pub async fn land(&self) -> Result<(), VehicleError> {
        let mut air_state = self.air_state.lock().await;
        self.vehicle.land().await?;
        *air_state = AirState::Grounded;
        Ok(())
    }

    /// Lands if airborne; a no-op on the ground.
    pub async fn land_if_airborne(&self) -> Result<(), VehicleError> {
        let mut air_state = self.air_state.lock().await;
        if *air_state == AirState::Airborne {
            self.vehicle.land().await?;
            *air_state = AirState::Grounded;
        }
        Ok(())
    }

    pub async fn battery(&self) -> Result<u8, VehicleError> { self.vehicle.battery().await }
}
