use super::flight_computer::FlightComputer;
use crate::vehicle::{MoveDirection, Vehicle, VehicleError};
use crate::{info, log, warn};
use std::sync::Arc;
use strum_macros::Display;
use tokio::sync::Mutex;

/// Offsets of the vehicle relative to a detected mission pad, vehicle-local frame, cm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissionPadReading {
    pub pad_id: i32,
    pub offset_x: i32,
    pub offset_y: i32,
    pub offset_z: i32,
}

/// Raw shape of a pad query: `(pad_id, x, y, z)`, or `(-1, None, None, None)` without a pad.
pub type PadData = (i32, Option<i32>, Option<i32>, Option<i32>);

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum NavState {
    Idle,
    Detecting,
    Aligning,
    Landing,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavOutcome {
    /// No pad in view. Nothing was moved.
    NoPad,
    /// Another navigation is in progress; this request was dropped.
    AlreadyRunning,
    Landed { pad_id: i32, corrections: Vec<(MoveDirection, u32)> },
}

/// One-shot "align over the pad, then land" sequence.
pub struct MissionPadNavigator {
    f_cont: Arc<FlightComputer>,
    vehicle: Arc<dyn Vehicle>,
    state: Mutex<NavState>,
    run_lock: Mutex<()>,
}

impl MissionPadNavigator {
    /// Offsets up to this magnitude count as aligned.
    pub const ALIGN_THRESHOLD_CM: i32 = 20;
    /// Pad query result while no pad is in view.
    pub const NO_PAD_DATA: PadData = (-1, None, None, None);

    pub fn new(f_cont: Arc<FlightComputer>) -> Self {
        Self {
            vehicle: f_cont.vehicle(),
            f_cont,
            state: Mutex::new(NavState::Idle),
            run_lock: Mutex::new(()),
        }
    }

    pub async fn state(&self) -> NavState { *self.state.lock().await }

    async fn enter(&self, state: NavState) {
        log!("Mission pad navigation: {state}");
        *self.state.lock().await = state;
    }

    /// Switches pad detection on, looking both down and forward.
    pub async fn enable_detection(&self) -> Result<(), VehicleError> {
        self.vehicle.enable_mission_pads().await?;
        info!("Mission pad detection started.");
        Ok(())
    }

    /// Moves that cancel out a reading's lateral and longitudinal offset.
    ///
    /// Each axis is judged independently against [`Self::ALIGN_THRESHOLD_CM`]; the
    /// lateral correction comes first.
    pub fn corrections(reading: &MissionPadReading) -> Vec<(MoveDirection, u32)> {
        let mut moves = Vec::with_capacity(2);
        let x = reading.offset_x;
        if x > Self::ALIGN_THRESHOLD_CM {
            moves.push((MoveDirection::Left, x.unsigned_abs()));
        } else if x < -Self::ALIGN_THRESHOLD_CM {
            moves.push((MoveDirection::Right, x.unsigned_abs()));
        }
        let y = reading.offset_y;
        if y > Self::ALIGN_THRESHOLD_CM {
            moves.push((MoveDirection::Back, y.unsigned_abs()));
        } else if y < -Self::ALIGN_THRESHOLD_CM {
            moves.push((MoveDirection::Forward, y.unsigned_abs()));
        }
        moves
    }

    /// Reads the current pad offsets, `None` if no pad is detected.
    pub async fn read_pad(&self) -> Result<Option<MissionPadReading>, VehicleError> {
        let pad_id = self.vehicle.mission_pad_id().await?;
        if pad_id < 0 {
            info!("No mission pad detected.");
            return Ok(None);
        }
        let reading = MissionPadReading {
            pad_id,
            offset_x: self.vehicle.mission_pad_distance_x().await?,
            offset_y: self.vehicle.mission_pad_distance_y().await?,
            offset_z: self.vehicle.mission_pad_distance_z().await?,
        };
        info!(
            "Mission Pad {pad_id}: Distance X: {} cm, Y: {} cm, Z: {} cm",
            reading.offset_x, reading.offset_y, reading.offset_z
        );
        Ok(Some(reading))
    }

    /// Read-only pad query; never moves the vehicle.
    pub async fn get_mission_pad_data(&self) -> Result<PadData, VehicleError> {
        Ok(match self.read_pad().await? {
            Some(r) => (r.pad_id, Some(r.offset_x), Some(r.offset_y), Some(r.offset_z)),
            None => Self::NO_PAD_DATA,
        })
    }

    /// Detects a pad, applies the corrections from a single reading without re-reading
    /// between them, then lands whether or not anything was corrected.
    ///
    /// Any failing read or move aborts the sequence and is returned as is.
    pub async fn navigate(&self) -> Result<NavOutcome, VehicleError> {
        let Ok(_running) = self.run_lock.try_lock() else {
            warn!("Mission pad navigation already in progress.");
            return Ok(NavOutcome::AlreadyRunning);
        };
        let res = self.run_sequence().await;
        match &res {
            Ok(NavOutcome::Landed { .. }) => self.enter(NavState::Done).await,
            Ok(_) => self.enter(NavState::Idle).await,
            Err(e) => {
                warn!("Mission pad navigation aborted: {e}");
                self.enter(NavState::Idle).await;
            }
        }
        res
    }

    async fn run_sequence(&self) -> Result<NavOutcome, VehicleError> {
        self.enter(NavState::Detecting).await;
        let Some(reading) = self.read_pad().await? else {
            return Ok(NavOutcome::NoPad);
        };

        self.enter(NavState::Aligning).await;
        let corrections = Self::corrections(&reading);
        for &(dir, cm) in &corrections {
            self.vehicle.travel(dir, cm).await?;
        }

        self.enter(NavState::Landing).await;
        self.f_cont.land().await?;
        info!("Drone aligned with Mission Pad {} and landed.", reading.pad_id);
        Ok(NavOutcome::Landed { pad_id: reading.pad_id, corrections })
    }
}
