use super::{MoveDirection, Vehicle, VehicleError};
use crate::flight_control::{CameraDirection, VelocityState};
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Calls observed by [`MockVehicle`], in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Connect,
    Velocity(VelocityState),
    Takeoff,
    Land,
    Travel(MoveDirection, u32),
    EnablePads,
    Camera(CameraDirection),
    StreamOn,
    StreamOff,
}

/// Recording vehicle with scriptable sensor values and failures.
pub(crate) struct MockVehicle {
    calls: Mutex<Vec<Call>>,
    pad: Mutex<(i32, i32, i32, i32)>,
    battery: Mutex<u8>,
    tof: Mutex<i32>,
    tof_delay: Mutex<std::time::Duration>,
    fail_connect: AtomicBool,
    fail_velocity: AtomicBool,
    fail_travel: AtomicBool,
    fail_sensors: AtomicBool,
}

impl MockVehicle {
    pub(crate) fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            pad: Mutex::new((-1, -100, -100, -100)),
            battery: Mutex::new(100),
            tof: Mutex::new(10),
            tof_delay: Mutex::new(std::time::Duration::ZERO),
            fail_connect: AtomicBool::new(false),
            fail_velocity: AtomicBool::new(false),
            fail_travel: AtomicBool::new(false),
            fail_sensors: AtomicBool::new(false),
        }
    }

    pub(crate) fn with_pad(self, id: i32, x: i32, y: i32, z: i32) -> Self {
        *self.pad.lock().unwrap() = (id, x, y, z);
        self
    }

    pub(crate) fn set_battery(&self, pct: u8) { *self.battery.lock().unwrap() = pct; }
    pub(crate) fn set_tof(&self, cm: i32) { *self.tof.lock().unwrap() = cm; }
    pub(crate) fn set_tof_delay(&self, delay: std::time::Duration) {
        *self.tof_delay.lock().unwrap() = delay;
    }
    pub(crate) fn fail_connect(&self, on: bool) { self.fail_connect.store(on, Ordering::SeqCst); }
    pub(crate) fn fail_velocity(&self, on: bool) { self.fail_velocity.store(on, Ordering::SeqCst); }
    pub(crate) fn fail_travel(&self, on: bool) { self.fail_travel.store(on, Ordering::SeqCst); }
    pub(crate) fn fail_sensors(&self, on: bool) { self.fail_sensors.store(on, Ordering::SeqCst); }

    pub(crate) fn calls(&self) -> Vec<Call> { self.calls.lock().unwrap().clone() }

    pub(crate) fn velocity_frames(&self) -> Vec<VelocityState> {
        self.calls()
            .into_iter()
            .filter_map(|c| if let Call::Velocity(rc) = c { Some(rc) } else { None })
            .collect()
    }

    pub(crate) fn travels(&self) -> Vec<(MoveDirection, u32)> {
        self.calls()
            .into_iter()
            .filter_map(|c| if let Call::Travel(d, cm) = c { Some((d, cm)) } else { None })
            .collect()
    }

    fn record(&self, call: Call) { self.calls.lock().unwrap().push(call); }

    fn sensor<T: Copy>(&self, value: &Mutex<T>) -> Result<T, VehicleError> {
        if self.fail_sensors.load(Ordering::SeqCst) {
            Err(VehicleError::StateUnavailable)
        } else {
            Ok(*value.lock().unwrap())
        }
    }
}

#[async_trait]
impl Vehicle for MockVehicle {
    async fn connect(&self) -> Result<(), VehicleError> {
        self.record(Call::Connect);
        if self.fail_connect.load(Ordering::SeqCst) {
            return Err(VehicleError::NoConnection);
        }
        Ok(())
    }

    async fn send_velocity(&self, rc: VelocityState) -> Result<(), VehicleError> {
        self.record(Call::Velocity(rc));
        if self.fail_velocity.load(Ordering::SeqCst) {
            return Err(VehicleError::Io("link dropped frame".to_string()));
        }
        Ok(())
    }

    async fn takeoff(&self) -> Result<(), VehicleError> {
        self.record(Call::Takeoff);
        Ok(())
    }

    async fn land(&self) -> Result<(), VehicleError> {
        self.record(Call::Land);
        Ok(())
    }

    async fn battery(&self) -> Result<u8, VehicleError> { self.sensor(&self.battery) }

    async fn mission_pad_id(&self) -> Result<i32, VehicleError> {
        Ok(self.sensor(&self.pad)?.0)
    }

    async fn mission_pad_distance_x(&self) -> Result<i32, VehicleError> {
        Ok(self.sensor(&self.pad)?.1)
    }

    async fn mission_pad_distance_y(&self) -> Result<i32, VehicleError> {
        Ok(self.sensor(&self.pad)?.2)
    }

    async fn mission_pad_distance_z(&self) -> Result<i32, VehicleError> {
        Ok(self.sensor(&self.pad)?.3)
    }

    async fn travel(&self, dir: MoveDirection, cm: u32) -> Result<(), VehicleError> {
        self.record(Call::Travel(dir, cm));
        if self.fail_travel.load(Ordering::SeqCst) {
            return Err(VehicleError::Rejected("error No valid imu".to_string()));
        }
        Ok(())
    }

    async fn enable_mission_pads(&self) -> Result<(), VehicleError> {
        self.record(Call::EnablePads);
        Ok(())
    }

    async fn set_camera(&self, dir: CameraDirection) -> Result<(), VehicleError> {
        self.record(Call::Camera(dir));
        Ok(())
    }

    async fn stream_on(&self) -> Result<(), VehicleError> {
        self.record(Call::StreamOn);
        Ok(())
    }

    async fn stream_off(&self) -> Result<(), VehicleError> {
        self.record(Call::StreamOff);
        Ok(())
    }

    async fn tof_distance(&self) -> Result<i32, VehicleError> {
        let delay = *self.tof_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.sensor(&self.tof)
    }
}
