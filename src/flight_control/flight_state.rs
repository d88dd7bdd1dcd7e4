use strum_macros::Display;

/// Link status of the quadcopter. Created disconnected, flips to connected once the
/// handshake succeeded and never flips back on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionState {
    connected: bool,
    speed: i32,
}

impl ConnectionState {
    pub fn new(speed: i32) -> Self { Self { connected: false, speed } }

    pub fn connected(&self) -> bool { self.connected }
    pub fn speed(&self) -> i32 { self.speed }

    pub(super) fn mark_connected(&mut self) { self.connected = true; }
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum AirState {
    Grounded,
    Airborne,
}

impl AirState {
    pub fn toggled(self) -> Self {
        match self {
            AirState::Grounded => AirState::Airborne,
            AirState::Airborne => AirState::Grounded,
        }
    }
}
