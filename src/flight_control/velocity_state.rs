use std::fmt;
use strum_macros::Display;

/// One channel of the RC vector.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// left/right, `lr`
    Lateral,
    /// forward/backward, `fb`
    Longitudinal,
    /// up/down, `ud`
    Vertical,
    /// yaw velocity, `yv`
    Yaw,
}

/// The four-axis RC vector streamed to the vehicle.
///
/// Every axis is kept within `[-MAX_SPEED, MAX_SPEED]`. The all-zero vector means the
/// vehicle should hover in place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct VelocityState {
    lr: i32,
    fb: i32,
    ud: i32,
    yv: i32,
}

impl VelocityState {
    pub const MAX_SPEED: i32 = 100;
    pub const NEUTRAL: VelocityState = VelocityState { lr: 0, fb: 0, ud: 0, yv: 0 };

    pub fn new(lr: i32, fb: i32, ud: i32, yv: i32) -> Self {
        Self { lr: Self::bound(lr), fb: Self::bound(fb), ud: Self::bound(ud), yv: Self::bound(yv) }
    }

    fn bound(v: i32) -> i32 { v.clamp(-Self::MAX_SPEED, Self::MAX_SPEED) }

    pub fn lr(&self) -> i32 { self.lr }
    pub fn fb(&self) -> i32 { self.fb }
    pub fn ud(&self) -> i32 { self.ud }
    pub fn yv(&self) -> i32 { self.yv }

    pub fn is_neutral(&self) -> bool { *self == Self::NEUTRAL }

    pub fn axis(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Lateral => self.lr,
            Axis::Longitudinal => self.fb,
            Axis::Vertical => self.ud,
            Axis::Yaw => self.yv,
        }
    }

    /// Overwrites one axis; the value is clamped to the accepted speed range.
    pub fn set_axis(&mut self, axis: Axis, value: i32) {
        let value = Self::bound(value);
        match axis {
            Axis::Lateral => self.lr = value,
            Axis::Longitudinal => self.fb = value,
            Axis::Vertical => self.ud = value,
            Axis::Yaw => self.yv = value,
        }
    }

    pub fn zero_all(&mut self) { *self = Self::NEUTRAL; }
}

impl fmt::Display for VelocityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[lr {}, fb {}, ud {}, yv {}]", self.lr, self.fb, self.ud, self.yv)
    }
}
