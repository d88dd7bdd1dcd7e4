use super::velocity_state::Axis;
use std::fmt;
use std::str::FromStr;
use strum_macros::{Display, EnumIter, EnumString};

/// A named direction of the operator's keyboard.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum Direction {
    Up,
    Down,
    YawLeft,
    YawRight,
    Forward,
    Backward,
    Left,
    Right,
}

impl Direction {
    pub fn axis(self) -> Axis {
        match self {
            Direction::Up | Direction::Down => Axis::Vertical,
            Direction::YawLeft | Direction::YawRight => Axis::Yaw,
            Direction::Forward | Direction::Backward => Axis::Longitudinal,
            Direction::Left | Direction::Right => Axis::Lateral,
        }
    }

    /// Sign the direction applies to its axis.
    pub fn sign(self) -> i32 {
        match self {
            Direction::Up | Direction::YawRight | Direction::Forward | Direction::Right => 1,
            Direction::Down | Direction::YawLeft | Direction::Backward | Direction::Left => -1,
        }
    }

    /// Console key bound to this direction.
    pub fn key(self) -> &'static str {
        match self {
            Direction::Up => "w",
            Direction::Down => "s",
            Direction::YawLeft => "a",
            Direction::YawRight => "d",
            Direction::Forward => "Up",
            Direction::Backward => "Down",
            Direction::Left => "Left",
            Direction::Right => "Right",
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        match key {
            "w" => Some(Direction::Up),
            "s" => Some(Direction::Down),
            "a" => Some(Direction::YawLeft),
            "d" => Some(Direction::YawRight),
            "Up" => Some(Direction::Forward),
            "Down" => Some(Direction::Backward),
            "Left" => Some(Direction::Left),
            "Right" => Some(Direction::Right),
            _ => None,
        }
    }
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
#[strum(serialize_all = "lowercase")]
pub enum Phase {
    Press,
    Release,
}

/// Discrete key event coming from the operator console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlightEvent {
    pub direction: Direction,
    pub phase: Phase,
}

impl FlightEvent {
    const RELEASE_PREFIX: &'static str = "release-";

    pub fn press(direction: Direction) -> Self { Self { direction, phase: Phase::Press } }
    pub fn release(direction: Direction) -> Self { Self { direction, phase: Phase::Release } }
}

impl fmt::Display for FlightEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.phase, self.direction)
    }
}

/// The console key was not part of the flight vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKey(pub String);

impl fmt::Display for UnknownKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown flight key {:?}", self.0)
    }
}

impl std::error::Error for UnknownKey {}

impl FromStr for FlightEvent {
    type Err = UnknownKey;

    /// Parses `w`, `Up`, ... as presses and `release-w`, `release-Up`, ... as releases.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (phase, key) = match s.strip_prefix(Self::RELEASE_PREFIX) {
            Some(key) => (Phase::Release, key),
            None => (Phase::Press, s),
        };
        Direction::from_key(key)
            .map(|direction| FlightEvent { direction, phase })
            .ok_or_else(|| UnknownKey(s.to_string()))
    }
}

/// What a release event clears.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum ReleasePolicy {
    /// Any release zeroes the whole vector and sends one neutral frame.
    #[strum(serialize = "all")]
    ZeroAll,
    /// A release clears only its own axis, and only if that axis still points its way.
    #[strum(serialize = "axis")]
    PerAxis,
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn key_vocabulary_round_trips() {
        for dir in Direction::iter() {
            assert_eq!(dir.key().parse::<FlightEvent>().unwrap(), FlightEvent::press(dir));
            let release = format!("release-{}", dir.key());
            assert_eq!(release.parse::<FlightEvent>().unwrap(), FlightEvent::release(dir));
        }
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!("x".parse::<FlightEvent>().is_err());
        assert!("release-".parse::<FlightEvent>().is_err());
        assert!("UP".parse::<FlightEvent>().is_err());
    }

    #[test]
    fn axis_mapping() {
        assert_eq!((Direction::Up.axis(), Direction::Up.sign()), (Axis::Vertical, 1));
        assert_eq!((Direction::YawLeft.axis(), Direction::YawLeft.sign()), (Axis::Yaw, -1));
        assert_eq!((Direction::Backward.axis(), Direction::Backward.sign()), (Axis::Longitudinal, -1));
        assert_eq!((Direction::Right.axis(), Direction::Right.sign()), (Axis::Lateral, 1));
        assert_eq!(Direction::YawRight.to_string(), "yaw-right");
    }

    #[test]
    fn release_policy_names() {
        assert_eq!("ALL".parse::<ReleasePolicy>().unwrap(), ReleasePolicy::ZeroAll);
        assert_eq!("axis".parse::<ReleasePolicy>().unwrap(), ReleasePolicy::PerAxis);
    }
}
