use crate::flight_control::ReleasePolicy;
use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use strum_macros::Display;

/// Runtime settings of the ground station, collected from the environment at start-up.
#[derive(Debug, Clone)]
pub struct GroundConfig {
    /// Command endpoint of the vehicle.
    pub tello_addr: SocketAddr,
    /// Local address the command socket binds to.
    pub tello_local_addr: SocketAddr,
    /// Local address the vehicle pushes its state packets to.
    pub tello_state_addr: SocketAddr,
    /// Local address the vehicle pushes its encoded video stream to.
    pub tello_video_addr: SocketAddr,
    /// Magnitude applied to an RC axis on key press.
    pub speed: i32,
    /// Maximum wait for an `ok`/`error` reply on the command channel.
    pub reply_timeout: Duration,
    /// Bind address of the operator console endpoint.
    pub console_addr: SocketAddr,
    pub release_policy: ReleasePolicy,
    /// `user@host` of the rover shell; the rover is disabled when unset.
    pub rover_target: Option<String>,
}

#[derive(Debug, Display)]
pub enum ConfigError {
    #[strum(to_string = "malformed value '{value}' for {key}")]
    Malformed { key: &'static str, value: String },
}

impl std::error::Error for ConfigError {}

impl GroundConfig {
    const DEF_TELLO_ADDR: &'static str = "192.168.10.1:8889";
    const DEF_TELLO_LOCAL_ADDR: &'static str = "0.0.0.0:8889";
    const DEF_TELLO_STATE_ADDR: &'static str = "0.0.0.0:8890";
    const DEF_TELLO_VIDEO_ADDR: &'static str = "0.0.0.0:11111";
    const DEF_SPEED: &'static str = "50";
    const DEF_REPLY_TIMEOUT_MS: &'static str = "7000";
    const DEF_CONSOLE_ADDR: &'static str = "0.0.0.0:1337";
    const DEF_RELEASE_POLICY: &'static str = "all";
    const DEF_ROVER_USER: &'static str = "administrator";

    /// Reads all settings from the process environment, falling back to the defaults
    /// matching a factory Tello on its own access point.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where F: Fn(&str) -> Option<String> {
        let speed: i32 = parse(&lookup, "TELLO_SPEED", Self::DEF_SPEED)?;
        if !(10..=100).contains(&speed) {
            return Err(ConfigError::Malformed { key: "TELLO_SPEED", value: speed.to_string() });
        }
        let reply_timeout_ms: u64 =
            parse(&lookup, "TELLO_REPLY_TIMEOUT_MS", Self::DEF_REPLY_TIMEOUT_MS)?;
        let rover_target = lookup("ROVER_HOST").map(|host| {
            let user = lookup("ROVER_USER").unwrap_or_else(|| Self::DEF_ROVER_USER.to_string());
            format!("{user}@{host}")
        });
        Ok(Self {
            tello_addr: parse(&lookup, "TELLO_ADDR", Self::DEF_TELLO_ADDR)?,
            tello_local_addr: parse(&lookup, "TELLO_LOCAL_ADDR", Self::DEF_TELLO_LOCAL_ADDR)?,
            tello_state_addr: parse(&lookup, "TELLO_STATE_ADDR", Self::DEF_TELLO_STATE_ADDR)?,
            tello_video_addr: parse(&lookup, "TELLO_VIDEO_ADDR", Self::DEF_TELLO_VIDEO_ADDR)?,
            speed,
            reply_timeout: Duration::from_millis(reply_timeout_ms),
            console_addr: parse(&lookup, "CONSOLE_ADDR", Self::DEF_CONSOLE_ADDR)?,
            release_policy: parse(&lookup, "RELEASE_POLICY", Self::DEF_RELEASE_POLICY)?,
            rover_target,
        })
    }
}

fn parse<F, T>(lookup: &F, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let value = lookup(key).unwrap_or_else(|| default.to_string());
    value.trim().parse::<T>().map_err(|_| ConfigError::Malformed { key, value })
}
