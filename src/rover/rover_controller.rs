use super::{RoverShell, ShellError};
use crate::{cmd, info, warn};
use std::sync::Arc;
use std::time::Duration;
use strum_macros::{Display, EnumString};

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum RoverAction {
    Forward,
    Backward,
    Left,
    Right,
    Stop,
}

/// Publishes velocity twists on the rover's `/cmd_vel` topic.
///
/// A motion command keeps publishing at 10 Hz on the remote side until `Stop`
/// interrupts it.
pub struct RoverController {
    shell: Arc<dyn RoverShell>,
}

impl RoverController {
    /// Linear speed in m/s.
    const LINEAR_SPEED: f32 = 0.5;
    /// Turn rate in rad/s.
    const ANGULAR_SPEED: f32 = 0.5;
    const SETTLE: Duration = Duration::from_millis(500);
    const READ_LEN: usize = 1024;
    const INTERRUPT: &'static str = "\x03";

    pub fn new(shell: Arc<dyn RoverShell>) -> Self { Self { shell } }

    /// Shell input for `action`, newline included.
    pub fn command_line(action: RoverAction) -> String {
        let (linear, angular) = match action {
            RoverAction::Forward => (Self::LINEAR_SPEED, 0.0),
            RoverAction::Backward => (-Self::LINEAR_SPEED, 0.0),
            RoverAction::Left => (0.0, Self::ANGULAR_SPEED),
            RoverAction::Right => (0.0, -Self::ANGULAR_SPEED),
            RoverAction::Stop => return format!("{}\n", Self::INTERRUPT),
        };
        format!(
            "source /opt/ros/melodic/setup.bash && rostopic pub /cmd_vel geometry_msgs/Twist \
             '{{linear: {{x: {linear}, y: 0, z: 0}}, angular: {{x: 0, y: 0, z: {angular}}}}}' -r 10\n"
        )
    }

    /// Sends `action`, waits for the shell to settle and returns its output so far.
    pub async fn execute(&self, action: RoverAction) -> Result<String, ShellError> {
        cmd!("rover {action}");
        self.shell.send(&Self::command_line(action)).await?;
        tokio::time::sleep(Self::SETTLE).await;
        let output = self.shell.read_available(Self::READ_LEN).await?;
        if !output.is_empty() {
            info!("Rover output: {}", output.trim_end());
        }
        Ok(output)
    }

    /// Stops the rover, logging instead of failing.
    pub async fn stop(&self) {
        if let Err(e) = self.execute(RoverAction::Stop).await {
            warn!("Could not stop rover: {e}");
        }
    }
}
