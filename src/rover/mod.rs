//! Ground rover driven through a remote ROS shell.

mod rover_controller;
mod ssh_shell;

pub use rover_controller::{RoverAction, RoverController};
pub use ssh_shell::SshShell;

use async_trait::async_trait;
use strum_macros::Display;

#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum ShellError {
    /// The shell process could not be started.
    #[strum(to_string = "could not start rover shell: {0}")]
    Spawn(String),
    /// The remote end hung up.
    #[strum(to_string = "rover shell closed")]
    Closed,
    #[strum(to_string = "rover shell error: {0}")]
    Io(String),
}

impl std::error::Error for ShellError {}

impl From<std::io::Error> for ShellError {
    fn from(value: std::io::Error) -> Self {
        match value.kind() {
            std::io::ErrorKind::BrokenPipe | std::io::ErrorKind::UnexpectedEof => {
                ShellError::Closed
            }
            _ => ShellError::Io(value.to_string()),
        }
    }
}

/// An interactive shell that stays open across commands.
#[async_trait]
pub trait RoverShell: Send + Sync {
    /// Writes raw input, e.g. a command line or a control character.
    async fn send(&self, input: &str) -> Result<(), ShellError>;

    /// Returns whatever output is buffered, at most `max_len` bytes, without waiting
    /// for more.
    async fn read_available(&self, max_len: usize) -> Result<String, ShellError>;
}
