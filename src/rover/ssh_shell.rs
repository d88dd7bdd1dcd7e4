use super::{RoverShell, ShellError};
use crate::info;
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;

/// Persistent `ssh` session to the rover, driven through the system ssh client.
///
/// Authentication is left to the client (keys or agent); a pseudo terminal is forced
/// so that Ctrl-C reaches the remote foreground process.
pub struct SshShell {
    _child: Child,
    stdin: Mutex<ChildStdin>,
    stdout: Mutex<ChildStdout>,
}

impl SshShell {
    const READ_GRACE: Duration = Duration::from_millis(100);

    pub fn open(target: &str) -> Result<Self, ShellError> {
        let mut child = Command::new("ssh")
            .arg("-tt")
            .arg("-o")
            .arg("BatchMode=yes")
            .arg(target)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ShellError::Spawn(e.to_string()))?;
        let stdin = child.stdin.take().ok_or(ShellError::Closed)?;
        let stdout = child.stdout.take().ok_or(ShellError::Closed)?;
        info!("Opened rover shell to {target}.");
        Ok(Self {
            _child: child,
            stdin: Mutex::new(stdin),
            stdout: Mutex::new(stdout),
        })
    }
}

#[async_trait]
impl RoverShell for SshShell {
    async fn send(&self, input: &str) -> Result<(), ShellError> {
        let mut stdin = self.stdin.lock().await;
        stdin.write_all(input.as_bytes()).await?;
        stdin.flush().await?;
        Ok(())
    }

    async fn read_available(&self, max_len: usize) -> Result<String, ShellError> {
        let mut stdout = self.stdout.lock().await;
        let mut buf = vec![0u8; max_len];
        match tokio::time::timeout(Self::READ_GRACE, stdout.read(&mut buf)).await {
            Ok(Ok(0)) => Err(ShellError::Closed),
            Ok(Ok(len)) => Ok(String::from_utf8_lossy(&buf[..len]).into_owned()),
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Ok(String::new()),
        }
    }
}
