/// External stream player.
///
/// ```text
///   Launcher::launch(url) ──► StreamHandle      (one process per stream)
///   StreamHandle::shutdown(grace)
///         ├── SIGTERM
///         ├── wait ≤ grace
///         └── SIGKILL if still alive
/// ```
///
/// `PlaybackController` only talks to these two traits, so tests can swap in
/// a fake launcher without spawning anything.
use std::future::Future;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use padradio_proto::config::PlayerConfig;
use padradio_proto::error::RadioError;
use padradio_proto::platform;
use tokio::process::{Child, Command};
use tracing::{debug, error, info, warn};

pub trait Launcher {
    type Handle: StreamHandle;

    /// Start playing `url`.  Success means the process was spawned.
    fn launch(&self, url: &str) -> Result<Self::Handle, RadioError>;
}

pub trait StreamHandle {
    /// Stop the stream: graceful terminate, bounded wait, then force-kill.
    fn shutdown(self, grace: Duration) -> impl Future<Output = ()>;
}

// ── ffplay ────────────────────────────────────────────────────────────────────

pub struct FfplayLauncher {
    binary: PathBuf,
    buffer_size: String,
    max_delay: String,
}

impl FfplayLauncher {
    /// Look up the player binary.  `None` disables playback for the run.
    pub fn locate(config: &PlayerConfig) -> Option<Self> {
        let Some(binary) = platform::find_binary(&config.binary) else {
            error!(
                "{} not found! Install ffmpeg to play audio; playback disabled",
                config.binary
            );
            return None;
        };
        info!("Player binary: {:?}", binary);
        Some(Self {
            binary,
            buffer_size: config.buffer_size.clone(),
            max_delay: config.max_delay.clone(),
        })
    }

    fn command(&self, url: &str) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("-autoexit")
            .arg("-nodisp")
            .arg("-rtbufsize")
            .arg(&self.buffer_size)
            .arg("-max_delay")
            .arg(&self.max_delay)
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        cmd
    }
}

impl Launcher for FfplayLauncher {
    type Handle = PlayerProcess;

    fn launch(&self, url: &str) -> Result<PlayerProcess, RadioError> {
        let child = self
            .command(url)
            .spawn()
            .map_err(|e| RadioError::spawn(self.binary.to_string_lossy(), e))?;
        debug!("player: spawned pid={:?} url={}", child.id(), url);
        Ok(PlayerProcess { child })
    }
}

pub struct PlayerProcess {
    child: Child,
}

impl StreamHandle for PlayerProcess {
    async fn shutdown(mut self, grace: Duration) {
        terminate(&self.child);
        match tokio::time::timeout(grace, self.child.wait()).await {
            Ok(Ok(status)) => debug!("player: exited with {}", status),
            Ok(Err(e)) => error!("Error stopping stream: {}", e),
            Err(_) => {
                warn!("Stream didn't stop gracefully, killing");
                if let Err(e) = self.child.kill().await {
                    error!("Failed to kill player: {}", e);
                }
            }
        }
    }
}

/// Ask the process to exit.  A child that was already reaped has no pid and
/// is left alone.
fn terminate(child: &Child) {
    if let Some(pid) = child.id() {
        // SAFETY: plain kill(2) on a pid we own; no memory is involved.
        let rc = unsafe { libc::kill(pid as libc::pid_t, libc::SIGTERM) };
        if rc != 0 {
            debug!(
                "player: SIGTERM pid={} failed: {}",
                pid,
                std::io::Error::last_os_error()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn script(dir: &std::path::Path, body: &str) -> PathBuf {
        let path = dir.join("fake-player");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn launcher(binary: PathBuf) -> FfplayLauncher {
        FfplayLauncher {
            binary,
            buffer_size: "1500M".into(),
            max_delay: "5000000".into(),
        }
    }

    #[test]
    fn test_locate_missing_binary_disables_playback() {
        let config = PlayerConfig {
            binary: "/nonexistent/ffplay".into(),
            ..PlayerConfig::default()
        };
        assert!(FfplayLauncher::locate(&config).is_none());
    }

    #[test]
    fn test_command_line() {
        let l = launcher(PathBuf::from("/usr/bin/ffplay"));
        let cmd = l.command("http://example/stream");
        let args: Vec<_> = cmd
            .as_std()
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            [
                "-autoexit",
                "-nodisp",
                "-rtbufsize",
                "1500M",
                "-max_delay",
                "5000000",
                "http://example/stream"
            ]
        );
    }

    #[tokio::test]
    async fn test_shutdown_terminates_cooperative_process() {
        let dir = tempfile::TempDir::new().unwrap();
        let l = launcher(script(dir.path(), "exec sleep 30"));
        let handle = l.launch("http://x").unwrap();
        let started = std::time::Instant::now();
        handle.shutdown(Duration::from_secs(5)).await;
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_shutdown_kills_process_ignoring_sigterm() {
        let dir = tempfile::TempDir::new().unwrap();
        let l = launcher(script(dir.path(), "trap '' TERM\nwhile true; do sleep 1; done"));
        let handle = l.launch("http://x").unwrap();
        // Give the shell time to install its trap.
        tokio::time::sleep(Duration::from_millis(200)).await;
        let started = std::time::Instant::now();
        handle.shutdown(Duration::from_millis(300)).await;
        assert!(started.elapsed() < Duration::from_secs(3));
    }
}
