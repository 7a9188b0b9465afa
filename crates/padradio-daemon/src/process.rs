//! Small helpers around `tokio::process` for the mixer, speech and admin
//! wrappers.  All of them silence the child's stdio.
use std::ffi::OsStr;
use std::process::Stdio;

use padradio_proto::error::RadioError;
use tokio::process::{Child, Command};

fn quiet(program: &OsStr) -> Command {
    let mut cmd = Command::new(program);
    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    cmd
}

/// Run to completion; a non-zero exit is an error.
pub async fn run_quiet<P, I, S>(program: P, args: I) -> anyhow::Result<()>
where
    P: AsRef<OsStr>,
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let program = program.as_ref();
    let status = quiet(program)
        .args(args)
        .status()
        .await
        .map_err(|e| RadioError::spawn(program.to_string_lossy(), e))?;
    if !status.success() {
        anyhow::bail!("{} exited with {}", program.to_string_lossy(), status);
    }
    Ok(())
}

/// Run to completion and return stdout.
pub async fn capture<P, I, S>(program: P, args: I) -> anyhow::Result<String>
where
    P: AsRef<OsStr>,
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let program = program.as_ref();
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .await
        .map_err(|e| RadioError::spawn(program.to_string_lossy(), e))?;
    if !output.status.success() {
        anyhow::bail!("{} exited with {}", program.to_string_lossy(), output.status);
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Start without waiting.  The returned child is reaped by tokio once it
/// exits, even if the handle is dropped.
pub fn spawn_detached<P, I, S>(program: P, args: I) -> Result<Child, RadioError>
where
    P: AsRef<OsStr>,
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let program = program.as_ref();
    quiet(program)
        .args(args)
        .spawn()
        .map_err(|e| RadioError::spawn(program.to_string_lossy(), e))
}
