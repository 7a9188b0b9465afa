use std::path::PathBuf;
use std::time::Duration;

use padradio_proto::config::AdminConfig;
use tracing::{error, info, warn};

use crate::process;
use crate::speech::Speaker;

/// Appliance maintenance actions reachable from the pad in admin mode.
///
/// Everything here is launched and left running; only the outcome of the
/// launch itself is checked, and a failed launch is announced.
pub struct SystemOps {
    speaker: Speaker,
    sudo: PathBuf,
    hostname: PathBuf,
    service_name: String,
    update_script: PathBuf,
    reboot_delay: Duration,
}

impl SystemOps {
    pub fn new(config: &AdminConfig, speaker: Speaker) -> Self {
        Self {
            speaker,
            sudo: PathBuf::from("sudo"),
            hostname: PathBuf::from("hostname"),
            service_name: config.service_name.clone(),
            update_script: config.update_script.clone(),
            reboot_delay: Duration::from_secs(config.reboot_delay_secs),
        }
    }

    /// Swap the privileged-command and hostname programs for stand-ins.
    #[cfg(test)]
    pub fn with_programs(mut self, sudo: PathBuf, hostname: PathBuf) -> Self {
        self.sudo = sudo;
        self.hostname = hostname;
        self
    }

    /// Speak the host's first IPv4 address.
    pub async fn announce_network(&self) -> anyhow::Result<()> {
        let output = match process::capture(&self.hostname, ["-I"]).await {
            Ok(out) => out,
            Err(e) => {
                self.speaker.say("Network information unavailable");
                return Err(e);
            }
        };
        match first_ipv4(&output) {
            Some(addr) => {
                info!("Network address: {}", addr);
                self.speaker.say(&format!("IP address {}", spoken_address(addr)));
            }
            None => {
                warn!("No network address assigned");
                self.speaker.say("No network connection");
            }
        }
        Ok(())
    }

    pub async fn run_update(&self) -> anyhow::Result<()> {
        if !self.update_script.is_file() {
            self.speaker.say("Update failed");
            anyhow::bail!("update script {:?} not found", self.update_script);
        }
        info!("Running update script {:?}", self.update_script);
        self.speaker.say("Updating");
        if let Err(e) = process::spawn_detached("sh", [&self.update_script]) {
            self.speaker.say("Update failed");
            return Err(e.into());
        }
        Ok(())
    }

    pub async fn restart_app(&self) -> anyhow::Result<()> {
        info!("Restarting service {}", self.service_name);
        self.speaker.say("Restarting");
        let args = ["systemctl", "restart", self.service_name.as_str()];
        if let Err(e) = process::spawn_detached(&self.sudo, args) {
            self.speaker.say("Restart failed");
            return Err(e.into());
        }
        Ok(())
    }

    pub async fn reboot(&self) -> anyhow::Result<()> {
        info!("Rebooting in {:?}", self.reboot_delay);
        self.speaker.say("Rebooting");
        tokio::time::sleep(self.reboot_delay).await;
        if let Err(e) = process::spawn_detached(&self.sudo, ["reboot"]) {
            error!("Reboot failed: {}", e);
            self.speaker.say("Reboot failed");
            return Err(e.into());
        }
        Ok(())
    }
}

/// First IPv4 entry of `hostname -I` output.
fn first_ipv4(output: &str) -> Option<&str> {
    output
        .split_whitespace()
        .find(|tok| tok.parse::<std::net::Ipv4Addr>().is_ok())
}

/// "192.168.1.20" → "192 dot 168 dot 1 dot 20", which TTS engines read out
/// more reliably than a dotted quad.
fn spoken_address(addr: &str) -> String {
    addr.split('.').collect::<Vec<_>>().join(" dot ")
}
