use std::path::PathBuf;

use padradio_proto::config::MixerConfig;
use padradio_proto::platform;
use tracing::{debug, error, info, warn};

use crate::process;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeDirection {
    Up,
    Down,
}

impl VolumeDirection {
    fn suffix(self) -> char {
        match self {
            VolumeDirection::Up => '+',
            VolumeDirection::Down => '-',
        }
    }
}

/// ALSA mixer wrapper: `amixer set <control> unmute`, then `<step>+` / `<step>-`.
pub struct VolumeControl {
    amixer: Option<PathBuf>,
    control: String,
    step: String,
}

impl VolumeControl {
    pub fn new(config: &MixerConfig) -> Self {
        let amixer = platform::find_binary(&config.binary);
        if amixer.is_none() {
            error!("{} not found! Volume control disabled", config.binary);
        }
        Self {
            amixer,
            control: config.control.clone(),
            step: config.step.clone(),
        }
    }

    #[cfg(test)]
    pub fn disabled() -> Self {
        Self {
            amixer: None,
            control: String::new(),
            step: String::new(),
        }
    }

    fn adjust_args(&self, direction: VolumeDirection) -> [String; 3] {
        [
            "set".to_string(),
            self.control.clone(),
            format!("{}{}", self.step, direction.suffix()),
        ]
    }

    pub async fn adjust(&self, direction: VolumeDirection) -> anyhow::Result<()> {
        let Some(amixer) = &self.amixer else {
            debug!("Volume control not available");
            return Ok(());
        };

        let unmute = ["set", self.control.as_str(), "unmute"];
        if let Err(e) = process::run_quiet(amixer, unmute).await {
            warn!("Unmute failed: {}", e);
        }
        process::run_quiet(amixer, self.adjust_args(direction)).await?;
        info!("Volume adjusted: {:?}", direction);
        Ok(())
    }
}
