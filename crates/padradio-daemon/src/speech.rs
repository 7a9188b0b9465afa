use std::path::PathBuf;

use padradio_proto::config::SpeechConfig;
use padradio_proto::platform;
use tracing::{debug, error, info, warn};

use crate::process;

/// Spoken feedback through an external TTS binary (espeak by default).
///
/// Announcements are fire-and-forget.  When the binary is missing or speech
/// is switched off, `say` only logs what would have been said.
#[derive(Debug, Clone, Default)]
pub struct Speaker {
    binary: Option<PathBuf>,
}

impl Speaker {
    pub fn new(config: &SpeechConfig) -> Self {
        if !config.enabled {
            info!("Speech disabled in config");
            return Self::disabled();
        }
        match platform::find_binary(&config.binary) {
            Some(binary) => {
                info!("Text-to-speech via {:?}", binary);
                Self {
                    binary: Some(binary),
                }
            }
            None => {
                error!("{} not found, spoken feedback disabled", config.binary);
                Self::disabled()
            }
        }
    }

    pub fn disabled() -> Self {
        Self { binary: None }
    }

    pub fn say(&self, text: &str) {
        let Some(binary) = &self.binary else {
            warn!("TTS not available, would have said: {}", text);
            return;
        };
        debug!("Saying: {}", text);
        if let Err(e) = process::spawn_detached(binary, [text]) {
            error!("TTS error: {}", e);
        }
    }
}
